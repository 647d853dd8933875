//! `vary`: print what a seed does to layout, attributes, text and data

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vary_core::{SeedInput, VariationConfig, VariationSession};

fn cli() -> Command {
    Command::new("vary")
        .version(vary_core::VERSION)
        .about("Deterministic seed-driven variation inspector")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .short('s')
                .global(true)
                .help("Base seed (invalid values clamp to 1)"),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .global(true)
                .conflicts_with("seed")
                .help("Query string carrying seed / seed-structure"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("seed").about("Show the resolved base seed and channel seeds"))
        .subcommand(Command::new("layout").about("Show the selected layout"))
        .subcommand(
            Command::new("attr")
                .about("Show ids and classes for element types")
                .arg(
                    Arg::new("types")
                        .required(true)
                        .num_args(1..)
                        .help("Semantic element types"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .default_value("0")
                        .value_parser(value_parser!(usize))
                        .help("Element index on the page"),
                ),
        )
        .subcommand(
            Command::new("text")
                .about("Show the phrasing and decoys for a text key")
                .arg(Arg::new("key").required(true).help("Semantic text key"))
                .arg(
                    Arg::new("fallback")
                        .long("fallback")
                        .default_value("")
                        .help("Original text"),
                ),
        )
        .subcommand(
            Command::new("shuffle")
                .about("Shuffle items with the structure seed")
                .arg(Arg::new("items").required(true).num_args(1..).help("Items to shuffle"))
                .arg(
                    Arg::new("context")
                        .long("context")
                        .default_value("cli")
                        .help("Context key salting the shuffle"),
                )
                .arg(
                    Arg::new("protect")
                        .long("protect")
                        .num_args(1)
                        .action(ArgAction::Append)
                        .help("Item that must keep its position"),
                ),
        )
        .subcommand(
            Command::new("load")
                .about("Resolve entity data through the provisioning chain")
                .arg(
                    Arg::new("entities")
                        .num_args(0..)
                        .help("Entity types (default: tracked entities)"),
                ),
        )
}

#[derive(Debug, Serialize)]
struct AttrRow {
    #[serde(rename = "type")]
    element_type: String,
    id: String,
    class: String,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn seed_input(matches: &ArgMatches) -> SeedInput {
    if let Some(query) = matches.get_one::<String>("query") {
        SeedInput::from_query(query)
    } else if let Some(seed) = matches.get_one::<String>("seed") {
        SeedInput::none().with_seed(seed.clone())
    } else {
        SeedInput::none()
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<VariationConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => VariationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(VariationConfig::default()),
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = load_config(&matches)?;
    let session = VariationSession::new(config).context("building session")?;
    let resolved = session.apply_input(&seed_input(&matches)).await;
    let json = matches.get_flag("json");
    let seeds = session.seeds();

    match matches.subcommand() {
        Some(("seed", _)) => {
            let derived = session.derived_seeds();
            let report = serde_json::json!({
                "input": resolved,
                "seeds": seeds,
                "channels": derived,
            });
            emit(json, &report, || {
                let mut out = format!(
                    "base seed {} (from {:?})\n  layout {}\n  data {}\n  text {}\n  structure {}",
                    seeds.base, resolved.origin, seeds.layout, seeds.data, seeds.text, seeds.structure
                );
                for (channel, seed) in &derived {
                    out.push_str(&format!("\n  channel {channel}: {seed}"));
                }
                out
            })
        }
        Some(("layout", _)) => {
            let layout = session.layout();
            emit(json, layout, || {
                let sections: Vec<String> = layout
                    .sections
                    .iter()
                    .map(|s| format!("{s:?}").to_lowercase())
                    .collect();
                format!(
                    "layout {} (seed {})\n  sections: {}\n  sidebar: {:?}\n  grouping: {:?} x{}\n  sticky header: {}",
                    layout.name,
                    seeds.layout,
                    sections.join(" > "),
                    layout.sidebar,
                    layout.grouping,
                    layout.columns,
                    layout.sticky_header
                )
            })
        }
        Some(("attr", args)) => {
            let index = args.get_one::<usize>("index").copied().unwrap_or_default();
            let rows: Vec<AttrRow> = strings(args, "types")
                .into_iter()
                .map(|element_type| AttrRow {
                    id: session.element_id(&element_type, index),
                    class: session.element_class(&element_type),
                    element_type,
                })
                .collect();
            emit(json, &rows, || {
                rows.iter()
                    .map(|r| format!("{}: id={} class={}", r.element_type, r.id, r.class))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Some(("text", args)) => {
            let key = args.get_one::<String>("key").context("missing key")?;
            let fallback = args.get_one::<String>("fallback").map_or("", String::as_str);
            let text = session.text(key, fallback);
            let decoys = session.decoys(key, false);
            let report = serde_json::json!({ "key": key, "text": text, "decoys": decoys });
            emit(json, &report, || {
                let mut out = format!("{key}: {text:?}");
                for decoy in &decoys.decoys {
                    out.push_str(&format!(
                        "\n  decoy {:?} {:?} .{}",
                        decoy.position, decoy.text, decoy.class_name
                    ));
                }
                out
            })
        }
        Some(("shuffle", args)) => {
            let items = strings(args, "items");
            let protected = strings(args, "protect");
            let context = args.get_one::<String>("context").map_or("cli", String::as_str);
            let shuffled = session.reorder(&items, context, |item| protected.contains(item));
            emit(json, &shuffled, || shuffled.join(" "))
        }
        Some(("load", args)) => {
            let entities = strings(args, "entities");
            let outcomes = if entities.is_empty() {
                session.load_all().await
            } else {
                let mut outcomes = Vec::with_capacity(entities.len());
                for entity in &entities {
                    outcomes.push(session.load(entity).await);
                }
                outcomes
            };
            emit(json, &outcomes, || {
                outcomes
                    .iter()
                    .map(|o| format!("{}: {} items from {} (seed {})", o.entity, o.items.len(), o.stage, o.seed))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        _ => anyhow::bail!("unknown command"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    run(matches).await
}
