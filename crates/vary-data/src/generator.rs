//! Deterministic local record generation
//!
//! Output is a pure function of `(entity, seed, count)`: a xorshift32
//! generator seeded from `fnv1a("generate:<entity>") ^ seed` walks fixed
//! field templates. No clock, no ambient randomness.

use crate::entity::{Entity, ID_FIELD};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use vary_seed::hash::fnv1a;
use vary_seed::prng::{below, Xorshift32};
use vary_seed::Seed;

/// How one field is generated
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGen {
    /// One of a fixed list
    Choice(Vec<Value>),
    /// Integer in `min..=max`
    Integer {
        /// Lower bound
        min: i64,
        /// Upper bound (inclusive)
        max: i64,
    },
    /// Two-decimal price in `min_cents..=max_cents`
    Price {
        /// Lower bound in cents
        min_cents: u32,
        /// Upper bound in cents (inclusive)
        max_cents: u32,
    },
    /// `true` with the given percentage
    Flag(u8),
    /// Up to `max` distinct entries of a list, in list order
    Subset {
        /// Candidates
        from: Vec<String>,
        /// Maximum entries picked
        max: usize,
    },
    /// One word from each part, joined by spaces
    Compose(Vec<Vec<String>>),
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn choice(words: &[&str]) -> FieldGen {
    FieldGen::Choice(words.iter().map(|w| json!(w)).collect())
}

fn compose(parts: &[&[&str]]) -> FieldGen {
    FieldGen::Compose(parts.iter().map(|p| strings(p)).collect())
}

impl FieldGen {
    fn sample(&self, rng: &mut Xorshift32) -> Value {
        match self {
            Self::Choice(values) => {
                if values.is_empty() {
                    return Value::Null;
                }
                values[below(rng, values.len())].clone()
            }
            Self::Integer { min, max } => {
                let (lo, hi) = if min <= max { (*min, *max) } else { (*max, *min) };
                let span = usize::try_from(hi.abs_diff(lo)).unwrap_or(usize::MAX - 1) + 1;
                let offset = i64::try_from(below(rng, span)).unwrap_or(0);
                json!(lo.saturating_add(offset))
            }
            Self::Price { min_cents, max_cents } => {
                let (lo, hi) = if min_cents <= max_cents {
                    (*min_cents, *max_cents)
                } else {
                    (*max_cents, *min_cents)
                };
                let span = (hi - lo) as usize + 1;
                // span fits u32 because hi - lo does
                #[allow(clippy::cast_possible_truncation)]
                let cents = lo + below(rng, span) as u32;
                json!(f64::from(cents) / 100.0)
            }
            Self::Flag(percent) => json!(below(rng, 100) < usize::from(*percent)),
            Self::Subset { from, max } => {
                let take = below(rng, (*max).min(from.len()) + 1);
                let mut picked: Vec<usize> = Vec::with_capacity(take);
                while picked.len() < take {
                    let i = below(rng, from.len());
                    if !picked.contains(&i) {
                        picked.push(i);
                    }
                }
                picked.sort_unstable();
                json!(picked.into_iter().map(|i| from[i].clone()).collect::<Vec<_>>())
            }
            Self::Compose(parts) => {
                let words: Vec<&str> = parts
                    .iter()
                    .filter(|p| !p.is_empty())
                    .map(|p| p[below(rng, p.len())].as_str())
                    .collect();
                json!(words.join(" "))
            }
        }
    }
}

/// Ordered field generators for one entity type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
    fields: Vec<(String, FieldGen)>,
}

impl Template {
    /// Empty template
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, generator: FieldGen) -> Self {
        self.fields.push((name.into(), generator));
        self
    }

    /// Field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Generates records from per-entity templates
#[derive(Debug, Clone)]
pub struct LocalGenerator {
    templates: HashMap<String, Template>,
    fallback: Template,
}

impl LocalGenerator {
    /// Generator with no entity templates
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            fallback: Template::new()
                .field("name", compose(&[&["Bright", "Quiet", "Swift", "Bold", "Calm"], &["Harbor", "Summit", "Meadow", "Atlas", "Beacon"]]))
                .field("value", FieldGen::Integer { min: 1, max: 1000 }),
        }
    }

    /// Add or replace an entity template
    #[must_use]
    pub fn with_template(mut self, entity: impl Into<String>, template: Template) -> Self {
        self.templates.insert(entity.into(), template);
        self
    }

    /// Template used for an entity type
    #[must_use]
    pub fn template(&self, entity: &str) -> &Template {
        self.templates.get(entity).unwrap_or(&self.fallback)
    }

    /// Generate `count` records for `entity` under `seed`
    #[must_use]
    pub fn generate(&self, entity: &str, seed: Seed, count: usize) -> Vec<Entity> {
        let template = self.template(entity);
        let mut rng = Xorshift32::new(fnv1a(&format!("generate:{entity}")) ^ seed.as_u32());
        (0..count)
            .map(|n| {
                let mut record = Map::new();
                record.insert(ID_FIELD.to_string(), json!(format!("{entity}-{seed}-{n}")));
                for (name, generator) in &template.fields {
                    record.insert(name.clone(), generator.sample(&mut rng));
                }
                Value::Object(record)
            })
            .collect()
    }
}

impl Default for LocalGenerator {
    fn default() -> Self {
        Self::empty()
            .with_template(
                "jobs",
                Template::new()
                    .field("title", compose(&[&["Junior", "Senior", "Lead", "Staff", "Principal"], &["Frontend Engineer", "Data Analyst", "Product Designer", "Backend Engineer", "QA Engineer", "Support Specialist"]]))
                    .field("company", choice(&["Brightline", "Northwind", "Kitestring", "Harbor Labs", "Quarry", "Fieldnote", "Copperleaf"]))
                    .field("location", choice(&["Remote", "Berlin", "Lisbon", "Dublin", "Madrid", "Paris", "Warsaw"]))
                    .field("salary", FieldGen::Integer { min: 35_000, max: 140_000 })
                    .field("type", choice(&["full-time", "part-time", "contract"]))
                    .field("tags", FieldGen::Subset { from: strings(&["rust", "react", "sql", "k8s", "figma", "python", "go"]), max: 3 })
                    .field("featured", FieldGen::Flag(20)),
            )
            .with_template(
                "hotels",
                Template::new()
                    .field("name", compose(&[&["Harbor", "Linden", "Casa", "Pier", "Old Mill", "Garden"], &["House", "Inn", "Suites", "Lodge", "Hotel"]]))
                    .field("city", choice(&["Lisbon", "Berlin", "Madrid", "Dublin", "Paris", "Rome"]))
                    .field("price", FieldGen::Integer { min: 60, max: 320 })
                    .field("rating", choice(&["3.5", "3.9", "4.2", "4.5", "4.8"]))
                    .field("amenities", FieldGen::Subset { from: strings(&["wifi", "pool", "gym", "spa", "breakfast", "bar"]), max: 4 })
                    .field("available", FieldGen::Flag(85)),
            )
            .with_template(
                "products",
                Template::new()
                    .field("name", compose(&[&["Trail", "Ceramic", "Wool", "Steel", "Canvas"], &["Backpack", "Mug", "Lamp", "Throw", "Knife", "Bottle"]]))
                    .field("category", choice(&["outdoor", "kitchen", "home", "office"]))
                    .field("price", FieldGen::Price { min_cents: 499, max_cents: 24_999 })
                    .field("stock", FieldGen::Integer { min: 0, max: 200 })
                    .field("rating", choice(&["3.8", "4.0", "4.3", "4.6", "4.9"])),
            )
            .with_template(
                "emails",
                Template::new()
                    .field("from", choice(&["ana@example.com", "sam@example.com", "lee@example.com", "billing@example.com", "noreply@example.com"]))
                    .field("subject", compose(&[&["Re:", "Fwd:", "Update:", "Reminder:"], &["venue", "invoice", "plan", "meeting", "order"]]))
                    .field("body", choice(&["See attached.", "Thanks for the update.", "Can we talk tomorrow?", "All set on my side."]))
                    .field("read", FieldGen::Flag(40))
                    .field("labels", FieldGen::Subset { from: strings(&["work", "billing", "events", "security"]), max: 2 }),
            )
    }
}
