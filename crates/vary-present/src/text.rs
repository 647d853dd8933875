//! Text phrasing variation
//!
//! Every seed maps to one of ten phrasing buckets. Bucket 1 is the canonical
//! bucket and carries no phrases, so the caller's original text comes back.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use vary_seed::Seed;

/// Number of phrasing buckets
pub const DEFAULT_BUCKETS: u8 = 10;

/// Canonical bucket
pub const CANONICAL_BUCKET: u8 = 1;

/// Phrases keyed by `(bucket, semantic key)`
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    entries: HashMap<(u8, String), String>,
}

impl PhraseTable {
    /// Empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a phrase
    #[must_use]
    pub fn with_phrase(mut self, bucket: u8, key: impl Into<String>, phrase: impl Into<String>) -> Self {
        self.insert(bucket, key, phrase);
        self
    }

    /// Add or replace a phrase in place
    pub fn insert(&mut self, bucket: u8, key: impl Into<String>, phrase: impl Into<String>) {
        self.entries.insert((bucket, key.into()), phrase.into());
    }

    /// Add one phrase per bucket starting at bucket 2
    #[must_use]
    pub fn with_variants(mut self, key: &str, phrases: &[&str]) -> Self {
        for (offset, phrase) in phrases.iter().enumerate() {
            let Ok(bucket) = u8::try_from(offset + 2) else {
                break;
            };
            self.insert(bucket, key, *phrase);
        }
        self
    }

    /// Phrase for a bucket and key
    #[must_use]
    pub fn get(&self, bucket: u8, key: &str) -> Option<&str> {
        self.entries
            .get(&(bucket, key.to_string()))
            .map(String::as_str)
    }

    /// All phrases for a key ordered by bucket
    #[must_use]
    pub fn alternates(&self, key: &str) -> Vec<(u8, &str)> {
        let mut found: Vec<(u8, &str)> = self
            .entries
            .iter()
            .filter(|((_, k), _)| k == key)
            .map(|((bucket, _), phrase)| (*bucket, phrase.as_str()))
            .collect();
        found.sort_unstable_by_key(|(bucket, _)| *bucket);
        found
    }

    /// Number of phrases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Built-in phrasings for common marketplace/booking copy
    #[must_use]
    pub fn builtin() -> Arc<PhraseTable> {
        Arc::clone(&BUILTIN)
    }
}

static BUILTIN: Lazy<Arc<PhraseTable>> = Lazy::new(|| {
    Arc::new(
        PhraseTable::new()
            .with_variants(
                "search.placeholder",
                &[
                    "Search listings",
                    "What are you looking for?",
                    "Find something",
                    "Type to search",
                    "Search by keyword",
                    "Start your search",
                    "Look up anything",
                    "Enter a search term",
                    "Browse by name",
                ],
            )
            .with_variants(
                "search.button",
                &["Go", "Find", "Look up", "Search now", "Show results", "Seek", "Explore", "Discover", "Filter"],
            )
            .with_variants(
                "cta.book_now",
                &[
                    "Reserve",
                    "Book this",
                    "Secure your spot",
                    "Reserve now",
                    "Make a booking",
                    "Claim it",
                    "Lock it in",
                    "Confirm booking",
                    "Hold my place",
                ],
            )
            .with_variants(
                "cart.add",
                &["Add", "Put in cart", "Add to basket", "Buy", "Add item", "Grab it", "Save to cart", "Take it", "Include"],
            )
            .with_variants(
                "nav.home",
                &["Start", "Main", "Overview", "Landing", "Front page", "Welcome", "Index", "Dashboard", "Top"],
            )
            .with_variants(
                "form.submit",
                &["Send", "Submit form", "Continue", "Done", "Save", "Apply", "Confirm", "Finish", "Next"],
            )
            .with_variants(
                "listing.empty",
                &[
                    "Nothing here yet",
                    "No matches found",
                    "Your search came up empty",
                    "No results",
                    "Nothing to show",
                    "Try another search",
                    "We found nothing",
                    "The list is empty",
                    "No items match",
                ],
            )
            .with_variants(
                "auth.login",
                &["Sign in", "Log on", "Enter", "Access account", "Member login", "Sign on", "Authenticate", "Continue to account", "Open session"],
            ),
    )
});

/// Selects a phrasing per semantic key
#[derive(Debug, Clone)]
pub struct ContentVariantEngine {
    table: Arc<PhraseTable>,
    buckets: u8,
}

impl ContentVariantEngine {
    /// Create engine over a phrase table
    #[inline]
    #[must_use]
    pub fn new(table: Arc<PhraseTable>) -> Self {
        Self {
            table,
            buckets: DEFAULT_BUCKETS,
        }
    }

    /// Override the bucket count (at least one)
    #[inline]
    #[must_use]
    pub fn with_buckets(mut self, buckets: u8) -> Self {
        self.buckets = buckets.max(1);
        self
    }

    /// Bucket for a seed: `((seed - 1) mod buckets) + 1`
    #[must_use]
    pub fn bucket_for(&self, seed: Seed) -> u8 {
        // offset < buckets <= u8::MAX
        #[allow(clippy::cast_possible_truncation)]
        let offset = seed.offset(usize::from(self.buckets)) as u8;
        offset + CANONICAL_BUCKET
    }

    /// Text for a semantic key, or `fallback` when no phrasing exists
    ///
    /// Never returns an empty string unless `fallback` is empty.
    #[must_use]
    pub fn text_for(&self, seed: Seed, semantic_key: &str, fallback: &str) -> String {
        self.table
            .get(self.bucket_for(seed), semantic_key)
            .filter(|phrase| !phrase.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Phrasings for a key other than the one `seed` renders
    #[must_use]
    pub fn alternates_for(&self, seed: Seed, semantic_key: &str) -> Vec<&str> {
        let bucket = self.bucket_for(seed);
        self.table
            .alternates(semantic_key)
            .into_iter()
            .filter(|(b, phrase)| *b != bucket && !phrase.is_empty())
            .map(|(_, phrase)| phrase)
            .collect()
    }

    /// Phrase table in use
    #[inline]
    #[must_use]
    pub fn table(&self) -> &PhraseTable {
        &self.table
    }
}

impl Default for ContentVariantEngine {
    fn default() -> Self {
        Self::new(PhraseTable::builtin())
    }
}
