//! Slug Value Object
//!
//! Public address of a form. Shared by every version in a form group, so
//! uniqueness comes from a random suffix rather than a storage constraint.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::config::SlugConfig;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Base used when a title has no ASCII-alphanumeric content at all
const FALLBACK_BASE: &str = "form";

/// URL-safe public identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Wrap an already generated slug (lookups by public address)
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds slugs of the form `<normalized-title>-<random suffix>`
#[derive(Clone, Debug)]
pub struct SlugGenerator {
    max_length: usize,
    suffix_length: usize,
}

impl SlugGenerator {
    pub fn new(config: &SlugConfig) -> Self {
        Self {
            max_length: config.max_length,
            suffix_length: config.suffix_length,
        }
    }

    /// Generate a slug using the thread-local RNG
    pub fn generate(&self, title: &str) -> Slug {
        self.generate_with(title, &mut rand::thread_rng())
    }

    /// Generate a slug drawing the suffix from `rng`
    pub fn generate_with<R: Rng + ?Sized>(&self, title: &str, rng: &mut R) -> Slug {
        let mut base = normalize_title(title, self.max_length);
        if base.is_empty() {
            base.push_str(FALLBACK_BASE);
        }

        let suffix: String = (0..self.suffix_length)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();

        Slug(format!("{}-{}", base, suffix))
    }
}

impl Default for SlugGenerator {
    fn default() -> Self {
        Self::new(&SlugConfig::default())
    }
}

/// Lowercase ASCII word characters, diacritics stripped, whitespace runs collapsed to one hyphen
fn normalize_title(title: &str, max_length: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    // NFD splits accented letters into base letter + combining mark; the mark
    // is then dropped together with any other non-word character.
    for ch in title.nfd() {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        }
    }

    // Only ASCII remains, so byte truncation is a char boundary
    if slug.len() > max_length {
        slug.truncate(max_length);
    }
    slug.trim_end_matches('-').to_string()
}
