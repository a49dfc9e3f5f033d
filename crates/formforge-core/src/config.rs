//! Engine configuration
//!
//! Plain serde structs; the host decides where values come from.

use serde::{Deserialize, Serialize};

/// Top-level engine settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub submission: SubmissionConfig,
    pub slug: SlugConfig,
    pub paging: PagingConfig,
}

/// Anti-automation heuristics applied before validation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Minimum time between page load and submit
    pub min_fill_time_ms: i64,
    pub honeypot_enabled: bool,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            min_fill_time_ms: 2000,
            honeypot_enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    /// Cap on the normalized title part, suffix excluded
    pub max_length: usize,
    pub suffix_length: usize,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            max_length: 50,
            suffix_length: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}
