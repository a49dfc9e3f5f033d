//! Anti-automation heuristics
//!
//! Neither check is a guarantee; both complement the external throttle.

use chrono::{DateTime, Utc};

use crate::config::SubmissionConfig;

/// Why a submission looked automated. Only ever logged, never returned
/// to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotSignal {
    HoneypotFilled,
    TooFast { elapsed_ms: i64 },
}

impl BotSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HoneypotFilled => "honeypot_filled",
            Self::TooFast { .. } => "too_fast",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BotDefense {
    min_fill_time_ms: i64,
    honeypot_enabled: bool,
}

impl BotDefense {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            min_fill_time_ms: config.min_fill_time_ms,
            honeypot_enabled: config.honeypot_enabled,
        }
    }

    /// `load_timestamp` is the epoch-millisecond value handed out with the
    /// public form; absent means the client did not echo it back.
    pub fn inspect(
        &self,
        honeypot: Option<&str>,
        load_timestamp: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), BotSignal> {
        if self.honeypot_enabled && honeypot.map_or(false, |h| !h.is_empty()) {
            return Err(BotSignal::HoneypotFilled);
        }

        if let Some(loaded_at) = load_timestamp {
            let elapsed_ms = now.timestamp_millis() - loaded_at;
            if elapsed_ms < self.min_fill_time_ms {
                return Err(BotSignal::TooFast { elapsed_ms });
            }
        }

        Ok(())
    }
}

impl Default for BotDefense {
    fn default() -> Self {
        Self::new(&SubmissionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_honeypot() {
        let defense = BotDefense::default();
        let now = Utc::now();
        assert_eq!(
            defense.inspect(Some("http://spam"), None, now),
            Err(BotSignal::HoneypotFilled)
        );
        assert_eq!(defense.inspect(Some(""), None, now), Ok(()));
        assert_eq!(defense.inspect(None, None, now), Ok(()));
    }

    #[test]
    fn test_honeypot_can_be_disabled() {
        let defense = BotDefense::new(&SubmissionConfig {
            honeypot_enabled: false,
            ..Default::default()
        });
        assert_eq!(defense.inspect(Some("filled"), None, Utc::now()), Ok(()));
    }

    #[test]
    fn test_fill_time() {
        let defense = BotDefense::default();
        let now = Utc::now();
        let now_ms = now.timestamp_millis();

        assert_eq!(
            defense.inspect(None, Some(now_ms), now),
            Err(BotSignal::TooFast { elapsed_ms: 0 })
        );
        assert_eq!(defense.inspect(None, Some(now_ms - 5000), now), Ok(()));
        assert_eq!(defense.inspect(None, Some(now_ms - 2000), now), Ok(()));
        assert!(defense.inspect(None, Some(now_ms + 60_000), now).is_err());
    }
}
