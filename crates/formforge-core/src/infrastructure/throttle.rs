//! Submission throttles

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::ports::outbound::{Clock, SubmissionThrottle};

/// Key used when the transport could not determine a client origin
const UNKNOWN_ORIGIN: &str = "unknown";

/// Minimum gap between sweeps of refilled buckets
const SWEEP_INTERVAL_SECS: i64 = 300;

/// Lets everything through
#[derive(Clone, Copy, Debug, Default)]
pub struct Unthrottled;

impl SubmissionThrottle for Unthrottled {
    fn try_acquire(&self, _origin: Option<&str>) -> bool {
        true
    }
}

/// Per-origin token bucket refilled continuously over an hour
pub struct TokenBucketThrottle {
    buckets: DashMap<String, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
    clock: Arc<dyn Clock>,
    last_sweep: Mutex<DateTime<Utc>>,
}

struct Bucket {
    tokens: f64,
    last_refill: DateTime<Utc>,
}

impl TokenBucketThrottle {
    /// `per_hour` submissions sustained, up to `burst` at once
    pub fn new(per_hour: u32, burst: u32, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            buckets: DashMap::new(),
            capacity: f64::from(burst.max(1)),
            refill_per_sec: f64::from(per_hour) / 3600.0,
            clock,
            last_sweep: Mutex::new(now),
        }
    }

    /// Origins currently holding a partially drained bucket
    pub fn tracked_origins(&self) -> usize {
        self.buckets.len()
    }

    /// Tokens left for an origin, after refill
    pub fn remaining(&self, origin: &str) -> u32 {
        let now = self.clock.now();
        match self.buckets.get_mut(origin) {
            Some(mut bucket) => {
                self.refill(&mut bucket, now);
                bucket.tokens.floor() as u32
            }
            None => self.capacity as u32,
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: DateTime<Utc>) {
        let elapsed_ms = (now - bucket.last_refill).num_milliseconds();
        if elapsed_ms > 0 {
            let added = elapsed_ms as f64 / 1000.0 * self.refill_per_sec;
            bucket.tokens = (bucket.tokens + added).min(self.capacity);
            bucket.last_refill = now;
        }
    }

    /// Drop buckets that would be full again; a missing bucket starts full
    fn sweep(&self, now: DateTime<Utc>) {
        {
            let mut last = self.last_sweep.lock();
            if now - *last < Duration::seconds(SWEEP_INTERVAL_SECS) {
                return;
            }
            *last = now;
        }

        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            let elapsed_ms = (now - bucket.last_refill).num_milliseconds().max(0);
            let refilled = bucket.tokens + elapsed_ms as f64 / 1000.0 * self.refill_per_sec;
            refilled < self.capacity
        });
        let pruned = before.saturating_sub(self.buckets.len());
        if pruned > 0 {
            debug!(pruned, remaining = self.buckets.len(), "pruned refilled throttle buckets");
        }
    }
}

impl SubmissionThrottle for TokenBucketThrottle {
    fn try_acquire(&self, origin: Option<&str>) -> bool {
        let now = self.clock.now();
        let key = origin.unwrap_or(UNKNOWN_ORIGIN);
        self.sweep(now);

        let mut bucket = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        self.refill(&mut bucket, now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
