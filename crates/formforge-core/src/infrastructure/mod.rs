//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod clock;
pub mod events;
pub mod persistence;
pub mod throttle;

pub use clock::{FixedClock, SystemClock};
pub use events::{RecordingEventPublisher, TracingEventPublisher};
pub use persistence::InMemoryRecordStore;
pub use throttle::{TokenBucketThrottle, Unthrottled};
