// Clock Port
//
// Boot time is derived as "now - uptime" and command durations are logged, so
// both read the clock through this trait and tests can freeze it.

use chrono::{DateTime, Utc};

/// Wall clock
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Host wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

pub mod mocks {
    use super::*;

    /// Clock frozen at a given instant (epoch milliseconds)
    #[derive(Debug, Clone, Copy)]
    pub struct FixedTimeProvider(pub i64);

    impl FixedTimeProvider {
        pub fn at(instant: DateTime<Utc>) -> Self {
            Self(instant.timestamp_millis())
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }
}
