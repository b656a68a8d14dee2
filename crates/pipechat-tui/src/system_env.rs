//! Production Environment implementation using system time.
//!
//! `SystemEnv` backs the session with the real monotonic clock and tokio's
//! timer. Behaviour is therefore non-deterministic; tests use
//! `pipechat_core::env::test_utils::MockEnv` instead.

use std::time::{Duration, Instant};

use pipechat_client::Environment;

/// Production environment using system time.
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
