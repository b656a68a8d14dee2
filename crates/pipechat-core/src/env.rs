//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from the system clock. Production uses real time;
//! tests use [`test_utils::MockEnv`], whose clock only moves when told to.

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

/// A point in time as seen by an [`Environment`].
///
/// Blanket-implemented for any type with the required arithmetic, which
/// covers `std::time::Instant`, `tokio::time::Instant`, and `Duration` (handy
/// as an offset-from-zero clock in tests).
pub trait Moment:
    Copy + Ord + Send + Sync + Debug + Add<Duration, Output = Self> + Sub<Output = Duration>
{
}

impl<T> Moment for T where
    T: Copy + Ord + Send + Sync + Debug + Add<Duration, Output = T> + Sub<Output = Duration>
{
}

/// Abstract environment providing time and async sleep.
///
/// # Invariants
///
/// - `now()` never goes backwards within one execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    type Instant: Moment;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; state machines never do.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Test environment with a manually advanced clock.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use super::Environment;

    /// Virtual clock shared between clones.
    ///
    /// Starts at zero. [`MockEnv::advance`] moves every clone forward, which
    /// lets a test hold one handle while the session under test holds another.
    #[derive(Debug, Clone, Default)]
    pub struct MockEnv {
        nanos: Arc<AtomicU64>,
    }

    impl MockEnv {
        /// Create a clock at time zero.
        pub fn new() -> Self {
            Self::default()
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
        }
    }

    impl Environment for MockEnv {
        type Instant = Duration;

        fn now(&self) -> Duration {
            Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
        }

        fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            self.advance(duration);
            std::future::ready(())
        }
    }
}
