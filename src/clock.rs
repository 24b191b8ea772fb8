// Gossip and routing engine for a payment-channel overlay network node.
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the MIT License
// along with this software.
// If not, see <https://opensource.org/licenses/MIT>.

//! Time sources used by the routing table and per-peer gossip state.
//!
//! The routing table never calls [`std::time::SystemTime::now`] directly: all
//! wall-clock comparisons (update staleness, pruning) and monotonic timing
//! (pacing, the prune interval) go through a [`Clock`] implementation, so
//! tests can replay stale gossip by overriding the wall clock without
//! touching the actual system time.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A source of both wall-clock (seconds since epoch, for timestamp
/// comparisons) and monotonic (for pacing/expiry) time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time, in seconds since the Unix epoch. Used for
    /// comparing against gossip message timestamps.
    fn now_secs(&self) -> u32;

    /// Current monotonic instant. Used for pacing clocks and to measure
    /// elapsed time for cool-off periods; never compared against gossip
    /// timestamps.
    fn monotonic_now(&self) -> Instant;
}

/// The real system clock: wall time taken from [`SystemTime::now`], monotonic
/// time from [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_secs() as u32
    }

    fn monotonic_now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock whose wall-clock reading can be overridden, for replaying stale
/// gossip in tests. Monotonic time is left untouched since pacing/expiry
/// logic doesn't need to be fooled the same way.
#[derive(Debug)]
pub struct TestClock {
    wall_secs: std::sync::atomic::AtomicU32,
}

impl TestClock {
    pub fn new(wall_secs: u32) -> Self {
        TestClock {
            wall_secs: std::sync::atomic::AtomicU32::new(wall_secs),
        }
    }

    pub fn set(&self, wall_secs: u32) {
        self.wall_secs
            .store(wall_secs, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u32) {
        self.wall_secs
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        TestClock::new(SystemClock.now_secs())
    }
}

impl Clock for TestClock {
    fn now_secs(&self) -> u32 {
        self.wall_secs.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn monotonic_now(&self) -> Instant {
        Instant::now()
    }
}
