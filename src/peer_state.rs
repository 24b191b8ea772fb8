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

//! Per-peer gossip replication state: a timestamp window, a cursor into
//! the store, and a pacing clock for the next outbound flush. The store
//! itself already skips tombstoned and non-rebroadcastable records
//! ([`crate::store::GossipStore::next`]); what's left here is purely
//! per-peer — the timestamp window and when to next look.

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::store::{self, GossipStore};

/// How often the forwarding loop rearms after draining the store, absent a
/// fresh timestamp filter resetting it to fire immediately.
pub const GOSSIP_FLUSH_INTERVAL: Duration = Duration::from_secs(60);

/// The first record offset, just past the format-version byte.
const STORE_HEAD_OFFSET: u64 = 1;

#[derive(Debug)]
pub struct PeerGossipState {
    min_timestamp: u32,
    max_timestamp: u32,
    cursor: u64,
    next_flush_at: Instant,
}

impl PeerGossipState {
    /// A freshly connected peer with no filter yet applied: the full
    /// timestamp range, starting from the head of the store, ready to send
    /// immediately.
    pub fn new(clock: &dyn Clock) -> Self {
        PeerGossipState {
            min_timestamp: 0,
            max_timestamp: u32::MAX,
            cursor: STORE_HEAD_OFFSET,
            next_flush_at: clock.monotonic_now(),
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn window(&self) -> (u32, u32) {
        (self.min_timestamp, self.max_timestamp)
    }

    /// Applies a `gossip_timestamp_filter`: resets the window, rewinds the
    /// cursor to the head of the store, and arms the pacing clock for an
    /// immediate send.
    pub fn apply_timestamp_filter(
        &mut self,
        first_timestamp: u32,
        timestamp_range: u32,
        clock: &dyn Clock,
    ) {
        self.min_timestamp = first_timestamp;
        self.max_timestamp = first_timestamp
            .saturating_add(timestamp_range)
            .saturating_sub(1)
            .max(first_timestamp);
        self.cursor = STORE_HEAD_OFFSET;
        self.next_flush_at = clock.monotonic_now();
    }

    pub fn is_flush_due(&self, clock: &dyn Clock) -> bool {
        clock.monotonic_now() >= self.next_flush_at
    }

    /// Advances the cursor through the store, returning the next payload
    /// due for this peer under its timestamp window, or `None` once the
    /// store is drained (at which point the pacing clock is rearmed).
    pub fn poll(
        &mut self,
        store: &mut GossipStore,
        clock: &dyn Clock,
    ) -> Result<Option<Vec<u8>>, store::Error> {
        loop {
            match store.next(self.cursor)? {
                None => {
                    self.next_flush_at =
                        clock.monotonic_now() + GOSSIP_FLUSH_INTERVAL;
                    return Ok(None);
                }
                Some((record, next_offset)) => {
                    self.cursor = next_offset;
                    if record.timestamp < self.min_timestamp
                        || record.timestamp > self.max_timestamp
                    {
                        continue;
                    }
                    return Ok(Some(record.payload));
                }
            }
        }
    }
}
