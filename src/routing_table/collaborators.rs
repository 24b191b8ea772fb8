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

//! The narrow trait boundaries the routing table consumes from, and
//! produces to, the rest of the node. Resolving a funding output crosses
//! the only suspension point in channel-announcement ingest (spec §5); the
//! routing table itself never touches the blockchain.

use crate::types::ShortChannelId;

/// The outcome of resolving a channel announcement's funding output
/// against the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FundingLookupResult {
    /// The output exists, is unspent, and its capacity is as given.
    Found { amount_sat: u64, script_pubkey: Vec<u8> },
    /// The output does not exist (yet) at this chain height.
    NotFound,
    /// The output existed but has already been spent.
    Spent,
}

/// Resolves the on-chain funding output a `channel_announcement` claims,
/// confirming it is unspent and deriving its script for the 2-of-2 match in
/// `RoutingTable::ingest_channel_announcement`'s second phase.
#[async_trait::async_trait]
pub trait FundingLookup: Send + Sync {
    async fn lookup(&self, short_channel_id: ShortChannelId) -> FundingLookupResult;
}

/// Notifications the routing table emits for a plugin/hook layer. Never
/// consumed internally; purely an output channel.
pub trait NotificationSink: Send + Sync {
    fn channel_added(&self, short_channel_id: ShortChannelId) {
        let _ = short_channel_id;
    }
    fn channel_removed(&self, short_channel_id: ShortChannelId) {
        let _ = short_channel_id;
    }
    fn channel_refreshed(&self, short_channel_id: ShortChannelId) {
        let _ = short_channel_id;
    }
}

/// A sink that drops every notification; useful for tests and for nodes
/// without a plugin layer attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotificationSink;

impl NotificationSink for NullNotificationSink {}
