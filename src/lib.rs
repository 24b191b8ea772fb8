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

//! Gossip replication and payment routing for a Lightning-style overlay
//! network.
//!
//! This crate owns two things: an append-only [`store`] of verified gossip
//! messages with CRC-protected, tombstonable records, and an in-memory
//! [`routing_table`] that validates incoming announcements/updates against
//! that store, prunes stale topology, and answers [`path_finder`] queries for
//! payment routes. Everything else a full node needs — JSON-RPC dispatch,
//! the wallet, the channel state machine that negotiates commitment
//! transactions, on-chain watching and signing — lives outside this crate
//! and is consumed here only through the narrow collaborator traits in
//! [`routing_table::collaborators`] and [`clock`].

#![recursion_limit = "256"]
#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports
)]

#[allow(unused_imports)]
#[macro_use]
extern crate amplify;
#[macro_use]
extern crate amplify_derive;

pub mod broadcast_index;
pub mod clock;
pub mod config;
pub mod failure_feedback;
pub mod path_finder;
pub mod peer_state;
pub mod routing_table;
pub mod store;
pub mod types;
pub mod wire;

pub use broadcast_index::BroadcastIndex;
pub use clock::Clock;
pub use config::Config;
pub use routing_table::RoutingTable;
pub use store::GossipStore;
pub use types::{NodeId, ShortChannelId};
