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

//! The in-memory topology graph: nodes, channels, and the multi-stage
//! ingest pipelines that validate incoming announcements and updates
//! against it, deferring orphans and pruning stale entries.

pub mod channel_set;
pub mod collaborators;
mod error;

pub use channel_set::ChannelSet;
pub use collaborators::{FundingLookup, FundingLookupResult, NotificationSink};
pub use error::IngestError;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use bitcoin::blockdata::opcodes::all as opcodes;
use bitcoin::blockdata::script::Builder;
use bitcoin::hashes::Hash as BitcoinHashTrait;
use bitcoin::hashes::sha256d;
use bitcoin::secp256k1::{self, Secp256k1};
use lightning_encoding::LightningEncode;
use lru::LruCache;

use crate::clock::Clock;
use crate::config::Config;
use crate::store::{self, GossipStore};
use crate::types::{Alias, NodeColor, NodeId, ShortChannelId, Signature};
use crate::wire::{
    ChannelAnnouncement, ChannelFlags, ChannelUpdate, Message, NodeAddress,
    NodeAnnouncement,
};

/// One direction of a bidirectional channel. Defined once its
/// `store_offset` is non-zero (offset 0 is the format-version byte, never a
/// record start, so it doubles as the "undefined" sentinel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HalfChannel {
    pub base_fee_msat: u32,
    pub proportional_fee_millionths: u32,
    pub cltv_expiry_delta: u16,
    pub htlc_minimum_msat: u64,
    pub htlc_maximum_msat: Option<u64>,
    pub message_flags: u8,
    pub channel_flags: u8,
    pub timestamp: u32,
    pub store_offset: u64,
}

impl HalfChannel {
    pub fn undefined() -> Self {
        HalfChannel {
            base_fee_msat: 0,
            proportional_fee_millionths: 0,
            cltv_expiry_delta: 0,
            htlc_minimum_msat: 0,
            htlc_maximum_msat: None,
            message_flags: 0,
            channel_flags: 0,
            timestamp: 0,
            store_offset: 0,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.store_offset != 0
    }

    pub fn is_disabled(&self) -> bool {
        self.channel_flags & ChannelFlags::DISABLED.bits() != 0
    }

    pub fn is_enabled(&self) -> bool {
        self.is_defined() && !self.is_disabled()
    }

    fn from_update(update: &ChannelUpdate, store_offset: u64) -> Self {
        HalfChannel {
            base_fee_msat: update.fee_base_msat,
            proportional_fee_millionths: update.fee_proportional_millionths,
            cltv_expiry_delta: update.cltv_expiry_delta,
            htlc_minimum_msat: update.htlc_minimum_msat,
            htlc_maximum_msat: update.htlc_maximum_msat,
            message_flags: update.message_flags,
            channel_flags: update.channel_flags,
            timestamp: update.timestamp,
            store_offset,
        }
    }
}

/// A channel whose announcement has been admitted. `nodes` is always
/// canonically ordered, `nodes.0 < nodes.1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub short_channel_id: ShortChannelId,
    pub nodes: (NodeId, NodeId),
    pub capacity_sat: u64,
    /// Non-zero iff the channel is public (invariant 2); zero for a
    /// local-only channel, which never enters the store.
    pub bcast_timestamp: u32,
    pub announcement_offset: Option<u64>,
    /// Index 0: direction `nodes.0 -> nodes.1`. Index 1: the reverse.
    pub half: [HalfChannel; 2],
}

impl Channel {
    pub fn is_public(&self) -> bool {
        self.bcast_timestamp != 0
    }

    pub fn half_for_direction(&self, direction_bit: u8) -> &HalfChannel {
        &self.half[(direction_bit & 1) as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct DeferredUpdate {
    update: ChannelUpdate,
}

/// A channel announcement awaiting its funding-output lookup.
#[derive(Clone, Debug)]
pub struct PendingChannelAnnouncement {
    announcement: ChannelAnnouncement,
    node_ids: (NodeId, NodeId),
    funding_keys: (secp256k1::PublicKey, secp256k1::PublicKey),
    deferred_updates: [Option<DeferredUpdate>; 2],
}

/// A channel whose announcement is in the store but which has not yet
/// received a first directional update, and so is not yet attached to
/// either endpoint's channel list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnupdatedChannel {
    pub short_channel_id: ShortChannelId,
    pub nodes: (NodeId, NodeId),
    pub capacity_sat: u64,
    pub announcement_offset: u64,
    pub bcast_timestamp: u32,
}

#[derive(Clone, Debug)]
pub struct NodeAnnouncementInfo {
    pub features: Vec<u8>,
    pub timestamp: u32,
    pub rgb_color: NodeColor,
    pub alias: Alias,
    pub addresses: Vec<NodeAddress>,
    pub store_offset: u64,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub node_id: NodeId,
    pub announcement: Option<NodeAnnouncementInfo>,
    pub channels: ChannelSet,
}

/// What happened to a freshly parsed `channel_announcement`: it either
/// requests an async funding-output lookup (the caller must follow up with
/// [`RoutingTable::complete_channel_announcement`]), or it was resolved
/// immediately without touching the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnouncementOutcome {
    Duplicate,
    FailedLookupCached,
    LookupRequested,
}

/// The node map, channel map, and the deferral/failure-cache state the
/// ingest pipelines use, plus the store and broadcast index they write
/// through to.
pub struct RoutingTable {
    config: Config,
    nodes: HashMap<NodeId, Node>,
    channels: HashMap<ShortChannelId, Channel>,
    pending_announcements: HashMap<ShortChannelId, PendingChannelAnnouncement>,
    unupdated_channels: HashMap<ShortChannelId, UnupdatedChannel>,
    pending_node_announcements: HashMap<NodeId, NodeAnnouncement>,
    locally_disabled: HashMap<(ShortChannelId, u8), Instant>,
    failed_lookups: LruCache<ShortChannelId, ()>,
    store: GossipStore,
    broadcast_index: crate::broadcast_index::BroadcastIndex,
    clock: Box<dyn Clock>,
    funding_lookup: Box<dyn FundingLookup>,
    notifications: Box<dyn NotificationSink>,
    secp: Secp256k1<secp256k1::VerifyOnly>,
}

const FAILED_LOOKUP_CACHE_SIZE: usize = 1024;

impl RoutingTable {
    pub fn new(
        config: Config,
        store: GossipStore,
        clock: Box<dyn Clock>,
        funding_lookup: Box<dyn FundingLookup>,
        notifications: Box<dyn NotificationSink>,
    ) -> Self {
        RoutingTable {
            config,
            nodes: HashMap::new(),
            channels: HashMap::new(),
            pending_announcements: HashMap::new(),
            unupdated_channels: HashMap::new(),
            pending_node_announcements: HashMap::new(),
            locally_disabled: HashMap::new(),
            failed_lookups: LruCache::new(
                std::num::NonZeroUsize::new(FAILED_LOOKUP_CACHE_SIZE).unwrap(),
            ),
            store,
            broadcast_index: crate::broadcast_index::BroadcastIndex::new(),
            clock,
            funding_lookup,
            notifications,
            secp: Secp256k1::verification_only(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn channel(&self, scid: &ShortChannelId) -> Option<&Channel> {
        self.channels.get(scid)
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn funding_lookup(&self) -> &dyn FundingLookup {
        self.funding_lookup.as_ref()
    }

    fn verify_signature(
        &self,
        pubkey: &secp256k1::PublicKey,
        data: &[u8],
        signature: &Signature,
    ) -> bool {
        let digest = sha256d::Hash::hash(data);
        match secp256k1::Message::from_slice(digest.as_ref()) {
            Ok(msg) => {
                self.secp.verify_ecdsa(&msg, signature, pubkey).is_ok()
            }
            Err(_) => false,
        }
    }

    fn encode(&self, msg: Message) -> Result<Vec<u8>, IngestError> {
        let mut buf = Vec::new();
        msg.lightning_encode(&mut buf)
            .map_err(|_| IngestError::MalformedMessage)?;
        Ok(buf)
    }

    fn append_and_index(
        &mut self,
        msg: Message,
        timestamp: u32,
    ) -> Result<u64, IngestError> {
        let payload = self.encode(msg)?;
        let offset = self.store.append(&payload, timestamp)?;
        self.broadcast_index.assign_next(offset);
        Ok(offset)
    }

    // -- channel_announcement --------------------------------------------

    /// First phase of the `channel_announcement` ingest pipeline: parses
    /// and verifies the four signatures, checks for a duplicate or a
    /// cached failed lookup, and otherwise places the announcement into the
    /// pending map and asks the caller to resolve its funding output.
    pub fn ingest_channel_announcement(
        &mut self,
        msg: ChannelAnnouncement,
    ) -> Result<AnnouncementOutcome, IngestError> {
        let scid = msg.short_channel_id;
        let signed = msg.signed_data().map_err(|_| IngestError::MalformedMessage)?;
        if !self.verify_signature(&msg.node_id_1, &signed, &msg.node_signature_1)
            || !self.verify_signature(&msg.node_id_2, &signed, &msg.node_signature_2)
            || !self.verify_signature(
                &msg.bitcoin_key_1,
                &signed,
                &msg.bitcoin_signature_1,
            )
            || !self.verify_signature(
                &msg.bitcoin_key_2,
                &signed,
                &msg.bitcoin_signature_2,
            )
        {
            log::debug!("rejecting channel_announcement for {:?}: bad signature", scid);
            return Err(IngestError::BadSignature);
        }

        if self.channels.contains_key(&scid)
            || self.unupdated_channels.contains_key(&scid)
        {
            return Ok(AnnouncementOutcome::Duplicate);
        }
        if self.failed_lookups.contains(&scid) {
            return Ok(AnnouncementOutcome::FailedLookupCached);
        }

        let (node_ids, funding_keys) = canonical_order(
            msg.node_id_1,
            msg.node_id_2,
            msg.bitcoin_key_1,
            msg.bitcoin_key_2,
        );
        self.pending_announcements.insert(
            scid,
            PendingChannelAnnouncement {
                announcement: msg,
                node_ids,
                funding_keys,
                deferred_updates: [None, None],
            },
        );
        Ok(AnnouncementOutcome::LookupRequested)
    }

    /// Convenience wrapper driving the funding lookup and its completion in
    /// one call, for callers that don't need to interleave other work
    /// while the lookup is outstanding.
    pub async fn ingest_channel_announcement_and_resolve(
        &mut self,
        msg: ChannelAnnouncement,
    ) -> Result<(), IngestError> {
        let scid = msg.short_channel_id;
        match self.ingest_channel_announcement(msg)? {
            AnnouncementOutcome::LookupRequested => {
                let result = self.funding_lookup.lookup(scid).await;
                self.complete_channel_announcement(scid, result)
            }
            _ => Ok(()),
        }
    }

    /// Second phase: apply the result of the funding-output lookup
    /// requested by [`Self::ingest_channel_announcement`].
    pub fn complete_channel_announcement(
        &mut self,
        scid: ShortChannelId,
        lookup: FundingLookupResult,
    ) -> Result<(), IngestError> {
        let pending = match self.pending_announcements.remove(&scid) {
            Some(p) => p,
            None => return Ok(()),
        };
        match lookup {
            FundingLookupResult::NotFound => Err(IngestError::TxoutUnknown),
            FundingLookupResult::Spent => {
                self.failed_lookups.put(scid, ());
                Err(IngestError::TxoutMismatch)
            }
            FundingLookupResult::Found { amount_sat, script_pubkey } => {
                let expected = funding_script_pubkey(
                    pending.funding_keys.0,
                    pending.funding_keys.1,
                );
                if script_pubkey != expected.to_bytes() {
                    self.failed_lookups.put(scid, ());
                    return Err(IngestError::TxoutMismatch);
                }

                let timestamp = self.clock.now_secs();
                let offset = self.append_and_index(
                    Message::ChannelAnnouncement(pending.announcement.clone()),
                    timestamp,
                )?;
                self.unupdated_channels.insert(
                    scid,
                    UnupdatedChannel {
                        short_channel_id: scid,
                        nodes: pending.node_ids,
                        capacity_sat: amount_sat,
                        announcement_offset: offset,
                        bcast_timestamp: timestamp,
                    },
                );

                for deferred in
                    pending.deferred_updates.into_iter().flatten()
                {
                    let _ = self.ingest_channel_update(deferred.update);
                }
                Ok(())
            }
        }
    }

    // -- channel_update -----------------------------------------------------

    fn is_stale_by_age(&self, timestamp: u32) -> bool {
        let now = self.clock.now_secs();
        now.saturating_sub(timestamp) > self.config.update_staleness_cutoff_secs
    }

    pub fn ingest_channel_update(
        &mut self,
        msg: ChannelUpdate,
    ) -> Result<(), IngestError> {
        let scid = msg.short_channel_id;

        if self.channels.contains_key(&scid) {
            return self.apply_update_to_full_channel(msg);
        }
        if let Some(unupdated) = self.unupdated_channels.remove(&scid) {
            return self.promote_unupdated_channel(unupdated, msg);
        }
        if let Some(pending) = self.pending_announcements.get_mut(&scid) {
            if self.is_stale_by_age(msg.timestamp) {
                return Err(IngestError::UnknownChannel);
            }
            let dir = (msg.direction() & 1) as usize;
            let replace = match &pending.deferred_updates[dir] {
                Some(existing) => msg.timestamp > existing.update.timestamp,
                None => true,
            };
            if replace {
                pending.deferred_updates[dir] = Some(DeferredUpdate { update: msg });
            }
            return Err(IngestError::UnknownChannel);
        }
        Err(IngestError::UnknownChannel)
    }

    fn apply_update_to_full_channel(
        &mut self,
        msg: ChannelUpdate,
    ) -> Result<(), IngestError> {
        let scid = msg.short_channel_id;
        let dir = (msg.direction() & 1) as usize;
        let (node_ids, stored_ts, stored_offset) = {
            let channel = self.channels.get(&scid).expect("checked by caller");
            (channel.nodes, channel.half[dir].timestamp, channel.half[dir].store_offset)
        };
        if stored_offset != 0 && stored_ts >= msg.timestamp {
            log::debug!(
                "dropping stale channel_update for {:?} direction {}: {} <= {}",
                scid, dir, msg.timestamp, stored_ts
            );
            return Err(IngestError::StaleUpdate);
        }

        let signer = if dir == 0 { node_ids.0 } else { node_ids.1 };
        let signed =
            msg.signed_data().map_err(|_| IngestError::MalformedMessage)?;
        if !self.verify_signature(signer.public_key(), &signed, &msg.signature) {
            log::debug!("rejecting channel_update for {:?}: bad signature", scid);
            return Err(IngestError::BadSignature);
        }

        if stored_offset != 0 {
            self.store.tombstone(stored_offset)?;
        }
        let offset = self.append_and_index(
            Message::ChannelUpdate(msg.clone()),
            msg.timestamp,
        )?;

        let channel = self.channels.get_mut(&scid).expect("checked by caller");
        channel.half[dir] = HalfChannel::from_update(&msg, offset);
        self.notifications.channel_refreshed(scid);
        Ok(())
    }

    fn promote_unupdated_channel(
        &mut self,
        unupdated: UnupdatedChannel,
        msg: ChannelUpdate,
    ) -> Result<(), IngestError> {
        let dir = (msg.direction() & 1) as usize;
        let signer = if dir == 0 { unupdated.nodes.0 } else { unupdated.nodes.1 };
        let signed = match msg.signed_data() {
            Ok(signed) => signed,
            Err(_) => {
                self.unupdated_channels
                    .insert(unupdated.short_channel_id, unupdated);
                return Err(IngestError::MalformedMessage);
            }
        };
        if !self.verify_signature(signer.public_key(), &signed, &msg.signature) {
            self.unupdated_channels.insert(unupdated.short_channel_id, unupdated);
            return Err(IngestError::BadSignature);
        }

        let offset = self.append_and_index(
            Message::ChannelUpdate(msg.clone()),
            msg.timestamp,
        )?;

        let mut half = [HalfChannel::undefined(), HalfChannel::undefined()];
        half[dir] = HalfChannel::from_update(&msg, offset);
        let channel = Channel {
            short_channel_id: unupdated.short_channel_id,
            nodes: unupdated.nodes,
            capacity_sat: unupdated.capacity_sat,
            bcast_timestamp: unupdated.bcast_timestamp,
            announcement_offset: Some(unupdated.announcement_offset),
            half,
        };
        self.attach_channel(channel);
        Ok(())
    }

    fn attach_channel(&mut self, channel: Channel) {
        let scid = channel.short_channel_id;
        let node_ids = [channel.nodes.0, channel.nodes.1];
        for node_id in node_ids {
            let node = self.nodes.entry(node_id).or_insert_with(|| Node {
                node_id,
                announcement: None,
                channels: ChannelSet::new(),
            });
            node.channels.insert(scid);
        }
        self.channels.insert(scid, channel);
        self.notifications.channel_added(scid);

        for node_id in node_ids {
            if let Some(pending_na) =
                self.pending_node_announcements.remove(&node_id)
            {
                let _ = self.ingest_node_announcement(pending_na);
            }
        }
    }

    /// Inserts a channel to a peer that hasn't reached announcement depth.
    /// Never enters the store or the pending/unupdated maps; participates
    /// in path finding only.
    pub fn insert_local_channel(
        &mut self,
        scid: ShortChannelId,
        nodes: (NodeId, NodeId),
        capacity_sat: u64,
    ) {
        let channel = Channel {
            short_channel_id: scid,
            nodes,
            capacity_sat,
            bcast_timestamp: 0,
            announcement_offset: None,
            half: [HalfChannel::undefined(), HalfChannel::undefined()],
        };
        self.attach_channel(channel);
    }

    /// Updates the locally known fee schedule of a local-only channel's
    /// half in `direction`, bypassing signature verification (there is no
    /// signer — this is our own channel).
    pub fn set_local_half_channel(
        &mut self,
        scid: ShortChannelId,
        direction: u8,
        half: HalfChannel,
    ) -> Result<(), IngestError> {
        let channel =
            self.channels.get_mut(&scid).ok_or(IngestError::UnknownChannel)?;
        if channel.is_public() {
            return Err(IngestError::UnknownChannel);
        }
        channel.half[(direction & 1) as usize] = half;
        Ok(())
    }

    // -- node_announcement ----------------------------------------------

    pub fn ingest_node_announcement(
        &mut self,
        msg: NodeAnnouncement,
    ) -> Result<(), IngestError> {
        let node_id = NodeId::from_public_key(msg.node_id);
        let has_public_channel = self
            .nodes
            .get(&node_id)
            .map(|n| {
                n.channels.iter().any(|scid| {
                    self.channels.get(scid).map(Channel::is_public).unwrap_or(false)
                })
            })
            .unwrap_or(false);

        if !has_public_channel {
            let is_pending_endpoint = self
                .pending_announcements
                .values()
                .any(|p| p.node_ids.0 == node_id || p.node_ids.1 == node_id)
                || self
                    .unupdated_channels
                    .values()
                    .any(|u| u.nodes.0 == node_id || u.nodes.1 == node_id);
            if is_pending_endpoint {
                let replace = match self.pending_node_announcements.get(&node_id) {
                    Some(existing) => msg.timestamp > existing.timestamp,
                    None => true,
                };
                if replace {
                    self.pending_node_announcements.insert(node_id, msg);
                }
            }
            return Err(IngestError::UnknownChannel);
        }

        if let Some(existing) = self
            .nodes
            .get(&node_id)
            .and_then(|n| n.announcement.as_ref())
        {
            if existing.timestamp >= msg.timestamp {
                return Err(IngestError::StaleUpdate);
            }
        }

        let signed =
            msg.signed_data().map_err(|_| IngestError::MalformedMessage)?;
        if !self.verify_signature(&msg.node_id, &signed, &msg.signature) {
            return Err(IngestError::BadSignature);
        }

        let prior_offset = self
            .nodes
            .get(&node_id)
            .and_then(|n| n.announcement.as_ref())
            .map(|a| a.store_offset);
        if let Some(offset) = prior_offset {
            self.store.tombstone(offset)?;
        }

        let offset = self.append_and_index(
            Message::NodeAnnouncement(msg.clone()),
            msg.timestamp,
        )?;

        let node = self.nodes.entry(node_id).or_insert_with(|| Node {
            node_id,
            announcement: None,
            channels: ChannelSet::new(),
        });
        node.announcement = Some(NodeAnnouncementInfo {
            features: msg.features,
            timestamp: msg.timestamp,
            rgb_color: msg.rgb_color,
            alias: msg.alias,
            addresses: msg.addresses,
            store_offset: offset,
        });
        Ok(())
    }

    // -- pruning ----------------------------------------------------------

    /// Removes every public channel with no direction refreshed within the
    /// configured prune timeout, and any node left with zero channels in
    /// the same sweep. Intended to run at half the prune timeout's cadence.
    pub fn prune(&mut self) -> Result<usize, store::Error> {
        let now = self.clock.now_secs();
        let cutoff = now.saturating_sub(self.config.prune_timeout_secs);

        let stale: Vec<ShortChannelId> = self
            .channels
            .values()
            .filter(|channel| channel.is_public())
            .filter_map(|channel| {
                let refreshed = channel.half.iter().any(HalfChannel::is_defined);
                let all_too_old = channel
                    .half
                    .iter()
                    .filter(|h| h.is_defined())
                    .all(|h| h.timestamp <= cutoff);
                (refreshed && all_too_old).then_some(channel.short_channel_id)
            })
            .collect();

        let pruned = stale.len();
        if pruned > 0 {
            log::debug!("pruning {} channel(s) stale past {}s", pruned, self.config.prune_timeout_secs);
        }
        for scid in stale {
            self.remove_channel(scid)?;
        }
        Ok(pruned)
    }

    pub(crate) fn remove_channel(
        &mut self,
        scid: ShortChannelId,
    ) -> Result<(), store::Error> {
        let channel = match self.channels.remove(&scid) {
            Some(c) => c,
            None => return Ok(()),
        };
        for node_id in [channel.nodes.0, channel.nodes.1] {
            let remove_node = if let Some(node) = self.nodes.get_mut(&node_id) {
                node.channels.remove(&scid);
                node.channels.is_empty()
            } else {
                false
            };
            if remove_node {
                if let Some(node) = self.nodes.remove(&node_id) {
                    if let Some(announcement) = node.announcement {
                        self.store.tombstone(announcement.store_offset)?;
                    }
                }
            }
        }
        if let Some(offset) = channel.announcement_offset {
            self.store.tombstone(offset)?;
        }
        for half in &channel.half {
            if half.is_defined() {
                self.store.tombstone(half.store_offset)?;
            }
        }
        self.notifications.channel_removed(scid);
        Ok(())
    }

    pub fn remove_node(&mut self, node_id: NodeId) -> Result<(), store::Error> {
        if let Some(node) = self.nodes.get(&node_id) {
            let scids: Vec<_> = node.channels.iter().copied().collect();
            for scid in scids {
                self.remove_channel(scid)?;
            }
        }
        Ok(())
    }

    // -- local disablement (failure feedback) ----------------------------

    pub fn locally_disable(
        &mut self,
        scid: ShortChannelId,
        direction: u8,
        cooloff: Duration,
    ) {
        let until = self.clock.monotonic_now() + cooloff;
        self.locally_disabled.insert((scid, direction & 1), until);
    }

    pub fn is_locally_disabled(&self, scid: ShortChannelId, direction: u8) -> bool {
        self.locally_disabled
            .get(&(scid, direction & 1))
            .map(|until| *until > self.clock.monotonic_now())
            .unwrap_or(false)
    }
}

fn canonical_order(
    node1: secp256k1::PublicKey,
    node2: secp256k1::PublicKey,
    key1: secp256k1::PublicKey,
    key2: secp256k1::PublicKey,
) -> ((NodeId, NodeId), (secp256k1::PublicKey, secp256k1::PublicKey)) {
    let n1 = NodeId::from_public_key(node1);
    let n2 = NodeId::from_public_key(node2);
    if n1 < n2 {
        ((n1, n2), (key1, key2))
    } else {
        ((n2, n1), (key2, key1))
    }
}

/// The 2-of-2 witness script's v0 P2WSH scriptpubkey for a channel's two
/// funding keys, sorted lexicographically per BOLT 3.
fn funding_script_pubkey(
    key1: secp256k1::PublicKey,
    key2: secp256k1::PublicKey,
) -> bitcoin::Script {
    let (a, b) =
        if key1.serialize() <= key2.serialize() { (key1, key2) } else { (key2, key1) };
    let witness_script = Builder::new()
        .push_opcode(opcodes::OP_PUSHNUM_2)
        .push_key(&bitcoin::PublicKey::new(a))
        .push_key(&bitcoin::PublicKey::new(b))
        .push_opcode(opcodes::OP_PUSHNUM_2)
        .push_opcode(opcodes::OP_CHECKMULTISIG)
        .into_script();
    bitcoin::Script::new_v0_p2wsh(&witness_script.wscript_hash())
}
