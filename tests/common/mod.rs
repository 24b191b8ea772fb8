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

//! Shared signing and table-construction helpers for the end-to-end tests,
//! mirroring the keypair/sign/make_table helpers used by the unit tests
//! inside `routing_table::mod`, but built only against the crate's public
//! API since these run as a separate compilation unit.

use bitcoin::hashes::{sha256d, Hash};
use bitcoin::secp256k1::{self, Secp256k1, SecretKey};

use lnp_gossip::routing_table::collaborators::{
    FundingLookup, FundingLookupResult, NullNotificationSink,
};
use lnp_gossip::routing_table::RoutingTable;
use lnp_gossip::store::GossipStore;
use lnp_gossip::types::{NodeId, ShortChannelId, Signature};
use lnp_gossip::wire::{ChannelAnnouncement, ChannelUpdate};
use lnp_gossip::{clock::TestClock, Config};

pub struct AlwaysFound {
    pub amount_sat: u64,
}

#[async_trait::async_trait]
impl FundingLookup for AlwaysFound {
    async fn lookup(&self, _scid: ShortChannelId) -> FundingLookupResult {
        FundingLookupResult::Found { amount_sat: self.amount_sat, script_pubkey: vec![] }
    }
}

pub fn keypair(byte: u8) -> (SecretKey, secp256k1::PublicKey) {
    let secp = Secp256k1::new();
    let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
    let pk = secp256k1::PublicKey::from_secret_key(&secp, &sk);
    (sk, pk)
}

pub fn node_id(byte: u8) -> NodeId {
    NodeId::from_public_key(keypair(byte).1)
}

pub fn sign(sk: &SecretKey, data: &[u8]) -> Signature {
    let secp = Secp256k1::new();
    let digest = sha256d::Hash::hash(data);
    let msg = secp256k1::Message::from_slice(digest.as_ref()).unwrap();
    secp.sign_ecdsa(&msg, sk)
}

/// A `RoutingTable` whose funding lookup always succeeds at `amount_sat`,
/// wall clock fixed at `wall_secs` and the default protocol tunables.
pub fn table_at(dir: &tempfile::TempDir, wall_secs: u32, amount_sat: u64) -> RoutingTable {
    let store = GossipStore::open(dir.path().join("gossip.store")).unwrap();
    RoutingTable::new(
        Config::default(),
        store,
        Box::new(TestClock::new(wall_secs)),
        Box::new(AlwaysFound { amount_sat }),
        Box::new(NullNotificationSink),
    )
}

pub fn table(dir: &tempfile::TempDir) -> RoutingTable {
    table_at(dir, 1_700_000_000, 1_000_000)
}

/// A fully signed `channel_announcement` for `scid`, with `node_1`/`node_2`
/// in whatever order the caller supplies them (the routing table
/// canonicalizes on ingest).
pub fn announcement(
    node_sk_1: &SecretKey,
    node_pk_1: secp256k1::PublicKey,
    node_sk_2: &SecretKey,
    node_pk_2: secp256k1::PublicKey,
    key_sk_1: &SecretKey,
    key_pk_1: secp256k1::PublicKey,
    key_sk_2: &SecretKey,
    key_pk_2: secp256k1::PublicKey,
    scid: ShortChannelId,
) -> ChannelAnnouncement {
    let mut msg = ChannelAnnouncement {
        node_signature_1: sign(node_sk_1, &[0]),
        node_signature_2: sign(node_sk_2, &[0]),
        bitcoin_signature_1: sign(key_sk_1, &[0]),
        bitcoin_signature_2: sign(key_sk_2, &[0]),
        features: vec![],
        chain_hash: sha256d::Hash::default(),
        short_channel_id: scid,
        node_id_1: node_pk_1,
        node_id_2: node_pk_2,
        bitcoin_key_1: key_pk_1,
        bitcoin_key_2: key_pk_2,
    };
    let signed = msg.signed_data().unwrap();
    msg.node_signature_1 = sign(node_sk_1, &signed);
    msg.node_signature_2 = sign(node_sk_2, &signed);
    msg.bitcoin_signature_1 = sign(key_sk_1, &signed);
    msg.bitcoin_signature_2 = sign(key_sk_2, &signed);
    msg
}

/// A fully signed `channel_update` for `scid` in `direction`, signed by
/// `signer_sk`, with the given timestamp and fee schedule.
#[allow(clippy::too_many_arguments)]
pub fn update(
    signer_sk: &SecretKey,
    scid: ShortChannelId,
    direction: u8,
    timestamp: u32,
    base_fee_msat: u32,
    proportional_fee_millionths: u32,
    cltv_expiry_delta: u16,
    htlc_minimum_msat: u64,
) -> ChannelUpdate {
    let mut msg = ChannelUpdate {
        signature: sign(signer_sk, &[0]),
        chain_hash: sha256d::Hash::default(),
        short_channel_id: scid,
        timestamp,
        message_flags: 0,
        channel_flags: direction & 1,
        cltv_expiry_delta,
        htlc_minimum_msat,
        fee_base_msat: base_fee_msat,
        fee_proportional_millionths: proportional_fee_millionths,
        htlc_maximum_msat: None,
    };
    let signed = msg.signed_data().unwrap();
    msg.signature = sign(signer_sk, &signed);
    msg
}
