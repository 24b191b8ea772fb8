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

//! End-to-end scenarios 1, 2 and 4: an update arriving before its
//! announcement, a stale update losing to an already-stored newer one, and
//! pruning sweeping a channel nobody has refreshed in too long.

mod common;

use lnp_gossip::routing_table::IngestError;
use lnp_gossip::types::ShortChannelId;

#[tokio::test]
async fn orphan_update_buffers_until_announcement_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = common::table(&dir);
    let (node_sk_1, node_pk_1) = common::keypair(1);
    let (node_sk_2, node_pk_2) = common::keypair(2);
    let (key_sk_1, key_pk_1) = common::keypair(3);
    let (key_sk_2, key_pk_2) = common::keypair(4);
    let scid = ShortChannelId::new(1, 1, 0).unwrap();

    // The update for dir=0 arrives first; the channel doesn't exist yet, so
    // it's buffered in the pending-announcement deferral map, not applied.
    let early_update = common::update(&node_sk_1, scid, 0, 100, 0, 0, 9, 0);
    assert!(matches!(
        table.ingest_channel_update(early_update),
        Err(IngestError::UnknownChannel)
    ));
    assert!(table.channel(&scid).is_none());

    let ann = common::announcement(
        &node_sk_1, node_pk_1, &node_sk_2, node_pk_2, &key_sk_1, key_pk_1,
        &key_sk_2, key_pk_2, scid,
    );
    table.ingest_channel_announcement_and_resolve(ann).await.unwrap();
    // The announcement lands in the unupdated set; it needs at least one
    // directional update before it's a routable channel.
    assert!(table.channel(&scid).is_none());

    let late_update = common::update(&node_sk_2, scid, 1, 50, 0, 0, 9, 0);
    table.ingest_channel_update(late_update).unwrap();

    let channel = table.channel(&scid).expect("attached after a directional update");
    assert_eq!(channel.half[0].timestamp, 100);
    assert_eq!(channel.half[1].timestamp, 50);
    assert!(channel.half[0].is_defined());
    assert!(channel.half[1].is_defined());
}

#[tokio::test]
async fn stale_update_never_overwrites_a_newer_stored_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = common::table(&dir);
    let (node_sk_1, node_pk_1) = common::keypair(1);
    let (node_sk_2, node_pk_2) = common::keypair(2);
    let (key_sk_1, key_pk_1) = common::keypair(3);
    let (key_sk_2, key_pk_2) = common::keypair(4);
    let scid = ShortChannelId::new(2, 1, 0).unwrap();

    let ann = common::announcement(
        &node_sk_1, node_pk_1, &node_sk_2, node_pk_2, &key_sk_1, key_pk_1,
        &key_sk_2, key_pk_2, scid,
    );
    table.ingest_channel_announcement_and_resolve(ann).await.unwrap();
    table.ingest_channel_update(common::update(&node_sk_1, scid, 0, 200, 0, 0, 9, 0)).unwrap();

    let stale = common::update(&node_sk_1, scid, 0, 199, 1, 1, 9, 0);
    assert!(matches!(
        table.ingest_channel_update(stale),
        Err(IngestError::StaleUpdate)
    ));

    let half = &table.channel(&scid).unwrap().half[0];
    assert_eq!(half.timestamp, 200);
    assert_eq!(half.base_fee_msat, 0);
}

#[tokio::test]
async fn pruning_removes_channels_with_no_recent_refresh() {
    let dir = tempfile::tempdir().unwrap();
    // A prune timeout of a single day keeps the scenario's math simple.
    let one_day = 24 * 60 * 60;
    let mut table = lnp_gossip::RoutingTable::new(
        lnp_gossip::Config { prune_timeout_secs: one_day, ..lnp_gossip::Config::default() },
        lnp_gossip::GossipStore::open(dir.path().join("gossip.store")).unwrap(),
        Box::new(lnp_gossip::clock::TestClock::new(10 * one_day)),
        Box::new(common::AlwaysFound { amount_sat: 1_000_000 }),
        Box::new(
            lnp_gossip::routing_table::collaborators::NullNotificationSink,
        ),
    );
    let (node_sk_1, node_pk_1) = common::keypair(1);
    let (node_sk_2, node_pk_2) = common::keypair(2);
    let (key_sk_1, key_pk_1) = common::keypair(3);
    let (key_sk_2, key_pk_2) = common::keypair(4);
    let scid = ShortChannelId::new(3, 1, 0).unwrap();

    let ann = common::announcement(
        &node_sk_1, node_pk_1, &node_sk_2, node_pk_2, &key_sk_1, key_pk_1,
        &key_sk_2, key_pk_2, scid,
    );
    table.ingest_channel_announcement_and_resolve(ann).await.unwrap();
    // Refreshed at t = 10 * one_day - (one_day + 1): stale by more than the
    // prune timeout relative to the clock fixed at 10 * one_day.
    let stale_ts = 10 * one_day - (one_day + 1);
    table.ingest_channel_update(common::update(&node_sk_1, scid, 0, stale_ts, 0, 0, 9, 0)).unwrap();

    let node_id_1 = lnp_gossip::types::NodeId::from_public_key(node_pk_1);
    let node_id_2 = lnp_gossip::types::NodeId::from_public_key(node_pk_2);
    assert!(table.node(&node_id_1).is_some());

    let pruned = table.prune().unwrap();
    assert_eq!(pruned, 1);
    assert!(table.channel(&scid).is_none());
    assert!(table.node(&node_id_1).is_none());
    assert!(table.node(&node_id_2).is_none());
}
