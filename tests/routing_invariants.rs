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

//! Property-based checks for the two quantified invariants from the
//! routing table's ingest pipeline: canonical node ordering, and
//! arrival-order independence for which of two updates to the same
//! direction ends up stored.

mod common;

use proptest::prelude::*;

use lnp_gossip::types::ShortChannelId;

fn run_two_update_race(
    dir: &tempfile::TempDir,
    node_byte_a: u8,
    node_byte_b: u8,
    key_byte_a: u8,
    key_byte_b: u8,
    ts_low: u32,
    ts_high: u32,
    high_arrives_first: bool,
) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let mut table = common::table(dir);
        let (node_sk_a, node_pk_a) = common::keypair(node_byte_a);
        let (node_sk_b, node_pk_b) = common::keypair(node_byte_b);
        let (key_sk_a, key_pk_a) = common::keypair(key_byte_a);
        let (key_sk_b, key_pk_b) = common::keypair(key_byte_b);
        let scid = ShortChannelId::new(1, 0, 0).unwrap();

        let ann = common::announcement(
            &node_sk_a, node_pk_a, &node_sk_b, node_pk_b, &key_sk_a, key_pk_a,
            &key_sk_b, key_pk_b, scid,
        );
        table.ingest_channel_announcement_and_resolve(ann).await.unwrap();

        // The routing table canonicalizes by `NodeId` ordering the same way
        // `NodeId`'s own `Ord` impl does, so whichever node sorts first
        // signs direction 0 -- replicate that here to pick a signer that
        // will actually verify.
        let node_id_a = lnp_gossip::types::NodeId::from_public_key(node_pk_a);
        let node_id_b = lnp_gossip::types::NodeId::from_public_key(node_pk_b);
        let signer_sk = if node_id_a < node_id_b { &node_sk_a } else { &node_sk_b };

        let low = common::update(signer_sk, scid, 0, ts_low, 0, 0, 9, 0);
        let high = common::update(signer_sk, scid, 0, ts_high, 1, 1, 9, 0);

        if high_arrives_first {
            table.ingest_channel_update(high).unwrap();
            let _ = table.ingest_channel_update(low);
        } else {
            table.ingest_channel_update(low).unwrap();
            table.ingest_channel_update(high).unwrap();
        }

        let channel = table.channel(&scid).unwrap();
        // Canonical ordering invariant: whichever order the two node ids
        // were supplied in, the stored channel always has nodes.0 < nodes.1.
        assert!(channel.nodes.0 < channel.nodes.1);
        // Arrival-order independence: the higher timestamp always wins.
        assert_eq!(channel.half[0].timestamp, ts_high);
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn newest_timestamp_wins_regardless_of_arrival_order(
        node_byte_a in 1u8..120,
        node_byte_b in 120u8..240,
        key_byte_a in 1u8..120,
        key_byte_b in 120u8..240,
        ts_low in 1u32..1000,
        gap in 1u32..1000,
        high_arrives_first in any::<bool>(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        run_two_update_race(
            &dir,
            node_byte_a, node_byte_b,
            key_byte_a, key_byte_b,
            ts_low, ts_low + gap,
            high_arrives_first,
        );
    }
}
