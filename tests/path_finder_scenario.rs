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

//! End-to-end scenario 3: A-(ch1)-B-(ch2)-C, with ch2 charging a fee ch1
//! doesn't, so the first hop forwards strictly more than the second.

mod common;

use std::collections::HashSet;

use lnp_gossip::path_finder::{find_route, RouteRequest};
use lnp_gossip::routing_table::HalfChannel;
use lnp_gossip::types::ShortChannelId;

fn half(base_fee_msat: u32, proportional_fee_millionths: u32, cltv_expiry_delta: u16) -> HalfChannel {
    let mut h = HalfChannel::undefined();
    h.base_fee_msat = base_fee_msat;
    h.proportional_fee_millionths = proportional_fee_millionths;
    h.cltv_expiry_delta = cltv_expiry_delta;
    h.htlc_minimum_msat = 0;
    h.store_offset = 1;
    h
}

#[test]
fn two_hop_route_forwards_the_spec_exact_amounts_and_delay() {
    let dir = tempfile::tempdir().unwrap();
    let mut t = common::table(&dir);
    let a = common::node_id(1);
    let b = common::node_id(2);
    let c = common::node_id(3);

    let scid_ab = ShortChannelId::new(1, 0, 0).unwrap();
    let scid_bc = ShortChannelId::new(2, 0, 0).unwrap();
    t.insert_local_channel(scid_ab, (a, b), 1_000_000);
    t.insert_local_channel(scid_bc, (b, c), 1_000_000);
    // B's own policy for forwarding A->B->C onward: free.
    t.set_local_half_channel(scid_ab, 0, half(0, 0, 9)).unwrap();
    // C's channel charges nothing either; the fee comes from B's own
    // schedule on ch2 (base=1, ppm=1000), charged to what it forwards on.
    t.set_local_half_channel(scid_bc, 0, half(1, 1000, 9)).unwrap();

    let request = RouteRequest {
        source: a,
        destination: c,
        amount_msat: 1_000_000,
        final_cltv_delta: 9,
        risk_factor: 1.0,
        max_hops: 20,
        fuzz: None,
        exclusions: HashSet::new(),
    };
    let hops = find_route(&t, &request).unwrap();
    assert_eq!(hops.len(), 2);
    assert_eq!(hops[0].short_channel_id, scid_ab);
    assert_eq!(hops[1].short_channel_id, scid_bc);
    assert_eq!(hops[1].amount_to_forward_msat, 1_000_000);

    // B's own schedule on ch2 (base=1, ppm=1000) is what it charges to
    // forward the 1_000_000 msat C needs; the first hop must carry that
    // amount plus B's fee.
    let bc_fee = 1 + (1_000_000u64 * 1000 + 999_999) / 1_000_000;
    assert_eq!(hops[0].amount_to_forward_msat, 1_000_000 + bc_fee);

    // The spec's "total delay at A" is the sum of the two hops' own deltas
    // (9 + 9); the destination's final_cltv_delta is a separate input that
    // seeds the backward search, not one more hop's worth of locktime.
    let total_delay: u16 = hops.iter().map(|h| h.cltv_delta).sum();
    assert_eq!(total_delay, 18);
}
