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

//! Risk-adjusted shortest-path search over the routing table's topology
//! graph. Runs backward from the destination so that per-hop fees
//! accumulate against the correct downstream amount, the way they would
//! when a forwarding node actually deducts its cut.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use rand::{Rng, SeedableRng};

use crate::routing_table::{Channel, HalfChannel, RoutingTable};
use crate::types::{NodeId, ShortChannelId};

#[derive(Debug, Display, Error)]
#[display(doc_comments)]
pub enum PathFinderError {
    /// no feasible path under the given amount, exclusions and hop limit
    NoRoute,
}

/// Deterministic per-edge weight jitter: `weight * (1 + f * (2r - 1))` for
/// `r` drawn from a seed shared across one route computation (and its
/// retries), so the same seed always perturbs the same edge the same way.
#[derive(Clone, Copy, Debug)]
pub struct Fuzz {
    pub factor: f64,
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct RouteRequest {
    pub source: NodeId,
    pub destination: NodeId,
    pub amount_msat: u64,
    /// CLTV delta required by the destination's own incoming edge.
    pub final_cltv_delta: u16,
    pub risk_factor: f64,
    pub max_hops: usize,
    pub fuzz: Option<Fuzz>,
    pub exclusions: HashSet<(ShortChannelId, u8)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteHop {
    pub short_channel_id: ShortChannelId,
    pub direction: u8,
    pub next_node_id: NodeId,
    pub amount_to_forward_msat: u64,
    pub cltv_delta: u16,
}

fn fee_msat(amt_msat: u64, half: &HalfChannel) -> u64 {
    let proportional = amt_msat as u128 * half.proportional_fee_millionths as u128;
    let proportional = ((proportional + 999_999) / 1_000_000) as u64;
    half.base_fee_msat as u64 + proportional
}

fn edge_weight(amt_msat: u64, half: &HalfChannel, risk_factor: f64) -> f64 {
    let fee = fee_msat(amt_msat, half) as f64;
    let risk = amt_msat as f64 * half.cltv_expiry_delta as f64 * risk_factor;
    fee + risk
}

fn fuzz_multiplier(fuzz: &Fuzz, scid: ShortChannelId, direction: u8) -> f64 {
    let mixed = fuzz
        .seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ scid.as_u64().wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ direction as u64;
    let r: f64 = rand::rngs::StdRng::seed_from_u64(mixed).gen();
    1.0 + fuzz.factor * (2.0 * r - 1.0)
}

/// The other endpoint of `channel` relative to `at`, and the half-channel
/// describing that neighbor's own forwarding policy toward `at` (the
/// direction whose fee a backward search charges to reach `at`).
fn predecessor_edge(
    channel: &Channel,
    at: NodeId,
) -> Option<(NodeId, u8, &HalfChannel)> {
    if channel.nodes.1 == at {
        Some((channel.nodes.0, 0, &channel.half[0]))
    } else if channel.nodes.0 == at {
        Some((channel.nodes.1, 1, &channel.half[1]))
    } else {
        None
    }
}

#[derive(Clone, Copy, Debug)]
struct HeapEntry {
    cost: f64,
    node: NodeId,
    amount_msat: u64,
    cltv: u16,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, and we want the lowest cost
        // popped first.
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

#[derive(Clone, Copy, Debug)]
struct Predecessor {
    toward_destination: NodeId,
    short_channel_id: ShortChannelId,
    direction: u8,
    amount_to_forward_msat: u64,
    cltv_delta: u16,
}

/// Computes a route from `request.source` to `request.destination`,
/// returning hops ordered source to destination.
pub fn find_route(
    table: &RoutingTable,
    request: &RouteRequest,
) -> Result<Vec<RouteHop>, PathFinderError> {
    if request.source == request.destination {
        return Ok(Vec::new());
    }

    let max_hops = request.max_hops.min(crate::config::MAX_HOPS_CEILING);

    let mut best_cost: HashMap<NodeId, f64> = HashMap::new();
    let mut predecessor: HashMap<NodeId, Predecessor> = HashMap::new();
    let mut heap = BinaryHeap::new();

    best_cost.insert(request.destination, 0.0);
    heap.push(HeapEntry {
        cost: 0.0,
        node: request.destination,
        amount_msat: request.amount_msat,
        cltv: request.final_cltv_delta,
    });

    while let Some(entry) = heap.pop() {
        if best_cost.get(&entry.node).copied().unwrap_or(f64::INFINITY)
            < entry.cost
        {
            continue;
        }
        if entry.node == request.source {
            return Ok(reconstruct(&predecessor, request.source));
        }

        let hops_so_far = path_length(&predecessor, entry.node);
        if hops_so_far >= max_hops {
            continue;
        }

        let node = match table.node(&entry.node) {
            Some(n) => n,
            None => continue,
        };
        for scid in node.channels.iter().copied().collect::<Vec<_>>() {
            let channel = match table.channel(&scid) {
                Some(c) => c,
                None => continue,
            };
            let (neighbor, direction, half) =
                match predecessor_edge(channel, entry.node) {
                    Some(e) => e,
                    None => continue,
                };

            if !half.is_enabled() {
                continue;
            }
            if table.is_locally_disabled(scid, direction) {
                continue;
            }
            if request.exclusions.contains(&(scid, direction)) {
                continue;
            }
            let amt = entry.amount_msat;
            if amt < half.htlc_minimum_msat {
                continue;
            }
            if let Some(max) = half.htlc_maximum_msat {
                if amt > max {
                    continue;
                }
            }
            if channel.is_public() && amt > channel.capacity_sat.saturating_mul(1000)
            {
                continue;
            }

            let mut weight = edge_weight(amt, half, request.risk_factor);
            if let Some(fuzz) = &request.fuzz {
                weight *= fuzz_multiplier(fuzz, scid, direction);
            }
            let new_cost = entry.cost + weight;

            if new_cost < best_cost.get(&neighbor).copied().unwrap_or(f64::INFINITY) {
                best_cost.insert(neighbor, new_cost);
                predecessor.insert(
                    neighbor,
                    Predecessor {
                        toward_destination: entry.node,
                        short_channel_id: scid,
                        direction,
                        amount_to_forward_msat: amt,
                        cltv_delta: half.cltv_expiry_delta,
                    },
                );
                heap.push(HeapEntry {
                    cost: new_cost,
                    node: neighbor,
                    amount_msat: fee_msat(amt, half) + amt,
                    cltv: entry.cltv + half.cltv_expiry_delta,
                });
            }
        }
    }

    Err(PathFinderError::NoRoute)
}

fn path_length(predecessor: &HashMap<NodeId, Predecessor>, mut node: NodeId) -> usize {
    let mut len = 0;
    while let Some(p) = predecessor.get(&node) {
        len += 1;
        node = p.toward_destination;
    }
    len
}

fn reconstruct(
    predecessor: &HashMap<NodeId, Predecessor>,
    mut node: NodeId,
) -> Vec<RouteHop> {
    let mut hops = Vec::new();
    while let Some(p) = predecessor.get(&node) {
        hops.push(RouteHop {
            short_channel_id: p.short_channel_id,
            direction: p.direction,
            next_node_id: p.toward_destination,
            amount_to_forward_msat: p.amount_to_forward_msat,
            cltv_delta: p.cltv_delta,
        });
        node = p.toward_destination;
    }
    hops
}
