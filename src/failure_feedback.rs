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

//! Feeds routing failures reported by failed payment attempts back into the
//! routing table: a transient disable, a permanent removal, or an update
//! swap-in, depending on what the erring node told us. None of this ever
//! produces a gossip message of its own — it only shapes the next route
//! computation.

use crate::routing_table::RoutingTable;
use crate::store;
use crate::types::{NodeId, ShortChannelId};
use crate::wire::ChannelUpdate;

/// The failure categories a payment attempt can report, grouped the way
/// the routing table reacts to them rather than by their wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureCode {
    /// `temporary_channel_failure`
    TemporaryChannelFailure,
    /// `fee_insufficient`
    FeeInsufficient,
    /// `incorrect_cltv_expiry`, `expiry_too_soon`, `final_expiry_too_soon`
    ExpiryOutOfRange,
    /// `amount_below_minimum`
    AmountBelowMinimum,
    /// `permanent_channel_failure`, `channel_disabled`
    PermanentChannelFailure,
    /// `unknown_next_peer`
    UnknownNextPeer,
    /// `unknown_channel` — the erring node has no such channel at all
    UnknownChannel,
    /// `permanent_node_failure`, `required_node_feature_missing`
    PermanentNodeFailure,
}

impl FailureCode {
    /// Whether, absent an attached update, a report of this code should
    /// disable the half-channel rather than tear down the whole channel.
    fn is_transient(self) -> bool {
        matches!(
            self,
            FailureCode::TemporaryChannelFailure
                | FailureCode::FeeInsufficient
                | FailureCode::ExpiryOutOfRange
                | FailureCode::AmountBelowMinimum
        )
    }
}

/// What a payment attempt reported about the hop that failed.
#[derive(Clone, Debug)]
pub struct FailureReport {
    pub erring_node: NodeId,
    pub erring_channel: Option<(ShortChannelId, u8)>,
    pub code: FailureCode,
    pub fresh_update: Option<ChannelUpdate>,
}

/// Applies one failure report to `table`, per spec §4.7's policy table.
///
/// A non-fatal rejection of an attached update (bad signature, stale
/// timestamp) is logged and otherwise ignored: the erring node handed us
/// something we can't trust, so we fall back to locally disabling the hop
/// as if no update had been attached at all. Only a fatal store I/O error
/// propagates.
pub fn apply_failure_feedback(
    table: &mut RoutingTable,
    report: &FailureReport,
) -> Result<(), store::Error> {
    match report.code {
        FailureCode::PermanentNodeFailure => {
            log::debug!(
                "failure feedback: removing node {:?} (permanent node failure)",
                report.erring_node
            );
            return table.remove_node(report.erring_node);
        }
        FailureCode::PermanentChannelFailure | FailureCode::UnknownChannel => {
            if let Some((scid, _)) = report.erring_channel {
                log::debug!(
                    "failure feedback: removing channel {:?} ({:?})",
                    scid,
                    report.code
                );
                return table.remove_channel(scid);
            }
            return Ok(());
        }
        FailureCode::UnknownNextPeer => {
            if let Some((scid, _)) = report.erring_channel {
                log::debug!(
                    "failure feedback: removing channel {:?} (unknown next peer)",
                    scid
                );
                return table.remove_channel(scid);
            }
            return Ok(());
        }
        _ => {}
    }

    debug_assert!(report.code.is_transient());

    if let Some(update) = report.fresh_update.clone() {
        match table.ingest_channel_update(update) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_fatal() => {
                return Err(match err {
                    crate::routing_table::IngestError::Store(e) => e,
                    _ => unreachable!("is_fatal() only returns true for Store"),
                });
            }
            Err(err) => {
                log::debug!(
                    "failure feedback: attached update for {:?} rejected ({}), \
                     falling back to local disable",
                    report.erring_channel,
                    err
                );
            }
        }
    }

    if let Some((scid, direction)) = report.erring_channel {
        log::debug!(
            "failure feedback: locally disabling {:?} direction {} ({:?})",
            scid,
            direction,
            report.code
        );
        table.locally_disable(scid, direction, table.config().local_disable_cooloff());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::config::Config;
    use crate::routing_table::collaborators::{FundingLookup, FundingLookupResult, NullNotificationSink};
    use crate::store::GossipStore;
    use bitcoin::secp256k1::{self, Secp256k1, SecretKey};

    struct NeverLooked;
    #[async_trait::async_trait]
    impl FundingLookup for NeverLooked {
        async fn lookup(&self, _scid: ShortChannelId) -> FundingLookupResult {
            FundingLookupResult::NotFound
        }
    }

    fn node_id(byte: u8) -> NodeId {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[byte; 32]).unwrap();
        NodeId::from_public_key(secp256k1::PublicKey::from_secret_key(&secp, &sk))
    }

    fn table(dir: &tempfile::TempDir) -> RoutingTable {
        let store = GossipStore::open(dir.path().join("gossip.store")).unwrap();
        RoutingTable::new(
            Config::default(),
            store,
            Box::new(TestClock::new(1_700_000_000)),
            Box::new(NeverLooked),
            Box::new(NullNotificationSink),
        )
    }

    #[test]
    fn transient_failure_without_update_disables_locally() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = table(&dir);
        let a = node_id(1);
        let b = node_id(2);
        let scid = ShortChannelId::new(1, 0, 0).unwrap();
        t.insert_local_channel(scid, (a, b), 1_000_000);

        let report = FailureReport {
            erring_node: a,
            erring_channel: Some((scid, 0)),
            code: FailureCode::TemporaryChannelFailure,
            fresh_update: None,
        };
        apply_failure_feedback(&mut t, &report).unwrap();
        assert!(t.is_locally_disabled(scid, 0));
        assert!(t.channel(&scid).is_some());
    }

    #[test]
    fn permanent_channel_failure_removes_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = table(&dir);
        let a = node_id(1);
        let b = node_id(2);
        let scid = ShortChannelId::new(1, 0, 0).unwrap();
        t.insert_local_channel(scid, (a, b), 1_000_000);

        let report = FailureReport {
            erring_node: a,
            erring_channel: Some((scid, 0)),
            code: FailureCode::PermanentChannelFailure,
            fresh_update: None,
        };
        apply_failure_feedback(&mut t, &report).unwrap();
        assert!(t.channel(&scid).is_none());
    }

    #[test]
    fn permanent_node_failure_removes_all_incident_channels() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = table(&dir);
        let a = node_id(1);
        let b = node_id(2);
        let c = node_id(3);
        let scid_ab = ShortChannelId::new(1, 0, 0).unwrap();
        let scid_ac = ShortChannelId::new(2, 0, 0).unwrap();
        t.insert_local_channel(scid_ab, (a, b), 1_000_000);
        t.insert_local_channel(scid_ac, (a, c), 1_000_000);

        let report = FailureReport {
            erring_node: a,
            erring_channel: None,
            code: FailureCode::PermanentNodeFailure,
            fresh_update: None,
        };
        apply_failure_feedback(&mut t, &report).unwrap();
        assert!(t.channel(&scid_ab).is_none());
        assert!(t.channel(&scid_ac).is_none());
        assert!(t.node(&a).is_none());
    }
}
