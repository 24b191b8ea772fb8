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

use crate::store;

/// Outcome of feeding a gossip message into the routing table. None of
/// these crash the node: parse and signature failures are local and
/// logged, `UnknownChannel` just means the update went into the deferral
/// map rather than being dropped.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum IngestError {
    /// malformed gossip message
    MalformedMessage,

    /// signature verification failed
    BadSignature,

    /// update timestamp is not strictly newer than the stored one
    StaleUpdate,

    /// update for an unknown channel was buffered or dropped
    UnknownChannel,

    /// on-chain funding output does not match the announced 2-of-2 script
    TxoutMismatch,

    /// on-chain funding output does not exist yet
    TxoutUnknown,

    /// the gossip store reported a fatal error while ingesting this message
    #[from]
    #[display(inner)]
    Store(store::Error),
}

impl IngestError {
    /// Whether this failure is fatal and should terminate the process that
    /// owns the routing table, per spec §7's propagation policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IngestError::Store(_))
    }
}
