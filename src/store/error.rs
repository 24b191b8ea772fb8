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

use amplify::IoError;

/// Failures from the gossip store. `Corrupt` and `Io` are fatal per spec §7:
/// the caller that owns the routing table logs the offset and terminates
/// rather than trying to continue with a store whose invariants can no
/// longer be trusted.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum Error {
    /// I/O error
    #[from(std::io::Error)]
    #[display(inner)]
    Io(IoError),

    /// CRC or length-bounds mismatch on the record at offset {0}
    Corrupt(u64),

    /// no record found at offset {0}
    NotFound(u64),

    /// payload of {0} bytes exceeds the maximum record length
    PayloadTooLarge(usize),
}
