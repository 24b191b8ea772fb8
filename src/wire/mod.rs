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

//! The wire codec: encode/decode for the gossip protocol's message kinds,
//! plus a peek-type operation that reads the 2-byte type tag of a buffer
//! without decoding (and without copying) the rest of it.
//!
//! Messages are a tagged union on the wire (a 2-byte big-endian type
//! followed by the type-specific body); that's modeled here as a closed sum
//! type, [`Message`], dispatching by tag, rather than as a derive — the
//! derive macro in [`lightning_encoding_derive`] only supports structs.

mod messages;

pub use messages::{
    ChainHash, ChannelAnnouncement, ChannelFlags, ChannelUpdate,
    GossipTimestampFilter, MessageFlags, NodeAnnouncement, QueryChannelRange,
    QueryShortChannelIds, ReplyChannelRange, ReplyShortChannelIdsEnd,
};

use std::io;

use lightning_encoding::{LightningDecode, LightningEncode};

/// Wire type tags, matching the gossip protocol's assigned numbers.
pub const TYPE_CHANNEL_ANNOUNCEMENT: u16 = 256;
pub const TYPE_NODE_ANNOUNCEMENT: u16 = 257;
pub const TYPE_CHANNEL_UPDATE: u16 = 258;
pub const TYPE_QUERY_SHORT_CHANNEL_IDS: u16 = 261;
pub const TYPE_REPLY_SHORT_CHANNEL_IDS_END: u16 = 262;
pub const TYPE_QUERY_CHANNEL_RANGE: u16 = 263;
pub const TYPE_REPLY_CHANNEL_RANGE: u16 = 264;
pub const TYPE_GOSSIP_TIMESTAMP_FILTER: u16 = 265;

/// The three message kinds that get rebroadcast from the gossip store to
/// peers; every other kind is store-internal bookkeeping or a one-shot
/// catch-up query/reply that the per-peer forwarding loop skips over.
pub fn is_rebroadcastable(type_tag: u16) -> bool {
    matches!(
        type_tag,
        TYPE_CHANNEL_ANNOUNCEMENT | TYPE_CHANNEL_UPDATE | TYPE_NODE_ANNOUNCEMENT
    )
}

/// Reads the 2-byte big-endian type tag from the front of an encoded
/// message without decoding the body. Used by the gossip store's read-back
/// path to classify a record without paying for a full parse.
pub fn peek_type(buf: &[u8]) -> Result<u16, lightning_encoding::Error> {
    if buf.len() < 2 {
        return Err(lightning_encoding::Error::DataIntegrityError(s!(
            "message shorter than its type tag"
        )));
    }
    Ok(u16::from_be_bytes([buf[0], buf[1]]))
}

/// A decoded gossip message, tagged by wire type.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
pub enum Message {
    #[display(inner)]
    ChannelAnnouncement(ChannelAnnouncement),
    #[display(inner)]
    ChannelUpdate(ChannelUpdate),
    #[display(inner)]
    NodeAnnouncement(NodeAnnouncement),
    #[display(inner)]
    QueryShortChannelIds(QueryShortChannelIds),
    #[display(inner)]
    ReplyShortChannelIdsEnd(ReplyShortChannelIdsEnd),
    #[display(inner)]
    QueryChannelRange(QueryChannelRange),
    #[display(inner)]
    ReplyChannelRange(ReplyChannelRange),
    #[display(inner)]
    GossipTimestampFilter(GossipTimestampFilter),
}

impl Message {
    pub fn type_tag(&self) -> u16 {
        match self {
            Message::ChannelAnnouncement(_) => TYPE_CHANNEL_ANNOUNCEMENT,
            Message::ChannelUpdate(_) => TYPE_CHANNEL_UPDATE,
            Message::NodeAnnouncement(_) => TYPE_NODE_ANNOUNCEMENT,
            Message::QueryShortChannelIds(_) => TYPE_QUERY_SHORT_CHANNEL_IDS,
            Message::ReplyShortChannelIdsEnd(_) => {
                TYPE_REPLY_SHORT_CHANNEL_IDS_END
            }
            Message::QueryChannelRange(_) => TYPE_QUERY_CHANNEL_RANGE,
            Message::ReplyChannelRange(_) => TYPE_REPLY_CHANNEL_RANGE,
            Message::GossipTimestampFilter(_) => {
                TYPE_GOSSIP_TIMESTAMP_FILTER
            }
        }
    }
}

impl LightningEncode for Message {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let mut len = self.type_tag().lightning_encode(&mut e)?;
        len += match self {
            Message::ChannelAnnouncement(m) => m.lightning_encode(&mut e)?,
            Message::ChannelUpdate(m) => m.lightning_encode(&mut e)?,
            Message::NodeAnnouncement(m) => m.lightning_encode(&mut e)?,
            Message::QueryShortChannelIds(m) => m.lightning_encode(&mut e)?,
            Message::ReplyShortChannelIdsEnd(m) => {
                m.lightning_encode(&mut e)?
            }
            Message::QueryChannelRange(m) => m.lightning_encode(&mut e)?,
            Message::ReplyChannelRange(m) => m.lightning_encode(&mut e)?,
            Message::GossipTimestampFilter(m) => m.lightning_encode(&mut e)?,
        };
        Ok(len)
    }
}

impl LightningDecode for Message {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let type_tag = u16::lightning_decode(&mut d)?;
        Ok(match type_tag {
            TYPE_CHANNEL_ANNOUNCEMENT => Message::ChannelAnnouncement(
                ChannelAnnouncement::lightning_decode(&mut d)?,
            ),
            TYPE_CHANNEL_UPDATE => {
                Message::ChannelUpdate(ChannelUpdate::lightning_decode(&mut d)?)
            }
            TYPE_NODE_ANNOUNCEMENT => Message::NodeAnnouncement(
                NodeAnnouncement::lightning_decode(&mut d)?,
            ),
            TYPE_QUERY_SHORT_CHANNEL_IDS => Message::QueryShortChannelIds(
                QueryShortChannelIds::lightning_decode(&mut d)?,
            ),
            TYPE_REPLY_SHORT_CHANNEL_IDS_END => {
                Message::ReplyShortChannelIdsEnd(
                    ReplyShortChannelIdsEnd::lightning_decode(&mut d)?,
                )
            }
            TYPE_QUERY_CHANNEL_RANGE => Message::QueryChannelRange(
                QueryChannelRange::lightning_decode(&mut d)?,
            ),
            TYPE_REPLY_CHANNEL_RANGE => Message::ReplyChannelRange(
                ReplyChannelRange::lightning_decode(&mut d)?,
            ),
            TYPE_GOSSIP_TIMESTAMP_FILTER => Message::GossipTimestampFilter(
                GossipTimestampFilter::lightning_decode(&mut d)?,
            ),
            unknown => {
                return Err(lightning_encoding::Error::EnumValueNotKnown(
                    "wire::Message",
                    unknown as usize,
                ))
            }
        })
    }
}
