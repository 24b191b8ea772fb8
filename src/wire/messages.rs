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

//! The gossip message bodies: `channel_announcement`, `channel_update`,
//! `node_announcement`, and the catch-up query/reply pairs.

use std::io;

use bitcoin::hashes::sha256d;
use bitcoin::secp256k1::PublicKey;
use lightning_encoding::{LightningDecode, LightningEncode};

use crate::types::{Alias, NodeAddress, NodeColor, ShortChannelId, Signature};

/// A chain hash identifies which blockchain a channel's funding output lives
/// on; it's the genesis block hash of that chain.
pub type ChainHash = sha256d::Hash;

bitflags::bitflags! {
    /// Bits carried in a `channel_update`'s `channel_flags` byte.
    pub struct ChannelFlags: u8 {
        /// Direction of this update relative to the channel's canonical
        /// node ordering: clear for `node[0] -> node[1]`, set otherwise.
        const DIRECTION = 0b0000_0001;
        /// The originating node has temporarily or permanently disabled
        /// this direction.
        const DISABLED  = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// Bits carried in a `channel_update`'s `message_flags` byte.
    pub struct MessageFlags: u8 {
        /// When set, the update carries an `htlc_maximum_msat` field.
        const HTLC_MAXIMUM_MSAT = 0b0000_0001;
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("channel_announcement({chain_hash}, {short_channel_id})")]
pub struct ChannelAnnouncement {
    pub node_signature_1: Signature,
    pub node_signature_2: Signature,
    pub bitcoin_signature_1: Signature,
    pub bitcoin_signature_2: Signature,
    pub features: Vec<u8>,
    pub chain_hash: ChainHash,
    pub short_channel_id: ShortChannelId,
    pub node_id_1: PublicKey,
    pub node_id_2: PublicKey,
    pub bitcoin_key_1: PublicKey,
    pub bitcoin_key_2: PublicKey,
}

impl ChannelAnnouncement {
    /// The portion of the message that both node signatures and both
    /// bitcoin signatures are computed over: everything after the four
    /// signature fields.
    pub fn signed_data(&self) -> Result<Vec<u8>, lightning_encoding::Error> {
        let mut buf = Vec::new();
        self.features.lightning_encode(&mut buf)?;
        self.chain_hash.lightning_encode(&mut buf)?;
        self.short_channel_id.lightning_encode(&mut buf)?;
        self.node_id_1.lightning_encode(&mut buf)?;
        self.node_id_2.lightning_encode(&mut buf)?;
        self.bitcoin_key_1.lightning_encode(&mut buf)?;
        self.bitcoin_key_2.lightning_encode(&mut buf)?;
        Ok(buf)
    }
}

/// `channel_update`, hand-coded rather than derived: `htlc_maximum_msat` is
/// only present on the wire when `message_flags`'s low bit is set, which the
/// struct-field derive has no way to express.
#[derive(Clone, PartialEq, Eq, Debug, Display)]
#[display("channel_update({chain_hash}, {short_channel_id}, {timestamp})")]
pub struct ChannelUpdate {
    pub signature: Signature,
    pub chain_hash: ChainHash,
    pub short_channel_id: ShortChannelId,
    pub timestamp: u32,
    pub message_flags: u8,
    pub channel_flags: u8,
    pub cltv_expiry_delta: u16,
    pub htlc_minimum_msat: u64,
    pub fee_base_msat: u32,
    pub fee_proportional_millionths: u32,
    pub htlc_maximum_msat: Option<u64>,
}

impl ChannelUpdate {
    pub fn direction(&self) -> u8 {
        self.channel_flags & ChannelFlags::DIRECTION.bits()
    }

    pub fn is_disabled(&self) -> bool {
        self.channel_flags & ChannelFlags::DISABLED.bits() != 0
    }

    pub fn has_htlc_maximum(&self) -> bool {
        self.message_flags & MessageFlags::HTLC_MAXIMUM_MSAT.bits() != 0
    }

    /// The portion of the message the signature is computed over: everything
    /// after the signature field.
    pub fn signed_data(&self) -> Result<Vec<u8>, lightning_encoding::Error> {
        let mut buf = Vec::new();
        self.chain_hash.lightning_encode(&mut buf)?;
        self.short_channel_id.lightning_encode(&mut buf)?;
        self.timestamp.lightning_encode(&mut buf)?;
        self.message_flags.lightning_encode(&mut buf)?;
        self.channel_flags.lightning_encode(&mut buf)?;
        self.cltv_expiry_delta.lightning_encode(&mut buf)?;
        self.htlc_minimum_msat.lightning_encode(&mut buf)?;
        self.fee_base_msat.lightning_encode(&mut buf)?;
        self.fee_proportional_millionths.lightning_encode(&mut buf)?;
        if let Some(max) = self.htlc_maximum_msat {
            max.lightning_encode(&mut buf)?;
        }
        Ok(buf)
    }
}

impl LightningEncode for ChannelUpdate {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let mut len = 0;
        len += self.signature.lightning_encode(&mut e)?;
        len += self.chain_hash.lightning_encode(&mut e)?;
        len += self.short_channel_id.lightning_encode(&mut e)?;
        len += self.timestamp.lightning_encode(&mut e)?;
        len += self.message_flags.lightning_encode(&mut e)?;
        len += self.channel_flags.lightning_encode(&mut e)?;
        len += self.cltv_expiry_delta.lightning_encode(&mut e)?;
        len += self.htlc_minimum_msat.lightning_encode(&mut e)?;
        len += self.fee_base_msat.lightning_encode(&mut e)?;
        len += self.fee_proportional_millionths.lightning_encode(&mut e)?;
        if let Some(max) = self.htlc_maximum_msat {
            len += max.lightning_encode(&mut e)?;
        }
        Ok(len)
    }
}

impl LightningDecode for ChannelUpdate {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let signature = Signature::lightning_decode(&mut d)?;
        let chain_hash = ChainHash::lightning_decode(&mut d)?;
        let short_channel_id = ShortChannelId::lightning_decode(&mut d)?;
        let timestamp = u32::lightning_decode(&mut d)?;
        let message_flags = u8::lightning_decode(&mut d)?;
        let channel_flags = u8::lightning_decode(&mut d)?;
        let cltv_expiry_delta = u16::lightning_decode(&mut d)?;
        let htlc_minimum_msat = u64::lightning_decode(&mut d)?;
        let fee_base_msat = u32::lightning_decode(&mut d)?;
        let fee_proportional_millionths = u32::lightning_decode(&mut d)?;
        let htlc_maximum_msat =
            if message_flags & MessageFlags::HTLC_MAXIMUM_MSAT.bits() != 0 {
                Some(u64::lightning_decode(&mut d)?)
            } else {
                None
            };
        Ok(ChannelUpdate {
            signature,
            chain_hash,
            short_channel_id,
            timestamp,
            message_flags,
            channel_flags,
            cltv_expiry_delta,
            htlc_minimum_msat,
            fee_base_msat,
            fee_proportional_millionths,
            htlc_maximum_msat,
        })
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("node_announcement({node_id}, {alias}, ...)")]
pub struct NodeAnnouncement {
    pub signature: Signature,
    pub features: Vec<u8>,
    pub timestamp: u32,
    pub node_id: PublicKey,
    pub rgb_color: NodeColor,
    pub alias: Alias,
    pub addresses: Vec<NodeAddress>,
}

impl NodeAnnouncement {
    pub fn signed_data(&self) -> Result<Vec<u8>, lightning_encoding::Error> {
        let mut buf = Vec::new();
        self.features.lightning_encode(&mut buf)?;
        self.timestamp.lightning_encode(&mut buf)?;
        self.node_id.lightning_encode(&mut buf)?;
        self.rgb_color.lightning_encode(&mut buf)?;
        self.alias.lightning_encode(&mut buf)?;
        self.addresses.lightning_encode(&mut buf)?;
        Ok(buf)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("query_short_channel_ids({chain_hash}, {short_ids:#?})")]
pub struct QueryShortChannelIds {
    pub chain_hash: ChainHash,
    pub short_ids: Vec<ShortChannelId>,
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("reply_short_channel_ids_end({chain_hash}, {full_information})")]
pub struct ReplyShortChannelIdsEnd {
    pub chain_hash: ChainHash,
    pub full_information: u8,
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("query_channel_range({chain_hash}, {first_blocknum}, {number_of_blocks})")]
pub struct QueryChannelRange {
    pub chain_hash: ChainHash,
    pub first_blocknum: u32,
    pub number_of_blocks: u32,
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("reply_channel_range({chain_hash}, {first_blocknum}, {number_of_blocks}, {full_information})")]
pub struct ReplyChannelRange {
    pub chain_hash: ChainHash,
    pub first_blocknum: u32,
    pub number_of_blocks: u32,
    pub full_information: u8,
    pub encoded_short_ids: Vec<ShortChannelId>,
}

#[derive(Clone, PartialEq, Eq, Debug, Display, LightningEncode, LightningDecode)]
#[display("gossip_timestamp_filter({chain_hash}, {first_timestamp}, {timestamp_range})")]
pub struct GossipTimestampFilter {
    pub chain_hash: ChainHash,
    pub first_timestamp: u32,
    pub timestamp_range: u32,
}
