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

//! Identifiers and small value types shared across the gossip store, the
//! routing table, and the wire codec: node and short-channel identifiers,
//! node metadata (color, alias, advertised addresses), and the signature
//! alias used throughout message verification.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::str::FromStr;

use amplify::hex::{FromHex, ToHex};
use amplify::{Slice32, Wrapper};
use bitcoin::secp256k1;
use lightning_encoding::{strategies, Strategy};

/// Identifies a node by its 33-byte compressed secp256k1 public key.
///
/// Unlike most identifiers in this crate this one is hand-written rather
/// than built with `amplify::Wrapper`: equality and ordering must be defined
/// over the compressed serialization (the canonical form peers sign and
/// gossip), not over whatever internal representation `secp256k1::PublicKey`
/// happens to use, so the derive's bitwise semantics would be the wrong tool.
#[derive(Clone, Copy, Debug)]
pub struct NodeId(pub secp256k1::PublicKey);

impl NodeId {
    pub fn from_public_key(key: secp256k1::PublicKey) -> Self {
        NodeId(key)
    }

    pub fn public_key(&self) -> &secp256k1::PublicKey {
        &self.0
    }

    pub fn serialize(&self) -> [u8; 33] {
        self.0.serialize()
    }
}

impl PartialEq for NodeId {
    fn eq(&self, other: &Self) -> bool {
        self.serialize() == other.serialize()
    }
}

impl Eq for NodeId {}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialize().cmp(&other.serialize())
    }
}

impl std::hash::Hash for NodeId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.serialize().to_hex())
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum NodeIdParseError {
    /// invalid hex encoding
    #[from]
    Hex(amplify::hex::Error),

    /// invalid public key encoding
    #[from]
    Secp256k1(secp256k1::Error),
}

impl FromStr for NodeId {
    type Err = NodeIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = Vec::<u8>::from_hex(s)?;
        let key = secp256k1::PublicKey::from_slice(&bytes)?;
        Ok(NodeId(key))
    }
}

impl lightning_encoding::LightningEncode for NodeId {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        Ok(e.write(&self.serialize())?)
    }
}

impl lightning_encoding::LightningDecode for NodeId {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let mut buf = [0u8; 33];
        d.read_exact(&mut buf)?;
        let key = secp256k1::PublicKey::from_slice(&buf).map_err(|_| {
            lightning_encoding::Error::DataIntegrityError(s!(
                "invalid node public key"
            ))
        })?;
        Ok(NodeId(key))
    }
}

/// The BIP-340/ECDSA signature attached to gossip messages. An alias rather
/// than a newtype: every wire message signs over its own canonical
/// serialization with plain `secp256k1::ecdsa::Signature`, and nothing in
/// this crate needs to distinguish "a gossip signature" from any other use
/// of the same type.
pub type Signature = secp256k1::ecdsa::Signature;

/// The three RGB bytes a node announcement carries for client UI coloring.
/// Cosmetic only; never inspected by the routing table.
#[derive(Wrapper, Clone, Copy, Debug, From, PartialEq, Eq, Default)]
pub struct NodeColor([u8; 3]);

impl lightning_encoding::LightningEncode for NodeColor {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        Ok(e.write(self.as_inner())?)
    }
}

impl lightning_encoding::LightningDecode for NodeColor {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let mut buf = [0u8; 3];
        d.read_exact(&mut buf)?;
        Ok(NodeColor(buf))
    }
}

/// The 32-byte alias a node announces for itself. Not guaranteed unique,
/// not guaranteed valid UTF-8; the routing table stores it opaquely.
#[derive(Wrapper, Clone, Copy, Debug, From, PartialEq, Eq, Hash)]
pub struct Alias(Slice32);

impl lightning_encoding::LightningEncode for Alias {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        Ok(e.write(self.as_inner().as_inner())?)
    }
}

impl lightning_encoding::LightningDecode for Alias {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let mut buf = [0u8; 32];
        d.read_exact(&mut buf)?;
        Ok(Alias(Slice32::from_inner(buf)))
    }
}

/// A short channel id: `{block_height:24 | tx_index:24 | output_index:16}`
/// packed into 64 bits, on the wire as three big-endian fields of 3, 3 and
/// 2 bytes respectively.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct ShortChannelId {
    block_height: u32,
    tx_index: u32,
    output_index: u16,
}

const SCID_COMPONENT_MAX: u32 = 1 << 24;

impl ShortChannelId {
    pub fn new(
        block_height: u32,
        tx_index: u32,
        output_index: u16,
    ) -> Option<Self> {
        if block_height >= SCID_COMPONENT_MAX || tx_index >= SCID_COMPONENT_MAX
        {
            return None;
        }
        Some(ShortChannelId {
            block_height,
            tx_index,
            output_index,
        })
    }

    pub fn block_height(&self) -> u32 {
        self.block_height
    }

    pub fn tx_index(&self) -> u32 {
        self.tx_index
    }

    pub fn output_index(&self) -> u16 {
        self.output_index
    }

    pub fn as_u64(&self) -> u64 {
        (self.block_height as u64) << 40
            | (self.tx_index as u64) << 16
            | self.output_index as u64
    }

    pub fn from_u64(v: u64) -> Self {
        ShortChannelId {
            block_height: ((v >> 40) & 0x00FF_FFFF) as u32,
            tx_index: ((v >> 16) & 0x00FF_FFFF) as u32,
            output_index: (v & 0xFFFF) as u16,
        }
    }
}

impl Display for ShortChannelId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}",
            self.block_height, self.tx_index, self.output_index
        )
    }
}

#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error,
)]
#[display(doc_comments)]
pub enum ShortChannelIdParseError {
    /// wrong block height component
    WrongBlockHeight,

    /// wrong transaction index component
    WrongTxIndex,

    /// wrong output index component
    WrongOutputIndex,

    /// too many short channel id components; expected three (block height,
    /// tx index and output index)
    ExcessiveComponents,
}

impl FromStr for ShortChannelId {
    type Err = ShortChannelIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split('x');
        match (split.next(), split.next(), split.next(), split.next()) {
            (Some(block_height), Some(tx_index), Some(output_index), None) => {
                let block_height = block_height
                    .parse()
                    .map_err(|_| ShortChannelIdParseError::WrongBlockHeight)?;
                let tx_index = tx_index
                    .parse()
                    .map_err(|_| ShortChannelIdParseError::WrongTxIndex)?;
                let output_index = output_index
                    .parse()
                    .map_err(|_| ShortChannelIdParseError::WrongOutputIndex)?;
                ShortChannelId::new(block_height, tx_index, output_index)
                    .ok_or(ShortChannelIdParseError::WrongBlockHeight)
            }
            _ => Err(ShortChannelIdParseError::ExcessiveComponents),
        }
    }
}

impl lightning_encoding::LightningEncode for ShortChannelId {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let mut len = 0;
        let bh = self.block_height.to_be_bytes();
        len += e.write(&bh[1..])?;
        let ti = self.tx_index.to_be_bytes();
        len += e.write(&ti[1..])?;
        len += e.write(&self.output_index.to_be_bytes())?;
        Ok(len)
    }
}

impl lightning_encoding::LightningDecode for ShortChannelId {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let mut bh = [0u8; 4];
        d.read_exact(&mut bh[1..])?;
        let mut ti = [0u8; 4];
        d.read_exact(&mut ti[1..])?;
        let mut oi = [0u8; 2];
        d.read_exact(&mut oi)?;
        Ok(ShortChannelId {
            block_height: u32::from_be_bytes(bh),
            tx_index: u32::from_be_bytes(ti),
            output_index: u16::from_be_bytes(oi),
        })
    }
}

impl Strategy for ShortChannelId {
    type Strategy = strategies::AsStrict;
}

/// A network address a node announced it is reachable at, as carried in the
/// TLV address list of a `node_announcement`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeAddress {
    IpV4 { addr: [u8; 4], port: u16 },
    IpV6 { addr: [u8; 16], port: u16 },
    OnionV2 { addr: [u8; 10], port: u16 },
    OnionV3 { ed25519_pubkey: [u8; 32], checksum: u16, version: u8, port: u16 },
}

impl NodeAddress {
    fn type_byte(&self) -> u8 {
        match self {
            NodeAddress::IpV4 { .. } => 1,
            NodeAddress::IpV6 { .. } => 2,
            NodeAddress::OnionV2 { .. } => 3,
            NodeAddress::OnionV3 { .. } => 4,
        }
    }
}

impl lightning_encoding::LightningEncode for NodeAddress {
    fn lightning_encode<E: io::Write>(
        &self,
        mut e: E,
    ) -> Result<usize, lightning_encoding::Error> {
        let mut len = e.write(&[self.type_byte()])?;
        match self {
            NodeAddress::IpV4 { addr, port } => {
                len += e.write(addr)?;
                len += e.write(&port.to_be_bytes())?;
            }
            NodeAddress::IpV6 { addr, port } => {
                len += e.write(addr)?;
                len += e.write(&port.to_be_bytes())?;
            }
            NodeAddress::OnionV2 { addr, port } => {
                len += e.write(addr)?;
                len += e.write(&port.to_be_bytes())?;
            }
            NodeAddress::OnionV3 {
                ed25519_pubkey,
                checksum,
                version,
                port,
            } => {
                len += e.write(ed25519_pubkey)?;
                len += e.write(&checksum.to_be_bytes())?;
                len += e.write(&[*version])?;
                len += e.write(&port.to_be_bytes())?;
            }
        }
        Ok(len)
    }
}

impl lightning_encoding::LightningDecode for NodeAddress {
    fn lightning_decode<D: io::Read>(
        mut d: D,
    ) -> Result<Self, lightning_encoding::Error> {
        let mut tag = [0u8; 1];
        d.read_exact(&mut tag)?;
        let mut port_buf = [0u8; 2];
        Ok(match tag[0] {
            1 => {
                let mut addr = [0u8; 4];
                d.read_exact(&mut addr)?;
                d.read_exact(&mut port_buf)?;
                NodeAddress::IpV4 { addr, port: u16::from_be_bytes(port_buf) }
            }
            2 => {
                let mut addr = [0u8; 16];
                d.read_exact(&mut addr)?;
                d.read_exact(&mut port_buf)?;
                NodeAddress::IpV6 { addr, port: u16::from_be_bytes(port_buf) }
            }
            3 => {
                let mut addr = [0u8; 10];
                d.read_exact(&mut addr)?;
                d.read_exact(&mut port_buf)?;
                NodeAddress::OnionV2 {
                    addr,
                    port: u16::from_be_bytes(port_buf),
                }
            }
            4 => {
                let mut ed25519_pubkey = [0u8; 32];
                d.read_exact(&mut ed25519_pubkey)?;
                let mut checksum_buf = [0u8; 2];
                d.read_exact(&mut checksum_buf)?;
                let mut version_buf = [0u8; 1];
                d.read_exact(&mut version_buf)?;
                d.read_exact(&mut port_buf)?;
                NodeAddress::OnionV3 {
                    ed25519_pubkey,
                    checksum: u16::from_be_bytes(checksum_buf),
                    version: version_buf[0],
                    port: u16::from_be_bytes(port_buf),
                }
            }
            unknown => {
                return Err(lightning_encoding::Error::EnumValueNotKnown(
                    "NodeAddress",
                    unknown as usize,
                ))
            }
        })
    }
}
