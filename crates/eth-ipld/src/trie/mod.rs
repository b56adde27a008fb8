//! Merkle-Patricia trie nodes in their content-addressed form.
//!
//! A node is decoded from its RLP encoding into one of four shapes. Child references become
//! CIDs carrying the codec of the trie the node belongs to; leaf values are decoded into a
//! [`LeafPayload`] chosen by the [`TrieKind`].
use crate::{
    codec::Codec,
    error::DecodeError,
    payload::{AccountSnapshot, EthTx, LeafPayload},
};
use alloy_primitives::Bytes;
use alloy_trie::Nibbles;
use cid::Cid;

mod children;
mod decode;
pub mod hex_prefix;
mod resolve;

pub use children::{BRANCH_SLOTS, BranchChildren};


/// The tries whose nodes are decoded, each with its own codec and leaf payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrieKind {
    /// World state: keccak(address) to account.
    State,
    /// Contract storage: keccak(slot) to value.
    Storage,
    /// Block transactions: rlp(index) to transaction.
    Transaction,
}

impl TrieKind {
    /// Codec of the nodes of this trie.
    pub const fn codec(self) -> Codec {
        match self {
            Self::State => Codec::EthStateTrie,
            Self::Storage => Codec::EthStorageTrie,
            Self::Transaction => Codec::EthTxTrie,
        }
    }

    /// The trie whose nodes carry `codec`, if any.
    pub const fn from_codec(codec: Codec) -> Option<Self> {
        match codec {
            Codec::EthStateTrie => Some(Self::State),
            Codec::EthStorageTrie => Some(Self::Storage),
            Codec::EthTxTrie => Some(Self::Transaction),
            _ => None,
        }
    }

    /// Name of the nodes of this trie in their text form.
    pub const fn object_name(self) -> &'static str {
        match self {
            Self::State => "EthereumStateTrie",
            Self::Storage => "EthereumStorageTrie",
            Self::Transaction => "EthereumTxTrie",
        }
    }

    /// Decodes the value of a leaf of this trie.
    pub fn decode_leaf(self, _key: &Nibbles, value: &[u8]) -> Result<LeafPayload, DecodeError> {
        Ok(match self {
            Self::State => LeafPayload::Account(AccountSnapshot::decode(value)?),
            Self::Storage => LeafPayload::Raw(Bytes::copy_from_slice(value)),
            Self::Transaction => LeafPayload::Transaction(EthTx::decode(value)?),
        })
    }
}

/// Shape of a trie node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The empty trie.
    Empty,
    /// 17 child slots.
    Branch,
    /// Shared key prefix followed by a single child.
    Extension,
    /// Rest of a key and its value.
    Leaf,
}

/// Content of a decoded trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The empty trie, encoded as the empty string.
    Empty,
    /// Branch children.
    Branch(BranchChildren),
    /// Extension key and the child it leads to.
    Extension {
        /// Shared key nibbles.
        key: Nibbles,
        /// Child node, with the codec of this trie.
        child: Cid,
    },
    /// Leaf key remainder and its decoded value.
    Leaf {
        /// Remaining key nibbles.
        key: Nibbles,
        /// Decoded value.
        payload: LeafPayload,
    },
}

/// A decoded trie node and the bytes it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieNode {
    codec: Codec,
    data: NodeData,
    raw: Bytes,
}

impl TrieNode {
    /// Shape of the node.
    pub const fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Empty => NodeKind::Empty,
            NodeData::Branch(_) => NodeKind::Branch,
            NodeData::Extension { .. } => NodeKind::Extension,
            NodeData::Leaf { .. } => NodeKind::Leaf,
        }
    }

    /// Content of the node.
    pub const fn data(&self) -> &NodeData {
        &self.data
    }

    /// The value stored at a leaf. A key path resolves to the leaf node; the payload itself is
    /// read from here, or one of its fields is resolved by name.
    pub const fn payload(&self) -> Option<&LeafPayload> {
        match &self.data {
            NodeData::Leaf { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Codec of the trie the node belongs to.
    pub const fn codec(&self) -> Codec {
        self.codec
    }

    /// The encoding the node was decoded from.
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }
}
