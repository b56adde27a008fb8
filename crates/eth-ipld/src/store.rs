//! Block storage and multi-hop traversal.
use crate::{
    block::{DecodedBlock, EthBlock},
    codec::{Codec, UnknownCodec, cid_codec, raw_to_cid},
    error::{DecodeError, ResolveError},
    node::{FieldValue, Node, Resolved},
    payload::{AccountSnapshot, EthTx},
    trie::{TrieKind, TrieNode},
};
use alloy_primitives::Bytes;
use cid::Cid;
use core::fmt;
use std::collections::BTreeMap;
use tracing::trace;

/// Content-addressed block storage.
pub trait BlockStore {
    /// Returns the bytes stored under `cid`.
    fn get(&self, cid: &Cid) -> Option<Bytes>;

    /// Stores `data` under `cid`. The caller guarantees that `cid` addresses `data`.
    fn insert(&mut self, cid: Cid, data: Bytes);

    /// Stores `data` under its CID for `codec` and returns the CID.
    fn put(&mut self, codec: Codec, data: Bytes) -> Cid {
        let cid = raw_to_cid(codec, &data);
        self.insert(cid, data);
        cid
    }

    /// Stores the encoding of `node`.
    fn put_node(&mut self, node: &dyn Node) -> Cid {
        let cid = node.cid();
        self.insert(cid, Bytes::copy_from_slice(node.raw_data()));
        cid
    }

    /// Stores the header, the transactions and the transaction trie nodes of a decoded block.
    /// Returns the CID of the block.
    fn put_block(&mut self, decoded: &DecodedBlock) -> Cid {
        for tx in &decoded.transactions {
            self.put_node(tx);
        }
        for node in &decoded.tx_trie_nodes {
            self.put_node(node);
        }
        self.put_node(&decoded.block)
    }
}

/// A [`BlockStore`] held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: BTreeMap<Cid, Bytes>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for MemoryStore {
    fn get(&self, cid: &Cid) -> Option<Bytes> {
        self.blocks.get(cid).cloned()
    }

    fn insert(&mut self, cid: Cid, data: Bytes) {
        self.blocks.insert(cid, data);
    }
}

/// Any Ethereum object, decoded according to the codec of its CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthNode {
    /// `eth-block`.
    Block(EthBlock),
    /// `eth-tx`.
    Tx(EthTx),
    /// `eth-account-snapshot`.
    Account(AccountSnapshot),
    /// `eth-tx-trie`, `eth-state-trie` or `eth-storage-trie`.
    Trie(TrieNode),
}

impl EthNode {
    /// Decodes `data`, stored under `cid`, with the decoder of the CID's codec.
    ///
    /// The data must hash to the digest of `cid`. A block must be stored as its bare header: a
    /// full body hashes to a different digest than the header it is addressed by.
    pub fn decode(cid: &Cid, data: &[u8]) -> Result<Self, DecodeError> {
        let codec = cid_codec(cid).map_err(|UnknownCodec(code)| DecodeError::UnsupportedCodec(code))?;
        let computed = raw_to_cid(codec, data);
        if computed != *cid {
            return Err(DecodeError::CidMismatch { expected: *cid, computed });
        }

        Ok(match codec {
            Codec::EthBlock => Self::Block(EthBlock::decode(data)?),
            Codec::EthTx => Self::Tx(EthTx::decode(data)?),
            Codec::EthAccountSnapshot => Self::Account(AccountSnapshot::decode(data)?),
            other => match TrieKind::from_codec(other) {
                Some(kind) => Self::Trie(TrieNode::decode(kind, data)?),
                None => return Err(DecodeError::UnsupportedCodec(other.code())),
            },
        })
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            Self::Block(block) => block,
            Self::Tx(tx) => tx,
            Self::Account(account) => account,
            Self::Trie(node) => node,
        }
    }
}

impl Node for EthNode {
    fn cid(&self) -> Cid {
        self.as_node().cid()
    }

    fn raw_data(&self) -> &[u8] {
        self.as_node().raw_data()
    }

    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        self.as_node().resolve(path)
    }

    fn links(&self) -> Vec<Cid> {
        self.as_node().links()
    }

    fn tree(&self) -> Vec<String> {
        self.as_node().tree()
    }
}

impl fmt::Display for EthNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block(block) => fmt::Display::fmt(block, f),
            Self::Tx(tx) => fmt::Display::fmt(tx, f),
            Self::Account(account) => fmt::Display::fmt(account, f),
            Self::Trie(node) => fmt::Display::fmt(node, f),
        }
    }
}

/// Errors of a multi-hop traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    /// A linked block is not in the store.
    #[error("block {0} not found")]
    NotFound(Cid),
    /// A fetched block failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The path failed to resolve through a fetched block.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The end of a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Walked {
    /// The path ended on an object.
    Node(EthNode),
    /// The path ended on a field value.
    Value(FieldValue),
}

/// Resolves `path` from `root`, fetching and following links until the path is consumed.
pub fn walk<'a, S>(store: &S, root: &Cid, path: &'a [&'a str]) -> Result<Walked, WalkError>
where
    S: BlockStore + ?Sized,
{
    let mut cid = *root;
    let mut rest = path;
    loop {
        let data = store.get(&cid).ok_or(WalkError::NotFound(cid))?;
        let node = EthNode::decode(&cid, &data)?;
        trace!(target: "eth_ipld::store", %cid, remaining = rest.len(), "walking");

        match node.resolve(rest)? {
            Resolved::Itself => return Ok(Walked::Node(node)),
            Resolved::Value(value) => return Ok(Walked::Value(value)),
            Resolved::Link { cid: next, rest: remaining } => {
                cid = next;
                rest = remaining;
            }
        }
    }
}
