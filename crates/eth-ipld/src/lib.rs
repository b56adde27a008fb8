//! Ethereum blocks, transactions and Merkle-Patricia trie nodes as content-addressed objects.
//!
//! Every object is identified by a CIDv1 made of its codec and the keccak-256 digest of its RLP
//! encoding. Hashes embedded in an object (parent hash, trie roots, branch children) become links
//! to other objects, so a path such as `["root", "a", "3", ..., "balance"]` can be resolved from a
//! block header down to an account field one object at a time.
//!
//! - [`decode_block`] decodes a header or a full block body and verifies its transaction trie.
//! - [`TrieNode::decode`] decodes state, storage and transaction trie nodes.
//! - [`Node::resolve`] resolves a path through one object; [`walk`] follows links through a
//!   [`BlockStore`].
//! - With the `serde` feature, every object serializes to JSON with links as `{"/": cid}`.

mod block;
pub mod codec;
mod error;
#[cfg(feature = "serde")]
mod json;
mod node;
pub mod path;
mod payload;
mod store;
pub mod trie;
mod tx_trie;

pub use block::{DecodedBlock, EthBlock, Header, decode_block, encode_block};
pub use codec::{Codec, cid_to_keccak, keccak_to_cid, raw_to_cid};
pub use error::{DecodeError, PathError, ResolveError};
pub use node::{FieldValue, Node, Resolved};
pub use payload::{AccountSnapshot, EthTx, LeafPayload, Transaction};
pub use store::{BlockStore, EthNode, MemoryStore, WalkError, Walked, walk};
pub use trie::{NodeData, NodeKind, TrieKind, TrieNode};
pub use tx_trie::{CommittedTrie, TxTrieBuilder};

pub use alloy_trie::Nibbles;
pub use cid::Cid;

#[cfg(all(test, not(feature = "serde")))]
use serde_json as _;
