//! JSON rendering of decoded objects.
//!
//! An object renders as a map of the names its [`Node::tree`] lists. Scalars take the
//! `alloy-primitives` serde forms (integers above 64 bits and byte strings as `0x` hex), links
//! render as `{"/": "<cid>"}`.
use crate::{
    block::EthBlock,
    node::{FieldValue, Node, Resolved},
    payload::{AccountSnapshot, EthTx, LeafPayload},
    store::EthNode,
    trie::{NodeData, TrieNode},
};
use alloy_trie::Nibbles;
use cid::Cid;
use serde::{
    Serialize, Serializer,
    ser::{Error as _, SerializeMap},
};

/// A link in its JSON form.
struct Link<'a>(&'a Cid);

impl Serialize for Link<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("/", &self.0.to_string())?;
        map.end()
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::U64(value) => value.serialize(serializer),
            Self::U256(value) => value.serialize(serializer),
            Self::Address(address) => address.serialize(serializer),
            Self::Bytes(bytes) => bytes.serialize(serializer),
            Self::B256(hash) => hash.serialize(serializer),
            Self::B64(nonce) => nonce.serialize(serializer),
            Self::Bloom(bloom) => bloom.serialize(serializer),
        }
    }
}

/// Resolves every name of `node`'s tree and serializes the results as one map.
fn serialize_fields<N, S>(node: &N, serializer: S) -> Result<S::Ok, S::Error>
where
    N: Node + ?Sized,
    S: Serializer,
{
    let fields = node.tree();
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for field in &fields {
        let path = [field.as_str()];
        match node.resolve(&path).map_err(S::Error::custom)? {
            Resolved::Value(value) => map.serialize_entry(field, &value)?,
            Resolved::Link { cid, .. } => map.serialize_entry(field, &Link(&cid))?,
            Resolved::Itself => {
                return Err(S::Error::custom(format!("field {field} is not a value")));
            }
        }
    }
    map.end()
}

fn hex_key(key: &Nibbles) -> String {
    key.to_vec().iter().map(|nibble| format!("{nibble:x}")).collect()
}

impl Serialize for EthBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fields(self, serializer)
    }
}

impl Serialize for EthTx {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fields(self, serializer)
    }
}

impl Serialize for AccountSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_fields(self, serializer)
    }
}

impl Serialize for LeafPayload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Account(account) => account.serialize(serializer),
            Self::Transaction(tx) => tx.serialize(serializer),
            Self::Raw(bytes) => bytes.serialize(serializer),
        }
    }
}

impl Serialize for TrieNode {
    /// `{"type": "branch", "0": link or null, .., "f": ..}`, `{"type": "extension", key: link}`,
    /// `{"type": "leaf", key: payload}` or `{"type": "empty"}`. Keys are hex nibble strings.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.data() {
            NodeData::Empty => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", "empty")?;
                map.end()
            }
            NodeData::Branch(children) => {
                let mut map = serializer.serialize_map(Some(17))?;
                map.serialize_entry("type", "branch")?;
                for (idx, child) in children.slots().take(16).enumerate() {
                    map.serialize_entry(&format!("{idx:x}"), &child.map(Link))?;
                }
                map.end()
            }
            NodeData::Extension { key, child } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "extension")?;
                map.serialize_entry(&hex_key(key), &Link(child))?;
                map.end()
            }
            NodeData::Leaf { key, payload } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "leaf")?;
                map.serialize_entry(&hex_key(key), payload)?;
                map.end()
            }
        }
    }
}

impl Serialize for EthNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Block(block) => block.serialize(serializer),
            Self::Tx(tx) => tx.serialize(serializer),
            Self::Account(account) => account.serialize(serializer),
            Self::Trie(node) => node.serialize(serializer),
        }
    }
}
