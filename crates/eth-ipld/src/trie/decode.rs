//! Trie node RLP decoding.
use super::{
    BRANCH_SLOTS, BranchChildren, NodeData, TrieKind, TrieNode,
    hex_prefix::{KeyKind, decode_compact_key},
};
use crate::{
    codec::{Codec, keccak_to_cid},
    error::DecodeError,
    payload::LeafPayload,
};
use alloy_primitives::{B256, Bytes};
use alloy_rlp::{EMPTY_STRING_CODE, Header, PayloadView};
use alloy_trie::Nibbles;
use cid::Cid;
use tracing::trace;

impl TrieNode {
    /// Decodes a node of the given trie, using its leaf payload decoder.
    pub fn decode(kind: TrieKind, data: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(kind.codec(), data, |key, value| kind.decode_leaf(key, value))
    }

    /// Decodes a node labelled with `codec`, handing leaf values to `decode_leaf`.
    ///
    /// `data` must be exactly one RLP item: the empty string for the empty trie, a list of two
    /// elements for a leaf or extension, or a list of 17 elements for a branch.
    pub fn decode_with<F>(codec: Codec, data: &[u8], decode_leaf: F) -> Result<Self, DecodeError>
    where
        F: FnOnce(&Nibbles, &[u8]) -> Result<LeafPayload, DecodeError>,
    {
        let node = if data == [EMPTY_STRING_CODE] {
            NodeData::Empty
        } else {
            let mut buf = data;
            let view = Header::decode_raw(&mut buf)?;
            if !buf.is_empty() {
                return Err(alloy_rlp::Error::UnexpectedLength.into());
            }
            match view {
                PayloadView::String(_) => return Err(alloy_rlp::Error::UnexpectedString.into()),
                PayloadView::List(items) => match items.as_slice() {
                    [key, value] => decode_short(codec, key, value, decode_leaf)?,
                    items if items.len() == BRANCH_SLOTS => decode_branch(codec, items)?,
                    items => return Err(DecodeError::UnknownNodeType(items.len())),
                },
            }
        };

        let node = Self { codec, data: node, raw: Bytes::copy_from_slice(data) };
        trace!(target: "eth_ipld::trie", %codec, kind = ?node.kind(), "decoded trie node");
        Ok(node)
    }
}

fn decode_short<F>(
    codec: Codec,
    mut key: &[u8],
    mut value: &[u8],
    decode_leaf: F,
) -> Result<NodeData, DecodeError>
where
    F: FnOnce(&Nibbles, &[u8]) -> Result<LeafPayload, DecodeError>,
{
    let compact = Header::decode_bytes(&mut key, false)?;
    let (kind, key) = decode_compact_key(compact)?;
    match kind {
        KeyKind::Extension => {
            let child = decode_reference(codec, value)?
                .ok_or_else(|| DecodeError::UnrecognizedObject(Bytes::copy_from_slice(value)))?;
            Ok(NodeData::Extension { key, child })
        }
        KeyKind::Leaf => {
            let bytes = Header::decode_bytes(&mut value, false)?;
            let payload = decode_leaf(&key, bytes)?;
            Ok(NodeData::Leaf { key, payload })
        }
    }
}

fn decode_branch(codec: Codec, items: &[&[u8]]) -> Result<NodeData, DecodeError> {
    let mut children = BranchChildren::new();
    for (idx, item) in items.iter().enumerate() {
        if let Some(child) = decode_reference(codec, item)? {
            children.insert(idx, child);
        }
    }
    Ok(NodeData::Branch(children))
}

/// Decodes a child reference: the empty string or a 32 byte node hash.
fn decode_reference(codec: Codec, item: &[u8]) -> Result<Option<Cid>, DecodeError> {
    let mut buf = item;
    match Header::decode_raw(&mut buf)? {
        PayloadView::String([]) => Ok(None),
        PayloadView::String(hash) if hash.len() == B256::len_bytes() => {
            Ok(Some(keccak_to_cid(codec, B256::from_slice(hash))))
        }
        PayloadView::String(other) => Err(DecodeError::UnrecognizedObject(Bytes::copy_from_slice(other))),
        PayloadView::List(_) => Err(DecodeError::UnrecognizedObject(Bytes::copy_from_slice(item))),
    }
}
