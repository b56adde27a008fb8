//! Path resolution through trie nodes.
use super::{NodeData, TrieKind, TrieNode};
use crate::{
    codec::raw_to_cid,
    error::ResolveError,
    node::{Node, Resolved},
    path::{FieldCheck, PathSegment, nibble_prefix_len, validate_path},
};
use alloy_trie::Nibbles;
use cid::Cid;
use core::fmt;

impl Node for TrieNode {
    fn cid(&self) -> Cid {
        raw_to_cid(self.codec, &self.raw)
    }

    fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        if path.is_empty() {
            return Ok(Resolved::Itself);
        }

        match &self.data {
            NodeData::Empty => Err(ResolveError::NoSuchLink),
            NodeData::Branch(children) => {
                let segments = validate_path(path, FieldCheck::Deferred)?;
                let PathSegment::Nibble(idx) = segments[0] else {
                    return Err(ResolveError::NoSuchLinkInBranch);
                };
                let child = children.get(idx as usize).ok_or(ResolveError::NoSuchLinkInBranch)?;
                Ok(Resolved::Link { cid: *child, rest: &path[1..] })
            }
            NodeData::Extension { key, child } => {
                let segments = validate_path(path, FieldCheck::Deferred)?;
                if !starts_with_key(&segments, key) {
                    return Err(ResolveError::NoSuchLinkInExtension);
                }
                Ok(Resolved::Link { cid: *child, rest: &path[key.len()..] })
            }
            NodeData::Leaf { key, payload } => {
                let segments = validate_path(path, payload.fields())?;
                let nibbles = nibble_prefix_len(&segments);
                if nibbles > 0 && !(nibbles == key.len() && starts_with_key(&segments, key)) {
                    return Err(ResolveError::NoSuchLinkInLeaf);
                }
                // A key path ends on the leaf whether or not its parents consumed the whole key.
                match &path[nibbles..] {
                    [] => Ok(Resolved::Itself),
                    rest => payload.resolve(rest),
                }
            }
        }
    }

    fn links(&self) -> Vec<Cid> {
        match &self.data {
            NodeData::Branch(children) => children.present().map(|(_, cid)| *cid).collect(),
            NodeData::Extension { child, .. } => vec![*child],
            NodeData::Empty | NodeData::Leaf { .. } => Vec::new(),
        }
    }

    fn tree(&self) -> Vec<String> {
        match &self.data {
            NodeData::Empty => Vec::new(),
            NodeData::Branch(children) => children
                .present()
                .filter(|(idx, _)| *idx < 16)
                .map(|(idx, _)| format!("{idx:x}"))
                .collect(),
            NodeData::Extension { key, .. } => {
                vec![key.to_vec().iter().map(|nibble| format!("{nibble:x}")).collect()]
            }
            NodeData::Leaf { payload, .. } => match payload.fields() {
                FieldCheck::Known(fields) => fields.iter().map(|field| (*field).to_string()).collect(),
                FieldCheck::Deferred => Vec::new(),
            },
        }
    }
}

/// Whether the path starts with every nibble of `key`.
fn starts_with_key(segments: &[PathSegment<'_>], key: &Nibbles) -> bool {
    let key = key.to_vec();
    segments.len() >= key.len()
        && key
            .iter()
            .zip(segments)
            .all(|(nibble, segment)| *segment == PathSegment::Nibble(*nibble))
}

impl fmt::Display for TrieNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name =
            TrieKind::from_codec(self.codec).map_or(self.codec.name(), TrieKind::object_name);
        write!(f, "<{name} {}>", self.cid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{Codec, keccak_to_cid},
        error::PathError,
        node::FieldValue,
        payload::{AccountSnapshot, LeafPayload},
        trie::{BRANCH_SLOTS, TrieKind, test_utils::encode_items},
    };
    use alloy_primitives::{B256, Bytes, KECCAK256_EMPTY, U256, hex, keccak256};
    use alloy_trie::{EMPTY_ROOT_HASH, TrieAccount};

    fn extension(hash: B256) -> TrieNode {
        let raw = encode_items(&[Bytes::copy_from_slice(&hex!("000d08")), Bytes::from(hash.to_vec())]);
        TrieNode::decode(TrieKind::State, &raw).unwrap()
    }

    fn branch(hash: B256) -> TrieNode {
        let mut items = vec![Bytes::from(hash.to_vec()); 9];
        items.resize(BRANCH_SLOTS, Bytes::new());
        TrieNode::decode(TrieKind::State, &encode_items(&items)).unwrap()
    }

    fn account_leaf(key: &[u8]) -> (TrieNode, AccountSnapshot) {
        let account = AccountSnapshot::new(TrieAccount {
            nonce: 5,
            balance: U256::from(1_000u64),
            storage_root: EMPTY_ROOT_HASH,
            code_hash: KECCAK256_EMPTY,
        });
        let raw = encode_items(&[Bytes::copy_from_slice(key), Bytes::copy_from_slice(account.raw_data())]);
        (TrieNode::decode(TrieKind::State, &raw).unwrap(), account)
    }

    #[test]
    fn extension_consumes_its_key() {
        let hash = keccak256(b"next");
        let node = extension(hash);

        assert_eq!(
            node.resolve(&["0", "d", "0", "8", "anything"]),
            Ok(Resolved::Link {
                cid: keccak_to_cid(Codec::EthStateTrie, hash),
                rest: &["anything"],
            })
        );
        assert_eq!(
            node.resolve(&["0", "d", "0", "9"]),
            Err(ResolveError::NoSuchLinkInExtension)
        );
        assert_eq!(node.resolve(&["0", "d"]), Err(ResolveError::NoSuchLinkInExtension));
        assert_eq!(node.links(), [keccak_to_cid(Codec::EthStateTrie, hash)]);
        assert_eq!(node.tree(), ["0d08"]);
    }

    #[test]
    fn branch_follows_one_nibble() {
        let hash = keccak256(b"next");
        let node = branch(hash);

        assert_eq!(
            node.resolve(&["4", "nonce"]),
            Ok(Resolved::Link { cid: keccak_to_cid(Codec::EthStateTrie, hash), rest: &["nonce"] })
        );
        assert_eq!(node.resolve(&["a"]), Err(ResolveError::NoSuchLinkInBranch));
        assert_eq!(node.resolve(&["nonce"]), Err(ResolveError::NoSuchLinkInBranch));
        assert_eq!(
            node.resolve(&["b", "0d010", "1"]),
            Err(ResolveError::Path(PathError::UnexpectedCharacter("0d010".to_string())))
        );
        assert_eq!(node.links().len(), 9);
        assert_eq!(node.tree(), ["0", "1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn empty_path_is_the_node_itself() {
        let node = branch(keccak256(b"next"));
        assert_eq!(node.resolve(&[]), Ok(Resolved::Itself));
        assert_eq!(node.cid(), raw_to_cid(Codec::EthStateTrie, node.raw_data()));
    }

    #[test]
    fn leaf_resolves_payload_fields() {
        let (node, _) = account_leaf(&hex!("3a"));

        // Key already consumed by the parents.
        assert_eq!(node.resolve(&["balance"]), Ok(Resolved::Value(FieldValue::U256(U256::from(1_000u64)))));
        // Remaining key matched here.
        assert_eq!(node.resolve(&["a", "nonce"]), Ok(Resolved::Value(FieldValue::U64(5))));
        assert_eq!(
            node.resolve(&["root"]),
            Ok(Resolved::Link { cid: keccak_to_cid(Codec::EthStorageTrie, EMPTY_ROOT_HASH), rest: &[] })
        );
        assert!(node.links().is_empty());
        assert_eq!(node.tree().len(), 4);
    }

    #[test]
    fn key_path_ends_on_the_leaf_for_any_remaining_key() {
        let (short, account) = account_leaf(&hex!("3a"));
        let (consumed, _) = account_leaf(&hex!("20"));

        assert_eq!(short.resolve(&["a"]), Ok(Resolved::Itself));
        assert_eq!(consumed.resolve(&[]), Ok(Resolved::Itself));
        for node in [&short, &consumed] {
            assert!(matches!(
                node.payload(),
                Some(LeafPayload::Account(payload)) if *payload == account
            ));
            assert_eq!(node.payload().and_then(LeafPayload::cid), Some(account.cid()));
        }
    }

    #[test]
    fn leaf_rejects_other_keys_and_fields() {
        let (node, _) = account_leaf(&hex!("3a"));

        assert_eq!(node.resolve(&["b", "nonce"]), Err(ResolveError::NoSuchLinkInLeaf));
        assert_eq!(
            node.resolve(&["0", "0", "0", "m0m0ney"]),
            Err(ResolveError::Path(PathError::UnknownField("m0m0ney".to_string())))
        );
        assert_eq!(
            node.resolve(&["nonce", "0"]),
            Err(ResolveError::Path(PathError::UnexpectedCharacter("nonce".to_string())))
        );
    }

    #[test]
    fn storage_leaf_holds_its_value() {
        let value = alloy_rlp::encode(U256::from(0x2au64));
        let raw = encode_items(&[Bytes::copy_from_slice(&hex!("3f")), Bytes::from(value.clone())]);
        let node = TrieNode::decode(TrieKind::Storage, &raw).unwrap();

        assert_eq!(node.resolve(&["f"]), Ok(Resolved::Itself));
        assert_eq!(node.payload(), Some(&LeafPayload::Raw(Bytes::from(value))));
        assert!(matches!(node.resolve(&["f", "balance"]), Err(ResolveError::Path(_))));
        assert!(node.tree().is_empty());
        assert!(matches!(
            node.data(),
            NodeData::Leaf { payload: LeafPayload::Raw(_), .. }
        ));
        assert_eq!(node.to_string(), format!("<EthereumStorageTrie {}>", node.cid()));
    }

    #[test]
    fn empty_trie_resolves_nothing() {
        let node = TrieNode::decode(TrieKind::Transaction, &[0x80]).unwrap();
        assert_eq!(node.resolve(&["0"]), Err(ResolveError::NoSuchLink));
        assert_eq!(node.resolve(&[]), Ok(Resolved::Itself));
        assert!(node.links().is_empty());
        assert_eq!(node.to_string(), format!("<EthereumTxTrie {}>", node.cid()));
    }
}
