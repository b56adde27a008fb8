//! Reconstruction of the transaction trie of a block body.
use alloy_primitives::{B256, Bytes};
use alloy_rlp::EMPTY_STRING_CODE;
use alloy_trie::{EMPTY_ROOT_HASH, HashBuilder, Nibbles, proof::ProofRetainer};
use std::collections::BTreeMap;
use tracing::debug;

/// Collects transactions keyed by their position and hashes them into a trie.
#[derive(Debug, Default)]
pub struct TxTrieBuilder {
    leaves: BTreeMap<Nibbles, Bytes>,
}

/// The stored nodes of a committed trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTrie {
    /// Root hash.
    pub root: B256,
    /// Encodings of the root and of every node referenced by hash, root first.
    pub nodes: Vec<Bytes>,
}

impl TxTrieBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the encoding of the transaction at `index`, keyed by `rlp(index)`.
    pub fn insert(&mut self, index: usize, encoded_tx: Bytes) {
        let key = Nibbles::unpack(alloy_rlp::encode(index));
        self.leaves.insert(key, encoded_tx);
    }

    /// Number of inserted transactions.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether no transaction was inserted.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Hashes the trie and returns its root and stored nodes.
    ///
    /// Nodes whose encoding is shorter than a hash are embedded in their parent and are not
    /// returned separately. The empty trie is returned as the single empty string node.
    pub fn commit(self) -> CommittedTrie {
        if self.leaves.is_empty() {
            debug!(target: "eth_ipld::tx_trie", "committed empty transaction trie");
            return CommittedTrie {
                root: EMPTY_ROOT_HASH,
                nodes: vec![Bytes::from_static(&[EMPTY_STRING_CODE])],
            };
        }

        let proof_keys: Vec<Nibbles> = self.leaves.keys().copied().collect();
        let mut hb = HashBuilder::default().with_proof_retainer(ProofRetainer::new(proof_keys));
        for (key, value) in &self.leaves {
            hb.add_leaf(*key, value);
        }

        let root = hb.root();
        let nodes: Vec<Bytes> = hb
            .take_proof_nodes()
            .into_nodes_sorted()
            .into_iter()
            .filter(|(path, bytes)| path.is_empty() || bytes.len() >= B256::len_bytes())
            .map(|(_, bytes)| bytes)
            .collect();

        debug!(target: "eth_ipld::tx_trie", leaves = self.leaves.len(), nodes = nodes.len(), %root, "committed transaction trie");
        CommittedTrie { root, nodes }
    }
}
