#![allow(unused_crate_dependencies)]
//! Deterministic blocks and tries for benchmarking and testing the decoders.

use alloy_primitives::{Address, B256, Bytes, KECCAK256_EMPTY, TxKind, U256, keccak256};
use alloy_rlp::Encodable;
use alloy_trie::{EMPTY_ROOT_HASH, HashBuilder, Nibbles, TrieAccount, proof::ProofRetainer};
use eth_ipld::{BlockStore, Cid, Codec, Header, Transaction, TxTrieBuilder, encode_block, keccak_to_cid};
use std::collections::BTreeMap;

/// Configuration for generating a block.
#[derive(Debug)]
pub struct BlockConfig {
    /// Block number.
    pub number: u64,
    /// Number of transactions in the body.
    pub num_transactions: usize,
    /// Length of the call data of every transaction.
    pub input_len: usize,
}

/// A generated block and its encoding.
#[derive(Debug)]
pub struct GeneratedBlock {
    /// Header, committing to the transactions.
    pub header: Header,
    /// Body transactions, in order.
    pub transactions: Vec<Transaction>,
    /// Encoding of `[header, transactions, ommers]`.
    pub encoded: Vec<u8>,
}

/// Configuration for generating a state trie.
#[derive(Debug)]
pub struct StateConfig {
    /// Total number of accounts in the trie.
    pub num_accounts: usize,
    /// How many of those accounts have non-empty storage.
    pub num_storage_accounts: usize,
    /// Number of storage slots per storage-bearing account.
    pub slots_per_account: usize,
}

/// Generated state and storage tries.
#[derive(Debug)]
pub struct GeneratedState {
    /// Root hash of the account trie.
    pub state_root: B256,
    /// Hashed nodes of the account trie, root first.
    pub state_nodes: Vec<Bytes>,
    /// Hashed nodes of every storage trie.
    pub storage_nodes: Vec<Bytes>,
    /// Addresses of all generated accounts.
    pub addresses: Vec<Address>,
    /// For accounts with storage: (address, vec of (slot, value)) pairs.
    pub storage_entries: Vec<(Address, Vec<(U256, U256)>)>,
}

impl GeneratedState {
    /// Stores every trie node under its codec and returns the CID of the state root.
    pub fn store<S: BlockStore + ?Sized>(&self, store: &mut S) -> Cid {
        for node in &self.state_nodes {
            store.put(Codec::EthStateTrie, node.clone());
        }
        for node in &self.storage_nodes {
            store.put(Codec::EthStorageTrie, node.clone());
        }
        keccak_to_cid(Codec::EthStateTrie, self.state_root)
    }
}

/// Create an address deterministically from an index.
pub fn make_address(i: usize) -> Address {
    let mut addr_bytes = [0u8; 20];
    let val = (i + 1) as u32;
    addr_bytes[16..].copy_from_slice(&val.to_be_bytes());
    Address::from(addr_bytes)
}

/// Create a signed-looking legacy transfer deterministically from an index.
pub fn make_transaction(i: usize, input_len: usize) -> Transaction {
    Transaction {
        nonce: i as u64,
        gas_price: U256::from(1_000_000_000u64),
        gas_limit: 21_000 + 16 * input_len as u64,
        to: TxKind::Call(make_address(i)),
        value: U256::from((i + 1) * 1000),
        input: Bytes::from(vec![i as u8; input_len]),
        v: U256::from(37),
        r: U256::from_be_bytes(keccak256((i as u64).to_be_bytes()).0),
        s: U256::from_be_bytes(keccak256((i as u64 + 1).to_be_bytes()).0) >> 1,
    }
}

/// Generate a block whose header commits to its transactions.
pub fn generate_block(config: &BlockConfig) -> GeneratedBlock {
    let transactions: Vec<Transaction> = (0..config.num_transactions)
        .map(|i| make_transaction(i, config.input_len))
        .collect();

    let mut builder = TxTrieBuilder::new();
    for (index, tx) in transactions.iter().enumerate() {
        builder.insert(index, alloy_rlp::encode(tx).into());
    }

    let header = Header {
        parent_hash: keccak256(config.number.to_be_bytes()),
        transactions_root: builder.commit().root,
        number: config.number,
        gas_limit: 30_000_000,
        gas_used: transactions.iter().map(|tx| tx.gas_limit).sum(),
        timestamp: 1_438_269_988 + config.number * 12,
        ..Default::default()
    };
    let encoded = encode_block(&header, &transactions, &[]);

    GeneratedBlock { header, transactions, encoded }
}

/// Path segments spelling out the nibbles of `key`.
pub fn nibble_path(key: impl AsRef<[u8]>) -> Vec<String> {
    Nibbles::unpack(key).to_vec().iter().map(|nibble| format!("{nibble:x}")).collect()
}

/// Hash the leaves into a trie and return its root and the nodes referenced by hash.
fn commit_trie(leaves: &BTreeMap<Nibbles, Vec<u8>>) -> (B256, Vec<Bytes>) {
    // Retain proofs for all keys
    let proof_keys: Vec<Nibbles> = leaves.keys().copied().collect();
    let mut hb = HashBuilder::default().with_proof_retainer(ProofRetainer::new(proof_keys));

    for (key, value) in leaves {
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

    (root, nodes)
}

/// Build a storage trie and return its root, hashed nodes, and the slot key-value pairs.
pub fn generate_storage_trie(
    seed: usize,
    num_slots: usize,
) -> (B256, Vec<Bytes>, Vec<(U256, U256)>) {
    if num_slots == 0 {
        return (EMPTY_ROOT_HASH, Vec::new(), Vec::new());
    }

    let mut leaves = BTreeMap::new();
    let mut slot_pairs = Vec::new();

    for i in 0..num_slots {
        let slot = U256::from(seed * 1000 + i);
        let value = U256::from(i + 1);
        let nibbles = Nibbles::unpack(keccak256(B256::from(slot)));

        let mut buf = Vec::new();
        value.encode(&mut buf);

        leaves.insert(nibbles, buf);
        slot_pairs.push((slot, value));
    }

    let (root, nodes) = commit_trie(&leaves);
    (root, nodes, slot_pairs)
}

/// Generate an account trie with accounts and optional storage.
pub fn generate_state(config: &StateConfig) -> GeneratedState {
    let mut storage_nodes = Vec::new();
    let mut addresses = Vec::new();
    let mut storage_entries = Vec::new();
    let mut account_leaves = BTreeMap::new();

    for i in 0..config.num_accounts {
        let address = make_address(i);
        addresses.push(address);

        let storage_root = if i < config.num_storage_accounts {
            let (root, nodes, slots) = generate_storage_trie(i, config.slots_per_account);
            storage_nodes.extend(nodes);
            storage_entries.push((address, slots));
            root
        } else {
            EMPTY_ROOT_HASH
        };

        let account = TrieAccount {
            nonce: i as u64,
            balance: U256::from((i + 1) * 1000),
            storage_root,
            code_hash: KECCAK256_EMPTY,
        };

        let mut buf = Vec::new();
        account.encode(&mut buf);

        account_leaves.insert(Nibbles::unpack(keccak256(address)), buf);
    }

    let (state_root, state_nodes) = commit_trie(&account_leaves);

    GeneratedState { state_root, state_nodes, storage_nodes, addresses, storage_entries }
}
