//! Block headers and block bodies.
//!
//! A block is addressed by its header alone. Decoding a full body additionally yields every
//! transaction and the nodes of the transaction trie, after checking that the trie rebuilt from
//! the transactions commits to the header's transactions root.
use crate::{
    codec::{Codec, keccak_to_cid, raw_to_cid},
    error::{DecodeError, ResolveError},
    node::{FieldValue, Node, Resolved, link},
    path::HEADER_FIELDS,
    payload::{EthTx, Transaction},
    trie::{TrieKind, TrieNode},
    tx_trie::TxTrieBuilder,
};
use alloy_primitives::{Address, B64, B256, Bloom, Bytes, U256, keccak256};
use alloy_rlp::{Encodable, Header as RlpHeader, PayloadView, RlpDecodable, RlpEncodable};
use cid::Cid;
use core::fmt;
use tracing::{debug, warn};

/// An Ethereum block header.
///
/// Fields introduced by later forks are optional and trail the legacy fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[rlp(trailing)]
pub struct Header {
    /// Hash of the parent block header.
    pub parent_hash: B256,
    /// Hash of the ommers list.
    pub ommers_hash: B256,
    /// Recipient of the block reward.
    pub beneficiary: Address,
    /// Root of the state trie after this block.
    pub state_root: B256,
    /// Root of the transaction trie.
    pub transactions_root: B256,
    /// Root of the receipt trie.
    pub receipts_root: B256,
    /// Bloom filter of the logs of all receipts.
    pub logs_bloom: Bloom,
    /// Proof-of-work difficulty.
    pub difficulty: U256,
    /// Block number.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used by all transactions.
    pub gas_used: u64,
    /// Unix timestamp.
    pub timestamp: u64,
    /// Arbitrary extra data.
    pub extra_data: Bytes,
    /// Proof-of-work mix digest.
    pub mix_hash: B256,
    /// Proof-of-work nonce.
    pub nonce: B64,
    /// Base fee per gas, from London.
    pub base_fee_per_gas: Option<u64>,
    /// Root of the withdrawals trie, from Shanghai.
    pub withdrawals_root: Option<B256>,
    /// Blob gas used, from Cancun.
    pub blob_gas_used: Option<u64>,
    /// Excess blob gas, from Cancun.
    pub excess_blob_gas: Option<u64>,
    /// Parent beacon block root, from Cancun.
    pub parent_beacon_block_root: Option<B256>,
    /// Hash of the execution layer requests, from Prague.
    pub requests_hash: Option<B256>,
}

/// A block header together with its canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthBlock {
    header: Header,
    raw: Bytes,
}

/// Everything decoded from a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBlock {
    /// The block header.
    pub block: EthBlock,
    /// Transactions of the body, in order. Empty for a bare header.
    pub transactions: Vec<EthTx>,
    /// Stored nodes of the transaction trie, root first. Empty for a bare header.
    pub tx_trie_nodes: Vec<TrieNode>,
}

/// Decodes a bare header or a full block body `[header, transactions, ommers, withdrawals?]`.
///
/// For a body, the transaction trie is rebuilt and must commit to the header's transactions
/// root, otherwise [`DecodeError::TxRootMismatch`] is returned and nothing is produced.
///
/// Only legacy transactions are decoded. A body holding a typed (EIP-2718) transaction fails
/// with [`alloy_rlp::Error::UnexpectedString`], since its envelope is a byte string rather than a
/// list.
pub fn decode_block(data: &[u8]) -> Result<DecodedBlock, DecodeError> {
    let items = match outer_items(data)? {
        Some(items) => items,
        None => {
            let block = EthBlock::decode_header(data)?;
            debug!(target: "eth_ipld::block", number = block.header.number, "decoded block header");
            return Ok(DecodedBlock { block, transactions: Vec::new(), tx_trie_nodes: Vec::new() });
        }
    };

    let [header, transactions, ommers, withdrawals @ ..] = items.as_slice() else {
        return Err(DecodeError::MalformedBody(items.len()));
    };
    if withdrawals.len() > 1 {
        return Err(DecodeError::MalformedBody(items.len()));
    }

    let block = EthBlock::decode_header(header)?;
    let transactions = decode_transactions(transactions)?;
    let _ommers: Vec<Header> = alloy_rlp::decode_exact(ommers)?;
    if let Some(withdrawals) = withdrawals.first() {
        if !matches!(RlpHeader::decode_raw(&mut &withdrawals[..])?, PayloadView::List(_)) {
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }
    }
    debug!(
        target: "eth_ipld::block",
        number = block.header.number,
        transactions = transactions.len(),
        "decoded block body"
    );

    let mut builder = TxTrieBuilder::new();
    for (index, tx) in transactions.iter().enumerate() {
        builder.insert(index, tx.raw().clone());
    }
    let trie = builder.commit();

    let expected = block.header.transactions_root;
    if trie.root != expected {
        warn!(target: "eth_ipld::block", %expected, computed = %trie.root, "transaction root mismatch");
        return Err(DecodeError::TxRootMismatch { expected, computed: trie.root });
    }

    let tx_trie_nodes = trie
        .nodes
        .iter()
        .map(|node| TrieNode::decode(TrieKind::Transaction, node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DecodedBlock { block, transactions, tx_trie_nodes })
}

/// Encodes a full block in the layout accepted by [`decode_block`].
pub fn encode_block(header: &Header, transactions: &[Transaction], ommers: &[Header]) -> Vec<u8> {
    let header = alloy_rlp::encode(header);
    let transactions = encode_items(transactions);
    let ommers = encode_items(ommers);

    let payload_length = header.len() + transactions.len() + ommers.len();
    let mut out = Vec::with_capacity(payload_length + 9);
    RlpHeader { list: true, payload_length }.encode(&mut out);
    out.extend_from_slice(&header);
    out.extend_from_slice(&transactions);
    out.extend_from_slice(&ommers);
    out
}

fn encode_items<T: Encodable>(items: &[T]) -> Vec<u8> {
    let payload_length = items.iter().map(Encodable::length).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    RlpHeader { list: true, payload_length }.encode(&mut out);
    for item in items {
        item.encode(&mut out);
    }
    out
}

/// Splits a block body into its items, or returns `None` if `data` is a bare header.
fn outer_items(data: &[u8]) -> Result<Option<Vec<&[u8]>>, DecodeError> {
    let mut buf = data;
    let PayloadView::List(items) = RlpHeader::decode_raw(&mut buf)? else {
        return Err(alloy_rlp::Error::UnexpectedString.into());
    };
    if !buf.is_empty() {
        return Err(alloy_rlp::Error::UnexpectedLength.into());
    }

    // A header starts with the parent hash, a body with the header list.
    let is_body = items
        .first()
        .and_then(|first| first.first())
        .is_some_and(|byte| *byte >= alloy_rlp::EMPTY_LIST_CODE);
    Ok(is_body.then_some(items))
}

fn decode_transactions(data: &[u8]) -> Result<Vec<EthTx>, DecodeError> {
    let mut buf = data;
    let PayloadView::List(items) = RlpHeader::decode_raw(&mut buf)? else {
        return Err(alloy_rlp::Error::UnexpectedString.into());
    };
    items.into_iter().map(EthTx::decode).collect()
}

impl EthBlock {
    /// Encodes `header` and wraps it.
    pub fn new(header: Header) -> Self {
        let raw = alloy_rlp::encode(&header).into();
        Self { header, raw }
    }

    /// Decodes a bare header, or the header of a full block body.
    ///
    /// A body goes through [`decode_block`], so its transactions must commit to the header's
    /// transactions root.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        match outer_items(data)? {
            Some(_) => decode_block(data).map(|decoded| decoded.block),
            None => Self::decode_header(data),
        }
    }

    fn decode_header(data: &[u8]) -> Result<Self, DecodeError> {
        let header: Header = alloy_rlp::decode_exact(data)?;
        let this = Self::new(header);
        if &this.raw[..] != data {
            return Err(DecodeError::NonCanonical("header"));
        }
        Ok(this)
    }

    /// The decoded header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The block hash: keccak-256 of the header encoding.
    pub fn hash(&self) -> B256 {
        keccak256(&self.raw)
    }

    fn header_links(&self) -> [(&'static str, Cid); 5] {
        let header = &self.header;
        [
            ("parent", keccak_to_cid(Codec::EthBlock, header.parent_hash)),
            ("receipts", keccak_to_cid(Codec::EthTxReceiptTrie, header.receipts_root)),
            ("root", keccak_to_cid(Codec::EthStateTrie, header.state_root)),
            ("tx", keccak_to_cid(Codec::EthTxTrie, header.transactions_root)),
            ("uncles", keccak_to_cid(Codec::EthBlockList, header.ommers_hash)),
        ]
    }
}

impl Node for EthBlock {
    fn cid(&self) -> Cid {
        raw_to_cid(Codec::EthBlock, &self.raw)
    }

    fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        let Some(first) = path.first() else {
            return Ok(Resolved::Itself);
        };

        if let Some((_, cid)) = self.header_links().into_iter().find(|(name, _)| name == first) {
            return Ok(link(path, cid));
        }
        if path.len() != 1 {
            return Err(ResolveError::UnexpectedPathElements((*first).to_string()));
        }

        let header = &self.header;
        let value = match *first {
            "time" => FieldValue::U64(header.timestamp),
            "bloom" => FieldValue::Bloom(header.logs_bloom),
            "coinbase" => FieldValue::Address(Some(header.beneficiary)),
            "difficulty" => FieldValue::U256(header.difficulty),
            "extra" => FieldValue::Bytes(header.extra_data.clone()),
            "gaslimit" => FieldValue::U64(header.gas_limit),
            "gasused" => FieldValue::U64(header.gas_used),
            "mixdigest" => FieldValue::B256(header.mix_hash),
            "nonce" => FieldValue::B64(header.nonce),
            "number" => FieldValue::U64(header.number),
            _ => return Err(ResolveError::NoSuchLink),
        };
        Ok(Resolved::Value(value))
    }

    fn links(&self) -> Vec<Cid> {
        self.header_links().into_iter().map(|(_, cid)| cid).collect()
    }

    fn tree(&self) -> Vec<String> {
        HEADER_FIELDS.iter().map(|field| (*field).to_string()).collect()
    }
}

impl fmt::Display for EthBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<EthereumBlock {}>", self.cid())
    }
}
