//! Legacy transactions, the leaves of the transaction trie.
use crate::{
    codec::{Codec, raw_to_cid},
    error::{DecodeError, ResolveError},
    node::{FieldValue, Node, Resolved, terminal},
    path::TX_FIELDS,
};
use alloy_primitives::{B256, Bytes, TxKind, U256, keccak256};
use alloy_rlp::{RlpDecodable, RlpEncodable};
use cid::Cid;
use core::fmt;

/// Fields of a transaction in its legacy RLP layout.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Transaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Price per unit of gas, in wei.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient, or [`TxKind::Create`] for contract creation.
    pub to: TxKind,
    /// Transferred value, in wei.
    pub value: U256,
    /// Call data or init code.
    pub input: Bytes,
    /// Signature recovery value.
    pub v: U256,
    /// Signature `r`.
    pub r: U256,
    /// Signature `s`.
    pub s: U256,
}

/// A transaction together with its canonical encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTx {
    tx: Transaction,
    raw: Bytes,
}

impl EthTx {
    /// Encodes `tx` and wraps it.
    pub fn new(tx: Transaction) -> Self {
        let raw = alloy_rlp::encode(&tx).into();
        Self { tx, raw }
    }

    /// Decodes a transaction from exactly one canonical RLP item.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let tx: Transaction = alloy_rlp::decode_exact(data)?;
        let this = Self::new(tx);
        if &this.raw[..] != data {
            return Err(DecodeError::NonCanonical("transaction"));
        }
        Ok(this)
    }

    /// The decoded fields.
    pub const fn tx(&self) -> &Transaction {
        &self.tx
    }

    /// Keccak-256 of the encoding, the transaction hash.
    pub fn hash(&self) -> B256 {
        keccak256(&self.raw)
    }

    /// The canonical encoding.
    pub const fn raw(&self) -> &Bytes {
        &self.raw
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let tx = &self.tx;
        Some(match name {
            "nonce" => FieldValue::U64(tx.nonce),
            "gasPrice" => FieldValue::U256(tx.gas_price),
            "gas" => FieldValue::U64(tx.gas_limit),
            "toAddress" => FieldValue::Address(tx.to.to().copied()),
            "value" => FieldValue::U256(tx.value),
            "data" | "input" => FieldValue::Bytes(tx.input.clone()),
            "v" => FieldValue::U256(tx.v),
            "r" => FieldValue::U256(tx.r),
            "s" => FieldValue::U256(tx.s),
            _ => return None,
        })
    }
}

impl Node for EthTx {
    fn cid(&self) -> Cid {
        raw_to_cid(Codec::EthTx, &self.raw)
    }

    fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        let Some(first) = path.first() else {
            return Ok(Resolved::Itself);
        };
        let value = self.field(first).ok_or(ResolveError::NoSuchLink)?;
        terminal(path, value)
    }

    fn links(&self) -> Vec<Cid> {
        Vec::new()
    }

    fn tree(&self) -> Vec<String> {
        TX_FIELDS.iter().map(|field| (*field).to_string()).collect()
    }
}

impl fmt::Display for EthTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<EthereumTx {}>", self.cid())
    }
}
