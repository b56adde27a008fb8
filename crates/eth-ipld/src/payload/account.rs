//! Account snapshots, the leaves of the state trie.
use crate::{
    codec::{Codec, keccak_to_cid, raw_to_cid},
    error::{DecodeError, ResolveError},
    node::{FieldValue, Node, Resolved, link, terminal},
    path::ACCOUNT_FIELDS,
};
use alloy_primitives::Bytes;
use alloy_trie::TrieAccount;
use cid::Cid;
use core::fmt;

/// An account as stored in the state trie, with its canonical encoding.
///
/// The storage root and code hash are exposed as links into the store. Both carry the storage
/// trie codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    account: TrieAccount,
    raw: Bytes,
}

impl AccountSnapshot {
    /// Encodes `account` and wraps it.
    pub fn new(account: TrieAccount) -> Self {
        let raw = alloy_rlp::encode(&account).into();
        Self { account, raw }
    }

    /// Decodes an account from exactly one canonical RLP item.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let account = alloy_rlp::decode_exact::<TrieAccount>(data)?;
        let this = Self::new(account);
        if &this.raw[..] != data {
            return Err(DecodeError::NonCanonical("account"));
        }
        Ok(this)
    }

    /// The decoded account.
    pub const fn account(&self) -> &TrieAccount {
        &self.account
    }

    /// Link to the root of the account's storage trie.
    pub fn storage_root_cid(&self) -> Cid {
        keccak_to_cid(Codec::EthStorageTrie, self.account.storage_root)
    }

    /// Link to the account's code.
    pub fn code_hash_cid(&self) -> Cid {
        keccak_to_cid(Codec::EthStorageTrie, self.account.code_hash)
    }
}

impl Node for AccountSnapshot {
    fn cid(&self) -> Cid {
        raw_to_cid(Codec::EthAccountSnapshot, &self.raw)
    }

    fn raw_data(&self) -> &[u8] {
        &self.raw
    }

    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        let Some(first) = path.first() else {
            return Ok(Resolved::Itself);
        };
        match *first {
            "root" => Ok(link(path, self.storage_root_cid())),
            "codeHash" => Ok(link(path, self.code_hash_cid())),
            "nonce" => terminal(path, FieldValue::U64(self.account.nonce)),
            "balance" => terminal(path, FieldValue::U256(self.account.balance)),
            _ => Err(ResolveError::NoSuchLink),
        }
    }

    fn links(&self) -> Vec<Cid> {
        vec![self.storage_root_cid(), self.code_hash_cid()]
    }

    fn tree(&self) -> Vec<String> {
        ACCOUNT_FIELDS.iter().map(|field| (*field).to_string()).collect()
    }
}

impl fmt::Display for AccountSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<EthereumAccountSnapshot {}>", self.cid())
    }
}
