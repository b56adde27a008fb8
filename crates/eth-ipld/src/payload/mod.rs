//! Decoded leaf values of the three trie kinds.
use crate::{
    error::ResolveError,
    node::{Node, Resolved},
    path::{ACCOUNT_FIELDS, FieldCheck, TX_FIELDS},
};
use alloy_primitives::Bytes;
use cid::Cid;

mod account;
mod tx;

pub use account::AccountSnapshot;
pub use tx::{EthTx, Transaction};

/// The value stored at a trie leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafPayload {
    /// State trie leaf.
    Account(AccountSnapshot),
    /// Transaction trie leaf.
    Transaction(EthTx),
    /// Storage trie leaf, kept as the stored bytes.
    Raw(Bytes),
}

impl LeafPayload {
    /// Identifier of the payload when it is separately addressable.
    pub fn cid(&self) -> Option<Cid> {
        match self {
            Self::Account(account) => Some(account.cid()),
            Self::Transaction(tx) => Some(tx.cid()),
            Self::Raw(_) => None,
        }
    }

    /// Field names the payload resolves.
    pub(crate) const fn fields(&self) -> FieldCheck<'static> {
        match self {
            Self::Account(_) => FieldCheck::Known(ACCOUNT_FIELDS),
            Self::Transaction(_) => FieldCheck::Known(TX_FIELDS),
            Self::Raw(_) => FieldCheck::Known(&[]),
        }
    }

    /// Resolves the field segment left once the leaf key is matched.
    pub(crate) fn resolve<'p>(&self, rest: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError> {
        match self {
            Self::Account(account) => account.resolve(rest),
            Self::Transaction(tx) => tx.resolve(rest),
            Self::Raw(_) => Err(ResolveError::NoSuchLink),
        }
    }
}
