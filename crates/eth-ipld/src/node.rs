//! The capability every content-addressed Ethereum object exposes to path resolution.
use crate::error::ResolveError;
use alloy_primitives::{Address, B64, B256, Bloom, Bytes, U256};
use cid::Cid;
use core::fmt;

/// Outcome of resolving a path through a single object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'p> {
    /// The path was empty: the object itself.
    Itself,
    /// A link to another object, and the part of the path left to resolve there.
    Link {
        /// Identifier of the next object.
        cid: Cid,
        /// Segments not consumed by this object.
        rest: &'p [&'p str],
    },
    /// A terminal value. The whole path was consumed.
    Value(FieldValue),
}

/// A scalar field of a decoded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Small unsigned integer (nonces, gas, timestamps).
    U64(u64),
    /// Large unsigned integer (balances, difficulty, signature values).
    U256(U256),
    /// An account address. `None` for the recipient of a contract creation.
    Address(Option<Address>),
    /// Opaque byte string.
    Bytes(Bytes),
    /// 32 byte hash.
    B256(B256),
    /// 8 byte proof-of-work nonce.
    B64(B64),
    /// 2048 bit logs bloom.
    Bloom(Bloom),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U64(value) => write!(f, "{value}"),
            Self::U256(value) => write!(f, "{value}"),
            Self::Address(Some(address)) => write!(f, "{address}"),
            Self::Address(None) => f.write_str("null"),
            Self::Bytes(bytes) => write!(f, "{bytes}"),
            Self::B256(hash) => write!(f, "{hash}"),
            Self::B64(nonce) => write!(f, "{nonce}"),
            Self::Bloom(bloom) => write!(f, "{bloom}"),
        }
    }
}

/// An object addressable by CID whose content can be traversed by path.
pub trait Node {
    /// Identifier of the object: its codec and the keccak-256 of [`Node::raw_data`].
    fn cid(&self) -> Cid;

    /// Canonical encoding of the object.
    fn raw_data(&self) -> &[u8];

    /// Resolves `path` one hop, stopping at the first link.
    fn resolve<'p>(&self, path: &'p [&'p str]) -> Result<Resolved<'p>, ResolveError>;

    /// Every identifier this object links to.
    fn links(&self) -> Vec<Cid>;

    /// The path names directly resolvable on this object.
    fn tree(&self) -> Vec<String>;

    /// Resolves `path` and requires the result to be a link.
    fn resolve_link<'p>(&self, path: &'p [&'p str]) -> Result<(Cid, &'p [&'p str]), ResolveError> {
        match self.resolve(path)? {
            Resolved::Link { cid, rest } => Ok((cid, rest)),
            Resolved::Itself | Resolved::Value(_) => Err(ResolveError::NotALink),
        }
    }
}

/// Resolves a terminal field, rejecting any segment after it.
pub(crate) fn terminal<'p>(
    path: &'p [&'p str],
    value: FieldValue,
) -> Result<Resolved<'p>, ResolveError> {
    match path {
        [_] => Ok(Resolved::Value(value)),
        [first, ..] => Err(ResolveError::UnexpectedPathElements((*first).to_string())),
        [] => Ok(Resolved::Itself),
    }
}

/// Resolves a link field, handing the rest of the path to the linked object.
pub(crate) fn link<'p>(path: &'p [&'p str], cid: Cid) -> Resolved<'p> {
    Resolved::Link { cid, rest: path.get(1..).unwrap_or_default() }
}
