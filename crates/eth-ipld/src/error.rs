//! Error types of decoding, path validation and resolution.
use alloy_primitives::{B256, Bytes};
use cid::Cid;

/// Structural and integrity errors raised while decoding Ethereum objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input is not valid RLP for the expected shape.
    #[error("rlp: {0}")]
    Rlp(alloy_rlp::Error),
    /// The compact key of a leaf or extension node carries an unknown flag nibble.
    #[error("unknown hex prefix {0:#x}")]
    UnknownHexPrefix(u8),
    /// The compact key of a leaf or extension node is empty.
    #[error("empty compact key")]
    EmptyCompactKey,
    /// The compact key holds more nibbles than a 32 byte key.
    #[error("compact key of {0} nibbles is too long")]
    KeyTooLong(usize),
    /// The node list has neither 2 nor 17 elements.
    #[error("unknown trie node type: {0} elements")]
    UnknownNodeType(usize),
    /// A branch slot or extension target is neither empty nor a 32 byte digest.
    #[error("unrecognized object in trie: {0}")]
    UnrecognizedObject(Bytes),
    /// The input bytes are not the canonical encoding of the object they decode to.
    #[error("non-canonical {0} encoding")]
    NonCanonical(&'static str),
    /// A block body does not have the `[header, transactions, ommers, withdrawals?]` layout.
    #[error("block body has {0} elements")]
    MalformedBody(usize),
    /// The transaction trie rebuilt from a block body does not commit to the header's root.
    #[error("wrong transaction hash computed: expected {expected}, computed {computed}")]
    TxRootMismatch {
        /// Transactions root recorded in the header.
        expected: B256,
        /// Root of the rebuilt transaction trie.
        computed: B256,
    },
    /// The data does not hash to the CID it was stored under.
    #[error("data does not match {expected}, hashes to {computed}")]
    CidMismatch {
        /// CID the data was fetched by.
        expected: Cid,
        /// CID of the data.
        computed: Cid,
    },
    /// The CID codec has no decoder.
    #[error("unsupported codec {0:#x}")]
    UnsupportedCodec(u64),
}

impl From<alloy_rlp::Error> for DecodeError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}

/// A path that is malformed, independently of the node it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A segment of the path is empty.
    #[error("unexpected blank element in path")]
    BlankSegment,
    /// A segment other than the last is not a single hexadecimal digit.
    #[error("unexpected character in path segment {0:?}")]
    UnexpectedCharacter(String),
    /// The last segment is neither a hexadecimal digit nor a field of the payload.
    #[error("unexpected field in path: {0:?}")]
    UnknownField(String),
}

/// Errors of resolving a path through a single node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The path failed validation.
    #[error(transparent)]
    Path(#[from] PathError),
    /// The branch has no child at the requested nibble.
    #[error("no such link in this branch")]
    NoSuchLinkInBranch,
    /// The path does not start with the extension key.
    #[error("no such link in this extension")]
    NoSuchLinkInExtension,
    /// The path does not match the remaining key of the leaf.
    #[error("no such link in this leaf")]
    NoSuchLinkInLeaf,
    /// The object has no field or link of that name.
    #[error("no such link")]
    NoSuchLink,
    /// A scalar field was followed by further segments.
    #[error("unexpected path elements past {0}")]
    UnexpectedPathElements(String),
    /// The resolved item is a value where a link was required.
    #[error("resolved item was not a link")]
    NotALink,
}
