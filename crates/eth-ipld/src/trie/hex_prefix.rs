//! Decoding of the hex-prefix (compact) key encoding used by leaf and extension nodes.
use crate::error::DecodeError;
use alloy_trie::Nibbles;

/// Longest key a trie node can carry: a 32 byte hashed key.
pub const MAX_KEY_NIBBLES: usize = 64;

/// The node kind announced by the flag nibble of a compact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The key belongs to an extension node.
    Extension,
    /// The key belongs to a leaf node.
    Leaf,
}

/// Decodes a compact key into its node kind and nibble sequence.
///
/// The flag nibble is `0`/`1` for extensions and `2`/`3` for leaves; odd flags carry the first
/// key nibble in the low half of the first byte, even flags are followed by a padding nibble.
pub fn decode_compact_key(compact: &[u8]) -> Result<(KeyKind, Nibbles), DecodeError> {
    let Some(&first) = compact.first() else {
        return Err(DecodeError::EmptyCompactKey);
    };

    let (kind, odd) = match first >> 4 {
        0b0000 => (KeyKind::Extension, false),
        0b0001 => (KeyKind::Extension, true),
        0b0010 => (KeyKind::Leaf, false),
        0b0011 => (KeyKind::Leaf, true),
        flag => return Err(DecodeError::UnknownHexPrefix(flag)),
    };

    let nibbles: Vec<u8> = compact.iter().flat_map(|byte| [byte >> 4, byte & 0x0f]).collect();
    let key = if odd { &nibbles[1..] } else { &nibbles[2..] };
    if key.len() > MAX_KEY_NIBBLES {
        return Err(DecodeError::KeyTooLong(key.len()));
    }

    Ok((kind, Nibbles::from_nibbles(key)))
}
