//! Path validation shared by every resolvable object.
//!
//! A path is a list of segments. Every segment but the last is a single hexadecimal digit
//! (a nibble of a trie key). The last one may instead name a field of the decoded payload.
use crate::error::PathError;

/// Fields resolvable on a transaction.
pub const TX_FIELDS: &[&str] =
    &["nonce", "gasPrice", "gas", "toAddress", "value", "data", "r", "s", "v", "input"];

/// Fields resolvable on an account snapshot.
pub const ACCOUNT_FIELDS: &[&str] = &["nonce", "balance", "codeHash", "root"];

/// Fields resolvable on a block header.
pub const HEADER_FIELDS: &[&str] = &[
    "time",
    "bloom",
    "coinbase",
    "difficulty",
    "extra",
    "gaslimit",
    "gasused",
    "mixdigest",
    "nonce",
    "number",
    "parent",
    "receipts",
    "root",
    "tx",
    "uncles",
];

/// A validated path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// A key nibble, `0..=15`.
    Nibble(u8),
    /// A field name. Only ever the last segment.
    Field(&'a str),
}

/// How the trailing field name of a path is checked.
#[derive(Debug, Clone, Copy)]
pub enum FieldCheck<'f> {
    /// The field must be one of the listed names.
    Known(&'f [&'f str]),
    /// Any name is carried through; the node that interprets it checks it.
    Deferred,
}

/// Parses a single hexadecimal digit, case-insensitively.
pub fn hex_nibble(segment: &str) -> Option<u8> {
    match segment.as_bytes() {
        [c] => (*c as char).to_digit(16).map(|digit| digit as u8),
        _ => None,
    }
}

/// Validates `path`, returning one segment per input segment.
pub fn validate_path<'a>(
    path: &[&'a str],
    fields: FieldCheck<'_>,
) -> Result<Vec<PathSegment<'a>>, PathError> {
    let Some((last, init)) = path.split_last() else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(path.len());
    for segment in init {
        if segment.is_empty() {
            return Err(PathError::BlankSegment);
        }
        let nibble = hex_nibble(segment)
            .ok_or_else(|| PathError::UnexpectedCharacter((*segment).to_string()))?;
        out.push(PathSegment::Nibble(nibble));
    }

    if last.is_empty() {
        return Err(PathError::BlankSegment);
    }
    let last = match hex_nibble(last) {
        Some(nibble) => PathSegment::Nibble(nibble),
        None => match fields {
            FieldCheck::Known(known) if known.contains(last) => PathSegment::Field(last),
            FieldCheck::Deferred if last.bytes().all(|c| c.is_ascii_alphanumeric()) => {
                PathSegment::Field(last)
            }
            _ => return Err(PathError::UnknownField((*last).to_string())),
        },
    };
    out.push(last);

    Ok(out)
}

/// Number of leading nibble segments.
pub(crate) fn nibble_prefix_len(segments: &[PathSegment<'_>]) -> usize {
    segments.iter().take_while(|segment| matches!(segment, PathSegment::Nibble(_))).count()
}
