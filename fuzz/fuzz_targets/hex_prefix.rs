#![no_main]

use alloy_trie::Nibbles;
use arbitrary::Arbitrary;
use eth_ipld::trie::hex_prefix::{KeyKind, decode_compact_key};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    nibbles: Vec<u8>,
    is_leaf: bool,
}

fuzz_target!(|input: Input| {
    let nibbles: Vec<u8> = input.nibbles.iter().take(64).map(|nibble| nibble & 0x0f).collect();
    let key = Nibbles::from_nibbles(&nibbles);

    let compact = alloy_trie::nodes::encode_path_leaf(&key, input.is_leaf);
    let (kind, decoded) =
        decode_compact_key(&compact[..]).expect("reference encoding must decode");

    let expected = if input.is_leaf { KeyKind::Leaf } else { KeyKind::Extension };
    assert_eq!(kind, expected);
    assert_eq!(decoded, key);
});
