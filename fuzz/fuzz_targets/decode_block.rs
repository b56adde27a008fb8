#![no_main]

use alloy_primitives::keccak256;
use eth_ipld::{Node, decode_block};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(decoded) = decode_block(data) else {
        return;
    };

    // A body commits to its transactions; a bare header carries none.
    if let Some(root) = decoded.tx_trie_nodes.first() {
        assert_eq!(keccak256(root.raw_data()), decoded.block.header().transactions_root);
    } else {
        assert!(decoded.transactions.is_empty());
    }
    assert_eq!(decoded.block.hash(), keccak256(decoded.block.raw_data()));
});
