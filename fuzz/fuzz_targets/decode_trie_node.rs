#![no_main]

use arbitrary::Arbitrary;
use eth_ipld::{Node, NodeData, Resolved, TrieKind, TrieNode};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Kind {
    State,
    Storage,
    Transaction,
}

#[derive(Debug, Arbitrary)]
struct Input {
    kind: Kind,
    data: Vec<u8>,
    path: Vec<String>,
}

fuzz_target!(|input: Input| {
    let kind = match input.kind {
        Kind::State => TrieKind::State,
        Kind::Storage => TrieKind::Storage,
        Kind::Transaction => TrieKind::Transaction,
    };
    let Ok(node) = TrieNode::decode(kind, &input.data) else {
        return;
    };

    assert_eq!(node.raw_data(), input.data.as_slice());
    assert_eq!(node.cid().codec(), kind.codec().code());
    if let NodeData::Branch(children) = node.data() {
        assert_eq!(node.links().len(), children.len());
    }

    let path: Vec<&str> = input.path.iter().map(String::as_str).collect();
    if let Ok(Resolved::Link { rest, .. }) = node.resolve(&path) {
        assert!(path.ends_with(rest));
    }
});
