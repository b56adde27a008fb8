#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use alloy_primitives::{U256, keccak256};
    use serde_json::json;
    use benchmarks::{
        BlockConfig, GeneratedState, StateConfig, generate_block, generate_state, nibble_path,
    };
    use eth_ipld::{
        BlockStore, Codec, DecodeError, EthBlock, EthNode, FieldValue, Header, LeafPayload,
        MemoryStore, NodeKind, PathError, ResolveError, WalkError, Walked, decode_block,
        encode_block, keccak_to_cid, walk,
    };

    fn segments(path: &[String]) -> Vec<&str> {
        path.iter().map(String::as_str).collect()
    }

    /// Path from a block header to the account of `address`, ending with `field`.
    fn account_path(address: &alloy_primitives::Address, field: &str) -> Vec<String> {
        let mut path = vec!["root".to_string()];
        path.extend(nibble_path(keccak256(address)));
        path.push(field.to_string());
        path
    }

    fn state_block(store: &mut MemoryStore, state: &GeneratedState) -> eth_ipld::Cid {
        state.store(store);
        let header = Header { number: 7, state_root: state.state_root, ..Default::default() };
        store.put_node(&EthBlock::new(header))
    }

    #[test]
    fn walks_transactions_from_block() {
        let block = generate_block(&BlockConfig { number: 10, num_transactions: 40, input_len: 4 });
        let decoded = decode_block(&block.encoded).expect("failed to decode block");
        assert_eq!(decoded.transactions.len(), 40);

        let mut store = MemoryStore::new();
        let root = store.put_block(&decoded);

        for (index, expected) in block.transactions.iter().enumerate() {
            let mut path = vec!["tx".to_string()];
            path.extend(nibble_path(alloy_rlp::encode(index)));

            // Every key path ends on its leaf, however much of the key the leaf holds.
            let Walked::Node(EthNode::Trie(leaf)) = walk(&store, &root, &segments(&path)).unwrap()
            else {
                panic!("transaction {index} did not resolve to a trie leaf");
            };
            assert_eq!(leaf.kind(), NodeKind::Leaf);
            let Some(LeafPayload::Transaction(tx)) = leaf.payload() else {
                panic!("leaf of transaction {index} holds no transaction");
            };
            assert_eq!(tx.tx(), expected);
            assert_eq!(tx, &decoded.transactions[index]);

            path.push("nonce".to_string());
            assert_eq!(
                walk(&store, &root, &segments(&path)),
                Ok(Walked::Value(FieldValue::U64(index as u64)))
            );
        }
    }

    #[test]
    fn renders_walked_objects_as_json() {
        let block = generate_block(&BlockConfig { number: 4, num_transactions: 3, input_len: 2 });
        let decoded = decode_block(&block.encoded).unwrap();
        let mut store = MemoryStore::new();
        let root = store.put_block(&decoded);

        let Walked::Node(header) = walk(&store, &root, &[]).unwrap() else {
            panic!("empty path did not end on the block");
        };
        let header = serde_json::to_value(&header).unwrap();
        let tx_root = keccak_to_cid(Codec::EthTxTrie, decoded.block.header().transactions_root);
        assert_eq!(header["number"], json!(4));
        assert_eq!(header["tx"], json!({ "/": tx_root.to_string() }));

        let Walked::Node(node) = walk(&store, &root, &["tx"]).unwrap() else {
            panic!("tx link did not end on a trie node");
        };
        assert_eq!(serde_json::to_value(&node).unwrap()["type"], json!("branch"));

        let path = ["tx", "8", "0"];
        let Walked::Node(EthNode::Trie(leaf)) = walk(&store, &root, &path).unwrap() else {
            panic!("first transaction did not end on a trie leaf");
        };
        let Some(LeafPayload::Transaction(tx)) = leaf.payload() else {
            panic!("leaf holds no transaction");
        };
        let leaf = serde_json::to_value(&leaf).unwrap();
        let rendered = leaf.as_object().unwrap().values().find(|value| value.is_object()).unwrap();
        assert_eq!(rendered, &serde_json::to_value(tx).unwrap());
        assert_eq!(rendered["nonce"], json!(0));
    }

    #[test]
    fn walks_transaction_trie_nodes() {
        let block = generate_block(&BlockConfig { number: 10, num_transactions: 40, input_len: 4 });
        let decoded = decode_block(&block.encoded).unwrap();
        let mut store = MemoryStore::new();
        let root = store.put_block(&decoded);

        let Walked::Node(EthNode::Trie(tx_root)) = walk(&store, &root, &["tx"]).unwrap() else {
            panic!("tx link did not resolve to a trie node");
        };
        assert_eq!(tx_root.kind(), NodeKind::Branch);
        assert_eq!(tx_root.codec(), Codec::EthTxTrie);

        // rlp(0) is 0x80, so no key starts with nibble 9.
        assert_eq!(
            walk(&store, &root, &["tx", "9", "0"]),
            Err(WalkError::Resolve(ResolveError::NoSuchLinkInBranch))
        );
    }

    #[test]
    fn follows_parent_links() {
        let parent = generate_block(&BlockConfig { number: 1, num_transactions: 3, input_len: 0 });
        let child = generate_block(&BlockConfig { number: 2, num_transactions: 5, input_len: 0 });

        let mut store = MemoryStore::new();
        let parent = decode_block(&parent.encoded).unwrap();
        store.put_block(&parent);

        let header = Header { parent_hash: parent.block.hash(), ..child.header };
        let child = decode_block(&encode_block(&header, &child.transactions, &[])).unwrap();
        let root = store.put_block(&child);

        assert_eq!(walk(&store, &root, &["number"]), Ok(Walked::Value(FieldValue::U64(2))));
        assert_eq!(
            walk(&store, &root, &["parent", "number"]),
            Ok(Walked::Value(FieldValue::U64(1)))
        );
        assert_eq!(
            walk(&store, &root, &["parent", "parent"]),
            Err(WalkError::NotFound(keccak_to_cid(
                Codec::EthBlock,
                parent.block.header().parent_hash
            )))
        );
    }

    #[test]
    fn walks_state_to_account_fields() {
        let state = generate_state(&StateConfig {
            num_accounts: 200,
            num_storage_accounts: 0,
            slots_per_account: 0,
        });
        let mut store = MemoryStore::new();
        let root = state_block(&mut store, &state);

        for (i, address) in state.addresses.iter().enumerate() {
            assert_eq!(
                walk(&store, &root, &segments(&account_path(address, "balance"))),
                Ok(Walked::Value(FieldValue::U256(U256::from((i + 1) * 1000))))
            );
            assert_eq!(
                walk(&store, &root, &segments(&account_path(address, "nonce"))),
                Ok(Walked::Value(FieldValue::U64(i as u64)))
            );
        }
    }

    #[test]
    fn walks_from_account_into_storage() {
        let state = generate_state(&StateConfig {
            num_accounts: 20,
            num_storage_accounts: 2,
            slots_per_account: 30,
        });
        let mut store = MemoryStore::new();
        let root = state_block(&mut store, &state);

        for (address, slots) in &state.storage_entries {
            let path = account_path(address, "root");
            let Walked::Node(EthNode::Trie(storage_root)) =
                walk(&store, &root, &segments(&path)).unwrap()
            else {
                panic!("account root did not resolve to a storage trie node");
            };
            assert_eq!(storage_root.codec(), Codec::EthStorageTrie);

            let storage_cid = eth_ipld::Node::cid(&storage_root);
            for (slot, value) in slots {
                let slot_path = nibble_path(keccak256(alloy_primitives::B256::from(*slot)));
                let Walked::Node(EthNode::Trie(leaf)) =
                    walk(&store, &storage_cid, &segments(&slot_path)).unwrap()
                else {
                    panic!("slot {slot} did not resolve to a trie leaf");
                };
                assert_eq!(
                    leaf.payload(),
                    Some(&LeafPayload::Raw(alloy_rlp::encode(value).into()))
                );
            }

            // Only the last segment may name a field.
            let mut through = path;
            through.extend(nibble_path(keccak256(alloy_primitives::B256::from(slots[0].0))));
            assert_eq!(
                walk(&store, &root, &segments(&through)),
                Err(WalkError::Resolve(ResolveError::Path(PathError::UnexpectedCharacter(
                    "root".to_string()
                ))))
            );
        }
    }

    #[test]
    fn empty_storage_root_is_not_stored() {
        let state = generate_state(&StateConfig {
            num_accounts: 5,
            num_storage_accounts: 0,
            slots_per_account: 0,
        });
        let mut store = MemoryStore::new();
        let root = state_block(&mut store, &state);

        let path = account_path(&state.addresses[0], "root");
        assert_eq!(
            walk(&store, &root, &segments(&path)),
            Err(WalkError::NotFound(keccak_to_cid(
                Codec::EthStorageTrie,
                alloy_primitives::b256!(
                    "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
                )
            )))
        );
    }

    #[test]
    fn rejects_tampered_store() {
        let state = generate_state(&StateConfig {
            num_accounts: 50,
            num_storage_accounts: 0,
            slots_per_account: 0,
        });
        let mut store = MemoryStore::new();
        let root = state_block(&mut store, &state);

        let state_root = keccak_to_cid(Codec::EthStateTrie, state.state_root);
        store.insert(state_root, state.state_nodes[1].clone());

        let path = account_path(&state.addresses[0], "balance");
        assert!(matches!(
            walk(&store, &root, &segments(&path)),
            Err(WalkError::Decode(DecodeError::CidMismatch { .. }))
        ));
    }

    #[test]
    fn rejects_block_with_wrong_transactions_root() {
        let block = generate_block(&BlockConfig { number: 3, num_transactions: 12, input_len: 0 });
        let header = Header { transactions_root: keccak256(b"wrong"), ..block.header };

        let body = encode_block(&header, &block.transactions, &[]);
        assert!(matches!(decode_block(&body), Err(DecodeError::TxRootMismatch { .. })));
        assert!(matches!(EthBlock::decode(&body), Err(DecodeError::TxRootMismatch { .. })));
    }
}
