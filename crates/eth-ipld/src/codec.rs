//! Multicodec tags of the Ethereum object kinds and the CID builder binding them to
//! keccak-256 digests.
use alloy_primitives::{B256, keccak256};
use cid::{Cid, multihash::Multihash};
use core::fmt;

/// Multihash code of keccak-256. Not to be confused with SHA3-256 (`0x16`).
pub const KECCAK_256: u64 = 0x1b;

/// Multicodec tags for every Ethereum object kind.
///
/// The tags are wire-visible: any store keyed by the CIDs produced here depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u64)]
pub enum Codec {
    /// Block header, `eth-block`.
    EthBlock = 0x90,
    /// List of ommer headers, `eth-block-list`.
    EthBlockList = 0x91,
    /// Transaction trie node, `eth-tx-trie`.
    EthTxTrie = 0x92,
    /// Transaction, `eth-tx`.
    EthTx = 0x93,
    /// Receipt trie node, `eth-tx-receipt-trie`. Reserved.
    EthTxReceiptTrie = 0x94,
    /// Receipt, `eth-tx-receipt`. Reserved.
    EthTxReceipt = 0x95,
    /// State trie node, `eth-state-trie`.
    EthStateTrie = 0x96,
    /// Account snapshot (state trie leaf value), `eth-account-snapshot`.
    EthAccountSnapshot = 0x97,
    /// Storage trie node, `eth-storage-trie`.
    EthStorageTrie = 0x98,
}

impl Codec {
    /// Returns the numeric multicodec tag.
    pub const fn code(self) -> u64 {
        self as u64
    }

    /// Returns the multicodec table name of the codec.
    pub const fn name(self) -> &'static str {
        match self {
            Self::EthBlock => "eth-block",
            Self::EthBlockList => "eth-block-list",
            Self::EthTxTrie => "eth-tx-trie",
            Self::EthTx => "eth-tx",
            Self::EthTxReceiptTrie => "eth-tx-receipt-trie",
            Self::EthTxReceipt => "eth-tx-receipt",
            Self::EthStateTrie => "eth-state-trie",
            Self::EthAccountSnapshot => "eth-account-snapshot",
            Self::EthStorageTrie => "eth-storage-trie",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a multicodec tag is not one of the Ethereum codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown ethereum codec {0:#x}")]
pub struct UnknownCodec(pub u64);

impl TryFrom<u64> for Codec {
    type Error = UnknownCodec;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        Ok(match code {
            0x90 => Self::EthBlock,
            0x91 => Self::EthBlockList,
            0x92 => Self::EthTxTrie,
            0x93 => Self::EthTx,
            0x94 => Self::EthTxReceiptTrie,
            0x95 => Self::EthTxReceipt,
            0x96 => Self::EthStateTrie,
            0x97 => Self::EthAccountSnapshot,
            0x98 => Self::EthStorageTrie,
            other => return Err(UnknownCodec(other)),
        })
    }
}

/// Wraps an already computed keccak-256 digest into a CIDv1 labelled with `codec`.
pub fn keccak_to_cid(codec: Codec, digest: B256) -> Cid {
    let hash = Multihash::<64>::wrap(KECCAK_256, digest.as_slice())
        .expect("a 32 byte digest always fits a 64 byte multihash");
    Cid::new_v1(codec.code(), hash)
}

/// Hashes `data` with keccak-256 and returns its CIDv1 labelled with `codec`.
pub fn raw_to_cid(codec: Codec, data: &[u8]) -> Cid {
    keccak_to_cid(codec, keccak256(data))
}

/// Returns the keccak-256 digest carried by `cid`, or `None` if it uses another hash function.
pub fn cid_to_keccak(cid: &Cid) -> Option<B256> {
    let hash = cid.hash();
    (hash.code() == KECCAK_256 && hash.size() == 32).then(|| B256::from_slice(hash.digest()))
}

/// Returns the Ethereum codec of `cid`, if it is one.
pub fn cid_codec(cid: &Cid) -> Result<Codec, UnknownCodec> {
    Codec::try_from(cid.codec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{b256, hex};
    use proptest::prelude::*;

    const ALL: [Codec; 9] = [
        Codec::EthBlock,
        Codec::EthBlockList,
        Codec::EthTxTrie,
        Codec::EthTx,
        Codec::EthTxReceiptTrie,
        Codec::EthTxReceipt,
        Codec::EthStateTrie,
        Codec::EthAccountSnapshot,
        Codec::EthStorageTrie,
    ];

    #[test]
    fn codec_tags_are_stable() {
        let tags: Vec<u64> = ALL.iter().map(|codec| codec.code()).collect();
        assert_eq!(tags, (0x90..=0x98).collect::<Vec<u64>>());
        for codec in ALL {
            assert_eq!(Codec::try_from(codec.code()), Ok(codec));
        }
        assert_eq!(Codec::try_from(0x55), Err(UnknownCodec(0x55)));
    }

    #[test]
    fn cid_carries_codec_and_keccak_digest() {
        let data = hex!("f84e808a034f0b4f1fb6c0a00000");
        let cid = raw_to_cid(Codec::EthAccountSnapshot, &data);

        assert_eq!(cid.version(), cid::Version::V1);
        assert_eq!(cid.codec(), 0x97);
        assert_eq!(cid.hash().code(), KECCAK_256);
        assert_eq!(cid_to_keccak(&cid), Some(keccak256(data)));
        assert_eq!(cid_codec(&cid), Ok(Codec::EthAccountSnapshot));
    }

    #[test]
    fn digest_and_raw_constructors_agree() {
        // keccak256(0x80), the root of an empty trie.
        let empty_root = b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");
        assert_eq!(raw_to_cid(Codec::EthTxTrie, &[0x80]), keccak_to_cid(Codec::EthTxTrie, empty_root));
    }

    #[test]
    fn codec_changes_only_the_label() {
        let data = b"same bytes";
        let tx = raw_to_cid(Codec::EthTx, data);
        let trie = raw_to_cid(Codec::EthTxTrie, data);

        assert_eq!(tx.hash(), trie.hash());
        assert_ne!(tx, trie);
        assert_ne!(tx.to_string(), trie.to_string());
    }

    proptest! {
        #[test]
        fn cid_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let first = raw_to_cid(Codec::EthStorageTrie, &data);
            let second = raw_to_cid(Codec::EthStorageTrie, &data);
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.to_bytes(), second.to_bytes());
        }

        #[test]
        fn cid_string_round_trips(data in proptest::collection::vec(any::<u8>(), 0..128), tag in 0usize..9) {
            let cid = raw_to_cid(ALL[tag], &data);
            let parsed = Cid::try_from(cid.to_string().as_str()).unwrap();
            prop_assert_eq!(parsed, cid);
            prop_assert_eq!(Cid::try_from(cid.to_bytes().as_slice()).unwrap(), cid);
        }

        #[test]
        fn distinct_bytes_give_distinct_cids(
            a in proptest::collection::vec(any::<u8>(), 0..64),
            b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(raw_to_cid(Codec::EthTx, &a), raw_to_cid(Codec::EthTx, &b));
        }
    }
}
