use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Hash;

/// Every rocksdb key starts with a version tag, so the layout can change without breaking
/// existing databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum KeyFormat {
    V1(KeyV1),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum KeyV1 {
    /// The number of leaves
    Width,
    /// The hash of the node at this index
    Node(u64),
    /// The raw value of the leaf with this ordinal
    Leaf(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum ValueFormat {
    V1(ValueV1),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum ValueV1 {
    Width(u64),
    Hash(Hash),
}

impl KeyFormat {
    pub(super) fn width() -> Self {
        Self::V1(KeyV1::Width)
    }

    pub(super) fn node(index: u64) -> Self {
        Self::V1(KeyV1::Node(index))
    }

    pub(super) fn leaf(ordinal: u64) -> Self {
        Self::V1(KeyV1::Leaf(ordinal))
    }
}

pub(super) fn to_bytes<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, borsh::io::Error> {
    borsh::to_vec(value)
}

pub(super) fn from_bytes<T: BorshDeserialize>(bytes: &[u8]) -> Result<T, borsh::io::Error> {
    borsh::from_slice(bytes)
}
