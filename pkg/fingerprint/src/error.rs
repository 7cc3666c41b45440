use mmr::Hash;

/// An error that can occur when interacting with a [`FingerprintLog`]
///
/// [`FingerprintLog`]: crate::FingerprintLog
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The zero hash was supplied as a fingerprint
    #[error("invalid data hash: the zero hash can't be appended")]
    InvalidDataHash,

    /// The fingerprint is already in the log
    #[error("data hash {hash} was already appended")]
    DataHashAlreadyAppended {
        /// The rejected fingerprint
        hash: Hash,
    },

    /// The index doesn't refer to a leaf of the log
    #[error("invalid hash index: {index}")]
    InvalidHashIndex {
        /// The index that was queried
        index: u64,
    },

    /// An error from the accumulator
    #[error("mmr error: {0}")]
    Mmr(#[from] mmr::Error),

    /// An error from the persistent accumulator
    #[cfg(feature = "storage")]
    #[error("storage error: {0}")]
    Storage(#[from] mmr::storage::Error),
}
