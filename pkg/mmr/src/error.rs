/// An error produced by the accumulator
///
/// Every variant describes a caller-side precondition violation. They are all detected before
/// any state is touched, so an operation that returns one of these has had no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Children were requested for a leaf
    #[error("not a parent: node {index} is a leaf")]
    NotAParent {
        /// The index that was queried
        index: u64,
    },

    /// A proof was requested for an index that is not an existing leaf
    #[error("invalid leaf index: {index}")]
    InvalidLeafIndex {
        /// The index that was queried
        index: u64,
    },

    /// Verification was requested for an index that is not a leaf of the committed width
    #[error("invalid hash index: {index}")]
    InvalidHashIndex {
        /// The index that was queried
        index: u64,
    },

    /// The number of peaks supplied doesn't match the width being committed to
    #[error("expected {expected} peaks for width {width}, got {actual}")]
    PeakCountMismatch {
        /// The width being committed to
        width: u64,
        /// `num_of_peaks(width)`
        expected: usize,
        /// The number of peaks supplied
        actual: usize,
    },

    /// The parts supplied to [`Mmr::from_parts`] do not describe a valid accumulator
    ///
    /// [`Mmr::from_parts`]: crate::Mmr::from_parts
    #[error("inconsistent accumulator state: {0}")]
    Inconsistent(String),
}
