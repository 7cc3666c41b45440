use primitives::Hash;
use sha3::{Digest, Keccak256};

use crate::{index, Error};

/// The hash of the leaf at `index` holding `value`
///
/// Computed as `keccak256(index ‖ value)`, with `index` encoded as a big-endian 256-bit word.
/// Folding the index in means the same value stored at two different positions produces two
/// different hashes, and a leaf hash can never be confused with a branch hash.
///
/// ```rust
/// # use mmr::*;
/// let value = keccak256(b"hello");
///
/// assert_ne!(hash_leaf(1, value), hash_leaf(2, value));
/// assert_ne!(hash_leaf(1, value), value);
/// ```
#[inline]
#[must_use]
pub fn hash_leaf(index: u64, value: Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(Hash::from_u64(index));
    hasher.update(value);
    Hash::new(hasher.finalize().into())
}

/// The hash of the branch node at `index` with children hashes `left` and `right`
///
/// Computed as `keccak256(index ‖ left ‖ right)`. This is not symmetric:
/// ```rust
/// # use mmr::*;
/// let a = keccak256(b"a");
/// let b = keccak256(b"b");
///
/// assert_ne!(hash_branch(3, a, b), hash_branch(3, b, a));
/// ```
#[inline]
#[must_use]
pub fn hash_branch(index: u64, left: Hash, right: Hash) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(Hash::from_u64(index));
    hasher.update(left);
    hasher.update(right);
    Hash::new(hasher.finalize().into())
}

/// Combine the peaks of an accumulator with `width` leaves into a single root hash
///
/// The peaks are concatenated from left to right and hashed together with the size of the
/// accumulator, and the result is hashed with the size again:
/// ```text
/// root = keccak256(size ‖ keccak256(size ‖ peak_1 ‖ ... ‖ peak_n))
/// ```
/// `size` grows strictly with `width`, so two accumulators with the same peaks but different
/// widths never share a root. An empty accumulator has the root [`Hash::ZERO`].
///
/// ```rust
/// # use mmr::*;
/// assert_eq!(peak_bagging(0, &[]), Ok(Hash::ZERO));
///
/// let err = peak_bagging(3, &[Hash::ZERO]).unwrap_err();
/// assert_eq!(err, Error::PeakCountMismatch { width: 3, expected: 2, actual: 1 });
/// ```
pub fn peak_bagging(width: u64, peaks: &[Hash]) -> Result<Hash, Error> {
    let expected = index::num_of_peaks(width);
    if peaks.len() != expected {
        return Err(Error::PeakCountMismatch {
            width,
            expected,
            actual: peaks.len(),
        });
    }

    Ok(bag_peaks(width, peaks))
}

/// [`peak_bagging`] without checking the number of peaks
pub(crate) fn bag_peaks(width: u64, peaks: &[Hash]) -> Hash {
    if width == 0 {
        return Hash::ZERO;
    }

    let size = Hash::from_u64(index::size(width));

    let mut inner = Keccak256::new();
    inner.update(size);
    for peak in peaks {
        inner.update(peak);
    }

    let mut outer = Keccak256::new();
    outer.update(size);
    outer.update(inner.finalize());

    Hash::new(outer.finalize().into())
}
