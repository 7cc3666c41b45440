use std::iter::zip;

use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Hash;
use serde::{Deserialize, Serialize};

use crate::{
    hash::{bag_peaks, hash_branch, hash_leaf},
    index, Error, Mmr,
};

/// An inclusion proof for a single leaf of an [`Mmr`]
///
/// The proof carries everything a verifier needs to recompute the root from the leaf value, so
/// it can be checked without access to the accumulator:
///  - `siblings` rebuild the peak of the mountain containing the leaf
///  - `peaks` and `width` rebuild the root from that peak
///
/// ```rust
/// # use mmr::*;
/// let mmr = mmr![1, 2, 3, 4, 5];
/// let proof = mmr.merkle_proof(4).unwrap();
///
/// // the leaf at 4 holds the third value
/// assert!(proof.verify(Hash::from_u64(3)).unwrap());
/// assert!(!proof.verify(Hash::from_u64(4)).unwrap());
///
/// assert_eq!(proof.root, mmr.root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct MerkleProof {
    /// The index of the leaf being proven
    pub index: u64,
    /// The root of the accumulator when the proof was generated
    pub root: Hash,
    /// The width of the accumulator when the proof was generated
    pub width: u64,
    /// The hashes of every peak, from left to right
    pub peaks: Vec<Hash>,
    /// The siblings on the path from the leaf to its peak, deepest first
    pub siblings: Vec<Hash>,
}

/// One level of the path from a peak down to a leaf
struct Step {
    /// The branch node on the path
    parent: u64,
    /// The child of `parent` that is not on the path
    sibling: u64,
    sibling_is_left: bool,
}

impl MerkleProof {
    /// Check that `value` is the value of the leaf at [`self.index`][MerkleProof::index] in an
    /// accumulator with root [`self.root`][MerkleProof::root]
    ///
    /// The leaf hash is folded up through the siblings (the side of each sibling comes from the
    /// path, not from the proof), the resulting hash replaces the matching entry in `peaks`, and
    /// the peaks are bagged with `width` and compared against `root`.
    ///
    /// Returns `Ok(false)` for proofs that don't hold, including malformed ones (the wrong number
    /// of peaks or siblings).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHashIndex`] if `index` is not a leaf of an accumulator with
    /// `width` leaves, or if `width` is beyond [`index::MAX_WIDTH`]
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3];
    /// let mut proof = mmr.merkle_proof(1).unwrap();
    ///
    /// proof.index = 5;
    /// assert_eq!(proof.verify(Hash::from_u64(1)), Err(Error::InvalidHashIndex { index: 5 }));
    /// ```
    pub fn verify(&self, value: Hash) -> Result<bool, Error> {
        let index = self.index;
        let in_range = self.width <= index::MAX_WIDTH
            && index != 0
            && index <= index::size(self.width);

        if !in_range || !index::is_leaf(index) {
            return Err(Error::InvalidHashIndex { index });
        }

        Ok(self.compute_root_hash(value) == Some(self.root))
    }

    /// The root that this proof would produce if the leaf held `value`
    ///
    /// `None` if the proof is malformed. `index` must already be known to be a leaf within
    /// `width`.
    fn compute_root_hash(&self, value: Hash) -> Option<Hash> {
        if self.peaks.len() != index::num_of_peaks(self.width) {
            return None;
        }

        let (position, peak) = containing_peak(self.width, self.index)?;
        let steps = path(peak, self.index);

        if steps.len() != self.siblings.len() {
            return None;
        }

        let mut node = hash_leaf(self.index, value);
        for (step, &sibling) in zip(steps, &self.siblings) {
            node = match step.sibling_is_left {
                true => hash_branch(step.parent, sibling, node),
                false => hash_branch(step.parent, node, sibling),
            };
        }

        let mut peaks = self.peaks.clone();
        peaks[position] = node;

        Some(bag_peaks(self.width, &peaks))
    }
}

impl Mmr {
    /// Generate an inclusion proof for the leaf at `index`
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3, 4];
    /// let proof = mmr.merkle_proof(2).unwrap();
    ///
    /// // a width of 4 is a single mountain of height 2
    /// assert_eq!(proof.siblings, vec![mmr.node(1).unwrap(), mmr.node(6).unwrap()]);
    /// assert_eq!(proof.peaks, vec![mmr.node(7).unwrap()]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLeafIndex`] if there is no leaf at `index` (either because `index`
    /// is out of range, or because it's a branch node)
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3, 4];
    ///
    /// assert_eq!(mmr.merkle_proof(3), Err(Error::InvalidLeafIndex { index: 3 }));
    /// assert_eq!(mmr.merkle_proof(8), Err(Error::InvalidLeafIndex { index: 8 }));
    /// ```
    pub fn merkle_proof(&self, index: u64) -> Result<MerkleProof, Error> {
        if self.leaf_ordinal(index).is_none() {
            return Err(Error::InvalidLeafIndex { index });
        }

        let (_, peak) =
            containing_peak(self.width(), index).ok_or(Error::InvalidLeafIndex { index })?;

        let siblings = path(peak, index)
            .iter()
            .map(|step| self.hash_at(step.sibling))
            .collect();

        Ok(MerkleProof {
            index,
            root: self.root(),
            width: self.width(),
            peaks: self.peaks(),
            siblings,
        })
    }

    /// Verify `proof` against the current root of this accumulator
    ///
    /// Unlike [`MerkleProof::verify`], a proof generated before later appends will not verify,
    /// since its root is no longer the current root
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mut mmr = mmr![1, 2, 3];
    /// let proof = mmr.merkle_proof(1).unwrap();
    ///
    /// assert!(mmr.verify_hash(&proof, Hash::from_u64(1)).unwrap());
    ///
    /// mmr.append(Hash::from_u64(4));
    ///
    /// assert!(proof.verify(Hash::from_u64(1)).unwrap());
    /// assert!(!mmr.verify_hash(&proof, Hash::from_u64(1)).unwrap());
    /// ```
    pub fn verify_hash(&self, proof: &MerkleProof, value: Hash) -> Result<bool, Error> {
        let valid = proof.verify(value)?;
        Ok(valid && proof.root == self.root())
    }
}

/// The position in the peak list and index of the peak whose mountain contains `index`
fn containing_peak(width: u64, index: u64) -> Option<(usize, u64)> {
    index::peak_indexes(width)
        .into_iter()
        .enumerate()
        .find(|(_, peak)| *peak >= index)
}

/// The steps from `index` up to `peak`, deepest first
///
/// `index` must be inside the mountain whose peak is `peak`
fn path(peak: u64, index: u64) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut cursor = peak;

    while cursor != index {
        let Ok((left, right)) = index::children(cursor) else {
            break;
        };

        // every index in the left subtree is at most `left`
        if index <= left {
            steps.push(Step {
                parent: cursor,
                sibling: right,
                sibling_is_left: false,
            });
            cursor = left;
        } else {
            steps.push(Step {
                parent: cursor,
                sibling: left,
                sibling_is_left: true,
            });
            cursor = right;
        }
    }

    steps.reverse();
    steps
}
