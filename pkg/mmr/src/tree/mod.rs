use primitives::Hash;

use crate::{
    hash::{bag_peaks, hash_branch, hash_leaf},
    index, Error,
};

mod append;
mod proof;

pub use proof::MerkleProof;

/// A Merkle Mountain Range
///
/// An append-only list of 32-byte values, committed to by a single [`root`][Mmr::root] hash.
/// Conceptually, an [`Mmr`] is a `Vec<Hash>` that can only be pushed to, and which can prove that
/// any of its elements is present:
///
/// ```rust
/// # use mmr::*;
/// let mut mmr = Mmr::new();
///
/// let index = mmr.append(keccak256(b"hello"));
/// mmr.append(keccak256(b"world"));
///
/// let proof = mmr.merkle_proof(index).unwrap();
/// assert!(proof.verify(keccak256(b"hello")).unwrap());
/// assert!(!proof.verify(keccak256(b"goodbye")).unwrap());
/// ```
///
/// Every node hash is kept in an arena indexed by node index, so proofs can be generated for any
/// leaf at any time. The raw leaf values are kept alongside.
#[derive(Debug, Clone, Default)]
pub struct Mmr {
    /// `nodes[i - 1]` is the hash of node `i`
    nodes: Vec<Hash>,
    /// Raw leaf values, by leaf ordinal
    leaves: Vec<Hash>,
    /// Indexes of the current peaks, from left to right
    peaks: Vec<u64>,
    root: Hash,
}

impl PartialEq for Mmr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for Mmr {}

impl Mmr {
    /// Create a new, empty accumulator
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = Mmr::new();
    ///
    /// assert_eq!(mmr.root(), Hash::ZERO);
    /// assert_eq!(mmr.size(), 0);
    /// assert!(mmr.peaks().is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of leaves appended so far
    #[inline]
    #[must_use]
    pub fn width(&self) -> u64 {
        self.leaves.len() as u64
    }

    /// The number of nodes (leaves and branches) created so far
    ///
    /// This is always `2 * width - popcount(width)`
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.nodes.len() as u64
    }

    /// Whether nothing has been appended yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The root hash, committing to every leaf and to the width
    ///
    /// [`Hash::ZERO`] for an empty accumulator. This value is cached, so calls are free.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Hash {
        self.root
    }

    /// The hashes of the current peaks, from left to right
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3];
    ///
    /// // 3 leaves make a mountain of height 1 and a lone leaf
    /// assert_eq!(mmr.peak_indexes(), &[3, 4]);
    /// assert_eq!(mmr.peaks(), vec![mmr.node(3).unwrap(), mmr.node(4).unwrap()]);
    /// ```
    #[must_use]
    pub fn peaks(&self) -> Vec<Hash> {
        self.peaks.iter().map(|&index| self.hash_at(index)).collect()
    }

    /// The indexes of the current peaks, from left to right
    ///
    /// This always equals [`index::peak_indexes(self.width())`][index::peak_indexes]
    #[inline]
    #[must_use]
    pub fn peak_indexes(&self) -> &[u64] {
        &self.peaks
    }

    /// The hash of the node at `index`, or `None` if it hasn't been created yet
    #[inline]
    #[must_use]
    pub fn node(&self, index: u64) -> Option<Hash> {
        let i = usize::try_from(index.checked_sub(1)?).ok()?;
        self.nodes.get(i).copied()
    }

    /// The children of the branch node at `index`
    ///
    /// This is purely index arithmetic (see [`index::children`]), the node does not need to exist
    /// yet
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3];
    ///
    /// assert_eq!(mmr.children(3), Ok((1, 2)));
    /// assert_eq!(mmr.children(2), Err(Error::NotAParent { index: 2 }));
    /// ```
    pub fn children(&self, index: u64) -> Result<(u64, u64), Error> {
        match index {
            0 => Err(Error::NotAParent { index }),
            index => index::children(index),
        }
    }

    /// The raw value stored in the leaf at `index`
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mut mmr = Mmr::new();
    /// let index = mmr.append(keccak256(b"hello"));
    ///
    /// assert_eq!(mmr.leaf_value(index), Ok(keccak256(b"hello")));
    /// assert_eq!(mmr.leaf_value(100), Err(Error::InvalidLeafIndex { index: 100 }));
    /// ```
    pub fn leaf_value(&self, index: u64) -> Result<Hash, Error> {
        self.leaf_ordinal(index)
            .map(|ordinal| self.leaves[ordinal])
            .ok_or(Error::InvalidLeafIndex { index })
    }

    /// The raw leaf values, in the order they were appended
    #[inline]
    #[must_use]
    pub fn leaf_values(&self) -> &[Hash] {
        &self.leaves
    }

    /// Iterate over `(index, value)` for every leaf, in the order they were appended
    pub fn leaves(&self) -> impl Iterator<Item = (u64, Hash)> + '_ {
        (0..).map(index::leaf_index).zip(self.leaves.iter().copied())
    }

    /// Rebuild an accumulator from its durable state
    ///
    /// `leaves` are the raw leaf values in append order, and `nodes` are the hashes of every node,
    /// in index order. The shape is checked (there must be exactly `size(width)` nodes) but the
    /// hashes are trusted. Call [`Mmr::validate`] to recompute them.
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mmr = mmr![1, 2, 3, 4, 5];
    ///
    /// let nodes = (1..=mmr.size()).map(|i| mmr.node(i).unwrap()).collect();
    /// let rebuilt = Mmr::from_parts(mmr.leaf_values().to_vec(), nodes).unwrap();
    ///
    /// assert_eq!(rebuilt, mmr);
    /// ```
    pub fn from_parts(leaves: Vec<Hash>, nodes: Vec<Hash>) -> Result<Self, Error> {
        let width = leaves.len() as u64;
        let expected = index::size(width);

        if nodes.len() as u64 != expected {
            return Err(Error::Inconsistent(format!(
                "{} leaves need {expected} nodes, found {}",
                leaves.len(),
                nodes.len(),
            )));
        }

        let mut mmr = Self {
            nodes,
            leaves,
            peaks: index::peak_indexes(width),
            root: Hash::ZERO,
        };
        mmr.root = mmr.bag();

        Ok(mmr)
    }

    /// Recompute every node hash from the leaf values and check it matches the stored hash
    pub fn validate(&self) -> Result<(), Error> {
        for index in 1..=self.size() {
            let expected = match index::children(index) {
                Ok((left, right)) => hash_branch(index, self.hash_at(left), self.hash_at(right)),
                Err(_) => {
                    let value = self.leaf_value(index)?;
                    hash_leaf(index, value)
                }
            };

            if self.hash_at(index) != expected {
                return Err(Error::Inconsistent(format!(
                    "node {index} doesn't match its recomputed hash"
                )));
            }
        }

        Ok(())
    }

    /// The hash of a node which is known to exist
    #[inline]
    fn hash_at(&self, index: u64) -> Hash {
        self.nodes[(index - 1) as usize]
    }

    #[inline]
    fn leaf_ordinal(&self, index: u64) -> Option<usize> {
        if index > self.size() {
            return None;
        }

        let ordinal = index::leaf_ordinal(index)?;
        usize::try_from(ordinal).ok()
    }

    fn bag(&self) -> Hash {
        bag_peaks(self.width(), &self.peaks())
    }
}

impl FromIterator<Hash> for Mmr {
    fn from_iter<I: IntoIterator<Item = Hash>>(iter: I) -> Self {
        let mut mmr = Self::new();
        mmr.extend(iter);
        mmr
    }
}

impl Extend<Hash> for Mmr {
    fn extend<I: IntoIterator<Item = Hash>>(&mut self, iter: I) {
        self.append_batch(iter);
    }
}
