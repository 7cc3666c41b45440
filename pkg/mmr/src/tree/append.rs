use primitives::Hash;

use crate::{
    hash::{hash_branch, hash_leaf},
    index, Mmr,
};

impl Mmr {
    /// Append a value as a new leaf, returning the index of the leaf
    ///
    /// The leaf becomes a new peak of height 0. While the two rightmost peaks have the same
    /// height, they are merged into a new branch node, exactly like the carries produced when
    /// incrementing the width in binary.
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mut mmr = Mmr::new();
    ///
    /// assert_eq!(mmr.append(Hash::from_u64(1)), 1);
    /// assert_eq!(mmr.append(Hash::from_u64(2)), 2); // creates branch 3
    /// assert_eq!(mmr.append(Hash::from_u64(3)), 4);
    /// assert_eq!(mmr.append(Hash::from_u64(4)), 5); // creates branches 6 and 7
    ///
    /// assert_eq!(mmr.size(), 7);
    /// assert_eq!(mmr.peak_indexes(), &[7]);
    /// ```
    ///
    /// This never fails. Any validation of `value` (for example, rejecting duplicates) is the
    /// caller's responsibility.
    pub fn append(&mut self, value: Hash) -> u64 {
        let leaf_index = self.size() + 1;

        self.nodes.push(hash_leaf(leaf_index, value));
        self.leaves.push(value);
        self.peaks.push(leaf_index);

        while let [.., older, newer] = self.peaks[..] {
            if index::mountain_height(older) != index::mountain_height(newer) {
                break;
            }

            let branch = self.size() + 1;
            let hash = hash_branch(branch, self.hash_at(older), self.hash_at(newer));

            self.peaks.truncate(self.peaks.len() - 2);
            self.nodes.push(hash);
            self.peaks.push(branch);

            tracing::trace!(branch, left = older, right = newer, "merged peaks");
        }

        self.root = self.bag();

        tracing::debug!(
            leaf_index,
            width = self.width(),
            size = self.size(),
            root = %self.root,
            "appended leaf"
        );

        leaf_index
    }

    /// Append many values, returning the index of each new leaf
    ///
    /// The result is identical to calling [`Mmr::append`] for each value in turn
    ///
    /// ```rust
    /// # use mmr::*;
    /// let mut a = Mmr::new();
    /// let indexes = a.append_batch((1..=5).map(Hash::from_u64));
    ///
    /// let b = mmr![1, 2, 3, 4, 5];
    ///
    /// assert_eq!(indexes, vec![1, 2, 4, 5, 8]);
    /// assert_eq!(a.root(), b.root());
    /// ```
    pub fn append_batch<I>(&mut self, values: I) -> Vec<u64>
    where
        I: IntoIterator<Item = Hash>,
    {
        let values = values.into_iter();
        let (hint, _) = values.size_hint();

        let mut indexes = Vec::with_capacity(hint);
        self.leaves.reserve(hint);
        self.nodes.reserve(2 * hint);

        for value in values {
            indexes.push(self.append(value));
        }

        indexes
    }

    /// Drop every leaf after the first `width`, along with the nodes they created
    ///
    /// Only used to undo appends that could not be persisted
    #[cfg_attr(not(feature = "storage"), allow(dead_code))]
    pub(crate) fn rewind(&mut self, width: u64) {
        debug_assert!(width <= self.width(), "can only rewind to an earlier width");

        self.nodes.truncate(index::size(width) as usize);
        self.leaves.truncate(width as usize);
        self.peaks = index::peak_indexes(width);
        self.root = self.bag();
    }
}
