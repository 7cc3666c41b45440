//! Index arithmetic for the flat, 1-indexed node numbering
//!
//! Nodes are numbered in the order they are created. Appending a leaf creates the leaf, followed
//! by every branch node that the leaf completes:
//! ```text
//! height 3 |          15
//! height 2 |    7            14              22
//! height 1 |  3    6     10      13      18      21      25
//! height 0 | 1 2  4 5   8  9   11  12  16  17  19  20  23  24  26
//! ```
//! A mountain of height `h` spans `2^(h + 1) - 1` consecutive indexes, and its peak is the last
//! of them. Everything in this module is a pure function of its arguments.

use crate::Error;

/// The largest width this numbering supports
///
/// One more leaf would make [`size`] overflow a `u64`
pub const MAX_WIDTH: u64 = (1 << 63) - 1;

/// The height of the node at `index` (`0` for leaves)
///
/// ```rust
/// # use mmr::index::mountain_height;
/// assert_eq!(mountain_height(1), 0);
/// assert_eq!(mountain_height(3), 1);
/// assert_eq!(mountain_height(15), 3);
/// assert_eq!(mountain_height(22), 2);
/// assert_eq!(mountain_height(26), 0);
/// ```
///
/// # Panics
///
/// Panics if `index` is 0, since indexes start at 1.
#[inline]
#[must_use]
pub fn mountain_height(index: u64) -> u32 {
    assert_ne!(index, 0, "node indexes start at 1");

    // an index made of only 1 bits is the peak of the leftmost mountain of that size
    //
    // otherwise, jump left over the largest mountain that fits below this index, which moves to
    // the node at the same height in the sibling mountain
    let mut index = index;
    while !is_all_ones(index) {
        index -= (1 << (bit_length(index) - 1)) - 1;
    }

    bit_length(index) - 1
}

/// Whether the node at `index` is a leaf
///
/// # Panics
///
/// Panics if `index` is 0.
#[inline]
#[must_use]
pub fn is_leaf(index: u64) -> bool {
    mountain_height(index) == 0
}

/// The indexes of the left and right children of the branch node at `index`
///
/// ```rust
/// # use mmr::index::children;
/// # use mmr::Error;
/// assert_eq!(children(3), Ok((1, 2)));
/// assert_eq!(children(15), Ok((7, 14)));
/// assert_eq!(children(31), Ok((15, 30)));
///
/// assert_eq!(children(4), Err(Error::NotAParent { index: 4 }));
/// ```
///
/// # Panics
///
/// Panics if `index` is 0.
#[inline]
pub fn children(index: u64) -> Result<(u64, u64), Error> {
    let height = mountain_height(index);

    if height == 0 {
        return Err(Error::NotAParent { index });
    }

    Ok((index - (1 << height), index - 1))
}

/// The number of peaks an accumulator with `width` leaves has
#[inline]
#[must_use]
pub fn num_of_peaks(width: u64) -> usize {
    width.count_ones() as usize
}

/// The number of nodes an accumulator with `width` leaves has
///
/// ```rust
/// # use mmr::index::size;
/// assert_eq!(size(0), 0);
/// assert_eq!(size(1), 1);
/// assert_eq!(size(2), 3);
/// assert_eq!(size(31), 57);
/// ```
#[inline]
#[must_use]
pub fn size(width: u64) -> u64 {
    (width << 1) - u64::from(width.count_ones())
}

/// The indexes of the peaks of an accumulator with `width` leaves, from left to right
///
/// Each set bit of `width` (most significant first) corresponds to one mountain. Widths beyond
/// [`MAX_WIDTH`] are not supported
///
/// ```rust
/// # use mmr::index::peak_indexes;
/// assert_eq!(peak_indexes(0), Vec::<u64>::new());
/// assert_eq!(peak_indexes(14), vec![15, 22, 25]);
/// assert_eq!(peak_indexes(15), vec![15, 22, 25, 26]);
/// ```
#[must_use]
pub fn peak_indexes(width: u64) -> Vec<u64> {
    let mut peaks = Vec::with_capacity(num_of_peaks(width));
    let mut offset = 0;

    for height in (0..u64::BITS - 1).rev() {
        if width & (1 << height) != 0 {
            offset += mountain_size(height);
            peaks.push(offset);
        }
    }

    peaks
}

/// The index of the leaf with the given 0-based ordinal
///
/// ```rust
/// # use mmr::index::leaf_index;
/// assert_eq!(leaf_index(0), 1);
/// assert_eq!(leaf_index(2), 4);
/// assert_eq!(leaf_index(4), 8);
/// ```
#[inline]
#[must_use]
pub fn leaf_index(ordinal: u64) -> u64 {
    size(ordinal) + 1
}

/// The 0-based ordinal of the leaf at `index`, or `None` if `index` is not a leaf
///
/// This is the inverse of [`leaf_index`]
#[inline]
#[must_use]
pub fn leaf_ordinal(index: u64) -> Option<u64> {
    match index {
        0 => None,
        index => width_for_size(index - 1),
    }
}

/// The width of an accumulator with `size` nodes, or `None` if no width produces this size
///
/// This is the inverse of [`size`]
#[must_use]
pub fn width_for_size(size: u64) -> Option<u64> {
    let mut remaining = size;
    let mut width = 0;

    // mountains appear in strictly decreasing height, and a mountain is larger than all smaller
    // mountains combined, so taking the largest mountain that fits is always correct
    for height in (0..u64::BITS - 1).rev() {
        let mountain = mountain_size(height);
        if mountain <= remaining {
            remaining -= mountain;
            width |= 1 << height;
        }
    }

    (remaining == 0).then_some(width)
}

/// The number of nodes in a mountain of the given height
#[inline]
fn mountain_size(height: u32) -> u64 {
    (1 << (height + 1)) - 1
}

#[inline]
fn is_all_ones(n: u64) -> bool {
    n & (n + 1) == 0
}

#[inline]
fn bit_length(n: u64) -> u32 {
    u64::BITS - n.leading_zeros()
}
