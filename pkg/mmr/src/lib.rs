#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::single_match_else)]
#![allow(clippy::cast_possible_truncation)]
#![deny(missing_docs)]

//! # MMR (**M**erkle **M**ountain **R**ange)
//!
//! An append-only accumulator, committing to an ordered list of 32-byte values with a single
//! [`root`][Mmr::root] hash.
//!
//! Conceptually, an [`Mmr`] is a `Vec<Hash>` that can only be pushed to. Every value that has
//! been appended can be proven to be present with a [`MerkleProof`]:
//!
//! ```rust
//! # use mmr::*;
//! let mut mmr = Mmr::new();
//!
//! let index = mmr.append(keccak256(b"some document"));
//!
//! let proof = mmr.merkle_proof(index).unwrap();
//! assert!(mmr.verify_hash(&proof, keccak256(b"some document")).unwrap());
//! ```
//!
//! ## Structure
//!
//! An [`Mmr`] is a list of perfect binary trees ("mountains"), with strictly decreasing heights
//! from left to right. The roots of the mountains are the "peaks". Appending a leaf adds a new
//! mountain of height 0, and then merges the two rightmost mountains for as long as they have the
//! same height. As a result, the heights of the peaks are exactly the set bits of the number of
//! leaves (the "width").
//!
//! Nodes are numbered from 1 in the order they are created, so the index of a node (and its
//! height, its children, etc.) depend only on the width when it was created. The arithmetic lives
//! in [`index`].
//!
//! ## Root hash
//!
//! Every node hash commits to the node's index as well as its contents (see [`hash_leaf`] and
//! [`hash_branch`]), and the root commits to every peak and to the number of nodes (see
//! [`peak_bagging`]). All hashes are keccak-256 over 32-byte big-endian words, so roots match the
//! equivalent on-chain accumulator.
//!
//! The root of an empty [`Mmr`] is [`Hash::ZERO`].

pub mod index;

mod error;
mod hash;
mod macros;
#[cfg(any(test, feature = "proptest"))]
mod arbitrary;
/// APIs relating to persistence of an [`Mmr`]
#[cfg(feature = "storage")]
pub mod storage;
mod tree;

pub use error::Error;
pub use hash::{hash_branch, hash_leaf, peak_bagging};
pub use primitives::{keccak256, Hash};
pub use tree::{MerkleProof, Mmr};
