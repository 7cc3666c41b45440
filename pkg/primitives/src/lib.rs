#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![deny(missing_docs)]

//! Value types shared by the accumulator and the fingerprint log

#[cfg(any(test, feature = "proptest"))]
mod arbitrary;
mod hash;

pub use hash::{keccak256, Hash, ParseHashError};
