#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![deny(missing_docs)]

//! # Fingerprint log
//!
//! A duplicate-rejecting log of content hashes, backed by an [`Mmr`].
//!
//! Each document is identified by its 32-byte content hash (its "fingerprint"). The log accepts
//! each fingerprint at most once, records the leaf index it was stored at, and can prove that any
//! recorded fingerprint is committed to by the current root:
//!
//! ```rust
//! # use fingerprint::*;
//! let mut log = FingerprintLog::new();
//!
//! let hash = keccak256(br#"{"game":"League of Legends","character":"Ahri"}"#);
//! let leaf_index = log.append_data(hash).unwrap();
//!
//! assert!(log.is_hash_appended(hash));
//! assert!(log.verify_hash(leaf_index).unwrap());
//!
//! // the same fingerprint can't be recorded twice
//! assert!(matches!(
//!     log.append_data(hash),
//!     Err(Error::DataHashAlreadyAppended { .. })
//! ));
//! ```
//!
//! The log is generic over its [`Accumulator`], so the same API works for an in-memory [`Mmr`]
//! and (with the `storage` feature) for a rocksdb-backed [`Persistent`].
//!
//! [`Persistent`]: mmr::storage::Persistent

mod accumulator;
mod error;
mod event;
mod log;
mod shared;

pub use accumulator::Accumulator;
pub use error::Error;
pub use event::DataHashAppended;
pub use log::FingerprintLog;
pub use mmr::{keccak256, Hash, MerkleProof, Mmr};
pub use shared::SharedFingerprintLog;
