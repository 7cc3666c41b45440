use mmr::Hash;
use serde::{Deserialize, Serialize};

/// Emitted every time a fingerprint is recorded
///
/// ```rust
/// # use fingerprint::*;
/// let mut log = FingerprintLog::new();
/// let mut events = log.subscribe();
///
/// let hash = keccak256(b"hello");
/// log.append_data(hash).unwrap();
///
/// let event = events.try_recv().unwrap();
/// assert_eq!(event, DataHashAppended { hash, leaf_index: 1 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataHashAppended {
    /// The fingerprint that was recorded
    pub hash: Hash,
    /// The index of the leaf holding it
    pub leaf_index: u64,
}

/// How many events a slow subscriber can fall behind before it starts missing them
pub(crate) const EVENT_CAPACITY: usize = 1024;
