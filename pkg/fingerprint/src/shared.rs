use std::sync::Arc;

use mmr::{Hash, MerkleProof, Mmr};
use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::broadcast;

use crate::{Accumulator, DataHashAppended, Error, FingerprintLog};

/// A [`FingerprintLog`] that can be shared between threads
///
/// Appends take a write lock and queries take a read lock, so a reader never observes an append
/// that is only partly applied
///
/// ```rust
/// # use fingerprint::*;
/// let log = SharedFingerprintLog::new(FingerprintLog::new());
/// let handle = log.clone();
///
/// std::thread::spawn(move || handle.append_data(keccak256(b"hello")).unwrap())
///     .join()
///     .unwrap();
///
/// assert!(log.is_hash_appended(keccak256(b"hello")));
/// ```
pub struct SharedFingerprintLog<A = Mmr> {
    inner: Arc<RwLock<FingerprintLog<A>>>,
}

impl<A> Clone for SharedFingerprintLog<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Accumulator> SharedFingerprintLog<A> {
    /// Wrap `log` so it can be shared
    #[must_use]
    pub fn new(log: FingerprintLog<A>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(log)),
        }
    }

    /// See [`FingerprintLog::append_data`]
    pub fn append_data(&self, hash: Hash) -> Result<u64, Error> {
        self.inner.write().append_data(hash)
    }

    /// See [`FingerprintLog::append_content`]
    pub fn append_content(&self, content: impl AsRef<[u8]>) -> Result<DataHashAppended, Error> {
        self.inner.write().append_content(content)
    }

    /// See [`FingerprintLog::append_data_batch`]
    pub fn append_data_batch<I>(&self, hashes: I) -> Result<Vec<u64>, Error>
    where
        I: IntoIterator<Item = Hash>,
    {
        self.inner.write().append_data_batch(hashes)
    }

    /// See [`FingerprintLog::is_hash_appended`]
    #[must_use]
    pub fn is_hash_appended(&self, hash: Hash) -> bool {
        self.inner.read().is_hash_appended(hash)
    }

    /// See [`FingerprintLog::verify_hash`]
    pub fn verify_hash(&self, leaf_index: u64) -> Result<bool, Error> {
        self.inner.read().verify_hash(leaf_index)
    }

    /// See [`FingerprintLog::merkle_proof`]
    pub fn merkle_proof(&self, leaf_index: u64) -> Result<MerkleProof, Error> {
        self.inner.read().merkle_proof(leaf_index)
    }

    /// See [`FingerprintLog::root`]
    #[must_use]
    pub fn root(&self) -> Hash {
        self.inner.read().root()
    }

    /// See [`FingerprintLog::subscribe`]
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DataHashAppended> {
        self.inner.read().subscribe()
    }

    /// Lock the log for reading, for queries that need several values from the same state
    ///
    /// Appends block until the guard is dropped
    pub fn read(&self) -> RwLockReadGuard<'_, FingerprintLog<A>> {
        self.inner.read()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use mmr::keccak256;

    use super::*;

    #[test]
    fn concurrent_appends_of_distinct_hashes() {
        let log = SharedFingerprintLog::new(FingerprintLog::new());

        thread::scope(|s| {
            for t in 0u8..4 {
                let log = log.clone();
                s.spawn(move || {
                    for i in 0u8..25 {
                        log.append_data(keccak256([t, i])).unwrap();
                    }
                });
            }
        });

        let guard = log.read();
        assert_eq!(guard.width(), 100);

        for t in 0u8..4 {
            for i in 0u8..25 {
                let leaf_index = guard.leaf_index_of(keccak256([t, i])).unwrap();
                assert!(guard.verify_hash(leaf_index).unwrap());
            }
        }
    }

    #[test]
    fn racing_duplicates_append_once() {
        let log = SharedFingerprintLog::new(FingerprintLog::new());
        let hash = keccak256(b"contested");

        let successes = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let log = log.clone();
                    s.spawn(move || log.append_data(hash).is_ok())
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(successes, 1);
        assert_eq!(log.read().width(), 1);
    }

    #[test]
    fn subscribers_on_clones_share_events() {
        let log = SharedFingerprintLog::new(FingerprintLog::new());
        let mut events = log.clone().subscribe();

        let leaf_index = log.append_data(keccak256(b"a")).unwrap();

        let event = events.try_recv().unwrap();
        assert_eq!(event.leaf_index, leaf_index);
        assert_eq!(log.root(), log.read().mmr().root());
    }
}
