use std::collections::{HashMap, HashSet};

use mmr::{keccak256, Hash, MerkleProof, Mmr};
use tokio::sync::broadcast;

use crate::{
    event::{DataHashAppended, EVENT_CAPACITY},
    Accumulator, Error,
};

/// A log of fingerprints, each recorded at most once
///
/// Every fingerprint is appended to the accumulator `A` as a leaf, and the leaf index is
/// remembered, so membership checks don't touch the accumulator at all
pub struct FingerprintLog<A = Mmr> {
    accumulator: A,
    /// Fingerprint to the leaf index that recorded it
    appended: HashMap<Hash, u64>,
    events: broadcast::Sender<DataHashAppended>,
}

impl FingerprintLog<Mmr> {
    /// Create a new, empty log backed by an in-memory [`Mmr`]
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            accumulator: Mmr::new(),
            appended: HashMap::new(),
            events,
        }
    }
}

impl Default for FingerprintLog<Mmr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Accumulator> FingerprintLog<A> {
    /// Wrap an existing accumulator, treating every leaf it holds as a recorded fingerprint
    ///
    /// ```rust
    /// # use fingerprint::*;
    /// let mut mmr = Mmr::new();
    /// mmr.append(keccak256(b"hello"));
    ///
    /// let log = FingerprintLog::from_accumulator(mmr).unwrap();
    /// assert_eq!(log.leaf_index_of(keccak256(b"hello")), Some(1));
    /// ```
    ///
    /// Fails if the accumulator holds a leaf that the log would have rejected (the zero hash, or
    /// the same value twice)
    pub fn from_accumulator(accumulator: A) -> Result<Self, Error> {
        let mut appended = HashMap::with_capacity(accumulator.mmr().leaf_values().len());

        for (leaf_index, hash) in accumulator.mmr().leaves() {
            if hash.is_zero() {
                return Err(Error::InvalidDataHash);
            }

            if appended.insert(hash, leaf_index).is_some() {
                return Err(Error::DataHashAlreadyAppended { hash });
            }
        }

        tracing::debug!(fingerprints = appended.len(), "rebuilt fingerprint index");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            accumulator,
            appended,
            events,
        })
    }

    /// Record `hash`, returning the index of the leaf it was stored at
    ///
    /// ```rust
    /// # use fingerprint::*;
    /// let mut log = FingerprintLog::new();
    ///
    /// assert_eq!(log.append_data(keccak256(b"a")).unwrap(), 1);
    /// assert_eq!(log.append_data(keccak256(b"b")).unwrap(), 2);
    /// assert_eq!(log.append_data(keccak256(b"c")).unwrap(), 4);
    ///
    /// assert!(matches!(log.append_data(Hash::ZERO), Err(Error::InvalidDataHash)));
    /// ```
    ///
    /// Fails with [`Error::InvalidDataHash`] for the zero hash, and
    /// [`Error::DataHashAlreadyAppended`] if `hash` was recorded before. Neither failure changes
    /// the log.
    pub fn append_data(&mut self, hash: Hash) -> Result<u64, Error> {
        self.check(hash)?;

        let leaf_index = self.accumulator.append(hash)?;
        self.record(hash, leaf_index);

        Ok(leaf_index)
    }

    /// Fingerprint `content` with keccak-256 and record the result
    ///
    /// ```rust
    /// # use fingerprint::*;
    /// let mut log = FingerprintLog::new();
    /// let event = log.append_content(b"some document").unwrap();
    ///
    /// assert_eq!(event.hash, keccak256(b"some document"));
    /// assert!(log.is_hash_appended(event.hash));
    /// ```
    pub fn append_content(&mut self, content: impl AsRef<[u8]>) -> Result<DataHashAppended, Error> {
        let hash = keccak256(content);
        let leaf_index = self.append_data(hash)?;

        Ok(DataHashAppended { hash, leaf_index })
    }

    /// Record many fingerprints at once, returning their leaf indexes
    ///
    /// Every hash is checked before anything is appended, including for duplicates within the
    /// batch itself. If any hash is rejected, the log is unchanged.
    ///
    /// ```rust
    /// # use fingerprint::*;
    /// let mut log = FingerprintLog::new();
    /// let (a, b) = (keccak256(b"a"), keccak256(b"b"));
    ///
    /// assert!(log.append_data_batch([a, b, a]).is_err());
    /// assert!(!log.is_hash_appended(a));
    ///
    /// assert_eq!(log.append_data_batch([a, b]).unwrap(), vec![1, 2]);
    /// ```
    pub fn append_data_batch<I>(&mut self, hashes: I) -> Result<Vec<u64>, Error>
    where
        I: IntoIterator<Item = Hash>,
    {
        let hashes: Vec<Hash> = hashes.into_iter().collect();

        let mut seen = HashSet::with_capacity(hashes.len());
        for &hash in &hashes {
            self.check(hash)?;

            if !seen.insert(hash) {
                tracing::warn!(%hash, "rejected fingerprint repeated within batch");
                return Err(Error::DataHashAlreadyAppended { hash });
            }
        }

        let leaf_indexes = self.accumulator.append_batch(hashes.clone())?;

        for (hash, &leaf_index) in hashes.into_iter().zip(&leaf_indexes) {
            self.record(hash, leaf_index);
        }

        Ok(leaf_indexes)
    }

    /// Whether `hash` has been recorded
    #[inline]
    #[must_use]
    pub fn is_hash_appended(&self, hash: Hash) -> bool {
        self.appended.contains_key(&hash)
    }

    /// The index of the leaf that recorded `hash`, if any
    #[inline]
    #[must_use]
    pub fn leaf_index_of(&self, hash: Hash) -> Option<u64> {
        self.appended.get(&hash).copied()
    }

    /// Check that the leaf at `leaf_index` is committed to by the current root
    ///
    /// A proof is generated for the stored value and verified against the current root
    ///
    /// ```rust
    /// # use fingerprint::*;
    /// let mut log = FingerprintLog::new();
    /// log.append_data(keccak256(b"a")).unwrap();
    /// log.append_data(keccak256(b"b")).unwrap();
    ///
    /// assert!(log.verify_hash(2).unwrap());
    /// assert!(matches!(log.verify_hash(3), Err(Error::InvalidHashIndex { index: 3 })));
    /// ```
    ///
    /// Fails with [`Error::InvalidHashIndex`] if `leaf_index` is not an existing leaf
    pub fn verify_hash(&self, leaf_index: u64) -> Result<bool, Error> {
        let mmr = self.accumulator.mmr();
        let invalid = |_| Error::InvalidHashIndex { index: leaf_index };

        let value = mmr.leaf_value(leaf_index).map_err(invalid)?;
        let proof = mmr.merkle_proof(leaf_index).map_err(invalid)?;

        Ok(mmr.verify_hash(&proof, value)?)
    }

    /// Generate an inclusion proof for the leaf at `leaf_index`
    pub fn merkle_proof(&self, leaf_index: u64) -> Result<MerkleProof, Error> {
        Ok(self.mmr().merkle_proof(leaf_index)?)
    }

    /// The children of the branch node at `index`
    pub fn children(&self, index: u64) -> Result<(u64, u64), Error> {
        Ok(self.mmr().children(index)?)
    }

    /// Subscribe to [`DataHashAppended`] events
    ///
    /// Only fingerprints recorded after subscribing are received
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DataHashAppended> {
        self.events.subscribe()
    }

    /// The current root hash
    #[inline]
    #[must_use]
    pub fn root(&self) -> Hash {
        self.mmr().root()
    }

    /// The number of nodes in the accumulator
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.mmr().size()
    }

    /// The number of fingerprints recorded
    #[inline]
    #[must_use]
    pub fn width(&self) -> u64 {
        self.mmr().width()
    }

    /// The hashes of the current peaks, from left to right
    #[must_use]
    pub fn peaks(&self) -> Vec<Hash> {
        self.mmr().peaks()
    }

    /// The state of the underlying accumulator
    #[inline]
    #[must_use]
    pub fn mmr(&self) -> &Mmr {
        self.accumulator.mmr()
    }

    /// Get a reference to the underlying accumulator
    #[inline]
    #[must_use]
    pub fn accumulator(&self) -> &A {
        &self.accumulator
    }

    /// Take the underlying accumulator
    #[inline]
    #[must_use]
    pub fn into_accumulator(self) -> A {
        self.accumulator
    }

    fn check(&self, hash: Hash) -> Result<(), Error> {
        if hash.is_zero() {
            tracing::warn!("rejected zero fingerprint");
            return Err(Error::InvalidDataHash);
        }

        if let Some(leaf_index) = self.leaf_index_of(hash) {
            tracing::warn!(%hash, leaf_index, "rejected fingerprint already appended");
            return Err(Error::DataHashAlreadyAppended { hash });
        }

        Ok(())
    }

    fn record(&mut self, hash: Hash, leaf_index: u64) {
        self.appended.insert(hash, leaf_index);

        tracing::info!(%hash, leaf_index, root = %self.root(), "fingerprint appended");

        // no subscribers is fine
        let _ = self.events.send(DataHashAppended { hash, leaf_index });
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    fn gaming_data() -> Hash {
        keccak256(
            br#"{"game":"League of Legends","character":"Ahri","ability":"Orb of Deception"}"#,
        )
    }

    #[test]
    fn zero_hash_is_rejected() {
        let mut log = FingerprintLog::new();

        assert!(matches!(log.append_data(Hash::ZERO), Err(Error::InvalidDataHash)));
        assert_eq!(log.size(), 0);
        assert_eq!(log.root(), Hash::ZERO);
        assert!(!log.is_hash_appended(Hash::ZERO));
    }

    #[test]
    fn zero_hash_is_rejected_after_appends() {
        let mut log = FingerprintLog::new();
        log.append_data(gaming_data()).unwrap();
        log.append_content(b"second document").unwrap();

        let root = log.root();
        let mut events = log.subscribe();

        assert!(matches!(log.append_data(Hash::ZERO), Err(Error::InvalidDataHash)));

        assert_eq!(log.root(), root);
        assert_eq!(log.width(), 2);
        assert_eq!(log.size(), 3);
        assert!(!log.is_hash_appended(Hash::ZERO));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn append_grows_log() {
        let mut log = FingerprintLog::new();
        let hash = gaming_data();

        let initial_size = log.size();
        log.append_data(hash).unwrap();

        assert_eq!(log.size(), initial_size + 1);
        assert_ne!(log.root(), Hash::ZERO);
        assert!(log.is_hash_appended(hash));
    }

    #[test]
    fn duplicate_is_rejected_without_change() {
        let mut log = FingerprintLog::new();
        let hash = gaming_data();

        log.append_data(hash).unwrap();
        let root = log.root();

        let err = log.append_data(hash).unwrap_err();
        assert!(matches!(err, Error::DataHashAlreadyAppended { hash: h } if h == hash));

        assert!(log.is_hash_appended(hash));
        assert_eq!(log.root(), root);
        assert_eq!(log.width(), 1);
    }

    #[test]
    fn root_matches_plain_mmr() {
        let hashes: Vec<_> = (0u8..20).map(|i| keccak256([i])).collect();

        let mut log = FingerprintLog::new();
        for &hash in &hashes {
            log.append_data(hash).unwrap();
        }

        let mmr: Mmr = hashes.into_iter().collect();
        assert_eq!(log.root(), mmr.root());
        assert_eq!(log.peaks(), mmr.peaks());
    }

    #[test]
    fn batch_rejects_zero_and_existing() {
        let mut log = FingerprintLog::new();
        let a = keccak256(b"a");
        log.append_data(a).unwrap();

        let b = keccak256(b"b");

        assert!(matches!(
            log.append_data_batch([b, Hash::ZERO]),
            Err(Error::InvalidDataHash)
        ));
        assert!(matches!(
            log.append_data_batch([b, a]),
            Err(Error::DataHashAlreadyAppended { .. })
        ));

        assert!(!log.is_hash_appended(b));
        assert_eq!(log.width(), 1);
    }

    #[test]
    fn verify_hash_rejects_non_leaves() {
        let mut log = FingerprintLog::new();
        log.append_data_batch((0u8..4).map(|i| keccak256([i]))).unwrap();

        for leaf_index in [1, 2, 4, 5] {
            assert!(log.verify_hash(leaf_index).unwrap());
        }

        for index in [0, 3, 6, 7, 8] {
            assert!(matches!(
                log.verify_hash(index),
                Err(Error::InvalidHashIndex { index: i }) if i == index
            ));
        }
    }

    #[test]
    fn children_delegate_to_index_math() {
        let mut log = FingerprintLog::new();
        log.append_data_batch((0u8..3).map(|i| keccak256([i]))).unwrap();

        assert_eq!(log.children(3).unwrap(), (1, 2));
        assert!(matches!(
            log.children(1),
            Err(Error::Mmr(mmr::Error::NotAParent { index: 1 }))
        ));
    }

    #[test]
    fn from_accumulator_rebuilds_index() {
        let mmr: Mmr = (1..=5).map(Hash::from_u64).collect();
        let mut log = FingerprintLog::from_accumulator(mmr).unwrap();

        assert_eq!(log.leaf_index_of(Hash::from_u64(3)), Some(4));
        assert!(matches!(
            log.append_data(Hash::from_u64(5)),
            Err(Error::DataHashAlreadyAppended { .. })
        ));

        let leaf_index = log.append_data(Hash::from_u64(6)).unwrap();
        assert_eq!(leaf_index, 9);
    }

    #[test]
    fn from_accumulator_rejects_invalid_leaves() {
        let duplicates: Mmr = [Hash::from_u64(1), Hash::from_u64(1)].into_iter().collect();
        assert!(matches!(
            FingerprintLog::from_accumulator(duplicates),
            Err(Error::DataHashAlreadyAppended { .. })
        ));

        let zero: Mmr = [Hash::ZERO].into_iter().collect();
        assert!(matches!(
            FingerprintLog::from_accumulator(zero),
            Err(Error::InvalidDataHash)
        ));
    }

    #[test]
    fn subscribers_see_every_append() {
        let mut log = FingerprintLog::new();
        let mut events = log.subscribe();

        let a = log.append_data(keccak256(b"a")).unwrap();
        let b = log.append_content(b"b").unwrap();
        let batch = log
            .append_data_batch([keccak256(b"c"), keccak256(b"d")])
            .unwrap();

        // rejected appends don't produce events
        log.append_data(keccak256(b"a")).unwrap_err();

        let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        let indexes: Vec<_> = received.iter().map(|event| event.leaf_index).collect();

        assert_eq!(received[0].hash, keccak256(b"a"));
        assert_eq!(received[1], b);
        assert_eq!(indexes, vec![a, b.leaf_index, batch[0], batch[1]]);
    }

    #[test]
    fn events_serialize_as_json() {
        let event = DataHashAppended {
            hash: Hash::from_u64(1),
            leaf_index: 4,
        };

        let json = serde_json::to_value(event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hash": Hash::from_u64(1).to_string(),
                "leaf_index": 4,
            })
        );
    }

    #[cfg(feature = "storage")]
    #[test]
    fn persistent_log_survives_reload() {
        use mmr::storage::Persistent;
        use tempdir::TempDir;

        let dir = TempDir::new("fingerprint_test").unwrap();
        let path = dir.path().join("db");

        let mut log = FingerprintLog::from_accumulator(Persistent::new(&path).unwrap()).unwrap();
        let leaf_index = log.append_content(b"document").unwrap().leaf_index;
        log.append_data_batch([keccak256(b"x"), keccak256(b"y")])
            .unwrap();
        let root = log.root();
        drop(log);

        let mut log = FingerprintLog::from_accumulator(Persistent::load(&path).unwrap()).unwrap();

        assert_eq!(log.root(), root);
        assert_eq!(log.leaf_index_of(keccak256(b"document")), Some(leaf_index));
        assert!(log.verify_hash(leaf_index).unwrap());
        assert!(matches!(
            log.append_content(b"y"),
            Err(Error::DataHashAlreadyAppended { .. })
        ));
    }

    #[proptest]
    fn every_appended_hash_verifies(hashes: HashSet<Hash>) {
        let mut log = FingerprintLog::new();

        for &hash in &hashes {
            match hash.is_zero() {
                true => assert!(log.append_data(hash).is_err()),
                false => {
                    log.append_data(hash).unwrap();
                }
            }
        }

        for &hash in &hashes {
            if let Some(leaf_index) = log.leaf_index_of(hash) {
                assert!(log.verify_hash(leaf_index).unwrap());
                assert!(log.is_hash_appended(hash));
            }
        }
    }

    #[proptest]
    fn second_append_always_fails(#[filter(!#hash.is_zero())] hash: Hash) {
        let mut log = FingerprintLog::new();

        log.append_data(hash).unwrap();
        assert!(matches!(
            log.append_data(hash),
            Err(Error::DataHashAlreadyAppended { .. })
        ));
        assert!(log.is_hash_appended(hash));
    }
}
