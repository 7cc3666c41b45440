use std::path::PathBuf;

use rocksdb::Options;
use tempdir::TempDir;
use test_strategy::proptest;

use crate::{keccak256, mmr};

use super::{
    format::{to_bytes, KeyFormat, ValueFormat, ValueV1},
    *,
};

fn setup_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new("mmr_db_test").unwrap();
    let file = dir.path().join("db");

    (dir, file)
}

// every case opens a fresh rocksdb instance, which is slow, so we limit the number of cases
// unless `--features slow-storage-tests` is passed
#[cfg(not(feature = "slow-storage-tests"))]
fn cases() -> u32 {
    10
}

#[cfg(feature = "slow-storage-tests")]
fn cases() -> u32 {
    proptest::test_runner::Config::default().cases / 2
}

#[test]
fn simple_storage_test() {
    let (_dir, path) = setup_path();
    let mut persistent = Persistent::new(&path).unwrap();

    assert!(persistent.mmr().is_empty());

    persistent.append(Hash::from_u64(1)).unwrap();
    assert_eq!(persistent.mmr().width(), 1);

    drop(persistent);

    // now load it again
    let persistent = Persistent::load(&path).unwrap();
    assert_eq!(persistent.mmr().width(), 1);
    assert_eq!(persistent.mmr().leaf_value(1), Ok(Hash::from_u64(1)));
    assert_eq!(persistent.mmr().root(), mmr![1].root());
}

#[test]
fn loading_a_fresh_location_is_empty() {
    let (_dir, path) = setup_path();
    let persistent = Persistent::load(&path).unwrap();

    assert!(persistent.mmr().is_empty());
    assert_eq!(persistent.mmr().root(), Hash::ZERO);
}

#[test]
fn appends_continue_after_load() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent
        .append_batch((0..6).map(Hash::from_u64))
        .unwrap();
    drop(persistent);

    let mut persistent = Persistent::load(&path).unwrap();
    let indexes = persistent
        .append_batch((6..10).map(Hash::from_u64))
        .unwrap();
    assert_eq!(indexes, vec![11, 12, 16, 17]);
    drop(persistent);

    let persistent = Persistent::load(&path).unwrap();
    let expected: Mmr = (0..10).map(Hash::from_u64).collect();

    assert_eq!(persistent.mmr().root(), expected.root());
    assert_eq!(persistent.mmr().size(), expected.size());
    assert_eq!(persistent.mmr().peak_indexes(), expected.peak_indexes());
}

#[test]
fn proofs_survive_reload() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    let index = persistent.append(keccak256(b"document")).unwrap();
    persistent
        .append_batch((0..4).map(Hash::from_u64))
        .unwrap();
    let proof = persistent.mmr().merkle_proof(index).unwrap();
    drop(persistent);

    let persistent = Persistent::load(&path).unwrap();
    let mmr = persistent.mmr();

    assert!(mmr.verify_hash(&proof, keccak256(b"document")).unwrap());
    assert_eq!(mmr.merkle_proof(index).unwrap(), proof);
}

#[test]
fn failed_write_rolls_back() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent.append_batch((0..3).map(Hash::from_u64)).unwrap();
    let (mmr, db) = persistent.into_parts();
    drop(db);

    // writes to a read-only instance always fail
    let db = DB::open_for_read_only(&Options::default(), &path, false).unwrap();
    let mut persistent = Persistent { mmr, db };
    let before = persistent.mmr().clone();

    let err = persistent.append(Hash::from_u64(3)).unwrap_err();
    assert!(matches!(err, Error::Rocksdb(_)));

    persistent.append_batch((3..8).map(Hash::from_u64)).unwrap_err();

    assert_eq!(persistent.mmr(), &before);
    assert_eq!(persistent.mmr().size(), before.size());
    assert_eq!(persistent.mmr().leaf_values(), before.leaf_values());
}

#[test]
fn missing_node_is_detected() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent.append_batch((0..5).map(Hash::from_u64)).unwrap();

    let key = to_bytes(&KeyFormat::node(3)).unwrap();
    persistent.db().delete(key).unwrap();
    drop(persistent);

    let Err(err) = Persistent::load(&path) else {
        panic!("loading should fail");
    };
    assert!(matches!(err, Error::DatabaseConsistency(_)));
}

#[test]
fn tampered_hash_is_detected() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent.append_batch((0..5).map(Hash::from_u64)).unwrap();

    let key = to_bytes(&KeyFormat::leaf(2)).unwrap();
    let value = to_bytes(&ValueFormat::V1(ValueV1::Hash(Hash::from_u64(100)))).unwrap();
    persistent.db().put(key, value).unwrap();
    drop(persistent);

    let Err(err) = Persistent::load(&path) else {
        panic!("loading should fail");
    };
    assert!(matches!(err, Error::DatabaseConsistency(_)));
}

#[test]
fn node_beyond_width_is_detected() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent.append_batch((0..3).map(Hash::from_u64)).unwrap();

    let key = to_bytes(&KeyFormat::node(10)).unwrap();
    let value = to_bytes(&ValueFormat::V1(ValueV1::Hash(Hash::ZERO))).unwrap();
    persistent.db().put(key, value).unwrap();
    drop(persistent);

    let Err(err) = Persistent::load(&path) else {
        panic!("loading should fail");
    };
    assert!(matches!(err, Error::DatabaseConsistency(_)));
}

#[test]
fn width_without_entries_is_detected() {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    persistent.append_batch((0..3).map(Hash::from_u64)).unwrap();

    for width in [u64::MAX >> 2, u64::MAX] {
        let key = to_bytes(&KeyFormat::width()).unwrap();
        let value = to_bytes(&ValueFormat::V1(ValueV1::Width(width))).unwrap();
        persistent.db().put(key, value).unwrap();

        let Err(err) = load::load_mmr(persistent.db()) else {
            panic!("loading should fail");
        };
        assert!(matches!(err, Error::DatabaseConsistency(_)));
    }
}

#[proptest(cases = cases())]
fn load_matches_in_memory(values: Vec<Hash>) {
    let (_dir, path) = setup_path();

    let mut persistent = Persistent::new(&path).unwrap();
    for value in &values {
        persistent.append(*value).unwrap();
    }
    drop(persistent);

    let persistent = Persistent::load(&path).unwrap();
    let expected: Mmr = values.into_iter().collect();

    assert_eq!(persistent.mmr().root(), expected.root());
    assert_eq!(persistent.mmr().leaf_values(), expected.leaf_values());
}

#[proptest(cases = cases())]
fn append_batch_same_as_append(values: Vec<Hash>) {
    let (_dir1, path1) = setup_path();
    let (_dir2, path2) = setup_path();

    let mut one_by_one = Persistent::new(&path1).unwrap();
    for value in &values {
        one_by_one.append(*value).unwrap();
    }

    let mut batched = Persistent::new(&path2).unwrap();
    batched.append_batch(values).unwrap();

    assert_eq!(one_by_one.mmr().root(), batched.mmr().root());
}
