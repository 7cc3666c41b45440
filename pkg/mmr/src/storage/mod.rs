use std::path::Path;

use primitives::Hash;
use rocksdb::DB;

pub use error::Error;

use crate::Mmr;

mod batch;
mod error;
mod format;
mod load;

#[cfg(test)]
mod tests;

/// A wrapper around [`Mmr`] that persists data to a rocksdb instance
///
/// Every node hash, every raw leaf value, and the width are stored. Peaks and the root are
/// recomputed when the accumulator is loaded.
///
/// ```rust
/// # use mmr::*;
/// # use mmr::storage::*;
/// # let dir = tempdir::TempDir::new("mmr_doctest").unwrap();
/// # let path = dir.path().join("db");
/// let mut persistent = Persistent::new(&path).unwrap();
/// persistent.append(keccak256(b"hello")).unwrap();
/// let root = persistent.mmr().root();
///
/// drop(persistent);
///
/// let persistent = Persistent::load(&path).unwrap();
/// assert_eq!(persistent.mmr().root(), root);
/// ```
pub struct Persistent {
    mmr: Mmr,
    db: DB,
}

impl Persistent {
    /// Create a new, empty [`Persistent`] [`Mmr`] backed by a rocksdb instance at `path`
    ///
    /// `path` should not already contain an accumulator. Use [`Persistent::load`] to open an
    /// existing one.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let db = DB::open_default(path)?;
        let mmr = Mmr::new();

        Ok(Self { mmr, db })
    }

    /// Load a [`Persistent`] [`Mmr`] from a rocksdb database located at `path`
    ///
    /// Loading a location that was never written to gives an empty accumulator
    ///
    /// Every node hash is recomputed from the stored leaf values, and
    /// [`Error::DatabaseConsistency`] is returned if anything is missing or doesn't match
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let db = DB::open_default(path)?;
        let mmr = load::load_mmr(&db)?;

        Ok(Self { mmr, db })
    }

    /// Get a reference to the wrapped accumulator
    ///
    /// ```rust
    /// # use mmr::*;
    /// # use mmr::storage::*;
    /// # let dir = tempdir::TempDir::new("mmr_doctest").unwrap();
    /// # let path = dir.path().join("db");
    /// let persistent = Persistent::new(&path).unwrap();
    ///
    /// assert_eq!(persistent.mmr().root(), Hash::ZERO);
    /// ```
    #[inline]
    #[must_use]
    pub fn mmr(&self) -> &Mmr {
        &self.mmr
    }

    /// Get a reference to the rocksdb instance
    #[inline]
    #[must_use]
    pub fn db(&self) -> &DB {
        &self.db
    }

    /// Split this instance into the [`Mmr`] and [`DB`] that make up this [`Persistent`]
    ///
    /// Since [`Persistent`] doesn't provide any way to get a `&mut Mmr`, this is the only way to
    /// get mutable access to the inner accumulator
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Mmr, DB) {
        let Self { mmr, db } = self;
        (mmr, db)
    }

    /// Append a value to the in-memory accumulator, and persist the new nodes to the backing
    /// rocksdb store
    ///
    /// ```rust
    /// # use mmr::*;
    /// # use mmr::storage::*;
    /// # let dir = tempdir::TempDir::new("mmr_doctest").unwrap();
    /// # let path = dir.path().join("db");
    /// let mut persistent = Persistent::new(&path).unwrap();
    ///
    /// assert_eq!(persistent.append(Hash::from_u64(1)).unwrap(), 1);
    /// assert_eq!(persistent.append(Hash::from_u64(2)).unwrap(), 2);
    /// assert_eq!(persistent.append(Hash::from_u64(3)).unwrap(), 4);
    /// ```
    ///
    /// If the write fails, the in-memory accumulator is rolled back, so a failed append has no
    /// effect
    pub fn append(&mut self, value: Hash) -> Result<u64, Error> {
        let width = self.mmr.width();
        let index = self.mmr.append(value);
        self.persist_since(width)?;

        Ok(index)
    }

    /// Append many values, persisting all of them in a single write
    ///
    /// Either every value is appended, or none are
    pub fn append_batch<I>(&mut self, values: I) -> Result<Vec<u64>, Error>
    where
        I: IntoIterator<Item = Hash>,
    {
        let width = self.mmr.width();
        let indexes = self.mmr.append_batch(values);
        self.persist_since(width)?;

        Ok(indexes)
    }

    fn persist_since(&mut self, width: u64) -> Result<(), Error> {
        match batch::write_since(&self.db, &self.mmr, width) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(
                    ?err,
                    width,
                    discarded = self.mmr.width() - width,
                    "failed to persist appends, rolling back"
                );
                self.mmr.rewind(width);
                Err(err)
            }
        }
    }
}
