use mmr::{Hash, Mmr};

use crate::Error;

/// The append-only store behind a [`FingerprintLog`]
///
/// Implemented for the in-memory [`Mmr`], and for [`Persistent`] when the `storage` feature is
/// enabled. Implementations must either append every value or none of them.
///
/// [`FingerprintLog`]: crate::FingerprintLog
/// [`Persistent`]: mmr::storage::Persistent
pub trait Accumulator {
    /// The current state of the accumulator
    fn mmr(&self) -> &Mmr;

    /// Append a single value, returning its leaf index
    fn append(&mut self, value: Hash) -> Result<u64, Error>;

    /// Append many values, returning their leaf indexes
    fn append_batch(&mut self, values: Vec<Hash>) -> Result<Vec<u64>, Error>;
}

impl Accumulator for Mmr {
    #[inline]
    fn mmr(&self) -> &Mmr {
        self
    }

    #[inline]
    fn append(&mut self, value: Hash) -> Result<u64, Error> {
        Ok(Mmr::append(self, value))
    }

    fn append_batch(&mut self, values: Vec<Hash>) -> Result<Vec<u64>, Error> {
        Ok(Mmr::append_batch(self, values))
    }
}

#[cfg(feature = "storage")]
impl Accumulator for mmr::storage::Persistent {
    #[inline]
    fn mmr(&self) -> &Mmr {
        mmr::storage::Persistent::mmr(self)
    }

    fn append(&mut self, value: Hash) -> Result<u64, Error> {
        Ok(mmr::storage::Persistent::append(self, value)?)
    }

    fn append_batch(&mut self, values: Vec<Hash>) -> Result<Vec<u64>, Error> {
        Ok(mmr::storage::Persistent::append_batch(self, values)?)
    }
}
