/// An error that can occur when interacting with a [`Persistent`]
///
/// [`Persistent`]: crate::storage::Persistent
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from rocksdb
    #[error("rocksdb error: {0}")]
    Rocksdb(#[from] rocksdb::Error),

    /// An error with the binary format of the data
    #[error("borsh error: {0}")]
    Borsh(#[from] borsh::io::Error),

    /// The database contained data that doesn't describe a valid accumulator
    #[error("the database contained inconsistent data: {0}")]
    DatabaseConsistency(String),

    /// An error from the in-memory accumulator
    #[error("mmr error: {0}")]
    Mmr(#[from] crate::Error),
}
