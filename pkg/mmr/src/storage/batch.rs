use rocksdb::{WriteBatch, DB};

use crate::{index, Mmr};

use super::{
    format::{to_bytes, KeyFormat, ValueFormat, ValueV1},
    Error,
};

/// Write everything `mmr` gained since it had `width` leaves in a single atomic batch
pub(super) fn write_since(db: &DB, mmr: &Mmr, width: u64) -> Result<(), Error> {
    if mmr.width() == width {
        return Ok(());
    }

    let mut batch = WriteBatch::default();

    for index in index::size(width) + 1..=mmr.size() {
        let Some(hash) = mmr.node(index) else {
            return Err(Error::DatabaseConsistency(format!(
                "node {index} missing from memory"
            )));
        };

        let key = KeyFormat::node(index);
        let value = ValueFormat::V1(ValueV1::Hash(hash));
        batch.put(to_bytes(&key)?, to_bytes(&value)?);
    }

    let new_leaves = mmr.leaf_values().iter().zip(0..).skip(width as usize);
    for (value, ordinal) in new_leaves {
        let key = KeyFormat::leaf(ordinal);
        let value = ValueFormat::V1(ValueV1::Hash(*value));
        batch.put(to_bytes(&key)?, to_bytes(&value)?);
    }

    let value = ValueFormat::V1(ValueV1::Width(mmr.width()));
    batch.put(to_bytes(&KeyFormat::width())?, to_bytes(&value)?);

    db.write(batch)?;

    Ok(())
}
