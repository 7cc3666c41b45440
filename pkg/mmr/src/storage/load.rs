use primitives::Hash;
use rocksdb::{IteratorMode, DB};

use crate::{index, Mmr};

use super::{
    format::{from_bytes, to_bytes, KeyFormat, KeyV1, ValueFormat, ValueV1},
    Error,
};

pub(super) fn load_mmr(db: &DB) -> Result<Mmr, Error> {
    let width = stored_width(db)?;
    let size = index::size(width);

    let mut node_entries = Vec::new();
    let mut leaf_entries = Vec::new();

    for entry in db.iterator(IteratorMode::Start) {
        let (key, value) = entry?;

        let KeyFormat::V1(key) = from_bytes(&key)?;
        let ValueFormat::V1(value) = from_bytes(&value)?;

        match (key, value) {
            (KeyV1::Width, ValueV1::Width(_)) => {}
            (KeyV1::Node(index), ValueV1::Hash(hash)) => node_entries.push((index, hash)),
            (KeyV1::Leaf(ordinal), ValueV1::Hash(value)) => leaf_entries.push((ordinal, value)),
            (key, value) => {
                return Err(inconsistent(format!("unexpected value {value:?} for {key:?}")));
            }
        }
    }

    // the stored width sizes the allocations below, so it must be backed by actual entries
    if (node_entries.len() as u64) < size || (leaf_entries.len() as u64) < width {
        return Err(inconsistent(format!(
            "width {width} needs {size} nodes and {width} leaves, found {} and {}",
            node_entries.len(),
            leaf_entries.len(),
        )));
    }

    let mut nodes = vec![None; to_usize(size)?];
    let mut leaves = vec![None; to_usize(width)?];

    for (index, hash) in node_entries {
        let slot = index
            .checked_sub(1)
            .and_then(|i| nodes.get_mut(usize::try_from(i).ok()?))
            .ok_or_else(|| inconsistent(format!("node {index} is beyond size {size}")))?;
        *slot = Some(hash);
    }

    for (ordinal, value) in leaf_entries {
        let slot = usize::try_from(ordinal)
            .ok()
            .and_then(|i| leaves.get_mut(i))
            .ok_or_else(|| inconsistent(format!("leaf {ordinal} is beyond width {width}")))?;
        *slot = Some(value);
    }

    let nodes = collect_all(nodes, "node")?;
    let leaves = collect_all(leaves, "leaf")?;

    let mmr = Mmr::from_parts(leaves, nodes)?;
    mmr.validate()
        .map_err(|err| inconsistent(err.to_string()))?;

    tracing::info!(width, size, root = %mmr.root(), "loaded mmr");

    Ok(mmr)
}

fn stored_width(db: &DB) -> Result<u64, Error> {
    let Some(bytes) = db.get(to_bytes(&KeyFormat::width())?)? else {
        // nothing has been written yet
        return Ok(0);
    };

    match from_bytes(&bytes)? {
        ValueFormat::V1(ValueV1::Width(width)) if width <= index::MAX_WIDTH => Ok(width),
        ValueFormat::V1(ValueV1::Width(width)) => {
            Err(inconsistent(format!("stored width {width} is too large")))
        }
        ValueFormat::V1(value) => Err(inconsistent(format!("width stored as {value:?}"))),
    }
}

fn collect_all(slots: Vec<Option<Hash>>, kind: &str) -> Result<Vec<Hash>, Error> {
    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.ok_or_else(|| inconsistent(format!("missing {kind} {i}"))))
        .collect()
}

fn to_usize(n: u64) -> Result<usize, Error> {
    usize::try_from(n).map_err(|_| inconsistent(format!("{n} entries don't fit in memory")))
}

fn inconsistent(message: String) -> Error {
    Error::DatabaseConsistency(message)
}
