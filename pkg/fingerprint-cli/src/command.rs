use std::{io::Write, path::PathBuf};

use clap::{ArgGroup, Args, Subcommand};
use color_eyre::Result;
use fingerprint::{keccak256, Accumulator, FingerprintLog, Hash};
use serde::Serialize;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a fingerprint, unless it was recorded before
    Append(AppendArgs),

    /// Check whether a fingerprint has been recorded
    Check {
        /// The fingerprint, as 32 hex encoded bytes
        hash: Hash,
    },

    /// Print the root, size, width and peaks of the log
    Info,

    /// Print the children of a branch node
    Children {
        /// Node index
        index: u64,
    },

    /// Print an inclusion proof for a leaf as JSON
    Proof {
        /// Leaf index
        index: u64,
    },

    /// Verify the leaf at an index against the current root
    Verify {
        /// Leaf index
        index: u64,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["hash", "file", "data"])))]
pub struct AppendArgs {
    /// A precomputed fingerprint, as 32 hex encoded bytes
    #[arg(long)]
    hash: Option<Hash>,

    /// Fingerprint the contents of this file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Fingerprint this string
    #[arg(long)]
    data: Option<String>,
}

impl AppendArgs {
    fn fingerprint(&self) -> Result<Hash> {
        match (&self.hash, &self.file, &self.data) {
            (Some(hash), _, _) => Ok(*hash),
            (_, Some(path), _) => Ok(keccak256(std::fs::read(path)?)),
            (_, _, Some(data)) => Ok(keccak256(data.as_bytes())),
            (None, None, None) => Err(eyre::eyre!("one of --hash, --file or --data is required")),
        }
    }
}

#[derive(Debug, Serialize)]
struct Info {
    root: Hash,
    size: u64,
    width: u64,
    peaks: Vec<Hash>,
}

#[derive(Debug, Serialize)]
struct Children {
    left: u64,
    right: u64,
}

impl Command {
    pub fn run<A, W>(self, log: &mut FingerprintLog<A>, out: &mut W) -> Result<()>
    where
        A: Accumulator,
        W: Write,
    {
        match self {
            Self::Append(args) => {
                let hash = args.fingerprint()?;
                writeln!(out, "data hash: {hash}")?;

                if let Some(leaf_index) = log.leaf_index_of(hash) {
                    writeln!(out, "already appended at leaf {leaf_index}")?;
                    return Ok(());
                }

                let leaf_index = log.append_data(hash)?;
                writeln!(out, "appended at leaf {leaf_index}")?;
                writeln!(out, "root: {}", log.root())?;
            }
            Self::Check { hash } => match log.leaf_index_of(hash) {
                Some(leaf_index) => writeln!(out, "appended at leaf {leaf_index}")?,
                None => writeln!(out, "not appended")?,
            },
            Self::Info => {
                let info = Info {
                    root: log.root(),
                    size: log.size(),
                    width: log.width(),
                    peaks: log.peaks(),
                };
                print_json(out, &info)?;
            }
            Self::Children { index } => {
                let (left, right) = log.children(index)?;
                print_json(out, &Children { left, right })?;
            }
            Self::Proof { index } => {
                let proof = log.merkle_proof(index)?;
                print_json(out, &proof)?;
            }
            Self::Verify { index } => match log.verify_hash(index)? {
                true => writeln!(out, "valid")?,
                false => writeln!(out, "invalid")?,
            },
        }

        Ok(())
    }
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
