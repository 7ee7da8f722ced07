// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A newline-delimited-JSON append-only log, one `Event` per line. The only
//! durable record of what happened; `MaterializedState` is always
//! reconstructible by replaying it from the start (SPEC_FULL §2.2).

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

/// An append-only event log backed by a single file.
///
/// `next_unprocessed`/`mark_processed` let a replayer resume from a
/// checkpoint (e.g. after loading a snapshot) without re-applying events
/// it has already materialized.
pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
}

impl Wal {
    /// Open (creating if absent) the log at `path`. `start_seq` is the
    /// sequence number already reflected in a prior snapshot, if any; events
    /// at or below it are skipped by `next_unprocessed`.
    pub fn open(path: impl AsRef<Path>, start_seq: u64) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;

        let mut write_seq = 0u64;
        for entry in read_entries(&path)? {
            write_seq = write_seq.max(entry?.seq);
        }

        Ok(Self {
            path,
            file,
            write_seq,
            processed_seq: start_seq,
        })
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append `event`, returning its assigned sequence number.
    pub fn append(&mut self, event: &Event) -> io::Result<u64> {
        self.write_seq += 1;
        let entry = WalEntry {
            seq: self.write_seq,
            event: event.clone(),
        };
        let mut line = serde_json::to_vec(&entry).map_err(io::Error::other)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// The next entry after `processed_seq`, without advancing it — the
    /// caller marks progress explicitly once the entry is applied.
    pub fn next_unprocessed(&mut self) -> io::Result<Option<WalEntry>> {
        for entry in read_entries(&self.path)? {
            let entry = entry?;
            if entry.seq > self.processed_seq {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    pub fn mark_processed(&mut self, seq: u64) -> io::Result<()> {
        self.processed_seq = self.processed_seq.max(seq);
        Ok(())
    }
}

fn read_entries(path: &Path) -> io::Result<impl Iterator<Item = io::Result<WalEntry>>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(
            serde_json::from_str::<WalEntry>(&line).map_err(io::Error::other),
        ),
        Err(err) => Some(Err(err)),
    }))
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
