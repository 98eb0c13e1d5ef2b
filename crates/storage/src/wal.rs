// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! The log is a UTF-8 text file: a version header line followed by one
//! [`rk_core::codec`] record per line, in application order. A file that
//! does not start with the header or is not valid UTF-8 is never replayed;
//! it is renamed to `<name>.corrupt.<reason>.<millis>` and the node starts
//! from an empty log instead. Bytes after the last newline are a torn
//! append and are cut off before any of the checks above.

use rk_core::{decode_record, encode_record, Operation};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// First line of every WAL file
pub const WAL_HEADER: &str = "RKWAL 1";

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why a WAL file was moved aside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineReason {
    /// First line is not [`WAL_HEADER`]
    Header,
    /// Contents are not valid UTF-8
    Encoding,
}

impl QuarantineReason {
    pub fn as_str(self) -> &'static str {
        match self {
            QuarantineReason::Header => "header",
            QuarantineReason::Encoding => "encoding",
        }
    }
}

/// Write-ahead log for durable operation storage
pub struct Wal {
    file: File,
    path: PathBuf,
    records: u64,
    quarantined: Option<PathBuf>,
}

/// Result of inspecting a WAL file on disk
enum Scan {
    Missing,
    /// Zero-length file, or a header torn before its newline
    Empty,
    Corrupt(QuarantineReason),
    Valid {
        ops: Vec<Operation>,
        skipped: usize,
        /// Bytes up to and including the last newline
        complete_len: u64,
        total_len: u64,
    },
}

impl Wal {
    /// Open or create a WAL at the given path
    ///
    /// Quarantines an unreadable file and truncates a torn trailing line
    /// left by a crash mid-append.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let mut quarantined = None;
        let scan = match scan(path)? {
            Scan::Corrupt(reason) => {
                quarantined = Some(quarantine(path, reason)?);
                Scan::Missing
            }
            other => other,
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        let mut wal = Self {
            file,
            path: path.to_path_buf(),
            records: 0,
            quarantined,
        };

        match scan {
            Scan::Missing | Scan::Empty | Scan::Corrupt(_) => wal.write_header()?,
            Scan::Valid {
                ops,
                complete_len,
                total_len,
                ..
            } => {
                if complete_len < total_len {
                    warn!(
                        path = %path.display(),
                        dropped_bytes = total_len - complete_len,
                        "truncating torn record at end of WAL"
                    );
                    wal.file.set_len(complete_len)?;
                    wal.file.sync_all()?;
                }
                wal.records = ops.len() as u64;
            }
        }

        debug!(path = %path.display(), records = wal.records, "WAL opened");
        Ok(wal)
    }

    /// Append an operation to the log, durably
    ///
    /// Returns the number of records in the log after the append. A failed
    /// append leaves no partial line behind.
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        self.append_batch(std::slice::from_ref(op))
    }

    /// Append several operations with one write and one sync
    ///
    /// All-or-nothing: on failure the file is cut back to its previous length.
    pub fn append_batch(&mut self, ops: &[Operation]) -> Result<u64, WalError> {
        if ops.is_empty() {
            return Ok(self.records);
        }

        let mut buf = String::new();
        for op in ops {
            buf.push_str(&encode_record(op));
            buf.push('\n');
        }

        let before = self.file.metadata()?.len();
        let written = self
            .file
            .write_all(buf.as_bytes())
            .and_then(|()| self.file.sync_all());
        if let Err(e) = written {
            if let Err(rollback) = self.file.set_len(before) {
                warn!(error = %rollback, "failed to roll back partial WAL batch");
            }
            return Err(e.into());
        }

        self.records += ops.len() as u64;
        Ok(self.records)
    }

    /// Read every valid record in file order
    ///
    /// A missing file reads as empty. A corrupt file is quarantined and a
    /// fresh log takes its place. Lines that fail to decode are skipped.
    pub fn read_all(&mut self) -> Result<Vec<Operation>, WalError> {
        match scan(&self.path)? {
            Scan::Missing | Scan::Empty => {
                // Later appends must land after a header
                self.reset()?;
                Ok(Vec::new())
            }
            Scan::Corrupt(reason) => {
                self.quarantined = Some(quarantine(&self.path, reason)?);
                self.reset()?;
                Ok(Vec::new())
            }
            Scan::Valid { ops, skipped, .. } => {
                if skipped > 0 {
                    warn!(
                        path = %self.path.display(),
                        skipped,
                        "skipped undecodable WAL records"
                    );
                }
                Ok(ops)
            }
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended or found at open
    pub fn len(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Where the most recent corrupt file was moved to, if any
    pub fn quarantined(&self) -> Option<&Path> {
        self.quarantined.as_deref()
    }

    /// Send later writes to `file` instead of the log file
    #[cfg(any(test, feature = "test-support"))]
    pub fn redirect_writes(&mut self, file: File) {
        self.file = file;
    }

    /// Replace a moved, deleted or emptied file with a fresh log
    fn reset(&mut self) -> Result<(), WalError> {
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&self.path)?;
        self.records = 0;
        self.write_header()
    }

    fn write_header(&mut self) -> Result<(), WalError> {
        self.file.set_len(0)?;
        writeln!(self.file, "{}", WAL_HEADER)?;
        self.file.sync_all()?;
        Ok(())
    }
}

fn scan(path: &Path) -> Result<Scan, WalError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Scan::Missing),
        Err(e) => return Err(e.into()),
    };
    if bytes.is_empty() {
        return Ok(Scan::Empty);
    }

    // Only newline-terminated lines are records; anything after the last
    // newline is a torn write and may end mid-character
    let total_len = bytes.len();
    let complete_len = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let torn_header = WAL_HEADER.as_bytes().starts_with(&bytes[complete_len..]);
    let mut bytes = bytes;
    bytes.truncate(complete_len);

    let Ok(text) = String::from_utf8(bytes) else {
        return Ok(Scan::Corrupt(QuarantineReason::Encoding));
    };
    let mut lines = text.split_terminator('\n');

    match lines.next() {
        Some(WAL_HEADER) => {}
        Some(_) => return Ok(Scan::Corrupt(QuarantineReason::Header)),
        None if torn_header => return Ok(Scan::Empty),
        None => return Ok(Scan::Corrupt(QuarantineReason::Header)),
    }

    let mut ops = Vec::new();
    let mut skipped = 0;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        match decode_record(line) {
            Ok(op) => ops.push(op),
            Err(e) => {
                debug!(error = %e, "skipping WAL record");
                skipped += 1;
            }
        }
    }

    Ok(Scan::Valid {
        ops,
        skipped,
        complete_len: complete_len as u64,
        total_len: total_len as u64,
    })
}

/// Move a corrupt file aside so the node can boot with an empty log
fn quarantine(path: &Path, reason: QuarantineReason) -> Result<PathBuf, WalError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "wal".to_string());
    let target = path.with_file_name(format!(
        "{}.corrupt.{}.{}",
        file_name,
        reason.as_str(),
        chrono::Utc::now().timestamp_millis()
    ));

    fs::rename(path, &target)?;
    warn!(
        from = %path.display(),
        to = %target.display(),
        reason = reason.as_str(),
        "quarantined unreadable WAL"
    );
    Ok(target)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
