//! JSONL call tape: the decoder's view of a capture, reduced to the calls the
//! scanner cares about.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dump_entry::DumpCandidate;
use super::events::CallRecord;
use super::registry::scan_records;

pub const CALL_TAPE_SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum TapeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid tape line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Tape header must be the first line (found on line {0})")]
    MisplacedHeader(usize),
    #[error("Missing tape header")]
    MissingHeader,
    #[error("Unsupported tape schema_version {found} (max supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum CallTapeLine {
    Header { schema_version: u32 },
    Entry { record: CallRecord },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTape {
    pub schema_version: u32,
    pub records: Vec<CallRecord>,
}

impl CallTape {
    pub fn new(records: Vec<CallRecord>) -> Self {
        Self {
            schema_version: CALL_TAPE_SCHEMA_VERSION,
            records,
        }
    }

    pub fn write_jsonl_to_path(&self, path: &Path) -> Result<(), TapeError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let header = CallTapeLine::Header {
            schema_version: self.schema_version,
        };
        writeln!(
            writer,
            "{}",
            serde_json::to_string(&header).map_err(std::io::Error::other)?
        )?;
        for record in &self.records {
            let line = CallTapeLine::Entry {
                record: record.clone(),
            };
            writeln!(
                writer,
                "{}",
                serde_json::to_string(&line).map_err(std::io::Error::other)?
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_jsonl_from_path(path: &Path) -> Result<Self, TapeError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut schema_version: Option<u32> = None;
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: CallTapeLine = serde_json::from_str(&line).map_err(|source| {
                TapeError::Parse {
                    line: idx + 1,
                    source,
                }
            })?;
            match parsed {
                CallTapeLine::Header { schema_version: v } => {
                    if idx != 0 {
                        return Err(TapeError::MisplacedHeader(idx + 1));
                    }
                    if v > CALL_TAPE_SCHEMA_VERSION {
                        return Err(TapeError::UnsupportedVersion {
                            found: v,
                            supported: CALL_TAPE_SCHEMA_VERSION,
                        });
                    }
                    schema_version = Some(v);
                }
                CallTapeLine::Entry { record } => {
                    if schema_version.is_none() {
                        return Err(TapeError::MissingHeader);
                    }
                    records.push(record);
                }
            }
        }

        let schema_version = schema_version.ok_or(TapeError::MissingHeader)?;
        Ok(Self {
            schema_version,
            records,
        })
    }

    /// Accepted dump candidates, in acceptance order
    pub fn scan(&self) -> Vec<DumpCandidate> {
        scan_records(&self.records)
    }
}

/// Read a tape and scan it in one go
pub fn scan_tape(path: &Path) -> Result<Vec<DumpCandidate>, TapeError> {
    let tape = CallTape::read_jsonl_from_path(path)?;
    tracing::debug!(
        path = %path.display(),
        records = tape.records.len(),
        "Loaded call tape"
    );
    Ok(tape.scan())
}
