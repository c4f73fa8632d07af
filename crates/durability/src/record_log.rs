//! Append-only record log.
//!
//! One frame per committed recipe, in id order. The vector index is not
//! persisted; it is rebuilt from the `(id, embedding)` pairs on replay.
//!
//! Appends are fsynced before they return. On replay, the first torn or
//! corrupt frame ends the log: it and everything after it are truncated.

use crate::format::{decode_frame, encode_frame, LogHeader, LOG_HEADER_SIZE};
use pantry_core::{RecipeFields, RecordId};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors from the record log
#[derive(Debug, Error)]
pub enum LogError {
    /// Underlying file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header is missing, has the wrong magic or an unknown version
    #[error("invalid log header: {0}")]
    InvalidHeader(String),

    /// A record could not be encoded
    #[error("encode error: {0}")]
    Encode(String),

    /// A checksummed frame held a payload that does not decode
    #[error("undecodable record at offset {offset}: {detail}")]
    Decode {
        /// File offset of the frame
        offset: u64,
        /// Decoder message
        detail: String,
    },

    /// Replay found ids out of order
    #[error("record id {found} follows {previous}")]
    OutOfOrder {
        /// Previous id in the log
        previous: RecordId,
        /// Offending id
        found: RecordId,
    },
}

impl From<LogError> for pantry_core::Error {
    fn from(e: LogError) -> Self {
        match e {
            LogError::Io(io) => pantry_core::Error::Io(io),
            LogError::Encode(msg) => pantry_core::Error::Serialization(msg),
            other => pantry_core::Error::Corruption(other.to_string()),
        }
    }
}

/// A recipe as persisted in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Assigned id
    pub id: RecordId,
    /// Validated fields
    pub fields: RecipeFields,
    /// Embedding of the canonical text
    pub embedding: Vec<f32>,
}

/// Outcome of [`RecordLog::replay`]
#[derive(Debug, Default)]
pub struct ReplayResult {
    /// Intact records, in log order
    pub records: Vec<StoredRecord>,
    /// Bytes removed from a torn or corrupt tail
    pub truncated_bytes: u64,
}

/// Append-only, checksummed record log
pub struct RecordLog {
    file: File,
    path: PathBuf,
    database_uuid: [u8; 16],
    /// Current end of file
    len: u64,
}

impl RecordLog {
    /// Open the log at `path`, creating it with a fresh header if missing.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        if !path.exists() {
            return Self::create(path);
        }

        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let mut header_bytes = [0u8; LOG_HEADER_SIZE];
        file.read_exact(&mut header_bytes).map_err(|e| {
            LogError::InvalidHeader(format!("{}: {}", path.display(), e))
        })?;
        let header = LogHeader::from_bytes(&header_bytes);
        if !header.is_valid() {
            return Err(LogError::InvalidHeader(format!(
                "{}: bad magic or version {}",
                path.display(),
                header.format_version
            )));
        }
        let len = file.seek(SeekFrom::End(0))?;

        debug!(target: "pantry::log", path = %path.display(), len, "Opened record log");
        Ok(RecordLog {
            file,
            path: path.to_path_buf(),
            database_uuid: header.database_uuid,
            len,
        })
    }

    fn create(path: &Path) -> Result<Self, LogError> {
        let database_uuid = *Uuid::new_v4().as_bytes();
        let mut file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)?;
        file.write_all(&LogHeader::new(database_uuid).to_bytes())?;
        file.sync_all()?;

        info!(
            target: "pantry::log",
            path = %path.display(),
            uuid = %Uuid::from_bytes(database_uuid),
            "Created record log"
        );
        Ok(RecordLog {
            file,
            path: path.to_path_buf(),
            database_uuid,
            len: LOG_HEADER_SIZE as u64,
        })
    }

    /// Read every intact record.
    ///
    /// Stops at the first torn or corrupt frame and truncates the file there.
    /// A frame whose checksum holds but whose payload does not decode is a
    /// hard error and nothing is truncated.
    pub fn replay(&mut self) -> Result<ReplayResult, LogError> {
        self.file.seek(SeekFrom::Start(LOG_HEADER_SIZE as u64))?;
        let mut buffer = Vec::new();
        self.file.read_to_end(&mut buffer)?;

        let mut result = ReplayResult::default();
        let mut offset = 0usize;
        let mut previous: Option<RecordId> = None;

        while offset < buffer.len() {
            match decode_frame(&buffer[offset..]) {
                Ok((payload, consumed)) => {
                    let record: StoredRecord =
                        rmp_serde::from_slice(payload).map_err(|e| LogError::Decode {
                            offset: (LOG_HEADER_SIZE + offset) as u64,
                            detail: e.to_string(),
                        })?;
                    if let Some(prev) = previous {
                        if record.id <= prev {
                            return Err(LogError::OutOfOrder {
                                previous: prev,
                                found: record.id,
                            });
                        }
                    }
                    previous = Some(record.id);
                    result.records.push(record);
                    offset += consumed;
                }
                Err(e) => {
                    let valid_end = (LOG_HEADER_SIZE + offset) as u64;
                    let dropped = buffer.len() - offset;
                    warn!(
                        target: "pantry::log",
                        offset = valid_end,
                        dropped_bytes = dropped,
                        reason = %e,
                        "Truncating torn record log tail"
                    );
                    self.truncate(valid_end)?;
                    result.truncated_bytes = dropped as u64;
                    break;
                }
            }
        }

        // Position at the end for subsequent appends
        self.len = self.file.seek(SeekFrom::End(0))?;
        info!(
            target: "pantry::log",
            records = result.records.len(),
            truncated_bytes = result.truncated_bytes,
            "Replayed record log"
        );
        Ok(result)
    }

    /// Append one record and fsync.
    ///
    /// Returns the log length before the append, which can be passed to
    /// [`RecordLog::truncate`] to undo it.
    pub fn append(&mut self, record: &StoredRecord) -> Result<u64, LogError> {
        let payload =
            rmp_serde::to_vec_named(record).map_err(|e| LogError::Encode(e.to_string()))?;
        let frame = encode_frame(&payload);
        let before = self.len;

        self.file.seek(SeekFrom::Start(before))?;
        let written = self
            .file
            .write_all(&frame)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = written {
            // Leave no partial frame behind
            let _ = self.truncate(before);
            return Err(LogError::Io(e));
        }
        self.len = before + frame.len() as u64;

        debug!(target: "pantry::log", id = %record.id, bytes = frame.len(), "Appended record");
        Ok(before)
    }

    /// Cut the log back to `len` bytes.
    pub fn truncate(&mut self, len: u64) -> Result<(), LogError> {
        let len = len.max(LOG_HEADER_SIZE as u64);
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.file.seek(SeekFrom::Start(len))?;
        self.len = len;
        Ok(())
    }

    /// Current length in bytes (header included)
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the log holds no records
    pub fn is_empty(&self) -> bool {
        self.len == LOG_HEADER_SIZE as u64
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// UUID written into the header at creation
    pub fn database_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.database_uuid)
    }
}

impl std::fmt::Debug for RecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLog")
            .field("path", &self.path)
            .field("len", &self.len)
            .finish()
    }
}
