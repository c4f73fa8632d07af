//! Durability layer for pantry
//!
//! This crate handles everything that touches disk:
//!
//! - Record log: one checksummed frame per committed recipe, fsynced on append
//! - Binary on-disk format (header, frame layout)
//! - Replay with torn-tail truncation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod record_log;

pub use format::{
    decode_frame, encode_frame, FrameError, LogHeader, FRAME_FORMAT_VERSION, LOG_FORMAT_VERSION,
    LOG_HEADER_SIZE, LOG_MAGIC,
};
pub use record_log::{LogError, RecordLog, ReplayResult, StoredRecord};

/// File name of the record log inside a data directory
pub const RECORD_LOG_FILE: &str = "recipes.log";
