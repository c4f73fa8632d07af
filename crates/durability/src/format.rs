//! Record log file format.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Log Header (32 bytes)              │
//! ├────────────────────────────────────┤
//! │ Frame 1                            │
//! ├────────────────────────────────────┤
//! │ Frame 2                            │
//! ├────────────────────────────────────┤
//! │ ...                                │
//! └────────────────────────────────────┘
//! ```
//!
//! # Header Layout
//!
//! ```text
//! ┌──────────────┬──────────────────┬──────────────┬─────────────────────┐
//! │ Magic (4)    │ Format Ver (4)   │ Reserved (8) │ Database UUID (16)  │
//! └──────────────┴──────────────────┴──────────────┴─────────────────────┘
//! ```
//!
//! # Frame Layout
//!
//! ```text
//! ┌─────────────────┬──────────────────┬─────────────────────────┬──────────┐
//! │ Length (4 bytes)│ Format Ver (1)   │ Payload (MessagePack)   │ CRC32 (4)│
//! └─────────────────┴──────────────────┴─────────────────────────┴──────────┘
//! ```
//!
//! The length field covers format version, payload and CRC. The CRC covers
//! format version and payload. All integers are little-endian.

use crc32fast::Hasher;
use thiserror::Error;

/// Magic bytes identifying a record log: "PNTR"
pub const LOG_MAGIC: [u8; 4] = *b"PNTR";

/// Current file format version
pub const LOG_FORMAT_VERSION: u32 = 1;

/// Size of the log header in bytes
pub const LOG_HEADER_SIZE: usize = 32;

/// Current frame format version
pub const FRAME_FORMAT_VERSION: u8 = 1;

/// Frames larger than this are treated as corrupt length fields
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Record log header (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    /// Magic bytes: "PNTR"
    pub magic: [u8; 4],
    /// File format version
    pub format_version: u32,
    /// UUID of the database that owns the log
    pub database_uuid: [u8; 16],
}

impl LogHeader {
    /// Create a header for a new log.
    pub fn new(database_uuid: [u8; 16]) -> Self {
        LogHeader {
            magic: LOG_MAGIC,
            format_version: LOG_FORMAT_VERSION,
            database_uuid,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; LOG_HEADER_SIZE] {
        let mut bytes = [0u8; LOG_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.format_version.to_le_bytes());
        bytes[16..32].copy_from_slice(&self.database_uuid);
        bytes
    }

    /// Deserialize header from bytes.
    pub fn from_bytes(bytes: &[u8; LOG_HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[4..8]);
        let mut database_uuid = [0u8; 16];
        database_uuid.copy_from_slice(&bytes[16..32]);
        LogHeader {
            magic,
            format_version: u32::from_le_bytes(version),
            database_uuid,
        }
    }

    /// Magic and version are the ones this build writes.
    pub fn is_valid(&self) -> bool {
        self.magic == LOG_MAGIC && self.format_version == LOG_FORMAT_VERSION
    }
}

/// Errors decoding a single frame
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Not enough bytes for a complete frame (torn write)
    #[error("insufficient data for frame")]
    InsufficientData,

    /// Length field is zero, too small or too large
    #[error("invalid frame length {0}")]
    InvalidLength(usize),

    /// Stored CRC does not match the computed one
    #[error("checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// CRC stored in the frame
        expected: u32,
        /// CRC computed over the frame contents
        computed: u32,
    },

    /// Frame was written by an unknown format version
    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),
}

fn crc(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Wrap a payload in a frame.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(1 + payload.len());
    body.push(FRAME_FORMAT_VERSION);
    body.extend_from_slice(payload);
    let checksum = crc(&body);

    let total_len = body.len() + 4;
    let mut frame = Vec::with_capacity(4 + total_len);
    frame.extend_from_slice(&(total_len as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    frame.extend_from_slice(&checksum.to_le_bytes());
    frame
}

/// Decode the frame at the start of `bytes`.
///
/// Returns `(payload, bytes_consumed)` on success.
pub fn decode_frame(bytes: &[u8]) -> Result<(&[u8], usize), FrameError> {
    if bytes.len() < 4 {
        return Err(FrameError::InsufficientData);
    }
    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&bytes[0..4]);
    let length = u32::from_le_bytes(len_bytes) as usize;

    // Minimum: 1 byte format version + 4 bytes CRC
    if length < 5 || length > MAX_FRAME_LEN {
        return Err(FrameError::InvalidLength(length));
    }
    if bytes.len() < 4 + length {
        return Err(FrameError::InsufficientData);
    }

    let body = &bytes[4..4 + length - 4];
    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&bytes[4 + length - 4..4 + length]);
    let expected = u32::from_le_bytes(crc_bytes);
    let computed = crc(body);
    if expected != computed {
        return Err(FrameError::ChecksumMismatch { expected, computed });
    }

    if body[0] != FRAME_FORMAT_VERSION {
        return Err(FrameError::UnsupportedVersion(body[0]));
    }

    Ok((&body[1..], 4 + length))
}
