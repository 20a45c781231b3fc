//! # Persistence Format
//!
//! Binary encoding for Tally records and snapshots.
//!
//! Record lists are postcard-encoded `Vec<T>` values stored under their key.
//! A snapshot is every store entry at once:
//!
//! Format: Header (5 bytes) + postcard-serialized `BTreeMap<String, Vec<u8>>`.
//! - 4 bytes: Magic ("TALY")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is decoded.

use crate::store::Entries;
use crate::{primitives, TallyError};
use serde::Serialize;
use serde::de::DeserializeOwned;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum allowed snapshot size.
///
/// Checked BEFORE deserialization so a corrupt or hostile file cannot
/// trigger a huge allocation.
pub const MAX_SNAPSHOT_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Minimum valid snapshot size (header only).
const MIN_FILE_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all snapshot data.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), TallyError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(TallyError::SerializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(TallyError::SerializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TallyError> {
        if bytes.len() < MIN_FILE_SIZE {
            return Err(TallyError::SerializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Check whether bytes start with a Tally snapshot header.
#[must_use]
pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.len() >= MIN_FILE_SIZE && &bytes[0..4] == primitives::MAGIC_BYTES
}

// =============================================================================
// SNAPSHOT FUNCTIONS
// =============================================================================

/// Serialize store entries to snapshot bytes (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn records_to_bytes(entries: &Entries) -> Result<Vec<u8>, TallyError> {
    let header = PersistenceHeader::new();
    let payload = postcard::to_stdvec(entries)
        .map_err(|e| TallyError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_FILE_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize store entries from snapshot bytes.
///
/// Validates, in order: minimum size, maximum size, header magic and version.
pub fn records_from_bytes(bytes: &[u8]) -> Result<Entries, TallyError> {
    if bytes.len() < MIN_FILE_SIZE {
        return Err(TallyError::SerializationError(
            "Data too short: minimum 5 bytes required".to_string(),
        ));
    }

    if bytes.len() > MAX_SNAPSHOT_SIZE {
        return Err(TallyError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[MIN_FILE_SIZE..]).map_err(|e| {
        TallyError::SerializationError(format!("Failed to deserialize snapshot: {}", e))
    })
}

// =============================================================================
// RECORD LIST ENCODING
// =============================================================================

/// Encode a record list for storage under a single key.
pub fn encode_list<T: Serialize>(records: &[T]) -> Result<Vec<u8>, TallyError> {
    postcard::to_stdvec(records).map_err(|e| TallyError::SerializationError(e.to_string()))
}

/// Decode a record list read from the store.
pub fn decode_list<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, TallyError> {
    postcard::from_bytes(bytes).map_err(|e| {
        TallyError::SerializationError(format!("Failed to decode record list: {}", e))
    })
}

/// Encode the id counter.
pub fn encode_counter(value: u64) -> Result<Vec<u8>, TallyError> {
    postcard::to_stdvec(&value).map_err(|e| TallyError::SerializationError(e.to_string()))
}

/// Decode the id counter.
pub fn decode_counter(bytes: &[u8]) -> Result<u64, TallyError> {
    postcard::from_bytes(bytes).map_err(|e| {
        TallyError::SerializationError(format!("Failed to decode id counter: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================
