//! # Formats
//!
//! - `persistence`: binary snapshot and record-list encoding
//! - `browser`: JSON layout of the browser edition's local storage

pub mod browser;
pub mod persistence;

pub use browser::{BrowserBudget, BrowserExport, BrowserTransaction};
pub use persistence::{
    MAX_SNAPSHOT_SIZE, PersistenceHeader, decode_counter, decode_list, encode_counter,
    encode_list, is_snapshot, records_from_bytes, records_to_bytes,
};
