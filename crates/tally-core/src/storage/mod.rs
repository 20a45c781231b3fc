//! # Storage
//!
//! Embedded database adapter for the record store.

pub mod redb_store;

pub use redb_store::RedbStore;
