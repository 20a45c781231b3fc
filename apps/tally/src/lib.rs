//! # Tally
//!
//! The Tally application: command line interface, TOML configuration and
//! the local HTTP API over the `tally-core` ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │              apps/tally (THE BINARY)           │
//! │                                                │
//! │  ┌──────────┐   ┌──────────┐   ┌────────────┐  │
//! │  │   CLI    │   │ HTTP API │   │   Config   │  │
//! │  │  (clap)  │   │  (axum)  │   │   (toml)   │  │
//! │  └────┬─────┘   └────┬─────┘   └─────┬──────┘  │
//! │       └──────────────┼───────────────┘         │
//! │                      ▼                         │
//! │              ┌───────────────┐                 │
//! │              │  tally-core   │                 │
//! │              │ (THE LOGIC)   │                 │
//! │              └───────────────┘                 │
//! └────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod config;
