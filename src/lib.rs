//! IndexTune - A lightweight online index-tuning advisor implemented in Rust
//!
//! This crate provides the core decision engine that watches a stream of SQL
//! statements and continuously recommends which indexes should currently be
//! materialized, trading query speed-up against index creation cost without
//! ever seeing future statements.

pub mod advisor;
pub mod candidate;
pub mod config;
pub mod core;
pub mod hotset;
pub mod oracle;
pub mod partition;
pub mod stats;
pub mod wfa;
