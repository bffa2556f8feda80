//! `convertible-rates` library crate.
//!
//! The binary (`cvr`) is a thin wrapper around this library so that:
//!
//! - the ingestion and analysis logic is testable without spawning processes
//! - feeds and storage can be swapped for fakes in tests

pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod io;
pub mod report;
pub mod store;
