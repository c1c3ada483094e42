//! blobstage - Azure Blob Storage staging for data-movement benchmarks
//!
//! Provisions and tears down storage containers, mints container-scoped
//! shared access signatures, and writes the CSV manifests that drive a
//! local -> container -> container -> local copy benchmark.

pub mod auth;
pub mod blob;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod provision;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, StageError};
