//! Azure Blob Storage container operations
//!
//! This module provides container creation and deletion and the
//! generation of container-scoped shared access signatures.

pub mod models;
pub mod store;

// Re-export commonly used types
pub use models::*;
pub use store::{AzureBlobStore, BlobStore};

#[cfg(test)]
pub use store::MockBlobStore;
