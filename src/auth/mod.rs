//! Authentication module for Azure Storage
//!
//! This module resolves shared-key credentials for the default and
//! secondary storage accounts from the environment.

pub mod credentials;

pub use credentials::*;
