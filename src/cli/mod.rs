//! CLI module for blobstage
//!
//! This module contains the command-line interface: command definitions,
//! argument parsing, and dispatch onto provisioning operations.

pub mod commands;

pub use commands::*;
