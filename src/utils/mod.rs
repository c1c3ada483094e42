//! Utility functions module
//!
//! This module contains leaf helpers: container naming, container URL
//! parsing, and date/time conversion.

pub mod datetime;
pub mod naming;

pub use datetime::*;
pub use naming::*;
