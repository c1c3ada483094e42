//! Manifest files consumed by the benchmark orchestration

pub mod writer;

pub use writer::*;
