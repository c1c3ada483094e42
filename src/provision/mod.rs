//! Provisioning of benchmark stage locations
//!
//! Each operation resolves credentials, creates or locates a container,
//! mints a SAS for it and writes the stage manifest.

pub mod provisioner;

pub use provisioner::Provisioner;
