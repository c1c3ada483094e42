//! Single-column CSV manifests
//!
//! A manifest is an ordered list of values, one per CSV record, read by
//! the orchestration script that drives the actual data copy.

use crate::error::{Result, StageError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Benchmark stage a manifest describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Local source and upload container
    LocationB,
    /// Server-side copy source and destination containers
    LocationC,
    /// Download container and local destination
    LocationD,
    /// Local results directory and reporting container
    PublishResults,
}

impl Stage {
    /// Fixed manifest file name; `version` tags the benchmarked tool build
    pub fn file_name(&self, version: &str) -> String {
        match self {
            Stage::LocationB => format!("locationB{version}.csv"),
            Stage::LocationC => format!("locationC{version}.csv"),
            Stage::LocationD => format!("locationD{version}.csv"),
            Stage::PublishResults => "publishResultsLocation.csv".to_string(),
        }
    }
}

/// Ordered manifest rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    rows: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, value: S) -> &mut Self {
        self.rows.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// CSV rendering, one record per row
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&escape_field(row));
            out.push('\n');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for Manifest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Quote a field when it holds a delimiter, quote, line break or leading space
fn escape_field(field: &str) -> String {
    let needs_quotes = field.starts_with(' ') || field.contains([',', '"', '\r', '\n']);

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write `manifest` to `path`.
///
/// An empty manifest is rejected before the file is created.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    if manifest.is_empty() {
        return Err(StageError::EmptyManifest {
            path: path.to_path_buf(),
        });
    }

    let write_err = |source| StageError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(path).map_err(write_err)?;
    file.write_all(manifest.to_csv().as_bytes())
        .map_err(write_err)?;
    file.flush().map_err(write_err)?;

    Ok(())
}

/// Writes stage manifests into a fixed output directory
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    output_dir: PathBuf,
}

impl ManifestWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, stage: Stage, version: &str) -> PathBuf {
        self.output_dir.join(stage.file_name(version))
    }

    /// Write the manifest for `stage` and return its path
    pub fn write(&self, stage: Stage, version: &str, manifest: &Manifest) -> Result<PathBuf> {
        let path = self.path_for(stage, version);
        write_manifest(&path, manifest)?;
        tracing::info!("Wrote {} row(s) to {}", manifest.len(), path.display());
        Ok(path)
    }
}
