use std::path::PathBuf;
use thiserror::Error;

/// Main error type for blobstage operations
#[derive(Debug, Error)]
pub enum StageError {
    #[error(
        "Required environment variable(s) not set or empty: {}",
        .variables.join(", ")
    )]
    MissingCredentials { variables: Vec<String> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid SAS window: {0}")]
    InvalidSasWindow(String),

    #[error("Could not create container '{container}': {details}")]
    ContainerCreation { container: String, details: String },

    #[error("Failed to delete the container '{container}': {details}")]
    ContainerDeletion { container: String, details: String },

    #[error("Failed to generate SAS for container '{container}': {details}")]
    SignatureMinting { container: String, details: String },

    #[error("Refusing to write empty manifest: {}", .path.display())]
    EmptyManifest { path: PathBuf },

    #[error("Failed to write manifest {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl StageError {
    pub fn missing_credentials<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingCredentials {
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_sas_window<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSasWindow(msg.into())
    }

    pub fn container_creation<S: Into<String>, D: ToString>(container: S, details: D) -> Self {
        Self::ContainerCreation {
            container: container.into(),
            details: details.to_string(),
        }
    }

    pub fn container_deletion<S: Into<String>, D: ToString>(container: S, details: D) -> Self {
        Self::ContainerDeletion {
            container: container.into(),
            details: details.to_string(),
        }
    }

    pub fn signature_minting<S: Into<String>, D: ToString>(container: S, details: D) -> Self {
        Self::SignatureMinting {
            container: container.into(),
            details: details.to_string(),
        }
    }
}

/// Result type alias for blobstage operations
pub type Result<T> = std::result::Result<T, StageError>;
