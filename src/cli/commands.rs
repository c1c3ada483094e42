//! CLI commands and argument parsing
//!
//! This module defines the command-line interface using clap and maps
//! each subcommand onto a provisioning operation.

use crate::auth::{AccountKind, ProcessEnv};
use crate::blob::AzureBlobStore;
use crate::config::Config;
use crate::error::Result;
use crate::manifest::ManifestWriter;
use crate::provision::Provisioner;
use crate::utils::datetime::parse_hours_lenient;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

/// Get the full version string with build information
fn get_version() -> &'static str {
    env!("VERSION_WITH_GIT")
}

/// Version plus commit and build time, shown by `--version`
fn get_long_version() -> &'static str {
    concat!(
        env!("VERSION_WITH_GIT"),
        "\ncommit: ",
        env!("GIT_HASH"),
        "\nbuilt: ",
        env!("BUILD_TIME")
    )
}

#[derive(Parser, Debug)]
#[command(name = "blobstage")]
#[command(about = "Stage Azure Blob Storage containers and SAS manifests for data-movement benchmarks")]
#[command(version = get_version(), long_version = get_long_version())]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Directory manifests are written to
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Create the upload container and write locationB<version>.csv
    #[command(name = "locB")]
    LocB {
        /// Local directory holding the source data
        local_path: String,
        /// SAS validity in hours
        #[arg(allow_hyphen_values = true)]
        hours: String,
        /// Version tag of the benchmarked tool
        version: String,
    },
    /// Create the copy destination container and write locationC<version>.csv
    #[command(name = "locC")]
    LocC {
        /// URL of the source (location B) container
        container_url: String,
        /// SAS validity in hours
        #[arg(allow_hyphen_values = true)]
        hours: String,
        /// Version tag of the benchmarked tool
        version: String,
    },
    /// Sign the download container and write locationD<version>.csv
    #[command(name = "locD")]
    LocD {
        /// URL of the container to download from
        container_url: String,
        /// SAS validity in hours
        #[arg(allow_hyphen_values = true)]
        hours: String,
        /// Local download directory
        local_path: String,
        /// Version tag of the benchmarked tool
        version: String,
    },
    /// Delete a container in the default account
    #[command(name = "delLocB")]
    DelLocB {
        /// URL of the container to delete
        container_url: String,
    },
    /// Delete a container in the secondary account
    #[command(name = "delLocC")]
    DelLocC {
        /// URL of the container to delete
        container_url: String,
    },
    /// Sign the results container and write publishResultsLocation.csv
    #[command(name = "pubRes")]
    PubRes {
        /// Local directory holding result CSV files
        local_path: String,
        /// Name of the reporting container
        container_name: String,
        /// SAS validity in hours
        #[arg(allow_hyphen_values = true)]
        hours: String,
    },
}

impl Cli {
    /// Fold CLI flags over the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.debug {
            config.debug = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        let provisioner = Provisioner::new(
            Arc::new(AzureBlobStore::new()),
            Arc::new(ProcessEnv),
            StdRng::from_entropy(),
            ManifestWriter::new(config.output_dir.clone()),
        )
        .with_download_signer(config.download_signing_account);

        execute_command(self.command, provisioner).await
    }
}

async fn execute_command(command: Commands, mut provisioner: Provisioner<StdRng>) -> Result<()> {
    match command {
        Commands::LocB {
            local_path,
            hours,
            version,
        } => {
            let path = provisioner
                .create_location_b(&local_path, parse_hours_lenient(&hours), &version)
                .await?;
            println!("{}", path.display());
        }
        Commands::LocC {
            container_url,
            hours,
            version,
        } => {
            let path = provisioner
                .create_location_c(&container_url, parse_hours_lenient(&hours), &version)
                .await?;
            println!("{}", path.display());
        }
        Commands::LocD {
            container_url,
            hours,
            local_path,
            version,
        } => {
            let path = provisioner
                .create_location_d(
                    &container_url,
                    parse_hours_lenient(&hours),
                    &local_path,
                    &version,
                )
                .await?;
            println!("{}", path.display());
        }
        Commands::DelLocB { container_url } => {
            provisioner
                .delete_container(AccountKind::Default, &container_url)
                .await?;
        }
        Commands::DelLocC { container_url } => {
            provisioner
                .delete_container(AccountKind::Secondary, &container_url)
                .await?;
        }
        Commands::PubRes {
            local_path,
            container_name,
            hours,
        } => {
            let path = provisioner
                .publish_results(&local_path, &container_name, parse_hours_lenient(&hours))
                .await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_loc_d_positional_order() {
        let cli = Cli::try_parse_from([
            "blobstage",
            "locD",
            "https://acct.blob.core.windows.net/copied",
            "4",
            "/data/out",
            "10.25",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Commands::LocD {
                container_url: "https://acct.blob.core.windows.net/copied".to_string(),
                hours: "4".to_string(),
                local_path: "/data/out".to_string(),
                version: "10.25".to_string(),
            }
        );
    }

    #[test]
    fn test_non_numeric_hours_still_parse() {
        let cli = Cli::try_parse_from(["blobstage", "pubRes", "/tmp/out", "results", "soon"]).unwrap();
        match cli.command {
            Commands::PubRes { hours, .. } => assert_eq!(parse_hours_lenient(&hours), 0),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_long_version_carries_build_metadata() {
        let long = get_long_version();
        assert!(long.starts_with(get_version()));
        assert!(long.contains(&format!("commit: {}", env!("GIT_HASH"))));
        assert!(long.contains(&format!("built: {}", env!("BUILD_TIME"))));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["blobstage", "locE", "x"]).is_err());
    }

    #[test]
    fn test_missing_argument_rejected() {
        assert!(Cli::try_parse_from(["blobstage", "locB", "/data/in", "2"]).is_err());
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "blobstage",
            "delLocC",
            "https://acct.blob.core.windows.net/c",
            "--debug",
            "--output-dir",
            "/tmp/m",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert!(config.debug);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/m"));
    }
}
