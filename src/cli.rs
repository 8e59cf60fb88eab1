//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `manifest-gather`.
#[derive(Debug, Parser)]
#[command(
    name = "manifest-gather",
    version,
    about = "Resolve deployment manifests into addressable job instances"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Gather job specs, links and process specs into a resolved manifest.
    DataGather(DataGatherArgs),
}

/// Arguments of `data-gather`. Flags take precedence over the environment.
#[derive(Debug, Clone, Args)]
pub struct DataGatherArgs {
    /// Path to the deployment manifest.
    #[arg(short = 'm', long, env = "BOSH_MANIFEST_PATH")]
    pub manifest: PathBuf,

    /// Directory containing `jobs-src/<release>/<job>/`.
    #[arg(short = 'b', long, env = "BASE_DIR")]
    pub base_dir: PathBuf,

    /// Namespace used in instance addresses.
    #[arg(long, alias = "desired-namespace", env = "CF_OPERATOR_NAMESPACE")]
    pub namespace: String,

    /// Instance groups to resolve; all groups when omitted.
    #[arg(short = 'g', long, value_delimiter = ',', env = "INSTANCE_GROUP_NAME")]
    pub instance_groups: Vec<String>,

    /// Write the resolved manifest here instead of standard output.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}
