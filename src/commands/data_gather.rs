//! `manifest-gather data-gather` command.

use std::path::Path;

use tracing::info;

use crate::cli::DataGatherArgs;
use crate::context::ServiceContext;
use crate::error::GatherError;
use crate::gather::{self, GatherOptions};
use crate::manifest::Manifest;

/// Execute `data-gather` against the given context.
///
/// # Errors
///
/// Returns an error string if an argument is empty, the manifest cannot be
/// read or parsed, or gathering fails.
pub fn run_with_context(ctx: &ServiceContext, args: &DataGatherArgs) -> Result<(), String> {
    require("manifest", args.manifest.as_os_str().is_empty())?;
    require("base-dir", args.base_dir.as_os_str().is_empty())?;
    require("namespace", args.namespace.is_empty())?;

    let manifest = load_manifest(ctx, &args.manifest).map_err(|e| e.to_string())?;
    let options = GatherOptions {
        base_dir: args.base_dir.clone(),
        namespace: args.namespace.clone(),
        instance_groups: args.instance_groups.iter().filter(|g| !g.is_empty()).cloned().collect(),
    };
    info!(
        manifest = %args.manifest.display(),
        base_dir = %options.base_dir.display(),
        groups = ?options.instance_groups,
        "gathering manifest data"
    );
    gather::gather_and_publish(ctx, &manifest, &options).map_err(|e| e.to_string())?;
    Ok(())
}

fn require(flag: &str, empty: bool) -> Result<(), String> {
    if empty {
        Err(format!("--{flag} must not be empty"))
    } else {
        Ok(())
    }
}

fn load_manifest(ctx: &ServiceContext, path: &Path) -> Result<Manifest, GatherError> {
    let contents = ctx
        .fs
        .read_to_string(path)
        .map_err(|e| GatherError::Io { path: path.to_path_buf(), message: e.to_string() })?;
    Manifest::from_yaml(&contents).map_err(|e| GatherError::Parse {
        what: format!("manifest {}", path.display()),
        message: e.to_string(),
    })
}
