//! Core library entry for the `manifest-gather` CLI.
//!
//! The engine lives in [`gather`]; it talks to the outside world only
//! through the traits in [`ports`], bundled in a [`context::ServiceContext`].

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod gather;
pub mod manifest;
pub mod ports;
pub mod property;

#[cfg(test)]
mod test_support;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => return err.print().map_err(|e| e.to_string()),
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["manifest-gather", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_reports_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("missing.yml");
        let err = run([
            "manifest-gather",
            "data-gather",
            "-m",
            manifest.to_str().unwrap(),
            "-b",
            dir.path().to_str().unwrap(),
            "--namespace",
            "ns",
        ])
        .unwrap_err();
        assert!(err.starts_with("failed to read"));
    }
}
