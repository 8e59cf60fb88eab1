//! Command dispatch and handlers.

pub mod data_gather;

use crate::cli::Command;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::DataGather(args) => {
            let ctx = ServiceContext::live(args.output.as_deref());
            data_gather::run_with_context(&ctx, args)
        }
    }
}
