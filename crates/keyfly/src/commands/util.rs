//! Shared helpers for command handlers.

use keyfly_core::OperationResult;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Print an operation result and turn a gateway-reported failure into a
/// nonzero exit.
pub fn report_result(result: &OperationResult, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        result,
        |r| output::describe_result(r, color),
        |r| r.code.to_string(),
    );
    output::print_output(&out, global.quiet);

    check_result(result)
}

/// Turn a gateway-reported failure into a nonzero exit without printing.
pub fn check_result(result: &OperationResult) -> Result<(), CliError> {
    if result.success {
        Ok(())
    } else {
        Err(CliError::OperationFailed {
            status: result.code,
        })
    }
}
