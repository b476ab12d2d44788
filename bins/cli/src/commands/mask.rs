//! Mask command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_line};
use notifyconf_infra::mask;

/// Print `url` (or a bare word) with its secrets masked.
pub fn run_mask(mode: OutputMode, url: &str) -> Result<CliOutput, CliError> {
    let masked = mask(url);
    let stdout = if mode.is_json() {
        to_json_line(&serde_json::json!({
            "status": "ok",
            "url": masked,
        }))?
    } else {
        format!("{masked}\n")
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
