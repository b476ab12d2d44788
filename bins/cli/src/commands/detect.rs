//! Detect command handler.

use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_line};
use crate::{CliOutput, format_error_output};
use notifyconf_infra::{Detection, FormatOrigin, Runtime, detect_source};

/// Report the format of the document at `target`.
pub fn run_detect(mode: OutputMode, runtime: &Runtime, target: &str) -> Result<CliOutput, CliError> {
    let detection = match detect_source(runtime, target) {
        Ok(detection) => detection,
        Err(error) => return Ok(format_error_output(mode, &error, ExitCode::for_error(&error))),
    };

    let stdout = if mode.is_json() {
        to_json_line(&serde_json::json!({
            "status": "ok",
            "detection": detection,
        }))?
    } else {
        format_detection_text(&detection)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_detection_text(detection: &Detection) -> String {
    let origin = match detection.origin {
        FormatOrigin::Query => "query",
        FormatOrigin::Transport => "transport",
        FormatOrigin::Content => "content",
    };
    format!(
        "url: {}\nformat: {}\norigin: {origin}\n",
        detection.url, detection.format
    )
}
