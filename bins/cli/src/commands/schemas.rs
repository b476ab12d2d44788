//! Schemas command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, to_json_line};
use notifyconf_infra::Runtime;
use std::fmt::Write as _;

/// List registered plugin schemas and configuration reader schemes.
pub fn run_schemas(mode: OutputMode, runtime: &Runtime) -> Result<CliOutput, CliError> {
    let plugins: Vec<serde_json::Value> = runtime
        .plugins()
        .descriptors()
        .into_iter()
        .map(|descriptor| {
            serde_json::json!({
                "serviceName": descriptor.service_name(),
                "schemas": descriptor.schemas(),
            })
        })
        .collect();
    let readers: Vec<serde_json::Value> = runtime
        .readers()
        .iter()
        .map(|(schema, reader)| {
            serde_json::json!({
                "schema": schema,
                "includeMode": reader.include_mode(),
            })
        })
        .collect();

    let stdout = if mode.is_json() {
        to_json_line(&serde_json::json!({
            "status": "ok",
            "plugins": plugins,
            "readers": readers,
        }))?
    } else {
        format_schemas_text(runtime)
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn format_schemas_text(runtime: &Runtime) -> String {
    let mut output = String::from("plugins:\n");
    for descriptor in runtime.plugins().descriptors() {
        let _ = writeln!(
            output,
            "  {}: {}",
            descriptor.service_name(),
            descriptor.schemas().join(", ")
        );
    }
    output.push_str("readers:\n");
    for (schema, reader) in runtime.readers().iter() {
        let _ = writeln!(output, "  {schema} ({})", reader.include_mode());
    }
    output
}
