//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Args, Parser, Subcommand};
use commands::{ResolveCommandInput, run_detect, run_mask, run_resolve, run_schemas};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode, to_json_line};
use notifyconf_infra::{
    CachePolicy, ConfigFormat, InfraError, LoggerChoice, REDACTED, Runtime, is_secret_key,
};
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(
    name = "ncf",
    version,
    about = "Resolve notification service URLs and configuration documents",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    logging: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct LogArgs {
    /// Log debug events to stderr.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors.
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve service URLs and configuration sources into destinations.
    Resolve {
        /// Service URLs; one argument may hold several.
        urls: Vec<String>,
        /// Configuration source URL or path (repeatable).
        #[arg(long = "config", short = 'c')]
        configs: Vec<String>,
        /// Tag given to every service URL (repeatable, comma-separated).
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,
        /// Include depth; 0 ignores includes.
        #[arg(long, env = "NOTIFYCONF_RECURSION", default_value_t = 1)]
        recursion: u32,
        /// Allow strict sources (such as `file://`) to be included from any scheme.
        #[arg(long)]
        insecure_includes: bool,
        /// Force the document format (`text` or `yaml`).
        #[arg(long, value_parser = parse_format)]
        format: Option<ConfigFormat>,
        /// Cache policy: seconds, or a boolean word.
        #[arg(long, value_parser = parse_cache)]
        cache: Option<CachePolicy>,
    },
    /// Report the format of a configuration document.
    Detect {
        /// Document URL or path.
        target: String,
    },
    /// Print a URL (or a bare word) with its secrets masked.
    Mask {
        /// URL or word to mask.
        url: String,
    },
    /// List plugin schemas and configuration reader schemes.
    Schemas,
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.logging);
    let mode = OutputMode::from_args(&cli.output);

    match run(cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_logging(args: &LogArgs) {
    let filter = if args.quiet {
        EnvFilter::new("error")
    } else if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    tracing::debug!(?command, "running command");
    let runtime = Runtime::builder().logger(LoggerChoice::Tracing).build()?;

    match command {
        Commands::Resolve {
            urls,
            configs,
            tags,
            recursion,
            insecure_includes,
            format,
            cache,
        } => run_resolve(
            mode,
            &runtime,
            ResolveCommandInput {
                urls,
                configs,
                tags,
                recursion,
                insecure_includes,
                format,
                cache,
            },
        ),
        Commands::Detect { target } => run_detect(mode, &runtime, &target),
        Commands::Mask { url } => run_mask(mode, &url),
        Commands::Schemas => run_schemas(mode, &runtime),
    }
}

fn parse_format(value: &str) -> Result<ConfigFormat, String> {
    value.parse::<ConfigFormat>().map_err(|error| error.to_string())
}

fn parse_cache(value: &str) -> Result<CachePolicy, String> {
    CachePolicy::from_query(value).map_err(|error| error.to_string())
}

pub(crate) fn format_error_output(
    mode: OutputMode,
    error: &InfraError,
    exit_code: ExitCode,
) -> CliOutput {
    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": error_payload(error),
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        to_json_line(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}\n"
                .to_owned()
        })
    } else {
        format!("error: {} ({})\n", error.message, error.code)
    };

    CliOutput {
        stdout,
        stderr: String::new(),
        exit_code,
    }
}

fn error_payload(error: &InfraError) -> serde_json::Value {
    let metadata: BTreeMap<&str, &str> = error
        .metadata
        .iter()
        .map(|(key, value)| {
            let value = if is_secret_key(key) { REDACTED } else { value.as_str() };
            (key.as_str(), value)
        })
        .collect();
    serde_json::json!({
        "code": error.code.to_string(),
        "message": error.message,
        "kind": error.kind.to_string(),
        "class": error.class.to_string(),
        "metadata": metadata,
    })
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
