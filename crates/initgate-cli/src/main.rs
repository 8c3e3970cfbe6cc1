// crates/initgate-cli/src/main.rs
// ============================================================================
// Module: Init Gate CLI Entry Point
// Description: Command dispatcher for init-data verification from the shell.
// Purpose: Provide a thin operator surface over the initgate-core pipeline.
// Dependencies: clap, initgate-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The Init Gate CLI verifies a single init-data payload supplied via
//! argument or stdin, prints the verification report as JSON on stdout, and
//! maps the outcome to an exit code: success for an accepted payload, a
//! distinct rejection code for signature or freshness failures, and the
//! generic failure code for operational errors. All verification logic lives
//! in `initgate-core`; this binary is host glue only.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::io::Write;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use initgate_core::FieldMap;
use initgate_core::IdentityRecord;
use initgate_core::PayloadFormat;
use initgate_core::Verification;
use initgate_core::VerifyParams;
use initgate_core::verify;
use initgate_core::verify_at;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable consulted for the shared secret when `--secret` is
/// not supplied.
const SECRET_ENV: &str = "INITGATE_SECRET";

/// Exit code for payloads rejected by signature or freshness checks.
const REJECTED_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for operator-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Command Model
// ============================================================================

/// Verifies platform-signed init-data payloads.
#[derive(Debug, Parser)]
#[command(name = "init-gate", version, about = "Verify platform-signed init-data payloads")]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Top-level CLI commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Verify one init-data payload and print the report as JSON.
    Verify(VerifyCommand),
}

/// Arguments for the `verify` command.
#[derive(Debug, Args)]
struct VerifyCommand {
    /// Raw init-data string; read from stdin when omitted.
    #[arg(long)]
    init_data: Option<String>,

    /// Shared secret; read from the INITGATE_SECRET environment variable
    /// when omitted.
    #[arg(long)]
    secret: Option<String>,

    /// Freshness window in seconds; zero or a negative value disables
    /// freshness enforcement.
    #[arg(long, default_value_t = 86_400)]
    max_age: i64,

    /// Unix time (seconds) to verify against; the wall clock when omitted.
    #[arg(long)]
    now: Option<i64>,
}

// ============================================================================
// SECTION: Report Model
// ============================================================================

/// JSON report printed for one verification.
#[derive(Debug, Serialize)]
struct VerifyReport {
    /// Whether the supplied signature matched the expected signature.
    signature_valid: bool,
    /// Whether the payload was within the freshness window; meaningful only
    /// when `signature_valid` is `true`.
    freshness_valid: bool,
    /// Wire encoding recognized during decoding.
    format: PayloadFormat,
    /// Count of malformed query pairs dropped during decoding.
    dropped_pairs: usize,
    /// Full decoded field map, signature field included.
    fields: FieldMap,
    /// Extracted identity record when the identity payload was well-formed.
    identity: Option<IdentityRecord>,
    /// Identity extraction failure, rendered as a message.
    identity_error: Option<String>,
}

impl VerifyReport {
    /// Builds a report from a verification result, attempting identity
    /// extraction and folding its failure into the report as data.
    fn from_verification(verification: Verification) -> Self {
        let (identity, identity_error) = match verification.identity() {
            Ok(record) => (Some(record), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            signature_valid: verification.signature_valid,
            freshness_valid: verification.freshness_valid,
            format: verification.format,
            dropped_pairs: verification.dropped_pairs,
            fields: verification.fields,
            identity,
            identity_error,
        }
    }

    /// Maps the report outcome to the process exit code.
    fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.outcome_code())
    }

    /// Numeric outcome code: zero for accepted payloads, the rejection code
    /// for signature or freshness failures.
    const fn outcome_code(&self) -> u8 {
        if self.signature_valid && self.freshness_valid {
            0
        } else {
            REJECTED_EXIT_CODE
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Verify(command) => command_verify(&command),
    }
}

// ============================================================================
// SECTION: Verify Command
// ============================================================================

/// Executes the `verify` command.
fn command_verify(command: &VerifyCommand) -> CliResult<ExitCode> {
    let init_data = match &command.init_data {
        Some(data) => data.clone(),
        None => read_stdin()?,
    };
    let secret = resolve_secret(command.secret.as_deref())?;

    let params = VerifyParams::with_window(init_data.trim_end(), &secret, command.max_age);
    let verification = command
        .now
        .map_or_else(|| verify(&params), |now| verify_at(&params, now));

    let report = VerifyReport::from_verification(verification);
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|err| CliError::new(format!("failed to render report: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(format!("stdout: {err}")))?;

    Ok(report.exit_code())
}

/// Resolves the shared secret from the flag or the environment.
fn resolve_secret(flag: Option<&str>) -> CliResult<String> {
    if let Some(secret) = flag {
        return Ok(secret.to_string());
    }
    std::env::var(SECRET_ENV).map_err(|_| {
        CliError::new(format!("shared secret required: pass --secret or set {SECRET_ENV}"))
    })
}

/// Reads the init-data payload from stdin.
fn read_stdin() -> CliResult<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| CliError::new(format!("stdin: {err}")))?;
    Ok(buffer)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Reports an operational error and yields the generic failure code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
