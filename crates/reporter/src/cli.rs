use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// Submission or other runtime failure exit code
pub const EXIT_FAILURE: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(buildpulse::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Failure while building or submitting results (exit code 1)
    #[error("{message}")]
    #[diagnostic(code(buildpulse::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }
}

fn other_from_diagnostic(err: &(impl Diagnostic + ?Sized)) -> CliError {
    CliError::Other {
        message: err.to_string(),
        help: err.help().map(|h| h.to_string()),
    }
}

impl From<buildpulse_metadata::Error> for CliError {
    fn from(err: buildpulse_metadata::Error) -> Self {
        other_from_diagnostic(&err)
    }
}

impl From<buildpulse_upload::Error> for CliError {
    fn from(err: buildpulse_upload::Error) -> Self {
        other_from_diagnostic(&err)
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Other { .. } => EXIT_FAILURE,
    }
}

/// Render an error on stderr through miette.
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    if matches!(err, CliError::Config { .. }) {
        eprintln!("See more help with --help");
    }
    let _ = io::stderr().flush();
}

/// Command-line interface for submitting test results to BuildPulse.
#[derive(Parser, Debug)]
#[command(name = "test-reporter")]
#[command(about = "CLI to submit test results to BuildPulse")]
#[command(
    after_help = "ENVIRONMENT VARIABLES:\n  \
    BUILDPULSE_ACCESS_KEY_ID      BuildPulse access key ID for the account that owns the repository\n  \
    BUILDPULSE_SECRET_ACCESS_KEY  BuildPulse secret access key for the account that owns the repository\n\n\
    EXAMPLE:\n  \
    $ test-reporter submit test/reports --account-id 42 --repository-id 8675309"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'L',
        long,
        global = true,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    /// Console log format.
    #[arg(
        long,
        global = true,
        help = "Console log format",
        default_value = "compact",
        value_enum
    )]
    pub format: TracingFormat,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package test results with build metadata and upload them.
    #[command(about = "Submit test results to BuildPulse")]
    Submit(SubmitArgs),
    /// Show version information.
    #[command(about = "Show version information")]
    Version,
}

/// Arguments for `submit`.
#[derive(Args, Debug, Clone, Default)]
pub struct SubmitArgs {
    /// Test result files, directories or glob patterns.
    #[arg(value_name = "TEST_RESULTS", required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// BuildPulse account ID for the account that owns the repository.
    #[arg(long, value_name = "ACCOUNT_ID")]
    pub account_id: Option<u64>,

    /// BuildPulse repository ID for the repository that produced the test results.
    #[arg(long, value_name = "REPOSITORY_ID")]
    pub repository_id: Option<u64>,

    /// Path to local git clone of the repository (default: ".").
    #[arg(long, value_name = "DIR")]
    pub repository_dir: Option<PathBuf>,

    /// SHA-1 hash of the git tree that produced the test results (for use only
    /// if a local git clone does not exist).
    #[arg(long, value_name = "SHA")]
    pub tree: Option<String>,

    /// Coverage report files, directories or glob patterns.
    #[arg(long = "coverage-files", value_name = "PATHS", num_args = 1..)]
    pub coverage_files: Vec<String>,

    /// Tags to attach to this submission.
    #[arg(long, value_name = "TAGS", num_args = 1..)]
    pub tags: Vec<String>,

    /// Quota to count this submission against.
    #[arg(long, value_name = "QUOTA_ID")]
    pub quota_id: Option<String>,
}

/// Parse command-line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
