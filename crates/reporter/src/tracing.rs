//! Tracing configuration for the test reporter CLI
//!
//! Console output goes to stderr in the selected format. A second, plain-text
//! layer records the same run into a [`LogCapture`] buffer so `submit` can ship
//! its own diagnostics alongside the test results.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
pub use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are worth showing and capturing.
const CRATES: [&str; 4] = [
    "buildpulse_metadata",
    "buildpulse_upload",
    "buildpulse_test_reporter",
    "test_reporter",
];

/// Tracing output format options
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above (default)
    Info,
    /// Show warnings and above
    Warn,
    /// Show errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Console output format.
    pub format: TracingFormat,
    /// Console verbosity when `RUST_LOG` is unset.
    pub level: Level,
}

/// Shared in-memory sink for log output.
///
/// Clones write to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Create an empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Console filter: `RUST_LOG` when set, otherwise this workspace at `level`.
fn console_filter(level: Level) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directives(level)))
}

/// Plain-text layer writing INFO and above from this workspace into `capture`.
pub fn capture_layer<S>(capture: &LogCapture) -> impl Layer<S> + Send + Sync + 'static
where
    S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(capture.clone())
        .with_filter(EnvFilter::new(directives(Level::INFO)))
}

/// Initialize tracing with the given configuration
///
/// # Errors
///
/// Returns an error if the filter directives are invalid or a global
/// subscriber is already installed.
pub fn init_tracing(config: &TracingConfig, capture: &LogCapture) -> miette::Result<()> {
    let env_filter = console_filter(config.level)
        .map_err(|e| miette::miette!("Failed to create tracing filter: {e}"))?;

    let console = match config.format {
        TracingFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
        TracingFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed(),
        TracingFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(console.with_filter(env_filter))
        .with(capture_layer(capture))
        .try_init()
        .map_err(|e| miette::miette!("Failed to initialize tracing: {e}"))?;

    tracing::debug!(format = ?config.format, "Tracing initialized");
    Ok(())
}
