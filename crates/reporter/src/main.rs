//! `test-reporter` binary entry point.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

use buildpulse_test_reporter::cli::{self, CliError, Commands, EXIT_FAILURE, EXIT_OK, exit_code_for, render_error};
use buildpulse_test_reporter::commands;
use buildpulse_test_reporter::tracing::{LogCapture, TracingConfig, init_tracing};
use buildpulse_test_reporter::process_env;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let capture = LogCapture::new();
    let tracing_config = TracingConfig {
        format: cli.format,
        level: cli.level.into(),
    };
    if let Err(e) = init_tracing(&tracing_config, &capture) {
        eprintln!("{e:?}");
    }

    let exit_code = match cli.command {
        Commands::Version => {
            println!("{}", commands::version::get_version_info());
            EXIT_OK
        }
        Commands::Submit(args) => run_with_tokio(|| async move {
            let key = commands::submit::execute(
                commands::version::current(),
                &args,
                process_env(),
                capture,
            )
            .await?;
            println!("{key}");
            Ok(())
        }),
    };

    std::process::exit(exit_code);
}

/// Create tokio runtime and run an async command to completion
fn run_with_tokio<F, Fut>(command: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return EXIT_FAILURE;
        }
    };

    match rt.block_on(command()) {
        Ok(()) => EXIT_OK,
        Err(err) => {
            render_error(&err);
            exit_code_for(&err)
        }
    }
}
