//! Host shell for a transparent desktop mascot.
//!
//! The host owns the overlay window, its compositor binding, the tray icon,
//! the context menu and the frame loop. The animation itself is supplied as
//! a [`Routine`]; [`run`] uses the built-in [`IdleRoutine`], [`run_with`]
//! accepts any other.

#[cfg(windows)]
pub mod app;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod frame_loop;
pub mod graphics;
pub mod logging;
pub mod menu;
pub mod router;
pub mod routine;
pub mod surface;
pub mod tray;
pub mod types;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
#[cfg(windows)]
use crate::error::Severity;
pub use crate::error::{HostError, HostResult};
pub use crate::routine::{IdleRoutine, Routine, SurfaceGeometry};

/// Run the host with the idle routine.
pub fn run() -> ExitCode {
    run_with(IdleRoutine::new())
}

/// Parse the command line, set up the host and drive `routine` until quit.
///
/// Usage errors and fatal setup errors are shown in the message dialog and
/// turn into a non-zero exit code.
pub fn run_with<R: Routine + 'static>(routine: R) -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if cli::is_informational(&e) => e.exit(),
        Err(e) => return report_fatal(&e.to_string()),
    };
    let log_level = cli.log_level.clone();
    let no_log_file = cli.no_log_file;

    let launch = cli.into_launch_args();

    let log_dir = match &launch {
        Ok((args, _)) if args.config.log_to_file => logging::default_log_dir(),
        Err(_) if !no_log_file => logging::default_log_dir(),
        _ => None,
    };
    logging::init_logging(log_level.as_deref(), log_dir.as_deref());
    log::info!("mascot-host {} starting", env!("CARGO_PKG_VERSION"));

    let (args, report) = match launch {
        Ok(launch) => launch,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return report_fatal(&e.to_string());
        },
    };
    report.log();

    dialog::init();
    let code = host(&args, crate::routine::share(routine));
    dialog::terminate();
    code
}

/// Show `message` in the dialog and produce the failure exit code.
fn report_fatal(message: &str) -> ExitCode {
    dialog::init();
    dialog::show_message(message);
    dialog::terminate();
    ExitCode::FAILURE
}

#[cfg(windows)]
fn host(args: &cli::LaunchArgs, routine: routine::SharedRoutine) -> ExitCode {
    let result = app::AppContext::setup(args, routine).and_then(|mut app| {
        let stats = app.run_frames();
        app.shutdown();
        stats
    });

    match result {
        Ok(stats) => {
            log::info!(
                "Exiting after {} frames ({} overruns, {} failed presents)",
                stats.frames,
                stats.overruns,
                stats.present_failures
            );
            ExitCode::SUCCESS
        },
        Err(e) => match e.severity() {
            Severity::Fatal => {
                log::error!("Fatal: {}", e);
                dialog::show_message(&e.to_string());
                ExitCode::FAILURE
            },
            Severity::Recoverable => {
                log::warn!("Stopped after a recoverable error: {}", e);
                ExitCode::SUCCESS
            },
        },
    }
}

#[cfg(not(windows))]
fn host(_args: &cli::LaunchArgs, _routine: routine::SharedRoutine) -> ExitCode {
    let message = "mascot-host needs the Windows compositor; this platform is not supported";
    log::error!("{}", message);
    dialog::show_message(message);
    ExitCode::FAILURE
}
