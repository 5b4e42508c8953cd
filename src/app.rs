//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real entry point:
//! - parses CLI arguments
//! - loads configuration and installs logging
//! - runs the form workflow for the chosen front-end
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::debug;

use crate::cli::{Command, ConnectionArgs, PredictArgs, SelectionArgs, picker};
use crate::config::{AppConfig, ConfigError};
use crate::data::PredictionClient;
use crate::domain::FormDraft;
use crate::error::AppError;
use crate::telemetry::{self, Console};

pub mod pipeline;
pub mod session;

/// Entry point for the `salary` binary.
pub fn run() -> Result<(), AppError> {
    // `salary` and `salary --fallback local` behave like `salary tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    dispatch(cli.command, AppConfig::load)
}

/// Run one subcommand. Configuration is only loaded for commands that use it.
fn dispatch<F>(command: Command, load_config: F) -> Result<(), AppError>
where
    F: FnOnce() -> Result<AppConfig, ConfigError>,
{
    match command {
        Command::Tables => handle_tables(),
        Command::Tui(args) => handle_tui(load_config()?, args),
        Command::Predict(args) => handle_predict(load_config()?, args),
        Command::Score(args) => handle_score(load_config()?, args),
    }
}

fn handle_predict(config: AppConfig, args: PredictArgs) -> Result<(), AppError> {
    let config = apply_connection(config, &args.connection)?;
    telemetry::init(&config.telemetry, Console::Stderr)?;

    let draft = collect_draft(&args.selection)?;
    let client = PredictionClient::new(&config.client)?;
    debug!(endpoint = client.endpoint(), fallback = ?config.fallback, "submitting selection");

    let outcome = match pipeline::submit(&draft, &client, config.fallback) {
        Ok(outcome) => outcome,
        Err(err) => {
            let notice = session::Notice::for_error(&err);
            eprintln!("{}", crate::report::format_notice(&notice));
            return Err(err.into());
        }
    };

    println!("{}", predict_report(&outcome));

    if let Some(path) = &args.export {
        crate::io::write_outcome_json(path, &outcome)?;
        debug!(path = %path.display(), "wrote export");
    }

    Ok(())
}

/// Success notice followed by the results view.
fn predict_report(outcome: &pipeline::Outcome) -> String {
    let notice = session::Notice::success(outcome.source, outcome.failure.as_ref());
    format!(
        "{}\n\n{}",
        crate::report::format_notice(&notice),
        crate::report::format_results(outcome)
    )
}

fn handle_score(config: AppConfig, args: SelectionArgs) -> Result<(), AppError> {
    telemetry::init(&config.telemetry, Console::Stderr)?;

    let selection = collect_draft(&args)?.complete()?;
    let breakdown = crate::scoring::breakdown(&selection);
    println!("{}", crate::report::format_breakdown(&breakdown));
    Ok(())
}

fn handle_tables() -> Result<(), AppError> {
    println!("{}", crate::report::format_tables());
    Ok(())
}

fn handle_tui(config: AppConfig, args: ConnectionArgs) -> Result<(), AppError> {
    let config = apply_connection(config, &args)?;
    // The terminal is taken over by the form; only a log file may receive events.
    telemetry::init(&config.telemetry, Console::Silent)?;
    crate::tui::run(config)
}

fn apply_connection(config: AppConfig, args: &ConnectionArgs) -> Result<AppConfig, AppError> {
    Ok(config.with_overrides(args.endpoint.as_deref(), args.fallback)?)
}

/// Flags first, then the picker for whatever is still missing.
fn collect_draft(args: &SelectionArgs) -> Result<FormDraft, AppError> {
    let mut draft = args.to_draft();
    if !args.no_input {
        picker::fill_missing(&mut draft)?;
    }
    Ok(draft)
}

/// Rewrite argv so `salary` defaults to `salary tui`.
///
/// Rules:
/// - `salary`                      -> `salary tui`
/// - `salary --fallback local ...` -> `salary tui --fallback local ...`
/// - `salary --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
