//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - configures logging
//! - runs the fit + bootstrap pipeline
//! - prints reports and writes exports

use std::path::Path;

use chrono::Utc;
use clap::Parser;

use crate::cli::{Command, FitArgs, ShowArgs};
use crate::domain::{BootstrapConfig, FitConfig, LoadOptions, Params};
use crate::error::AppError;
use crate::io::{
    BootstrapSummary, FIT_CURVE_FILE, PAR_SUMMARY_FILE, RESIDUALS_FILE, RunSummary, TRANS_CURVE_FILE,
    TRANS_DATA_FILE,
};

pub mod pipeline;

/// File name of the JSON run summary inside the output directory.
pub const SUMMARY_FILE: &str = "summary.json";

/// Entry point for the `unfold` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => {
            init_logging(args.verbose);
            handle_fit(args)
        }
        Command::Show(args) => {
            init_logging(false);
            handle_show(args)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    // A second init (tests, embedding) is harmless.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_fit_report(&run.fit, &run.diagnostics)
    );
    println!(
        "{}",
        crate::report::format_bootstrap_report(&run.ensemble, &run.statistics)
    );

    if let Some(dir) = &config.output_dir {
        write_exports(dir, &config, &run)?;
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let summary = crate::io::read_summary_json(&args.summary)?;

    println!(
        "{} run on {} ({} points, generated {})",
        summary.tool, summary.data_file, summary.n_points, summary.generated
    );
    println!(
        "{}",
        crate::report::format_fit_report(&summary.fit, &summary.diagnostics)
    );
    println!(
        "* Bootstrap: {} accepted, {} failed ({:?}, seed {})",
        summary.bootstrap.accepted, summary.bootstrap.failures, summary.bootstrap.method, summary.bootstrap.seed
    );
    println!("{}", crate::report::format_summary_table(&summary.bootstrap.parameters));
    Ok(())
}

fn write_exports(dir: &Path, config: &FitConfig, run: &pipeline::RunOutput) -> Result<(), AppError> {
    use crate::io::export::*;

    write_curve(&dir.join(FIT_CURVE_FILE), &run.curve)?;
    write_residuals(&dir.join(RESIDUALS_FILE), &run.residuals)?;
    write_points(&dir.join(TRANS_DATA_FILE), &run.transformed.points)?;
    write_curve(&dir.join(TRANS_CURVE_FILE), &run.transformed.curve)?;
    write_parameter_summary(&dir.join(PAR_SUMMARY_FILE), &run.statistics)?;
    let columns = write_parameter_columns(dir, &run.ensemble, &run.histograms)?;

    let summary = RunSummary {
        tool: "unfold".to_string(),
        generated: Utc::now(),
        data_file: config.data_path.display().to_string(),
        gas_constant: config.gas_constant,
        temperature: config.temperature,
        n_points: run.data.len(),
        fit: run.fit.clone(),
        diagnostics: run.diagnostics.clone(),
        bootstrap: BootstrapSummary {
            method: config.bootstrap.method,
            seed: config.bootstrap.seed,
            accepted: run.ensemble.accepted(),
            failures: run.ensemble.failures,
            parameters: run.statistics.clone(),
        },
    };
    crate::io::write_summary_json(&dir.join(SUMMARY_FILE), &summary)?;

    log::info!("wrote {} artifacts to {}", columns.len() + 6, dir.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    let initial_guess = Params::from_slice(&args.initial).ok_or_else(|| {
        AppError::config(format!(
            "--initial needs {} comma-separated values ({}), got {}.",
            Params::LEN,
            Params::NAMES.join(","),
            args.initial.len()
        ))
    })?;

    Ok(FitConfig {
        data_path: args.data.clone(),
        load: LoadOptions {
            fixed_err: args.fixed_err,
            frac_err: args.frac_err,
            guess: args.guess,
            reset_err: args.reset_err,
        },
        gas_constant: args.gas_constant,
        temperature: args.temperature,
        initial_guess,
        xatol: args.xatol,
        fatol: args.fatol,
        max_iters: args.max_iters,
        bootstrap: BootstrapConfig {
            target_count: args.n_bootstrap,
            seed: args.seed,
            method: args.method,
            max_attempts_per_sample: args.max_attempts,
            verbose: args.verbose,
        },
        histogram_bins: args.bins,
        output_dir: (!args.no_export).then(|| args.output_dir.clone()),
    })
}
