//! Command-line parsing for the two-state unfolding fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code. Every fit option can also be supplied
//! through an `UNFOLD_*` environment variable (or a `.env` file).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_GAS_CONSTANT, DEFAULT_GUESS_FRACTION, DEFAULT_TEMPERATURE, ResampleMethod};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "unfold", version, about = "Two-state unfolding fit with bootstrap uncertainties")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a dataset, bootstrap parameter uncertainties, and export results.
    Fit(FitArgs),
    /// Print a previously exported JSON run summary.
    Show(ShowArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Whitespace-delimited data file (`x y` or `x y err` per line).
    #[arg(env = "UNFOLD_DATA")]
    pub data: PathBuf,

    /// Flat uncertainty for 2-column data.
    #[arg(long, env = "UNFOLD_FIXED_ERR")]
    pub fixed_err: Option<f64>,

    /// Uncertainty as a fraction of |y| for 2-column data (wins over --fixed-err).
    #[arg(long, env = "UNFOLD_FRAC_ERR")]
    pub frac_err: Option<f64>,

    /// Scale for inferring uncertainty as guess * min|y| when no error option is set.
    #[arg(long, env = "UNFOLD_GUESS", default_value_t = DEFAULT_GUESS_FRACTION)]
    pub guess: f64,

    /// Replace every uncertainty with this value after loading.
    #[arg(long, env = "UNFOLD_RESET_ERR")]
    pub reset_err: Option<f64>,

    /// Absolute temperature (K).
    #[arg(long, env = "UNFOLD_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Gas constant (kcal/mol/K).
    #[arg(long, env = "UNFOLD_GAS_CONSTANT", default_value_t = DEFAULT_GAS_CONSTANT)]
    pub gas_constant: f64,

    /// Initial guess `af,bf,au,bu,dG,m`.
    #[arg(
        long,
        env = "UNFOLD_INITIAL",
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_values_t = vec![-0.25, 1.02, -0.001, 0.3, 3.0, 4.0]
    )]
    pub initial: Vec<f64>,

    /// Number of successful bootstrap fits to collect.
    #[arg(short = 'n', long, env = "UNFOLD_N_BOOTSTRAP", default_value_t = 100)]
    pub n_bootstrap: usize,

    /// Random seed for resampling.
    #[arg(long, env = "UNFOLD_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Resampling strategy.
    #[arg(long, value_enum, env = "UNFOLD_METHOD", default_value_t = ResampleMethod::Cases)]
    pub method: ResampleMethod,

    /// Failed fits tolerated per bootstrap sample before giving up.
    #[arg(long, env = "UNFOLD_MAX_ATTEMPTS", default_value_t = 1000)]
    pub max_attempts: usize,

    /// Simplex convergence tolerance on parameters.
    #[arg(long, default_value_t = 1e-4)]
    pub xatol: f64,

    /// Simplex convergence tolerance on chi-square.
    #[arg(long, default_value_t = 1e-4)]
    pub fatol: f64,

    /// Maximum simplex iterations (default 200 per parameter).
    #[arg(long)]
    pub max_iters: Option<usize>,

    /// Histogram bins per parameter.
    #[arg(long, default_value_t = 25)]
    pub bins: usize,

    /// Directory for exported artifacts.
    #[arg(short = 'o', long, env = "UNFOLD_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip writing artifacts.
    #[arg(long)]
    pub no_export: bool,

    /// Report every failed bootstrap fit and enable debug logging.
    #[arg(short, long, env = "UNFOLD_VERBOSE")]
    pub verbose: bool,
}

/// Options for printing a saved summary.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Summary JSON produced by `unfold fit`.
    #[arg(value_name = "JSON")]
    pub summary: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_defaults() {
        let cli = Cli::try_parse_from(["unfold", "fit", "data.txt"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.data, PathBuf::from("data.txt"));
        assert_eq!(args.initial, vec![-0.25, 1.02, -0.001, 0.3, 3.0, 4.0]);
        assert_eq!(args.n_bootstrap, 100);
        assert_eq!(args.method, ResampleMethod::Cases);
        assert!(args.frac_err.is_none());
    }

    #[test]
    fn parses_custom_initial_guess() {
        let cli = Cli::try_parse_from([
            "unfold", "fit", "d.txt", "--initial", "0,1,0,0,2,1", "--frac-err", "0.05", "--method", "residuals",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.initial, vec![0.0, 1.0, 0.0, 0.0, 2.0, 1.0]);
        assert_eq!(args.frac_err, Some(0.05));
        assert_eq!(args.method, ResampleMethod::Residuals);
    }
}
