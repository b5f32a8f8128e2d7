//! faroetest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "faroetest_core=info,faroetest_providers=info,faroetest_report=info,faroetest=info";

#[derive(Parser)]
#[command(name = "faroetest", version, about = "Faroese LLM eval harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the test categories against the model
    Run {
        /// Run only this category (grammar, morphological, translation)
        #[arg(long)]
        category: Option<String>,

        /// Model to evaluate (overrides the config file)
        #[arg(long)]
        model: Option<String>,

        /// Directory holding the test case fixtures
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory results are written to
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Retries on transient provider errors
        #[arg(long)]
        max_retries: Option<u32>,

        /// Generation temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render the accuracy chart from the most recent results
    Plot {
        /// Directory holding results files
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Chart output path (default: <results-dir>/accuracy_plot.svg)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate the test case fixtures
    Validate {
        /// Directory holding the test case fixtures (default: from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and test case fixtures
    Init,
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            category,
            model,
            data_dir,
            results_dir,
            max_retries,
            temperature,
            config,
        } => {
            commands::run::execute(commands::run::RunArgs {
                category,
                model,
                data_dir,
                results_dir,
                max_retries,
                temperature,
                config,
            })
            .await
        }
        Commands::Plot {
            results_dir,
            output,
            config,
        } => commands::plot::execute(results_dir, output, config),
        Commands::Validate { data_dir, config } => commands::validate::execute(data_dir, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
