mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::amortization::AmortizationArgs;
use commands::benchmark::{BenchmarkArgs, IndustriesArgs};
use commands::offer::OfferArgs;
use commands::roi::RoiArgs;
use commands::scenarios::ScenariosArgs;
use commands::valuation::ValuationArgs;

/// Small-business acquisition valuation and offer calculations
#[derive(Parser)]
#[command(
    name = "bizval",
    version,
    about = "Small-business acquisition valuation and offer calculations",
    long_about = "A CLI for valuing small businesses with decimal precision. Supports \
                  multiple-based valuations, loan amortization, acquisition ROI with \
                  IRR/NPV/payback, scenario analysis, industry benchmarks and offer \
                  recommendations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// JSON or YAML file overriding the default engine assumptions
    #[arg(long, global = true)]
    assumptions: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Value a business with one methodology
    Valuation(ValuationArgs),
    /// Annual payment and amortization schedule for a fixed-rate loan
    Amortization(AmortizationArgs),
    /// Project acquisition cash flows (IRR, NPV, payback, sensitivity)
    Roi(RoiArgs),
    /// Generate and analyse optimistic / realistic / pessimistic scenarios
    Scenarios(ScenariosArgs),
    /// Compare implied multiples against an industry benchmark
    Benchmark(BenchmarkArgs),
    /// Recommend an offer range from one or more valuations
    Offer(OfferArgs),
    /// List the industries in the benchmark table
    Industries(IndustriesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let assumptions = match input::load_assumptions(cli.assumptions.as_deref()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Valuation(args) => commands::valuation::run_valuation(args),
        Commands::Amortization(args) => commands::amortization::run_amortization(args),
        Commands::Roi(args) => commands::roi::run_roi(args, &assumptions),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args, &assumptions),
        Commands::Benchmark(args) => commands::benchmark::run_benchmark(args, &assumptions),
        Commands::Offer(args) => commands::offer::run_offer(args, &assumptions),
        Commands::Industries(args) => commands::benchmark::run_industries(args),
        Commands::Version => {
            println!("bizval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
