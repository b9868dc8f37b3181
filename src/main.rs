//! ftcfix CLI entry point.

use clap::Parser;
use ftcfix::cli::{self, Cli, Commands, EXIT_ERROR};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Check(args) => cli::run_check(args),
        Commands::Fix(args) => cli::run_fix(args),
        Commands::Convert(args) => cli::run_convert(args),
        Commands::HardwareMap(args) => cli::run_hardware_map(args),
        Commands::Imports(args) => cli::run_imports(args),
        Commands::ListRules => cli::run_list_rules(),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
