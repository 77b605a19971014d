//! Binary entry point for phaply-rs.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use phaply_rs::cli::{Cli, execute};

#[allow(clippy::print_stdout, clippy::print_stderr)]
fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
