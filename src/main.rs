use clap::Parser;

use stress_predictor_lib::cli::{run, Cli, EXIT_FAILURE};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("failed to start stress-predictor: {error}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
