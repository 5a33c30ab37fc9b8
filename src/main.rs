use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use azure_cost_estimator::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    init_tracing();

    match args.command {
        cli::Commands::Estimate {
            input,
            out_dir,
            save_dir,
            regions,
        } => {
            commands::estimate::execute(&args.config, input, out_dir, save_dir, regions).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Version => {
            println!("Azure Cost Estimator v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
