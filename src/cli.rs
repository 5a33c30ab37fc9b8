use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "azure-cost-estimator", version, about = "Azure retail cost estimator")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Estimate costs for a spreadsheet of meter ids and quantities
    Estimate {
        /// Input .xlsx file with 'MeterId' and 'Quantity' columns
        input: PathBuf,

        /// Directory for the generated estimate (defaults to the current directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Directory for an extra copy of the estimate
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        /// Region preference list, overriding the configuration
        #[arg(short, long, value_delimiter = ',')]
        regions: Option<Vec<String>>,
    },

    /// Test configuration file validity
    Test,

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_estimate() {
        let args = vec!["azure-cost-estimator", "estimate", "meters.xlsx"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Estimate {
                input,
                out_dir,
                save_dir,
                regions,
            } => {
                assert_eq!(input, PathBuf::from("meters.xlsx"));
                assert!(out_dir.is_none());
                assert!(save_dir.is_none());
                assert!(regions.is_none());
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_parsing_estimate_with_regions() {
        let args = vec![
            "azure-cost-estimator",
            "estimate",
            "meters.xlsx",
            "--regions",
            "eastus2,Global",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Estimate { regions, .. } => {
                assert_eq!(
                    regions,
                    Some(vec!["eastus2".to_string(), "Global".to_string()])
                );
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_cli_parsing_custom_config() {
        let args = vec!["azure-cost-estimator", "--config", "prod.toml", "test"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        assert!(matches!(cli.command, Commands::Test));
    }

    #[test]
    fn test_cli_requires_input_for_estimate() {
        let args = vec!["azure-cost-estimator", "estimate"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
