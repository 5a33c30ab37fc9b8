use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use azure_cost_estimator::config;
use azure_cost_estimator::input::read_input;
use azure_cost_estimator::pricing::models::ResolvedRow;
use azure_cost_estimator::pricing::{BatchResolver, RetailPriceClient};
use azure_cost_estimator::report;

/// Execute the estimate command
pub async fn execute(
    config_path: &Path,
    input_path: PathBuf,
    out_dir: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    regions: Option<Vec<String>>,
) -> Result<()> {
    let mut cfg = config::load_config(config_path)?;
    if let Some(regions) = regions {
        cfg.api.regions = regions;
    }
    if save_dir.is_some() {
        cfg.output.save_dir = save_dir;
    }

    info!("Reading input workbook: {}", input_path.display());
    let table = read_input(&input_path)?;
    println!("{} {} rows to price", "→".cyan(), table.rows.len());

    let client = RetailPriceClient::new(
        cfg.api.base_url.clone(),
        Duration::from_secs(cfg.api.timeout_seconds),
    )?;
    let mut resolver = BatchResolver::new(
        client,
        cfg.api.regions.clone(),
        Duration::from_millis(cfg.batch.row_delay_ms),
    );

    let bar = ProgressBar::new(table.rows.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} rows ({percent}%)")
            .unwrap(),
    );

    let resolved = resolver
        .resolve(&table.rows, |progress| {
            bar.set_position(progress.index as u64);
        })
        .await;
    bar.finish();

    let report = report::assemble(&table, &resolved)?;
    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
    let written = report.write_to(&out_dir)?;
    println!("{} Estimate written to {}", "✓".green(), written.display());

    if let Some(dir) = &cfg.output.save_dir {
        match report.save_copy(dir) {
            Ok(path) => println!("{} Copy saved to {}", "✓".green(), path.display()),
            Err(e) => {
                warn!("Skipping secondary save: {}", e);
                println!("{} {}", "⚠".yellow(), e);
            }
        }
    }

    print_summary(&resolved);
    Ok(())
}

/// Batch outcome summary table
fn print_summary(resolved: &[ResolvedRow]) {
    let priced = resolved.iter().filter(|r| r.final_cost.is_some()).count();
    let missed = resolved.len() - priced;
    let total: f64 = resolved.iter().filter_map(|r| r.final_cost).sum();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Rows", "Priced", "No price", "Estimated total (USD)"]);
    table.add_row(vec![
        Cell::new(resolved.len()),
        Cell::new(priced),
        Cell::new(missed),
        Cell::new(format!("{:.4}", total)),
    ]);

    println!("{table}");

    if missed > 0 {
        println!(
            "{} {} row(s) had no price in any configured region",
            "⚠".yellow(),
            missed
        );
    }
}
