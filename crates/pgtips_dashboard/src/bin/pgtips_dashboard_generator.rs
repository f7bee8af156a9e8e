use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pgtips_dashboard::config::PgTipsDashboardConfig;
use pgtips_dashboard::dashboard_definitions::get_pgtips_dashboard;
use pgtips_infra_utils::dumping::{serialize_to_file, to_canonical_json};
use pgtips_infra_utils::tracing_utils::configure_tracing;
use tracing::info;

#[cfg(test)]
#[path = "pgtips_dashboard_generator_test.rs"]
mod pgtips_dashboard_generator_test;

#[derive(Parser, Debug)]
#[command(about = "Prints the pgTips Grafana dashboard as JSON.")]
struct Args {
    /// A JSON file overriding the datasource and resource identifiers.
    #[arg(long)]
    config_file: Option<PathBuf>,
    /// Write the dashboard to this file instead of stdout.
    #[arg(long)]
    output_path: Option<PathBuf>,
}

/// Creates the dashboard json.
fn main() -> anyhow::Result<()> {
    configure_tracing();
    let args = Args::parse();

    let config = match &args.config_file {
        Some(config_file) => PgTipsDashboardConfig::load(config_file)?,
        None => PgTipsDashboardConfig::default(),
    };
    let dashboard = get_pgtips_dashboard(&config)?;

    match &args.output_path {
        Some(output_path) => {
            let output_path = output_path.to_str().with_context(|| {
                format!("Output path {} is not valid UTF-8.", output_path.display())
            })?;
            serialize_to_file(&dashboard, output_path)?
        }
        None => {
            let rendered = to_canonical_json(&dashboard)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
            stdout.flush()?;
            info!("Wrote the dashboard to stdout.");
        }
    }
    Ok(())
}
