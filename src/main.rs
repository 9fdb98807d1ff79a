use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use sales_dashboard::{
    filter_by_months, load_data, CsvExport, DashboardConfig, DashboardState, MonthSelection,
    SummaryMetrics,
};

#[derive(Debug, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales dashboard over the sample sales table")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// JSON config file overriding page text, export naming and defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated month list, e.g. Jan,Feb (default: configured first months)
    #[arg(long, global = true)]
    months: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Write the filtered rows as CSV
    Export {
        /// Output file (default: configured export filename)
        output: Option<PathBuf>,
    },

    /// Print the key metrics for the selected months
    Summary,

    /// Interactive terminal dashboard (the default)
    Ui,
}

impl Cli {
    /// `--months` if given, the configured default otherwise
    fn month_selection(&self, config: &DashboardConfig) -> Result<MonthSelection> {
        match &self.months {
            Some(list) => Ok(MonthSelection::parse(list)?),
            None => Ok(DashboardState::from_config(config).selected_months),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DashboardConfig::from_path(cli.config.as_deref())?;

    match cli.command.as_ref().unwrap_or(&Command::Ui) {
        Command::Export { output } => {
            sales_dashboard::init_logging(tracing::Level::INFO);
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.export_filename));
            run_export(&cli.month_selection(&config)?, &path, &config)
        }
        Command::Summary => {
            sales_dashboard::init_logging(tracing::Level::INFO);
            run_summary(&cli.month_selection(&config)?)
        }
        Command::Ui => {
            // Anything logged while the alternate screen is up would garble it
            sales_dashboard::init_logging(tracing::Level::WARN);
            run_ui_mode(config)
        }
    }
}

fn run_export(selection: &MonthSelection, path: &Path, config: &DashboardConfig) -> Result<()> {
    let view = filter_by_months(load_data(), selection);
    let export = CsvExport::with_name(&view, &config.export_filename, &config.export_mime)?;

    std::fs::write(path, &export.body)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(rows = view.len(), months = %selection.to_query(), path = %path.display(), "exported filtered data");
    println!("✓ Wrote {} rows to {}", view.len(), path.display());
    Ok(())
}

fn run_summary(selection: &MonthSelection) -> Result<()> {
    let view = filter_by_months(load_data(), selection);
    let metrics = SummaryMetrics::compute(&view);

    println!("📈 Key Metrics ({})", selection.to_query());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total Sales:   {}", metrics.total_sales_display());
    println!("Average Sales: {}", metrics.average_sales_display());
    println!("Total Revenue: {}", metrics.total_revenue_display());
    match &metrics.top_region {
        Some(top) => println!(
            "🏆 Top Performer: {} ({} sales)",
            top.region,
            sales_dashboard::format_thousands(top.sales)
        ),
        None => println!("🏆 Top Performer: no data for the selected months"),
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: DashboardConfig) -> Result<()> {
    let mut app = sales_dashboard::ui::App::new(load_data(), config)?;
    sales_dashboard::ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin dashboard-server --features server");
    std::process::exit(1);
}
