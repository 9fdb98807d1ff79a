// Sales Dashboard - Web Server
// JSON API + static page over the shared in-memory sales table

use anyhow::Result;
use clap::Parser;
use sales_dashboard::{load_data, DashboardConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "dashboard-server")]
#[command(about = "Serve the sales dashboard over HTTP")]
#[command(version)]
struct Args {
    /// JSON config file; `bind_addr` and session limits live there
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured listen address
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    sales_dashboard::init_logging(tracing::Level::INFO);

    let args = Args::parse();
    let mut config = DashboardConfig::from_path(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let table = load_data();
    info!(rows = table.len(), version = sales_dashboard::VERSION, "sales table ready");

    println!("🌐 {} - Web Server", config.page_title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   UI:  http://{}", config.bind_addr);
    println!("   API: http://{}/api/view", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    sales_dashboard::server::serve(table, config).await
}
