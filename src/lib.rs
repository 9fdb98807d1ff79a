// Sales Dashboard - Core Library
// Exposes all modules for use in the TUI, the API server, and tests

pub mod dataset;
pub mod filter;
pub mod aggregate;
pub mod metrics;
pub mod export;
pub mod view;
pub mod config;
pub mod error;

#[cfg(feature = "tui")]
pub mod ui;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use dataset::{
    Month, Region, SalesRecord, SalesTable,
    build_sample_table, load_data,
};
pub use filter::{
    FilteredView, MonthSelection,
    filter_by_months, unfiltered,
};
pub use aggregate::{
    Aggregation, ChartKind, ChartMode,
    MonthRegionRevenue, MonthTotal, ProductShare, RegionTotal, RevenueSeries,
    aggregate, revenue_by_month_region, revenue_series, sales_by_month, sales_by_product,
    sales_by_region,
};
pub use metrics::{
    SummaryMetrics, TopPerformer,
    format_thousands, top_region,
};
pub use export::{
    CsvExport, EXPORT_FILENAME, EXPORT_MIME,
    parse_csv, read_csv, to_csv,
};
pub use view::{
    ChartView, Controls, DashboardState, MetricsView, PageHeader, ViewModel,
    render,
};
pub use config::DashboardConfig;
pub use error::DashboardError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the `tracing` subscriber shared by both binaries.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies.
pub fn init_logging(default_level: tracing::Level) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
