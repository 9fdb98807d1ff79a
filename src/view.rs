// 🖼️ Presentation Stage - pure `render(state) -> ViewModel`
//
// A front-end owns a `DashboardState`, mutates it on each interaction and
// re-renders the whole page from scratch. Nothing here touches a terminal
// or a socket.

use crate::aggregate::{aggregate, Aggregation, ChartKind, ChartMode};
use crate::config::DashboardConfig;
use crate::dataset::{Month, SalesRecord, SalesTable};
use crate::export::CsvExport;
use crate::filter::{filter_by_months, MonthSelection};
use crate::metrics::SummaryMetrics;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Everything a user can change on the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    #[serde(default)]
    pub chart_mode: ChartMode,

    #[serde(default)]
    pub selected_months: MonthSelection,

    /// "Show filtered data" checkbox
    #[serde(default)]
    pub show_raw_data: bool,
}

impl DashboardState {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            selected_months: MonthSelection::first_n(config.default_month_count),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHeader {
    pub title: String,
    pub icon: String,
    pub heading: String,
    pub tagline: String,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub mode: ChartMode,
    pub kind: ChartKind,
    pub title: String,
    pub data: Aggregation,
    /// Set when there is nothing to plot
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsView {
    pub total_sales: String,
    pub average_sales: String,
    pub total_revenue: String,
    /// Region name, or a no-data message
    pub top_performer: String,
    pub top_performer_sales: Option<String>,
    pub raw: SummaryMetrics,
}

impl MetricsView {
    fn from_metrics(metrics: SummaryMetrics) -> Self {
        let (top_performer, top_performer_sales) = match &metrics.top_region {
            Some(top) => (
                top.region.to_string(),
                Some(format!("{} sales", crate::metrics::format_thousands(top.sales))),
            ),
            None => (NO_DATA.to_string(), None),
        };

        Self {
            total_sales: metrics.total_sales_display(),
            average_sales: metrics.average_sales_display(),
            total_revenue: metrics.total_revenue_display(),
            top_performer,
            top_performer_sales,
            raw: metrics,
        }
    }
}

/// Widget options for the sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    pub chart_modes: Vec<ChartMode>,
    pub months: Vec<Month>,
    pub selected_chart: ChartMode,
    pub selected_months: Vec<Month>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub header: PageHeader,
    pub controls: Controls,
    pub chart: ChartView,
    pub metrics: MetricsView,
    pub row_count: usize,
    /// Present only while "Show filtered data" is checked
    pub raw_data: Option<Vec<SalesRecord>>,
    pub export: CsvExport,
}

pub const NO_DATA: &str = "No data for the selected months";

/// Compute the full page for `state` over `table`
pub fn render(state: &DashboardState, table: &SalesTable, config: &DashboardConfig) -> Result<ViewModel> {
    let view = filter_by_months(table, &state.selected_months);

    let data = aggregate(&view, state.chart_mode);
    let placeholder = data.is_empty().then(|| NO_DATA.to_string());
    let chart = ChartView {
        mode: state.chart_mode,
        kind: state.chart_mode.kind(),
        title: state.chart_mode.title().to_string(),
        data,
        placeholder,
    };

    let metrics = MetricsView::from_metrics(SummaryMetrics::compute(&view));
    let export = CsvExport::with_name(&view, &config.export_filename, &config.export_mime)?;

    Ok(ViewModel {
        header: PageHeader {
            title: config.page_title.clone(),
            icon: config.page_icon.clone(),
            heading: config.heading.clone(),
            tagline: config.tagline.clone(),
            footer: config.footer.clone(),
        },
        controls: Controls {
            chart_modes: ChartMode::ALL.to_vec(),
            months: table.months(),
            selected_chart: state.chart_mode,
            selected_months: state.selected_months.months(),
        },
        chart,
        metrics,
        row_count: view.len(),
        raw_data: state.show_raw_data.then(|| view.to_records()),
        export,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_data, Region};
    use crate::export::parse_csv;

    fn render_default(state: &DashboardState) -> ViewModel {
        render(state, load_data(), &DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_default_render() {
        let vm = render_default(&DashboardState::default());

        assert_eq!(vm.header.title, "Sales Dashboard");
        assert_eq!(vm.controls.months.len(), 12);
        assert_eq!(vm.controls.selected_months.len(), 6);
        assert_eq!(vm.chart.mode, ChartMode::SalesByRegion);
        assert_eq!(vm.chart.kind, ChartKind::Bar);
        assert_eq!(vm.chart.title, "Total Sales by Region");
        assert!(vm.chart.placeholder.is_none());
        assert_eq!(vm.row_count, 30);
        assert_eq!(vm.metrics.total_sales, "4,397");
        assert_eq!(vm.metrics.top_performer, "West");
        assert_eq!(vm.metrics.top_performer_sales.as_deref(), Some("1,136 sales"));
        assert!(vm.raw_data.is_none());
    }

    #[test]
    fn test_jan_feb_scenario() {
        let state = DashboardState {
            chart_mode: ChartMode::SalesByRegion,
            selected_months: MonthSelection::from_months([Month::Jan, Month::Feb]),
            show_raw_data: true,
        };
        let vm = render_default(&state);

        assert_eq!(vm.row_count, 10);
        assert_eq!(vm.metrics.raw.total_sales, 1425);
        assert_eq!(vm.metrics.top_performer, Region::West.to_string());
        match &vm.chart.data {
            Aggregation::ByRegion(rows) => assert_eq!(rows.len(), 5),
            other => panic!("unexpected aggregation: {:?}", other),
        }
        assert_eq!(vm.raw_data.as_ref().map(Vec::len), Some(10));
    }

    #[test]
    fn test_empty_selection_renders_placeholders() {
        let state = DashboardState {
            selected_months: MonthSelection::none(),
            ..DashboardState::default()
        };

        for mode in ChartMode::ALL {
            let vm = render_default(&DashboardState { chart_mode: mode, ..state.clone() });
            assert_eq!(vm.chart.placeholder.as_deref(), Some(NO_DATA));
            assert!(vm.chart.data.is_empty());
            assert_eq!(vm.metrics.average_sales, "N/A");
            assert_eq!(vm.metrics.top_performer, NO_DATA);
            assert_eq!(vm.metrics.top_performer_sales, None);
        }
    }

    #[test]
    fn test_export_matches_visible_rows() {
        let state = DashboardState {
            selected_months: MonthSelection::from_months([Month::Sep, Month::Oct, Month::Nov]),
            show_raw_data: true,
            ..DashboardState::default()
        };
        let vm = render_default(&state);

        let exported = parse_csv(&vm.export.body).unwrap();
        assert_eq!(Some(exported), vm.raw_data);
    }

    #[test]
    fn test_state_from_config() {
        let config = DashboardConfig {
            default_month_count: 2,
            ..DashboardConfig::default()
        };
        let state = DashboardState::from_config(&config);
        assert_eq!(state.selected_months.months(), vec![Month::Jan, Month::Feb]);
    }

    #[test]
    fn test_state_json() {
        let state: DashboardState = serde_json::from_str(
            r#"{"chart_mode": "Revenue Trends", "selected_months": ["Mar", "Jan"]}"#,
        )
        .unwrap();

        assert_eq!(state.chart_mode, ChartMode::RevenueTrends);
        assert_eq!(state.selected_months.months(), vec![Month::Jan, Month::Mar]);
        assert!(!state.show_raw_data);

        assert!(serde_json::from_str::<DashboardState>(r#"{"selected_months": ["Foo"]}"#).is_err());
    }
}
