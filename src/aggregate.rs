// 📊 Aggregation Stage - the four grouped summaries behind the charts
//
// All functions are total: an empty view produces an empty result.

use crate::dataset::{Month, Region};
use crate::error::DashboardError;
use crate::filter::FilteredView;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CHART MODE
// ============================================================================

/// Chart type offered by the sidebar single-select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartMode {
    #[default]
    SalesByRegion,
    SalesByMonth,
    RevenueTrends,
    ProductPerformance,
}

impl ChartMode {
    pub const ALL: [ChartMode; 4] = [
        ChartMode::SalesByRegion,
        ChartMode::SalesByMonth,
        ChartMode::RevenueTrends,
        ChartMode::ProductPerformance,
    ];

    /// Label shown in the chart-type picker
    pub fn label(&self) -> &'static str {
        match self {
            ChartMode::SalesByRegion => "Sales by Region",
            ChartMode::SalesByMonth => "Sales by Month",
            ChartMode::RevenueTrends => "Revenue Trends",
            ChartMode::ProductPerformance => "Product Performance",
        }
    }

    /// Chart heading
    pub fn title(&self) -> &'static str {
        match self {
            ChartMode::SalesByRegion => "Total Sales by Region",
            ChartMode::SalesByMonth => "Sales Trend by Month",
            ChartMode::RevenueTrends => "Revenue Trends by Region",
            ChartMode::ProductPerformance => "Sales Distribution by Product",
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self {
            ChartMode::SalesByRegion => ChartKind::Bar,
            ChartMode::SalesByMonth => ChartKind::Line,
            ChartMode::RevenueTrends => ChartKind::MultiLine,
            ChartMode::ProductPerformance => ChartKind::Pie,
        }
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        let i = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartMode::ALL
            .iter()
            .copied()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::UnknownChartMode(s.to_string()))
    }
}

// Chart modes travel as their labels ("Sales by Region") in JSON
impl Serialize for ChartMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ChartMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    MultiLine,
    Pie,
}

// ============================================================================
// AGGREGATE ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTotal {
    pub region: Region,
    pub sales: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: Month,
    pub sales: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRegionRevenue {
    pub month: Month,
    pub region: Region,
    pub revenue: u64,
}

/// One colored line of the revenue chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSeries {
    pub region: Region,
    pub points: Vec<(Month, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductShare {
    pub product: String,
    pub sales: u64,
    /// Percentage of the view's sales, 0.0..=100.0
    pub share: f64,
}

/// Result of one aggregation, tagged by the chart it feeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rows", rename_all = "snake_case")]
pub enum Aggregation {
    ByRegion(Vec<RegionTotal>),
    ByMonth(Vec<MonthTotal>),
    ByMonthRegion(Vec<RevenueSeries>),
    ByProduct(Vec<ProductShare>),
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregation::ByRegion(rows) => rows.is_empty(),
            Aggregation::ByMonth(rows) => rows.is_empty(),
            Aggregation::ByMonthRegion(series) => series.is_empty(),
            Aggregation::ByProduct(rows) => rows.is_empty(),
        }
    }
}

// ============================================================================
// GROUP-BY OPERATIONS
// ============================================================================

/// Sum of sales per region, first-encountered order.
///
/// A non-empty view always yields all five regions; regions the view does not
/// contain are appended with zero so the bar chart keeps one bar per region.
pub fn sales_by_region(view: &FilteredView<'_>) -> Vec<RegionTotal> {
    if view.is_empty() {
        return Vec::new();
    }

    let mut totals: Vec<RegionTotal> = Vec::with_capacity(Region::ALL.len());
    for record in view.iter() {
        match totals.iter_mut().find(|t| t.region == record.region) {
            Some(total) => total.sales += record.sales,
            None => totals.push(RegionTotal {
                region: record.region,
                sales: record.sales,
            }),
        }
    }

    for region in Region::ALL {
        if !totals.iter().any(|t| t.region == region) {
            totals.push(RegionTotal { region, sales: 0 });
        }
    }

    totals
}

/// Sum of sales per month, calendar order, only months present in the view
pub fn sales_by_month(view: &FilteredView<'_>) -> Vec<MonthTotal> {
    let mut sums = [None::<u64>; 12];
    for record in view.iter() {
        *sums[record.month.index()].get_or_insert(0) += record.sales;
    }

    Month::ALL
        .iter()
        .zip(sums)
        .filter_map(|(month, sum)| sum.map(|sales| MonthTotal { month: *month, sales }))
        .collect()
}

/// Sum of revenue per (month, region): month in calendar order, then region
/// in first-encountered order
pub fn revenue_by_month_region(view: &FilteredView<'_>) -> Vec<MonthRegionRevenue> {
    let region_order = encountered_regions(view);
    let mut rows: Vec<MonthRegionRevenue> = Vec::new();

    for record in view.iter() {
        match rows
            .iter_mut()
            .find(|r| r.month == record.month && r.region == record.region)
        {
            Some(row) => row.revenue += record.revenue,
            None => rows.push(MonthRegionRevenue {
                month: record.month,
                region: record.region,
                revenue: record.revenue,
            }),
        }
    }

    rows.sort_by_key(|r| {
        let rank = region_order.iter().position(|g| *g == r.region).unwrap_or(usize::MAX);
        (r.month, rank)
    });
    rows
}

/// Revenue per (month, region) regrouped as one series per region
pub fn revenue_series(view: &FilteredView<'_>) -> Vec<RevenueSeries> {
    let mut series: Vec<RevenueSeries> = encountered_regions(view)
        .into_iter()
        .map(|region| RevenueSeries {
            region,
            points: Vec::new(),
        })
        .collect();

    for row in revenue_by_month_region(view) {
        if let Some(line) = series.iter_mut().find(|s| s.region == row.region) {
            line.points.push((row.month, row.revenue));
        }
    }

    series
}

/// Sum of sales per product with its share of the view's total
pub fn sales_by_product(view: &FilteredView<'_>) -> Vec<ProductShare> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    for record in view.iter() {
        match totals.iter_mut().find(|(product, _)| *product == record.product) {
            Some((_, sales)) => *sales += record.sales,
            None => totals.push((record.product.clone(), record.sales)),
        }
    }

    let grand_total: u64 = totals.iter().map(|(_, sales)| sales).sum();
    totals
        .into_iter()
        .map(|(product, sales)| ProductShare {
            share: if grand_total == 0 {
                0.0
            } else {
                sales as f64 * 100.0 / grand_total as f64
            },
            product,
            sales,
        })
        .collect()
}

/// Run the aggregation that backs `mode`
pub fn aggregate(view: &FilteredView<'_>, mode: ChartMode) -> Aggregation {
    match mode {
        ChartMode::SalesByRegion => Aggregation::ByRegion(sales_by_region(view)),
        ChartMode::SalesByMonth => Aggregation::ByMonth(sales_by_month(view)),
        ChartMode::RevenueTrends => Aggregation::ByMonthRegion(revenue_series(view)),
        ChartMode::ProductPerformance => Aggregation::ByProduct(sales_by_product(view)),
    }
}

fn encountered_regions(view: &FilteredView<'_>) -> Vec<Region> {
    let mut regions = Vec::new();
    for record in view.iter() {
        if !regions.contains(&record.region) {
            regions.push(record.region);
        }
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_data, SalesRecord};
    use crate::filter::{filter_by_months, MonthSelection};

    fn jan_feb() -> FilteredView<'static> {
        filter_by_months(load_data(), &MonthSelection::from_months([Month::Jan, Month::Feb]))
    }

    #[test]
    fn test_sales_by_region_jan_feb() {
        let totals = sales_by_region(&jan_feb());

        assert_eq!(totals.len(), 5);
        let expected = [
            (Region::North, 210),
            (Region::South, 310),
            (Region::East, 250),
            (Region::West, 370),
            (Region::Central, 285),
        ];
        for (total, (region, sales)) in totals.iter().zip(expected) {
            assert_eq!(total.region, region);
            assert_eq!(total.sales, sales);
        }
    }

    #[test]
    fn test_sales_by_region_zero_fills_missing_regions() {
        let rows = vec![
            SalesRecord::new(Region::West, Month::Jan, "Widget A", 10, 100),
            SalesRecord::new(Region::East, Month::Jan, "Widget A", 20, 200),
        ];
        let view = FilteredView::from_rows(rows.iter().collect());
        let totals = sales_by_region(&view);

        assert_eq!(totals.len(), 5);
        assert_eq!(totals[0], RegionTotal { region: Region::West, sales: 10 });
        assert_eq!(totals[1], RegionTotal { region: Region::East, sales: 20 });
        assert!(totals[2..].iter().all(|t| t.sales == 0));
    }

    #[test]
    fn test_sales_by_month_calendar_order() {
        let view = filter_by_months(
            load_data(),
            &MonthSelection::from_months([Month::Dec, Month::Mar, Month::Jan]),
        );
        let totals = sales_by_month(&view);

        let months: Vec<_> = totals.iter().map(|t| t.month).collect();
        assert_eq!(months, vec![Month::Jan, Month::Mar, Month::Dec]);
        assert_eq!(totals[0].sales, 690);
        assert_eq!(totals[1].sales, 712);
        assert_eq!(totals[2].sales, 834);
    }

    #[test]
    fn test_group_totals_agree() {
        let table = load_data();
        for selection in [
            MonthSelection::default(),
            MonthSelection::all(),
            MonthSelection::from_months([Month::Feb, Month::Nov]),
        ] {
            let view = filter_by_months(table, &selection);
            let grand: u64 = view.iter().map(|r| r.sales).sum();
            let by_region: u64 = sales_by_region(&view).iter().map(|t| t.sales).sum();
            let by_month: u64 = sales_by_month(&view).iter().map(|t| t.sales).sum();

            assert_eq!(by_region, grand);
            assert_eq!(by_month, grand);
        }
    }

    #[test]
    fn test_revenue_by_month_region() {
        let rows = revenue_by_month_region(&jan_feb());

        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].month, Month::Jan);
        assert_eq!(rows[0].region, Region::North);
        assert_eq!(rows[0].revenue, 1000);
        assert_eq!(rows[5].month, Month::Feb);
        assert_eq!(rows[8].region, Region::West);
        assert_eq!(rows[8].revenue, 1800);
    }

    #[test]
    fn test_revenue_series_one_line_per_region() {
        let series = revenue_series(&jan_feb());

        assert_eq!(series.len(), 5);
        let north = &series[0];
        assert_eq!(north.region, Region::North);
        assert_eq!(north.points, vec![(Month::Jan, 1000), (Month::Feb, 1000)]);
    }

    #[test]
    fn test_sales_by_product_single_product() {
        let shares = sales_by_product(&jan_feb());

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].product, "Widget A");
        assert_eq!(shares[0].sales, 1425);
        assert!((shares[0].share - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_view_aggregations() {
        let view = filter_by_months(load_data(), &MonthSelection::none());

        for mode in ChartMode::ALL {
            assert!(aggregate(&view, mode).is_empty(), "{mode} should be empty");
        }
        assert!(revenue_by_month_region(&view).is_empty());
    }

    #[test]
    fn test_chart_mode_labels() {
        assert_eq!("Sales by Region".parse::<ChartMode>().unwrap(), ChartMode::SalesByRegion);
        assert_eq!("revenue trends".parse::<ChartMode>().unwrap(), ChartMode::RevenueTrends);
        assert_eq!(
            "Pie Chart".parse::<ChartMode>(),
            Err(DashboardError::UnknownChartMode("Pie Chart".to_string()))
        );

        assert_eq!(ChartMode::ProductPerformance.next(), ChartMode::SalesByRegion);
        assert_eq!(ChartMode::SalesByRegion.previous(), ChartMode::ProductPerformance);
        assert_eq!(ChartMode::RevenueTrends.kind(), ChartKind::MultiLine);
    }

    #[test]
    fn test_chart_mode_json_uses_label() {
        let json = serde_json::to_string(&ChartMode::SalesByMonth).unwrap();
        assert_eq!(json, "\"Sales by Month\"");

        let mode: ChartMode = serde_json::from_str("\"Product Performance\"").unwrap();
        assert_eq!(mode, ChartMode::ProductPerformance);
        assert!(serde_json::from_str::<ChartMode>("\"Scatter\"").is_err());
    }
}
