// 📈 Summary Metrics - totals, average and top performer for the filtered view

use crate::aggregate::sales_by_region;
use crate::dataset::Region;
use crate::filter::FilteredView;
use serde::{Deserialize, Serialize};
use thousands::Separable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub region: Region,
    pub sales: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub row_count: usize,
    pub total_sales: u64,
    /// `None` when the view is empty
    pub average_sales: Option<f64>,
    pub total_revenue: u64,
    /// `None` when the view is empty
    pub top_region: Option<TopPerformer>,
}

impl SummaryMetrics {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let row_count = view.len();
        let total_sales: u64 = view.iter().map(|r| r.sales).sum();
        let total_revenue: u64 = view.iter().map(|r| r.revenue).sum();

        let average_sales = if row_count == 0 {
            None
        } else {
            Some(total_sales as f64 / row_count as f64)
        };

        Self {
            row_count,
            total_sales,
            average_sales,
            total_revenue,
            top_region: top_region(view),
        }
    }

    pub fn has_data(&self) -> bool {
        self.row_count > 0
    }

    pub fn total_sales_display(&self) -> String {
        format_thousands(self.total_sales)
    }

    /// One decimal, or "N/A" for an empty view
    pub fn average_sales_display(&self) -> String {
        match self.average_sales {
            Some(avg) => format!("{:.1}", avg),
            None => "N/A".to_string(),
        }
    }

    pub fn total_revenue_display(&self) -> String {
        format!("${}", format_thousands(self.total_revenue))
    }
}

/// Region with the highest summed sales. On a tie the region encountered
/// first in the view wins.
pub fn top_region(view: &FilteredView<'_>) -> Option<TopPerformer> {
    let mut best: Option<TopPerformer> = None;
    for total in sales_by_region(view) {
        let better = match &best {
            Some(current) => total.sales > current.sales,
            None => true,
        };
        if better {
            best = Some(TopPerformer {
                region: total.region,
                sales: total.sales,
            });
        }
    }
    best
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    value.separate_with_commas()
}
