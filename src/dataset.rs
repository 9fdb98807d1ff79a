// 🗂️ Dataset Provider - fixed sales table, built once per process
//
// The table is immutable after construction. Every render borrows the same
// `&'static SalesTable`, so filtering and aggregation never copy the base rows.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::debug;

// ============================================================================
// REGION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    North,
    South,
    East,
    West,
    Central,
}

impl Region {
    /// All regions, in dataset row order
    pub const ALL: [Region; 5] = [
        Region::North,
        Region::South,
        Region::East,
        Region::West,
        Region::Central,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
            Region::Central => "Central",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::UnknownRegion(s.to_string()))
    }
}

// ============================================================================
// MONTH
// ============================================================================

/// Calendar month; `Ord` follows the calendar, not the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Zero-based position in the calendar
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::UnknownMonth(s.to_string()))
    }
}

// ============================================================================
// SALES RECORD
// ============================================================================

/// One row of the sales table.
///
/// Field order matches the export header: Region, Sales, Month, Product, Revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Region")]
    pub region: Region,

    #[serde(rename = "Sales")]
    pub sales: u64,

    #[serde(rename = "Month")]
    pub month: Month,

    #[serde(rename = "Product")]
    pub product: String,

    #[serde(rename = "Revenue")]
    pub revenue: u64,
}

impl SalesRecord {
    pub fn new(region: Region, month: Month, product: &str, sales: u64, revenue: u64) -> Self {
        Self {
            region,
            sales,
            month,
            product: product.to_string(),
            revenue,
        }
    }
}

// ============================================================================
// SALES TABLE
// ============================================================================

/// Append-only at construction, read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SalesRecord> {
        self.records.iter()
    }

    /// Distinct months in first-encountered order (the month picker's options)
    pub fn months(&self) -> Vec<Month> {
        let mut seen = Vec::new();
        for record in &self.records {
            if !seen.contains(&record.month) {
                seen.push(record.month);
            }
        }
        seen
    }
}

pub const PRODUCT_NAME: &str = "Widget A";

const SALES: [u64; 60] = [
    100, 150, 120, 180, 140, 110, 160, 130, 190, 145,
    105, 155, 125, 185, 142, 115, 165, 135, 195, 150,
    108, 158, 128, 188, 144, 118, 168, 138, 198, 152,
    112, 162, 132, 192, 146, 122, 172, 142, 202, 156,
    116, 166, 136, 196, 148, 126, 176, 146, 206, 160,
    120, 170, 140, 200, 150, 130, 180, 150, 210, 164,
];

const REVENUE: [u64; 5] = [1000, 1500, 1200, 1800, 1400];

/// Build the 12 months × 5 regions table from scratch
pub fn build_sample_table() -> SalesTable {
    let records = Month::ALL
        .iter()
        .enumerate()
        .flat_map(|(m, month)| {
            Region::ALL.iter().enumerate().map(move |(r, region)| {
                SalesRecord::new(*region, *month, PRODUCT_NAME, SALES[m * 5 + r], REVENUE[r])
            })
        })
        .collect();

    SalesTable::new(records)
}

/// Shared base table; constructed on first use and reused by every render
pub fn load_data() -> &'static SalesTable {
    static TABLE: OnceLock<SalesTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let table = build_sample_table();
        debug!(rows = table.len(), "built sample sales table");
        table
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let table = load_data();
        assert_eq!(table.len(), 60);
        assert_eq!(table.months(), Month::ALL.to_vec());

        for month in Month::ALL {
            let rows: Vec<_> = table.iter().filter(|r| r.month == month).collect();
            assert_eq!(rows.len(), 5);
            let regions: Vec<_> = rows.iter().map(|r| r.region).collect();
            assert_eq!(regions, Region::ALL.to_vec());
        }
    }

    #[test]
    fn test_first_rows_match_source_values() {
        let table = load_data();
        let first = &table.records()[0];
        assert_eq!(first.region, Region::North);
        assert_eq!(first.month, Month::Jan);
        assert_eq!(first.product, "Widget A");
        assert_eq!(first.sales, 100);
        assert_eq!(first.revenue, 1000);

        let last = &table.records()[59];
        assert_eq!(last.region, Region::Central);
        assert_eq!(last.month, Month::Dec);
        assert_eq!(last.sales, 164);
        assert_eq!(last.revenue, 1400);
    }

    #[test]
    fn test_load_data_is_memoized() {
        let a = load_data();
        let b = load_data();
        assert!(std::ptr::eq(a, b));
        assert_eq!(*a, build_sample_table());
    }

    #[test]
    fn test_parse_categoricals() {
        assert_eq!("Feb".parse::<Month>().unwrap(), Month::Feb);
        assert_eq!(" dec ".parse::<Month>().unwrap(), Month::Dec);
        assert_eq!("west".parse::<Region>().unwrap(), Region::West);

        assert_eq!(
            "Foo".parse::<Month>(),
            Err(DashboardError::UnknownMonth("Foo".to_string()))
        );
        assert!("Nowhere".parse::<Region>().is_err());
    }

    #[test]
    fn test_month_order_is_calendar() {
        assert!(Month::Jan < Month::Feb);
        assert!(Month::Apr < Month::Aug);
        assert_eq!(Month::Dec.index(), 11);
    }
}
