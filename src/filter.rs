// 🔎 Filter Stage - month selection and the filtered view it produces

use crate::dataset::{Month, SalesRecord, SalesTable};
use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Months picked in the sidebar multi-select. An empty selection is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthSelection {
    months: BTreeSet<Month>,
}

impl MonthSelection {
    pub fn all() -> Self {
        Self::from_months(Month::ALL)
    }

    pub fn none() -> Self {
        Self {
            months: BTreeSet::new(),
        }
    }

    /// The first `n` months in calendar order
    pub fn first_n(n: usize) -> Self {
        Self::from_months(Month::ALL.iter().copied().take(n))
    }

    pub fn from_months(months: impl IntoIterator<Item = Month>) -> Self {
        Self {
            months: months.into_iter().collect(),
        }
    }

    /// Parse a comma-separated list such as `"Jan,Feb"`. Blank input is the
    /// empty selection; any unknown label rejects the whole list.
    pub fn parse(list: &str) -> Result<Self, DashboardError> {
        let months = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Month>)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { months })
    }

    pub fn contains(&self, month: Month) -> bool {
        self.months.contains(&month)
    }

    /// Add the month if missing, remove it otherwise
    pub fn toggle(&mut self, month: Month) {
        if !self.months.remove(&month) {
            self.months.insert(month);
        }
    }

    /// Selected months in calendar order
    pub fn months(&self) -> Vec<Month> {
        self.months.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Every month not in this selection
    pub fn complement(&self) -> Self {
        Self::from_months(Month::ALL.iter().copied().filter(|m| !self.contains(*m)))
    }

    /// Comma-separated labels, the inverse of [`MonthSelection::parse`]
    pub fn to_query(&self) -> String {
        self.months
            .iter()
            .map(Month::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for MonthSelection {
    fn default() -> Self {
        Self::first_n(6)
    }
}

/// Rows of the base table that survived the month filter, in table order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView<'a> {
    rows: Vec<&'a SalesRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn from_rows(rows: Vec<&'a SalesRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[&'a SalesRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Owned copy of the visible rows (raw data table, API payloads)
    pub fn to_records(&self) -> Vec<SalesRecord> {
        self.rows.iter().map(|r| (*r).clone()).collect()
    }
}

/// Keep rows whose month is selected
pub fn filter_by_months<'a>(table: &'a SalesTable, selection: &MonthSelection) -> FilteredView<'a> {
    FilteredView::from_rows(
        table
            .iter()
            .filter(|record| selection.contains(record.month))
            .collect(),
    )
}

/// Whole table as a view, for callers that do not filter
pub fn unfiltered(table: &SalesTable) -> FilteredView<'_> {
    FilteredView::from_rows(table.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load_data;

    #[test]
    fn test_filter_jan_feb() {
        let table = load_data();
        let selection = MonthSelection::from_months([Month::Jan, Month::Feb]);
        let view = filter_by_months(table, &selection);

        assert_eq!(view.len(), 10);
        assert!(view.iter().all(|r| r.month == Month::Jan || r.month == Month::Feb));
        // Table order is kept: all of January first
        assert!(view.rows()[..5].iter().all(|r| r.month == Month::Jan));
    }

    #[test]
    fn test_filter_all_is_identity() {
        let table = load_data();
        let view = filter_by_months(table, &MonthSelection::all());
        assert_eq!(view, unfiltered(table));
        assert_eq!(view.to_records(), table.records().to_vec());
    }

    #[test]
    fn test_filter_empty_selection() {
        let table = load_data();
        let view = filter_by_months(table, &MonthSelection::none());
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_and_complement_partition_table() {
        let table = load_data();

        // Walk every non-empty subset of the twelve months
        for mask in 1u32..(1 << 12) {
            let selection = MonthSelection::from_months(
                Month::ALL
                    .iter()
                    .copied()
                    .filter(|m| mask & (1 << m.index()) != 0),
            );
            let view = filter_by_months(table, &selection);
            let rest = filter_by_months(table, &selection.complement());

            assert!(view.iter().all(|r| selection.contains(r.month)));
            assert_eq!(view.len(), selection.len() * 5);
            assert_eq!(view.len() + rest.len(), table.len());
        }
    }

    #[test]
    fn test_default_selection_is_first_six_months() {
        let selection = MonthSelection::default();
        assert_eq!(
            selection.months(),
            vec![Month::Jan, Month::Feb, Month::Mar, Month::Apr, Month::May, Month::Jun]
        );
    }

    #[test]
    fn test_toggle() {
        let mut selection = MonthSelection::none();
        selection.toggle(Month::Mar);
        assert!(selection.contains(Month::Mar));
        selection.toggle(Month::Mar);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_parse_selection() {
        let selection = MonthSelection::parse("Feb, Jan").unwrap();
        assert_eq!(selection.months(), vec![Month::Jan, Month::Feb]);
        assert_eq!(selection.to_query(), "Jan,Feb");

        assert!(MonthSelection::parse("").unwrap().is_empty());
        assert_eq!(
            MonthSelection::parse("Jan,Smarch"),
            Err(DashboardError::UnknownMonth("Smarch".to_string()))
        );
    }
}
