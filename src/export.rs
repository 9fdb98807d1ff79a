// 💾 Export Stage - CSV download of the filtered view

use crate::dataset::SalesRecord;
use crate::filter::FilteredView;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const EXPORT_FILENAME: &str = "dashboard_data.csv";
pub const EXPORT_MIME: &str = "text/csv";
pub const EXPORT_HEADER: [&str; 5] = ["Region", "Sales", "Month", "Product", "Revenue"];

/// Downloadable artifact: what the "Download filtered data as CSV" action hands out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub filename: String,
    pub mime: String,
    pub body: String,
}

impl CsvExport {
    pub fn from_view(view: &FilteredView<'_>) -> Result<Self> {
        Self::with_name(view, EXPORT_FILENAME, EXPORT_MIME)
    }

    pub fn with_name(view: &FilteredView<'_>, filename: &str, mime: &str) -> Result<Self> {
        Ok(Self {
            filename: filename.to_string(),
            mime: mime.to_string(),
            body: to_csv(view)?,
        })
    }

    /// Write the body under `dir/filename`, returning the full path
    pub fn write_to_dir(&self, dir: &Path) -> Result<std::path::PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.body)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        Ok(path)
    }
}

/// Header row plus one row per visible record, in view order
pub fn to_csv(view: &FilteredView<'_>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    // An empty view still carries the header
    if view.is_empty() {
        wtr.write_record(EXPORT_HEADER)?;
    }
    for record in view.iter() {
        wtr.serialize(record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    let body = String::from_utf8(bytes).context("CSV output was not UTF-8")?;
    debug!(rows = view.len(), bytes = body.len(), "serialized CSV export");
    Ok(body)
}

/// Read an exported CSV back into records
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    if headers.iter().ne(EXPORT_HEADER.iter().copied()) {
        anyhow::bail!("Unexpected CSV header: {:?}", headers);
    }

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: SalesRecord =
            result.with_context(|| format!("Failed to parse CSV row {}", line + 2))?;
        records.push(record);
    }

    Ok(records)
}

pub fn parse_csv(body: &str) -> Result<Vec<SalesRecord>> {
    read_csv(body.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_data, Month, Region};
    use crate::filter::{filter_by_months, MonthSelection};

    #[test]
    fn test_csv_header_and_first_row() {
        let view = filter_by_months(load_data(), &MonthSelection::from_months([Month::Jan]));
        let body = to_csv(&view).unwrap();
        let lines: Vec<&str> = body.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Region,Sales,Month,Product,Revenue");
        assert_eq!(lines[1], "North,100,Jan,Widget A,1000");
        assert_eq!(lines[5], "Central,140,Jan,Widget A,1400");
    }

    #[test]
    fn test_csv_round_trip() {
        let view = filter_by_months(load_data(), &MonthSelection::default());
        let export = CsvExport::from_view(&view).unwrap();

        assert_eq!(export.filename, "dashboard_data.csv");
        assert_eq!(export.mime, "text/csv");

        let parsed = parse_csv(&export.body).unwrap();
        assert_eq!(parsed.len(), 30);
        assert_eq!(parsed, view.to_records());
    }

    #[test]
    fn test_empty_view_exports_header_only() {
        let view = filter_by_months(load_data(), &MonthSelection::none());
        let body = to_csv(&view).unwrap();

        assert_eq!(body.trim_end(), "Region,Sales,Month,Product,Revenue");
        assert!(parse_csv(&body).unwrap().is_empty());
    }

    #[test]
    fn test_read_csv_rejects_bad_input() {
        assert!(parse_csv("a,b,c\n1,2,3\n").is_err());
        assert!(parse_csv("Region,Sales,Month,Product,Revenue\nAtlantis,1,Jan,Widget A,5\n").is_err());

        let ok = parse_csv("Region,Sales,Month,Product,Revenue\nWest,7,Mar,Widget B,70\n").unwrap();
        assert_eq!(ok[0].region, Region::West);
        assert_eq!(ok[0].product, "Widget B");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = std::env::temp_dir().join(format!("sales-dashboard-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let view = filter_by_months(load_data(), &MonthSelection::from_months([Month::Feb]));
        let export = CsvExport::from_view(&view).unwrap();
        let path = export.write_to_dir(&dir).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, export.body);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
