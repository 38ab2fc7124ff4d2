use std::path::Path;

use chrono::{Duration, NaiveDate};
use survey_tables::{RawValue, TIMESTAMP_FORMAT};

/// The content of an export file, before it is turned into a dataset.
#[derive(PartialEq, Debug, Clone)]
pub struct RawExport {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

/// The provider for a file: the one requested, or the one matching its extension.
pub fn detect_provider(path: &str, input_type: Option<&str>) -> String {
    if let Some(t) = input_type {
        return t.to_lowercase();
    }
    match Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("xlsx") | Some("xlsm") => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}

/// Column identifiers, without the byte order mark some exporters add.
pub fn clean_column_name(s: &str) -> String {
    s.trim_start_matches('\u{feff}').trim().to_string()
}

/// Formats an Excel serial date (days since 1899-12-30) like the text timestamps.
pub fn excel_serial_to_timestamp(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let dt = epoch.checked_add_signed(Duration::try_milliseconds(millis as i64)?)?;
    Some(dt.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers() {
        assert_eq!(detect_provider("data/survey.CSV", None), "csv");
        assert_eq!(detect_provider("data/survey.xlsx", None), "xlsx");
        assert_eq!(detect_provider("data/survey", None), "csv");
        assert_eq!(detect_provider("data/survey.txt", Some("XLSX")), "xlsx");
    }

    #[test]
    fn excel_dates() {
        assert_eq!(
            excel_serial_to_timestamp(44075.5).as_deref(),
            Some("2020-09-01 12:00:00")
        );
        assert_eq!(excel_serial_to_timestamp(-1e300), None);
        assert_eq!(excel_serial_to_timestamp(-1e12), None);
        assert_eq!(excel_serial_to_timestamp(f64::NAN), None);
        assert_eq!(clean_column_name("\u{feff}StartDate "), "StartDate");
    }
}
