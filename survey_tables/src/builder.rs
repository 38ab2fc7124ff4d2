use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::debug;

pub use crate::config::*;

/// A builder for assembling a dataset from the rows of a survey export.
///
/// ```
/// use survey_tables::builder::DatasetBuilder;
/// use survey_tables::{RawValue, TableErrors};
///
/// let mut builder = DatasetBuilder::new(
///     &["RecordedDate".to_string(), "clubs_Participate".to_string()],
///     "recordeddate",
/// )?
/// .question_row(&["Recorded Date".to_string(), "Programs - Clubs".to_string()])
/// .metadata_row(&["{}".to_string(), "{}".to_string()]);
///
/// builder.add_record(&[
///     RawValue::Text("2020-09-01 10:00:00".to_string()),
///     RawValue::Text("Yes".to_string()),
/// ])?;
/// let dataset = builder.build();
/// assert_eq!(dataset.records().len(), 1);
///
/// # Ok::<(), TableErrors>(())
/// ```
pub struct DatasetBuilder {
    _columns: Vec<String>,
    _column_index: HashMap<String, usize>,
    _timestamp_idx: usize,
    _questions: Vec<String>,
    _metadata: Vec<String>,
    _records: Vec<Record>,
}

impl DatasetBuilder {
    pub fn new(columns: &[String], timestamp_column: &str) -> Result<DatasetBuilder, TableErrors> {
        let columns: Vec<String> = columns.iter().map(|c| c.trim().to_lowercase()).collect();
        let mut column_index: HashMap<String, usize> = HashMap::new();
        for (idx, c) in columns.iter().enumerate() {
            if column_index.insert(c.clone(), idx).is_some() {
                return Err(TableErrors::DuplicateColumn(c.clone()));
            }
        }
        let ts = timestamp_column.to_lowercase();
        let timestamp_idx = *column_index
            .get(&ts)
            .ok_or(TableErrors::MissingTimestampColumn(ts))?;
        Ok(DatasetBuilder {
            _questions: vec![String::new(); columns.len()],
            _metadata: vec![String::new(); columns.len()],
            _columns: columns,
            _column_index: column_index,
            _timestamp_idx: timestamp_idx,
            _records: Vec::new(),
        })
    }

    /// Sets the question text of each column (row 0 of the export).
    pub fn question_row(self, questions: &[String]) -> DatasetBuilder {
        let questions = self.pad(questions);
        DatasetBuilder {
            _questions: questions,
            ..self
        }
    }

    /// Sets the auxiliary metadata row (row 1 of the export).
    pub fn metadata_row(self, metadata: &[String]) -> DatasetBuilder {
        let metadata = self.pad(metadata);
        DatasetBuilder {
            _metadata: metadata,
            ..self
        }
    }

    fn pad(&self, row: &[String]) -> Vec<String> {
        let mut res: Vec<String> = row.iter().take(self._columns.len()).cloned().collect();
        res.resize(self._columns.len(), String::new());
        res
    }

    /// Adds a respondent record.
    ///
    /// Missing trailing cells are treated as empty. The timestamp must be
    /// formatted as `YYYY-MM-DD HH:MM:SS`: a record that cannot be placed in
    /// time would make every yearly table wrong, so this is an error.
    pub fn add_record(&mut self, values: &[RawValue]) -> Result<(), TableErrors> {
        // Rows 0 and 1 are the header rows.
        let row = self._records.len() + 2;
        if values.len() > self._columns.len() {
            return Err(TableErrors::RowTooLong {
                row,
                len: values.len(),
            });
        }
        let mut normalized: Vec<RawValue> = values.iter().map(normalize).collect();
        normalized.resize(self._columns.len(), RawValue::Absent);

        let timestamp = match &normalized[self._timestamp_idx] {
            RawValue::Text(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok(),
            _ => None,
        }
        .ok_or_else(|| TableErrors::MalformedTimestamp {
            row,
            value: values
                .get(self._timestamp_idx)
                .and_then(|v| v.as_text())
                .unwrap_or_default(),
        })?;
        debug!("add_record: row {} timestamp {}", row, timestamp);

        self._records.push(Record {
            timestamp,
            values: normalized,
        });
        Ok(())
    }

    pub fn build(self) -> Dataset {
        Dataset {
            columns: self._columns,
            column_index: self._column_index,
            questions: self._questions,
            metadata: self._metadata,
            records: self._records,
        }
    }
}

fn normalize(value: &RawValue) -> RawValue {
    match value {
        RawValue::Text(s) if s.trim().is_empty() => RawValue::Absent,
        RawValue::Text(s) => RawValue::Text(s.trim().to_lowercase()),
        RawValue::Number(n) if n.is_nan() => RawValue::Absent,
        x => x.clone(),
    }
}

impl Dataset {
    /// Builds a dataset from the rows of an export in its raw layout: row 0 is the
    /// question text, row 1 the metadata and the following rows are the records.
    pub fn from_raw_rows(
        columns: &[String],
        rows: &[Vec<RawValue>],
        timestamp_column: &str,
    ) -> Result<Dataset, TableErrors> {
        if rows.len() < 2 {
            return Err(TableErrors::MissingHeaderRows);
        }
        let header_text =
            |row: &[RawValue]| -> Vec<String> { row.iter().map(header_cell).collect() };
        let mut builder = DatasetBuilder::new(columns, timestamp_column)?
            .question_row(&header_text(&rows[0]))
            .metadata_row(&header_text(&rows[1]));
        for row in rows.iter().skip(2) {
            builder.add_record(row)?;
        }
        Ok(builder.build())
    }
}

// Header rows keep their original casing: this is the text shown to readers.
fn header_cell(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => format_number(*n),
        RawValue::Absent => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn columns() -> Vec<String> {
        vec!["RecordedDate".to_string(), "Clubs".to_string()]
    }

    #[test]
    fn lowercases_columns_and_values() {
        let rows = vec![
            vec![text("Recorded Date"), text("Programs - Clubs (all)")],
            vec![text("{}"), text("{}")],
            vec![text("2020-09-01 00:00:00"), text("  Yes ")],
            vec![text("2020-10-01 00:00:00"), text("")],
        ];
        let ds = Dataset::from_raw_rows(&columns(), &rows, "RecordedDate").unwrap();
        assert_eq!(ds.columns(), &["recordeddate".to_string(), "clubs".to_string()]);
        assert_eq!(ds.records()[0].values[1], text("yes"));
        assert_eq!(ds.records()[1].values[1], RawValue::Absent);
        // Question text is not lowercased.
        assert_eq!(ds.question_text("CLUBS"), Some("Programs - Clubs (all)"));
        assert_eq!(ds.metadata().len(), 2);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut b = DatasetBuilder::new(&columns(), "recordeddate").unwrap();
        b.add_record(&[text("2021-01-15 12:30:00")]).unwrap();
        let ds = b.build();
        assert_eq!(ds.records()[0].values, vec![text("2021-01-15 12:30:00"), RawValue::Absent]);
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let mut b = DatasetBuilder::new(&columns(), "recordeddate").unwrap();
        b.add_record(&[text("2021-01-15 12:30:00"), text("no")]).unwrap();
        let res = b.add_record(&[text("15/01/2021"), text("yes")]);
        assert_eq!(
            res,
            Err(TableErrors::MalformedTimestamp {
                row: 3,
                value: "15/01/2021".to_string()
            })
        );
        let res = b.add_record(&[RawValue::Absent, text("yes")]);
        assert!(matches!(res, Err(TableErrors::MalformedTimestamp { .. })));
    }

    #[test]
    fn rejects_bad_layouts() {
        let dup = vec!["a".to_string(), "A".to_string()];
        assert_eq!(
            DatasetBuilder::new(&dup, "a").err(),
            Some(TableErrors::DuplicateColumn("a".to_string()))
        );
        assert_eq!(
            DatasetBuilder::new(&columns(), "startdate").err(),
            Some(TableErrors::MissingTimestampColumn("startdate".to_string()))
        );
        let rows = vec![vec![text("q"), text("q")]];
        assert_eq!(
            Dataset::from_raw_rows(&columns(), &rows, "recordeddate").err(),
            Some(TableErrors::MissingHeaderRows)
        );
        let mut b = DatasetBuilder::new(&columns(), "recordeddate").unwrap();
        let res = b.add_record(&[text("2021-01-15 12:30:00"), text("a"), text("b")]);
        assert_eq!(res, Err(TableErrors::RowTooLong { row: 2, len: 3 }));
    }
}
