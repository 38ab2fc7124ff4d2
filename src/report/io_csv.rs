// Primitives for reading CSV exports.

use std::io::Read;
use snafu::prelude::*;

use crate::report::{
    io_common::{clean_column_name, RawExport},
    *,
};

pub fn read_csv_export(path: &str) -> ReportResult<RawExport> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr, path)
}

/// The first line holds the column identifiers, every other line is kept as text.
pub fn read_records<R: Read>(rdr: csv::Reader<R>, path: &str) -> ReportResult<RawExport> {
    let mut records = rdr.into_records();
    let header = records
        .next()
        .context(EmptyCsvSnafu { path })?
        .context(CsvLineParseSnafu { lineno: 1usize })?;
    let columns: Vec<String> = header.iter().map(clean_column_name).collect();
    debug!("read_records: columns: {:?}", columns);

    let mut rows: Vec<Vec<RawValue>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        rows.push(line.iter().map(|s| RawValue::Text(s.to_string())).collect());
    }
    Ok(RawExport { columns, rows })
}
