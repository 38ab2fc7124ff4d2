// Primitives for reading Excel exports.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use snafu::prelude::*;

use crate::report::{
    io_common::{clean_column_name, excel_serial_to_timestamp, RawExport},
    *,
};

fn get_range(path: &str, worksheet_name: Option<&str>) -> ReportResult<Range<DataType>> {
    debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    };
    wrange
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })
}

fn read_cell(cell: &DataType) -> RawValue {
    match cell {
        DataType::String(s) => RawValue::Text(s.clone()),
        DataType::Float(f) => RawValue::Number(*f),
        DataType::Int(i) => RawValue::Number(*i as f64),
        DataType::Bool(b) => RawValue::Text(b.to_string()),
        DataType::DateTime(f) => match excel_serial_to_timestamp(*f) {
            Some(s) => RawValue::Text(s),
            None => RawValue::Number(*f),
        },
        DataType::Empty => RawValue::Absent,
        _ => {
            warn!("read_cell: cannot read cell {:?}, treating it as empty", cell);
            RawValue::Absent
        }
    }
}

/// The first row of the worksheet holds the column identifiers.
pub fn read_excel_export(path: &str, worksheet_name: Option<&str>) -> ReportResult<RawExport> {
    let wrange = get_range(path, worksheet_name)?;
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    let columns: Vec<String> = header
        .iter()
        .map(|c| match read_cell(c) {
            RawValue::Text(s) => clean_column_name(&s),
            x => x.as_text().unwrap_or_default(),
        })
        .collect();
    debug!("read_excel_export: columns: {:?}", columns);

    let rows: Vec<Vec<RawValue>> = iter
        .map(|row| row.iter().map(read_cell).collect())
        .collect();
    Ok(RawExport { columns, rows })
}
