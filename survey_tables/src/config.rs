// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

/// The format of the timestamp column in survey exports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell of a survey export, after normalization.
///
/// Text is always stored lowercase: category labels are compared
/// case-insensitively.
#[derive(PartialEq, Debug, Clone)]
pub enum RawValue {
    Text(String),
    Number(f64),
    /// An empty cell.
    Absent,
}

impl RawValue {
    /// The text form of the value, as used for category counting.
    /// Absent values have no text form and are not counted.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Absent => None,
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One respondent.
#[derive(PartialEq, Debug, Clone)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    /// Aligned with the columns of the dataset.
    pub values: Vec<RawValue>,
}

/// The full export: columns, question text header and respondent records.
///
/// Built once per report with the [`crate::builder::DatasetBuilder`] and never
/// modified afterwards.
#[derive(PartialEq, Debug, Clone)]
pub struct Dataset {
    pub(crate) columns: Vec<String>,
    pub(crate) column_index: HashMap<String, usize>,
    pub(crate) questions: Vec<String>,
    pub(crate) metadata: Vec<String>,
    pub(crate) records: Vec<Record>,
}

impl Dataset {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The auxiliary metadata row of the export, kept as-is.
    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// Position of a column, looked up case-insensitively.
    pub fn column_position(&self, tag: &str) -> Option<usize> {
        self.column_index.get(&tag.to_lowercase()).cloned()
    }

    /// The raw question text for a column, if the column exists.
    pub fn question_text(&self, tag: &str) -> Option<&str> {
        self.column_position(tag)
            .and_then(|idx| self.questions.get(idx))
            .map(|s| s.as_str())
    }
}

// ********* Configuration **********

/// Comparison operators accepted by the filter expressions.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FilterOperand {
    /// Compared against the score of a value.
    Number(f64),
    /// Compared against the lowercase text of a value. Only equality tests.
    Label(String),
}

/// A parsed filter expression such as `>= 3` or `!= n/a`.
#[derive(PartialEq, Debug, Clone)]
pub struct FilterExpr {
    pub op: FilterOp,
    pub operand: FilterOperand,
}

/// Category label (lowercase) to score.
pub type ScoreMap = HashMap<String, i64>;

/// One requested output table.
#[derive(PartialEq, Debug, Clone)]
pub enum TableSpec {
    /// Counts and percentages of the responses matching `freq_keys`.
    Frequency {
        question: String,
        sub_questions: Vec<String>,
        freq_keys: Vec<String>,
    },
    /// Mean score per year.
    Mean {
        question: String,
        sub_questions: Vec<String>,
        filter: Option<FilterExpr>,
    },
    /// A table type that is not understood. It is reported in the output
    /// instead of failing the whole report.
    Unknown { question: String, type_name: String },
}

/// The inclusive range of academic years to report on.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub const DEFAULT_START: i32 = 2019;
    /// From September on, the academic year that started in August is included.
    pub const DEFAULT_ROLLOVER_MONTH: u32 = 9;

    pub fn years(&self) -> Vec<i32> {
        (self.start..=self.end).collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ReportConfig {
    pub tables: Vec<TableSpec>,
    pub score_map: ScoreMap,
    pub years: YearRange,
}

// ******** Output data structures *********

#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Integer(i64),
    Decimal(f64),
    /// No value could be computed (empty year, missing column).
    NoData,
    Text(String),
}

/// A column of a result table. Frequency tables use the year as the group.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnKey {
    pub group: Option<String>,
    pub label: String,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ResultTable {
    pub name: String,
    pub axis_name: Option<String>,
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<TableRow>,
}

impl ResultTable {
    /// Looks up a cell by row label and column key.
    pub fn find(&self, row_label: &str, group: Option<&str>, label: &str) -> Option<&Cell> {
        let col = self
            .columns
            .iter()
            .position(|c| c.group.as_deref() == group && c.label == label)?;
        let row = self.rows.iter().find(|r| r.label == row_label)?;
        row.cells.get(col)
    }
}

/// Errors that prevent a report from being generated.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TableErrors {
    /// The import does not contain the question and metadata header rows.
    MissingHeaderRows,
    DuplicateColumn(String),
    MissingTimestampColumn(String),
    /// A data row has more cells than there are columns.
    RowTooLong { row: usize, len: usize },
    MalformedTimestamp { row: usize, value: String },
    MalformedFilter(String),
    EmptyYearRange { start: i32, end: i32 },
}

impl Error for TableErrors {}

impl Display for TableErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableErrors::MissingHeaderRows => {
                write!(f, "the export must start with a question row and a metadata row")
            }
            TableErrors::DuplicateColumn(c) => write!(f, "duplicate column: {}", c),
            TableErrors::MissingTimestampColumn(c) => {
                write!(f, "timestamp column {:?} not found", c)
            }
            TableErrors::RowTooLong { row, len } => {
                write!(f, "row {}: too many cells ({})", row, len)
            }
            TableErrors::MalformedTimestamp { row, value } => {
                write!(f, "row {}: cannot parse timestamp {:?}", row, value)
            }
            TableErrors::MalformedFilter(s) => write!(f, "malformed filter expression: {:?}", s),
            TableErrors::EmptyYearRange { start, end } => {
                write!(f, "empty year range: {} to {}", start, end)
            }
        }
    }
}
