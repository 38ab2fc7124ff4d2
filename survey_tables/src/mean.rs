use log::debug;

use crate::classify::{passes_filter, to_score};
use crate::config::*;
use crate::questions::resolve_question;
use crate::years::YearBucket;

/// Mean score of a column over one year.
///
/// Values without a score or rejected by the filter are left out. Returns
/// `None` when nothing is left, including when the column does not exist.
pub fn mean_score(
    bucket: &YearBucket,
    column: Option<usize>,
    score_map: &ScoreMap,
    filter: Option<&FilterExpr>,
) -> Option<f64> {
    let idx = column?;
    let values: Vec<(&RawValue, Option<f64>)> = bucket
        .records
        .iter()
        .filter_map(|r| r.values.get(idx))
        .map(|v| (v, to_score(v, score_map)))
        .collect();
    let passing = passes_filter(filter, &values);

    let (sum, count) = values
        .iter()
        .zip(passing.iter())
        .filter_map(|((_, score), pass)| if *pass { *score } else { None })
        .fold((0.0, 0usize), |(s, c), x| (s + x, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Two decimals, halves going to the even neighbour.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// One row per sub-question and one column per year.
pub fn mean_table(
    dataset: &Dataset,
    buckets: &[YearBucket],
    question: &str,
    sub_questions: &[String],
    score_map: &ScoreMap,
    filter: Option<&FilterExpr>,
) -> ResultTable {
    let rows: Vec<TableRow> = sub_questions
        .iter()
        .map(|tag| {
            let column = dataset.column_position(tag);
            let cells = buckets
                .iter()
                .map(|bucket| {
                    let m = mean_score(bucket, column, score_map, filter);
                    debug!("mean_table: {} {}: {:?}", tag, bucket.year, m);
                    m.map(|x| Cell::Decimal(round2(x))).unwrap_or(Cell::NoData)
                })
                .collect();
            TableRow {
                label: resolve_question(dataset, tag),
                cells,
            }
        })
        .collect();
    ResultTable {
        name: question.to_string(),
        axis_name: Some("Question".to_string()),
        columns: buckets
            .iter()
            .map(|b| ColumnKey {
                group: None,
                label: b.year.to_string(),
            })
            .collect(),
        rows,
    }
}
