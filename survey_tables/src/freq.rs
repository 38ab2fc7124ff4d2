use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::*;
use crate::questions::resolve_question;
use crate::years::YearBucket;

/// The synthetic category that is always present with a zero count.
pub const NOT_FOUND: &str = "not found";

/// Count and percentage of one category in one year.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CategoryFrequency {
    pub category: String,
    pub count: i64,
    pub percent: i64,
}

/// Frequencies of all the values of a column in one year, most frequent first.
///
/// Percentages are relative to the non-empty answers of that year only, and
/// truncated. The `not found` category is always appended with zero values.
pub fn value_frequencies(bucket: &YearBucket, column: Option<usize>) -> Vec<CategoryFrequency> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, i64> = HashMap::new();
    if let Some(idx) = column {
        for r in bucket.records.iter() {
            if let Some(v) = r.values.get(idx).and_then(|v| v.as_text()) {
                let c = counts.entry(v.clone()).or_insert(0);
                if *c == 0 {
                    order.push(v);
                }
                *c += 1;
            }
        }
    }
    let total: i64 = counts.values().sum();

    let mut res: Vec<CategoryFrequency> = order
        .into_iter()
        .filter(|c| c != NOT_FOUND)
        .map(|category| {
            let count = counts[&category];
            let percent = ((count as f64 / total as f64) * 100.0) as i64;
            CategoryFrequency {
                category,
                count,
                percent,
            }
        })
        .collect();
    // Stable: ties keep their order of appearance.
    res.sort_by(|a, b| b.count.cmp(&a.count));
    res.push(CategoryFrequency {
        category: NOT_FOUND.to_string(),
        count: 0,
        percent: 0,
    });
    res
}

/// Sums the frequencies of the matching categories.
///
/// When every key was observed, the keys are summed as listed. Otherwise only
/// the observed categories that are keys (or `not found`) are summed.
pub fn sum_matching(frequencies: &[CategoryFrequency], freq_keys: &[String]) -> (i64, i64) {
    let by_category: HashMap<&str, &CategoryFrequency> = frequencies
        .iter()
        .map(|f| (f.category.as_str(), f))
        .collect();

    let strict: Option<Vec<&CategoryFrequency>> = freq_keys
        .iter()
        .map(|k| by_category.get(k.as_str()).cloned())
        .collect();
    let selected: Vec<&CategoryFrequency> = match strict {
        Some(sel) => sel,
        None => {
            let mut wanted: HashSet<&str> = freq_keys.iter().map(|k| k.as_str()).collect();
            wanted.insert(NOT_FOUND);
            frequencies
                .iter()
                .filter(|f| wanted.contains(f.category.as_str()))
                .collect()
        }
    };
    selected
        .iter()
        .fold((0, 0), |(c, p), f| (c + f.count, p + f.percent))
}

pub fn freq_keys_label(freq_keys: &[String]) -> String {
    freq_keys.join(" or ")
}

/// The one-row frequency table of a single column, for every year.
pub fn frequency_row(
    dataset: &Dataset,
    buckets: &[YearBucket],
    tag: &str,
    freq_keys: &[String],
) -> TableRow {
    let column = dataset.column_position(tag);
    let mut cells: Vec<Cell> = Vec::new();
    for bucket in buckets.iter() {
        let frequencies = value_frequencies(bucket, column);
        let (count, percent) = sum_matching(&frequencies, freq_keys);
        debug!(
            "frequency_row: {} {}: {:?} -> {} {}%",
            tag, bucket.year, freq_keys, count, percent
        );
        cells.push(Cell::Integer(count));
        cells.push(Cell::Integer(percent));
    }
    TableRow {
        label: resolve_question(dataset, tag),
        cells,
    }
}

pub fn frequency_columns(buckets: &[YearBucket], freq_keys: &[String]) -> Vec<ColumnKey> {
    let label = freq_keys_label(freq_keys);
    buckets
        .iter()
        .flat_map(|b| {
            let group = Some(b.year.to_string());
            vec![
                ColumnKey {
                    group: group.clone(),
                    label: format!("#'{}'", label),
                },
                ColumnKey {
                    group,
                    label: format!("%'{}'", label),
                },
            ]
        })
        .collect()
}

/// One row per sub-question, in the configured order.
pub fn frequency_table(
    dataset: &Dataset,
    buckets: &[YearBucket],
    question: &str,
    sub_questions: &[String],
    freq_keys: &[String],
) -> ResultTable {
    ResultTable {
        name: question.to_string(),
        axis_name: Some("Question".to_string()),
        columns: frequency_columns(buckets, freq_keys),
        rows: sub_questions
            .iter()
            .map(|tag| frequency_row(dataset, buckets, tag, freq_keys))
            .collect(),
    }
}
