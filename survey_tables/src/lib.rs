/*!
Summary tables for survey exports, grouped by academic year.

The entry point is [`TableGenerator`]: it is configured with a [`Dataset`] (see
[`builder::DatasetBuilder`]) and a [`ReportConfig`], and produces one
[`ResultTable`] per configured table.

```
use survey_tables::*;

let rows: Vec<Vec<RawValue>> = vec![
    vec!["Recorded Date", "Did you participate? - Student clubs"],
    vec!["{}", "{}"],
    vec!["2020-09-01 10:00:00", "Yes"],
    vec!["2021-01-15 10:00:00", "Yes"],
    vec!["2021-05-01 10:00:00", "No"],
]
.into_iter()
.map(|r| r.into_iter().map(|s| RawValue::Text(s.to_string())).collect())
.collect();
let columns = vec!["RecordedDate".to_string(), "clubs_participate".to_string()];
let dataset = Dataset::from_raw_rows(&columns, &rows, "recordeddate")?;

let config = ReportConfig {
    tables: vec![TableSpec::Frequency {
        question: "Participation".to_string(),
        sub_questions: vec!["clubs_participate".to_string()],
        freq_keys: vec!["yes".to_string()],
    }],
    score_map: ScoreMap::new(),
    years: YearRange { start: 2020, end: 2020 },
};
let tables = TableGenerator::configure(&dataset, &config).generate_tables();
assert_eq!(
    tables[0].find("Student clubs", Some("2020"), "%'yes'"),
    Some(&Cell::Integer(66))
);
# Ok::<(), TableErrors>(())
```
*/

mod config;
use log::{info, warn};

pub mod builder;
pub mod classify;
pub mod freq;
pub mod manual;
pub mod mean;
pub mod questions;
pub mod years;

pub use crate::config::*;
use crate::years::{partition_by_year, YearBucket};

/// A report generator, configured for one dataset.
///
/// Nothing is shared between generators: each request builds its own from
/// its own inputs.
pub struct TableGenerator<'a> {
    dataset: &'a Dataset,
    config: &'a ReportConfig,
    buckets: Vec<YearBucket<'a>>,
}

impl<'a> TableGenerator<'a> {
    pub fn configure(dataset: &'a Dataset, config: &'a ReportConfig) -> TableGenerator<'a> {
        info!(
            "Configuring {} tables over {} records, years {}-{}",
            config.tables.len(),
            dataset.records().len(),
            config.years.start,
            config.years.end
        );
        TableGenerator {
            dataset,
            config,
            buckets: partition_by_year(dataset, &config.years),
        }
    }

    pub fn buckets(&self) -> &[YearBucket<'a>] {
        &self.buckets
    }

    pub fn generate_table(&self, spec: &TableSpec) -> ResultTable {
        match spec {
            TableSpec::Frequency {
                question,
                sub_questions,
                freq_keys,
            } => freq::frequency_table(
                self.dataset,
                &self.buckets,
                question,
                sub_questions,
                freq_keys,
            ),
            TableSpec::Mean {
                question,
                sub_questions,
                filter,
            } => mean::mean_table(
                self.dataset,
                &self.buckets,
                question,
                sub_questions,
                &self.config.score_map,
                filter.as_ref(),
            ),
            TableSpec::Unknown {
                question,
                type_name,
            } => {
                warn!(
                    "generate_table: unknown table type {:?} for {:?}",
                    type_name, question
                );
                table_type_error(question, type_name)
            }
        }
    }

    /// All the tables, in the configured order.
    pub fn generate_tables(&self) -> Vec<ResultTable> {
        self.config
            .tables
            .iter()
            .map(|t| self.generate_table(t))
            .collect()
    }
}

fn table_type_error(question: &str, type_name: &str) -> ResultTable {
    ResultTable {
        name: question.to_string(),
        axis_name: None,
        columns: vec![ColumnKey {
            group: None,
            label: String::new(),
        }],
        rows: vec![TableRow {
            label: "Error".to_string(),
            cells: vec![Cell::Text(format!(
                "Incorrect table type: '{}' for question: '{}'",
                type_name, question
            ))],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    fn dataset() -> Dataset {
        let columns: Vec<String> = ["RecordedDate", "clubs_Participate", "rec_Participate"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec![
                text("Recorded Date"),
                text("Programs (check all) - Did you participate? - Student clubs"),
                text("Programs (check all) - Did you participate? - Recreation"),
            ],
            vec![text("{\"ImportId\":\"recordedDate\"}"), text("{}"), text("{}")],
            vec![text("2020-09-01 00:00:00"), text("Yes"), text("No")],
            vec![text("2021-01-15 00:00:00"), text("yes"), text("No")],
            vec![text("2021-05-01 00:00:00"), text("NO"), text("Yes")],
            vec![text("2019-07-01 00:00:00"), text("yes"), text("yes")],
        ];
        Dataset::from_raw_rows(&columns, &rows, "recordeddate").unwrap()
    }

    fn config(tables: Vec<TableSpec>) -> ReportConfig {
        ReportConfig {
            tables,
            score_map: [("yes".to_string(), 1), ("no".to_string(), 0)]
                .into_iter()
                .collect(),
            years: YearRange {
                start: 2019,
                end: 2020,
            },
        }
    }

    #[test]
    fn frequency_scenario() {
        init();
        let ds = dataset();
        let cfg = config(vec![TableSpec::Frequency {
            question: "Did you participate?".to_string(),
            sub_questions: vec!["clubs_participate".to_string()],
            freq_keys: vec!["yes".to_string()],
        }]);
        let tables = TableGenerator::configure(&ds, &cfg).generate_tables();
        assert_eq!(tables.len(), 1);
        let t = &tables[0];
        assert_eq!(t.name, "Did you participate?");
        assert_eq!(t.find("Student clubs", Some("2020"), "#'yes'"), Some(&Cell::Integer(2)));
        assert_eq!(t.find("Student clubs", Some("2020"), "%'yes'"), Some(&Cell::Integer(66)));
        // The July 2019 record belongs to no academic year.
        assert_eq!(t.find("Student clubs", Some("2019"), "#'yes'"), Some(&Cell::Integer(0)));
    }

    #[test]
    fn mean_scenario() {
        init();
        let ds = dataset();
        let cfg = config(vec![TableSpec::Mean {
            question: "Participation score".to_string(),
            sub_questions: vec![
                "clubs_participate".to_string(),
                "rec_participate".to_string(),
                "ministry_participate".to_string(),
            ],
            filter: None,
        }]);
        let tables = TableGenerator::configure(&ds, &cfg).generate_tables();
        let t = &tables[0];
        let labels: Vec<&str> = t.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Student clubs", "Recreation", "Not Found - ministry_participate"]
        );
        assert_eq!(t.find("Student clubs", None, "2020"), Some(&Cell::Decimal(0.67)));
        assert_eq!(t.find("Recreation", None, "2020"), Some(&Cell::Decimal(0.33)));
        assert_eq!(t.find("Student clubs", None, "2019"), Some(&Cell::NoData));
        assert_eq!(t.rows[2].cells, vec![Cell::NoData, Cell::NoData]);
    }

    #[test]
    fn unknown_type_does_not_stop_the_report() {
        init();
        let ds = dataset();
        let cfg = config(vec![
            TableSpec::Unknown {
                question: "Broken Table".to_string(),
                type_name: "bogus".to_string(),
            },
            TableSpec::Frequency {
                question: "Recreation".to_string(),
                sub_questions: vec!["rec_participate".to_string()],
                freq_keys: vec!["yes".to_string(), "no".to_string()],
            },
        ]);
        let tables = TableGenerator::configure(&ds, &cfg).generate_tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "Broken Table");
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(
            tables[0].rows[0].cells,
            vec![Cell::Text(
                "Incorrect table type: 'bogus' for question: 'Broken Table'".to_string()
            )]
        );
        assert_eq!(
            tables[1].find("Recreation", Some("2020"), "#'yes or no'"),
            Some(&Cell::Integer(3))
        );
        assert_eq!(
            tables[1].find("Recreation", Some("2020"), "%'yes or no'"),
            Some(&Cell::Integer(99))
        );
    }

    #[test]
    fn generators_are_independent() {
        let ds = dataset();
        let cfg_a = config(vec![]);
        let mut cfg_b = config(vec![]);
        cfg_b.years = YearRange {
            start: 2020,
            end: 2020,
        };
        let a = TableGenerator::configure(&ds, &cfg_a);
        let b = TableGenerator::configure(&ds, &cfg_b);
        assert_eq!(a.buckets().len(), 2);
        assert_eq!(b.buckets().len(), 1);
        assert!(a.generate_tables().is_empty());
    }
}
