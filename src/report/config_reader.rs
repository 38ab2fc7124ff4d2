use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::report::*;

pub const DEFAULT_TIMESTAMP_COLUMN: &str = "recordeddate";

/// One table, as written in the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub question: String,
    #[serde(rename = "type")]
    pub table_type: String,
    #[serde(default)]
    pub sub_questions: Vec<String>,
    pub freq_keys: Option<Vec<String>>,
    pub filter: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Path to the survey export, relative to the configuration file.
    pub datasource: Option<String>,
    pub title: Option<String>,
    pub section_config: Vec<SectionConfig>,
    #[serde(default)]
    pub score_map: HashMap<String, i64>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
    pub year_rollover_month: Option<u32>,
    pub timestamp_column: Option<String>,
}

pub fn read_config(path: &str) -> ReportResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

fn lowercase_all(xs: &[String]) -> Vec<String> {
    xs.iter().map(|s| s.trim().to_lowercase()).collect()
}

/// Turns a section of the configuration into a table specification.
///
/// Column identifiers and labels are lowercased, the question is kept as written.
/// Unknown table types are kept: they are reported in the output.
pub fn validate_section(section: &SectionConfig) -> ReportResult<TableSpec> {
    let question = section.question.clone();
    let sub_questions = lowercase_all(&section.sub_questions);
    let res = match section.table_type.trim().to_lowercase().as_str() {
        "freq" => {
            let freq_keys = match &section.freq_keys {
                Some(keys) => lowercase_all(keys),
                None => whatever!("Table {:?}: freq tables need freq_keys", section.question),
            };
            TableSpec::Frequency {
                question,
                sub_questions,
                freq_keys,
            }
        }
        "mean" => {
            let filter = match &section.filter {
                Some(f) if !f.trim().is_empty() => {
                    Some(FilterExpr::parse(f).context(InvalidConfigSnafu {})?)
                }
                _ => None,
            };
            TableSpec::Mean {
                question,
                sub_questions,
                filter,
            }
        }
        _ => TableSpec::Unknown {
            question,
            type_name: section.table_type.clone(),
        },
    };
    Ok(res)
}

pub fn validate_config(config: &SurveyConfig, today: NaiveDate) -> ReportResult<ReportConfig> {
    let years = YearRange::resolve(
        config.year_start,
        config.year_end,
        today,
        config
            .year_rollover_month
            .unwrap_or(YearRange::DEFAULT_ROLLOVER_MONTH),
    )
    .context(InvalidConfigSnafu {})?;

    let tables = config
        .section_config
        .iter()
        .map(validate_section)
        .collect::<ReportResult<Vec<TableSpec>>>()?;

    let score_map: ScoreMap = config
        .score_map
        .iter()
        .map(|(k, v)| (k.trim().to_lowercase(), *v))
        .collect();

    Ok(ReportConfig {
        tables,
        score_map,
        years,
    })
}
