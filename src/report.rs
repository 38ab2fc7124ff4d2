use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_tables::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::report::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod output;

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The file {path} has no header line"))]
    EmptyCsv { path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Missing worksheet or empty Excel file {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("Cannot read the survey export {path}"))]
    InvalidDataset { source: TableErrors, path: String },
    #[snafu(display("Invalid configuration"))]
    InvalidConfig { source: TableErrors },
    #[snafu(display("Error writing file {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Everything needed to produce one report.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ReportOptions {
    pub config_path: String,
    /// Overrides the datasource of the configuration.
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub excel_worksheet_name: Option<String>,
    /// A path, or `stdout`. Defaults to the standard output.
    pub out: Option<String>,
    pub html: Option<String>,
    pub reference: Option<String>,
}

fn read_dataset(
    root_path: &Path,
    config: &SurveyConfig,
    options: &ReportOptions,
) -> ReportResult<Dataset> {
    let data_path = match (&options.input, &config.datasource) {
        (Some(input), _) => input.clone(),
        (None, Some(datasource)) => {
            let p: PathBuf = [root_path, Path::new(datasource)].iter().collect();
            p.as_path().display().to_string()
        }
        (None, None) => whatever!("No datasource in the configuration and no --input"),
    };
    info!("Attempting to read survey export {:?}", data_path);

    let provider = io_common::detect_provider(&data_path, options.input_type.as_deref());
    let export = match provider.as_str() {
        "csv" => io_csv::read_csv_export(&data_path)?,
        "xlsx" => io_excel::read_excel_export(&data_path, options.excel_worksheet_name.as_deref())?,
        x => whatever!("Input type not implemented: {:?}", x),
    };
    debug!(
        "read_dataset: {} columns, {} rows",
        export.columns.len(),
        export.rows.len()
    );

    let timestamp_column = config
        .timestamp_column
        .clone()
        .unwrap_or_else(|| DEFAULT_TIMESTAMP_COLUMN.to_string());
    Dataset::from_raw_rows(&export.columns, &export.rows, &timestamp_column)
        .context(InvalidDatasetSnafu { path: data_path })
}

fn report_title(config: &SurveyConfig, config_path: &Path) -> String {
    config.title.clone().unwrap_or_else(|| {
        config_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    })
}

fn write_output(path: &str, contents: &str) -> ReportResult<()> {
    fs::write(path, contents).context(WritingSnafu { path })
}

/// Generates the tables for a configuration file.
pub fn run_report(options: &ReportOptions) -> ReportResult<Vec<ResultTable>> {
    let config_p = Path::new(options.config_path.as_str());
    let config = read_config(&options.config_path)?;
    info!("config: {:?}", config);

    // Validate the configuration before touching the data.
    let report_config = validate_config(&config, chrono::Local::now().date_naive())?;

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let dataset = read_dataset(root_p, &config, options)?;
    info!(
        "Read {} records with {} columns",
        dataset.records().len(),
        dataset.columns().len()
    );

    let tables = TableGenerator::configure(&dataset, &report_config).generate_tables();

    let title = report_title(&config, config_p);
    let summary_js = output::build_summary_js(&title, &tables);
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match options.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty_js_summary),
        Some(path) => write_output(path, &pretty_js_summary)?,
    }

    if let Some(html_path) = &options.html {
        write_output(html_path, &output::render_html(&title, &tables))?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &options.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(tables)
}

pub fn read_summary(path: &str) -> ReportResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}
