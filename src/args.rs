use clap::Parser;

/// This program builds yearly summary tables from a survey export.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON configuration of the report: datasource, tables and score map.
    /// For more information about the file format, read the documentation of the survey_tables crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided,
    /// surveytab will check that the generated summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the report will be written in JSON
    /// format to the given location. It is printed on the standard output otherwise.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) If specified, the tables will also be written as an HTML page to the
    /// given location.
    #[clap(long, value_parser)]
    pub html: Option<String>,

    /// (file path or empty) The survey export to read. Setting this option overrides the
    /// datasource of the configuration.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx, default from the file extension) The type of the input.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
