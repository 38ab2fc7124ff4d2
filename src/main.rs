use clap::Parser;
use log::{debug, info};
use std::error::Error;

mod args;
mod report;

use crate::args::Args;
use crate::report::{run_report, ReportOptions};

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    let config_path = match args.config.clone() {
        Some(p) => p,
        None => {
            eprintln!("A configuration file is required (--config)");
            std::process::exit(2);
        }
    };

    let options = ReportOptions {
        config_path,
        input: args.input,
        input_type: args.input_type,
        excel_worksheet_name: args.excel_worksheet_name,
        out: args.out,
        html: args.html,
        reference: args.reference,
    };

    match run_report(&options) {
        Ok(tables) => info!("Generated {} tables", tables.len()),
        Err(e) => {
            eprintln!("An error occured: {}", e);
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  caused by: {}", s);
                source = s.source();
            }
            std::process::exit(1);
        }
    }
}
