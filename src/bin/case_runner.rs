//! REST Case Runner Binary Entry Point
//!
//! Usage: `case-runner <config.json> <rows.json> [properties.json] [results.jsonl]`
//!
//! Loads the run configuration and static properties, bootstraps the suite
//! (store reset plus login), runs every row and prints a JSON report to
//! stdout. Logging goes to stderr and is controlled by `RUST_LOG`.
//!
//! Exit codes: 0 when every case passed or was skipped, 1 when any case
//! failed, 2 when the run could not start.

use rest_case_runner::config::load_config;
use rest_case_runner::context::RunContext;
use rest_case_runner::environment::{load_properties, StaticProperties};
use rest_case_runner::runner::{
    JsonLinesResultSink, JsonRowSource, LogNotifier, MemoryResultSink, ResultSink, Suite,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const USAGE: &str =
    "usage: case-runner <config.json> <rows.json> [properties.json] [results.jsonl]";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 4 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: &[String]) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_config(Path::new(&args[0]))?;
    let source = JsonRowSource::from_path(Path::new(&args[1]))?;
    let properties = match args.get(2) {
        Some(path) => load_properties(Path::new(path))?,
        None => StaticProperties::new(),
    };
    let sink: Arc<dyn ResultSink> = match args.get(3) {
        Some(path) => Arc::new(JsonLinesResultSink::open(path)?),
        None => Arc::new(MemoryResultSink::new()),
    };

    let suite = Suite::new(
        RunContext::new(config, properties),
        sink,
        Arc::new(LogNotifier),
    )?;
    log::info!("starting run {}", suite.run_id());

    suite.bootstrap().await?;
    let report = suite.run_all(&source).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!("{}", report.summary());

    Ok(report.is_success())
}
