use acbledger::ingest::load_transactions;
use acbledger::{calculate, AppError, Config, RunReport};
use std::io::Write;

fn main() {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let transactions = load_transactions(&config.transactions_csv, config.sort_input)?;
    let outcome = calculate(&transactions)?;
    let report = RunReport::build(
        outcome,
        &transactions,
        &config.asset,
        config.tax_year,
        config.inclusion_rate,
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out).map_err(|e| AppError::Output(e.to_string()))?;
    Ok(())
}
