use std::path::PathBuf;

use anyhow::{Context, Result};
use atc_cli::report::render_report;
use atc_core::{
    analyze_flights, ingest_flights, score_resolutions, summarize_resolutions, AnalysisOptions,
};
use clap::Parser;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze a JSON or CSV flight file for losses of separation")]
struct Args {
    /// Flight file (JSON array or CSV)
    file: PathBuf,

    /// Sampling step in seconds
    #[arg(long, default_value_t = atc_core::rules::DEFAULT_FINE_STEP_SEC)]
    step: i64,

    /// Print the full analysis as JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    atc_cli::init_logging();
    let args = Args::parse();

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let batch = ingest_flights(&text)
        .with_context(|| format!("invalid flight data in {}", args.file.display()))?;
    tracing::info!(count = batch.count, "Flights loaded");

    let options = AnalysisOptions::with_step(args.step);
    let analysis = analyze_flights(&batch.flights, &options)?;
    let candidates = score_resolutions(&analysis.conflicts, &options.rules);
    let resolutions = summarize_resolutions(&analysis.conflicts, &candidates);

    if args.json {
        let output = json!({
            "analysis": analysis,
            "candidates": candidates,
            "resolution_summary": resolutions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(&analysis, &candidates, &resolutions));
    }

    Ok(())
}
