use std::path::PathBuf;

use anyhow::{Context, Result};
use atc_cli::{report::render_report, AnalysisClient};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Submit a flight file to a running analysis server")]
struct Args {
    /// Flight file (JSON array or CSV)
    file: PathBuf,

    /// ATC Server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Sampling step in seconds (server default when omitted)
    #[arg(long)]
    step: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    atc_cli::init_logging();
    let args = Args::parse();
    let client = AnalysisClient::new(args.url);

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let batch = client.ingest(text).await?;
    println!("Server accepted {} flights", batch.count);

    let submitted = client.analyze(&batch.flights, args.step).await?;
    println!("Analysis id: {}\n", submitted.analysis_id);

    let scored = client.score(&submitted.analysis.conflicts).await?;
    print!(
        "{}",
        render_report(&submitted.analysis, &scored.candidates, &scored.summary)
    );

    Ok(())
}
