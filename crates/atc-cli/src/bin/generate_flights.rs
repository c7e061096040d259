use anyhow::Result;
use atc_core::{generate_flights, SyntheticConfig};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Csv,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate seeded synthetic flight traffic")]
struct Args {
    /// Total number of flights
    #[arg(long, default_value_t = 20)]
    count: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Pairs engineered to cross at a shared waypoint
    #[arg(long, default_value_t = 2)]
    crossing_pairs: usize,

    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

fn main() -> Result<()> {
    atc_cli::init_logging();
    let args = Args::parse();

    let flights = generate_flights(&SyntheticConfig {
        count: args.count,
        seed: args.seed,
        crossing_pairs: args.crossing_pairs,
        ..SyntheticConfig::default()
    })?;

    match args.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&flights)?),
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for flight in &flights {
                writer.serialize(flight)?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}
