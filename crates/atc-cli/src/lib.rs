//! ATC CLI - command line tools for flight conflict analysis.
//!
//! Binaries:
//! - analyze_flights: offline analysis of a JSON or CSV flight file
//! - generate_flights: seeded synthetic traffic
//! - submit_flights: send a flight file to a running server

pub mod client;
pub mod report;

pub use client::AnalysisClient;

use tracing_subscriber::EnvFilter;

/// Log to stderr so report output on stdout stays clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
