//! DataTrail offline reader binary.
//!
//! Takes index or data files (either half of a pair works), decodes every
//! stored segment, and prints an aggregate report of the contained event
//! records.
//!
//! ```bash
//! datatrail-reader mirror/alice.idx mirror/rust-101/bob.dat
//! ```

use std::path::PathBuf;

use clap::Parser;
use datatrail_reader::{read_pair, Error, Report};
use datatrail_storage::FilePair;

#[derive(Debug, Parser)]
#[command(name = "datatrail-reader", about = "Aggregate records from DataTrail log pairs")]
struct Args {
    /// Index or data files of the pairs to aggregate
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Naming the .idx and the .dat of one pair must not count it twice.
    let mut pairs: Vec<FilePair> = Vec::new();
    for file in &args.files {
        let pair =
            FilePair::from_either(file).ok_or_else(|| Error::UnrecognizedPath(file.clone()))?;
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    let mut report = Report::default();
    for pair in &pairs {
        read_pair(pair, |record| report.observe(record))?;
    }

    print!("{report}");
    Ok(())
}
