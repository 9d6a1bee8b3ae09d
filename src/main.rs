use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use ip_cardinality::config::{DEFAULT_CHUNK_SIZE, DEFAULT_WORKER_COUNT};
use ip_cardinality::counter::DEFAULT_PROMOTION_THRESHOLD;
use ip_cardinality::{count_unique_in_file, ChunkBoundary, Config};

/// Count distinct IPv4 addresses in a newline-delimited file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file with one dotted-quad address per line
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Bytes read per chunk handed to a worker
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Number of parsing threads
    #[arg(short = 't', long = "workers", value_name = "N", default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Distinct addresses above which the counter switches to a 512 MiB bitmap
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PROMOTION_THRESHOLD)]
    promotion_threshold: usize,

    /// How chunk edges relate to line boundaries
    #[arg(long, value_enum, default_value_t = CliBoundary::Aligned)]
    boundary: CliBoundary,
}

/// Chunk boundary options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliBoundary {
    /// Never split a line across chunks
    Aligned,
    /// Cut chunks every `--chunk-size` bytes; addresses on a cut are lost
    Split,
}

impl From<CliBoundary> for ChunkBoundary {
    fn from(boundary: CliBoundary) -> Self {
        match boundary {
            CliBoundary::Aligned => ChunkBoundary::LineAligned,
            CliBoundary::Split => ChunkBoundary::Split,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // stdout carries only the result line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::default()
        .with_chunk_size(args.chunk_size)
        .with_worker_count(args.workers)
        .with_promotion_threshold(args.promotion_threshold)
        .with_boundary(args.boundary.into());

    match count_unique_in_file(&args.input, &config) {
        Ok(summary) => {
            println!("Number of unique IP addresses: {}", summary.unique);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
