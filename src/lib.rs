//! `ip-cardinality` is a Rust crate designed to count the number of distinct IPv4 addresses in large
//! newline-delimited inputs with memory that adapts to the cardinality actually observed.
//!
//! Addresses are recorded in an exact hash set while the number of distinct addresses stays small,
//! and in a fixed 512 MiB bitmap over the whole IPv4 space once it grows past a threshold. Input is
//! parsed in parallel by a pool of workers, each merging its private tally into the shared counter
//! exactly once.
//!
//! ```no_run
//! use ip_cardinality::{count_unique_in_file, Config};
//!
//! let summary = count_unique_in_file("addresses.txt", &Config::default())?;
//! println!("Number of unique IP addresses: {}", summary.unique);
//! # Ok::<(), ip_cardinality::Error>(())
//! ```

#[cfg(not(target_pointer_width = "64"))]
compile_error!("the address bitmap requires a 64-bit target");

pub mod address;
pub mod bitmap;
pub mod config;
pub mod counter;
mod error;
pub mod exact;
pub mod pipeline;
pub mod reader;
mod representation;
#[cfg(feature = "with_serde")]
mod serde;

pub use address::{format_address, parse_address, parse_line, MalformedAddress};
pub use bitmap::Bitmap;
pub use config::{ChunkBoundary, Config};
pub use counter::AdaptiveCounter;
pub use error::{Error, Result};
pub use exact::ExactSet;
pub use pipeline::{count_unique, count_unique_in_file, MergeCoordinator, RunSummary};
pub use representation::RepresentationKind;
