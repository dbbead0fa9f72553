//! Reads a USPS delivery statistics (delstat) file and sums active residential
//! and business delivery counts per ZIP code.

pub mod aggregate;
pub mod input;
pub mod process;
pub mod record;
pub mod report;
pub mod summary;

pub use aggregate::{ZipAggregate, ZipAggregates};
pub use process::{process_path, process_stream, Outcome, ParsePolicy, ProcessOptions, RunStats};
pub use summary::Summary;
