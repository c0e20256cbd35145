//! Training metrics and logging.
//!
//! ## Metrics
//!
//! - [`SummaryStats`]: mean / std / min / max of a set of values
//! - [`IterationSnapshot`]: cost and return statistics of one iteration
//!
//! ## Loggers
//!
//! - [`ConsoleLogger`]: Pretty-printed console output
//! - [`CSVLogger`]: CSV file logging for analysis
//! - [`MultiLogger`]: Combine multiple loggers

pub mod iteration_stats;
pub mod logger;

pub use iteration_stats::{IterationSnapshot, SummaryStats};
pub use logger::{CSVLogger, ConsoleLogger, MetricsLogger, MultiLogger};
