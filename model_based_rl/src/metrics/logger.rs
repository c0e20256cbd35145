//! Iteration metric sinks.
//!
//! The trainer calls `log` once per iteration and then `flush`, so every
//! sink has a complete row on disk (or screen) before the next iteration
//! starts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use super::iteration_stats::IterationSnapshot;

/// Logger trait for different logging backends.
pub trait MetricsLogger: Send {
    /// Record one iteration.
    fn log(&mut self, snapshot: &IterationSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Console table, one row per iteration.
pub struct ConsoleLogger {
    start_time: Instant,
    show_header: bool,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            show_header: true,
        }
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }

    fn header() -> String {
        let columns = format!(
            "{:>5} {:>12} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>10} {:>8} {:>10} {:>8}",
            "Iter",
            "AvgCost",
            "StdCost",
            "MinCost",
            "MaxCost",
            "AvgReturn",
            "MinReturn",
            "MaxReturn",
            "StdReturn",
            "Dataset",
            "ModelLoss",
            "Time"
        );
        let rule = "-".repeat(columns.len());
        format!("{}\n{}", columns, rule)
    }

    fn format_row(&self, snapshot: &IterationSnapshot) -> String {
        let loss = snapshot
            .model_loss
            .map(|l| format!("{:.5}", l))
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{:>5} {:>12.3} {:>10.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3} {:>10.3} {:>8} {:>10} {:>7.1}s",
            snapshot.iteration,
            snapshot.cost.mean,
            snapshot.cost.std,
            snapshot.cost.min,
            snapshot.cost.max,
            snapshot.returns.mean,
            snapshot.returns.min,
            snapshot.returns.max,
            snapshot.returns.std,
            snapshot.dataset_trajectories,
            loss,
            self.start_time.elapsed().as_secs_f32()
        )
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &IterationSnapshot) {
        if self.show_header {
            println!("{}", Self::header());
            self.show_header = false;
        }
        println!("{}", self.format_row(snapshot));
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// CSV file with a header row and one row per iteration.
pub struct CSVLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CSVLogger {
    /// Create (or truncate) the CSV file at `path`.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "iteration,{},dataset_trajectories,model_loss,elapsed_secs",
            IterationSnapshot::METRIC_NAMES.join(",")
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }

    /// Reset the start time.
    pub fn reset_timer(&mut self) {
        self.start_time = Instant::now();
    }
}

impl MetricsLogger for CSVLogger {
    fn log(&mut self, snapshot: &IterationSnapshot) {
        let values: Vec<String> = snapshot
            .named_values()
            .iter()
            .map(|(_, v)| format!("{:.6}", v))
            .collect();
        let loss = snapshot.model_loss.map(|l| l.to_string()).unwrap_or_default();

        if let Err(e) = writeln!(
            self.writer,
            "{},{},{},{},{:.2}",
            snapshot.iteration,
            values.join(","),
            snapshot.dataset_trajectories,
            loss,
            self.start_time.elapsed().as_secs_f32()
        ) {
            log::warn!("Failed to write metrics row: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush metrics file: {}", e);
        }
    }
}

impl Drop for CSVLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Multi-logger that writes to multiple backends.
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    /// Add a logger.
    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl Default for MultiLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &IterationSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::SummaryStats;

    fn snapshot(iteration: usize) -> IterationSnapshot {
        let stats = SummaryStats {
            mean: 1.5,
            std: 0.5,
            min: 1.0,
            max: 2.0,
        };
        IterationSnapshot {
            iteration,
            cost: stats,
            returns: stats,
            dataset_trajectories: 12,
            model_loss: None,
        }
        .with_model_loss(0.25)
    }

    #[test]
    fn test_console_logger() {
        let mut logger = ConsoleLogger::new();
        logger.log(&snapshot(0));
        logger.log(&snapshot(1));
        logger.flush();
    }

    #[test]
    fn test_console_row_has_cost_and_return_ranges() {
        let header = ConsoleLogger::header();
        let columns: Vec<&str> = header.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(
            columns,
            vec![
                "Iter", "AvgCost", "StdCost", "MinCost", "MaxCost", "AvgReturn", "MinReturn", "MaxReturn",
                "StdReturn", "Dataset", "ModelLoss", "Time"
            ]
        );

        let mut snap = snapshot(3);
        snap.cost = SummaryStats {
            mean: 5.0,
            std: 1.0,
            min: 4.0,
            max: 7.0,
        };
        let row = ConsoleLogger::new().format_row(&snap);
        let fields: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(fields.len(), columns.len());
        assert_eq!(&fields[..5], &["3", "5.000", "1.000", "4.000", "7.000"]);
        assert_eq!(fields[9], "12");
        assert_eq!(fields[10], "0.25000");
    }

    #[test]
    fn test_csv_logger_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        {
            let mut logger = CSVLogger::new(&path).unwrap();
            logger.log(&snapshot(0));
            logger.log(&snapshot(1));
            logger.flush();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(
            "iteration,AverageCost,StdCost,MinimumCost,MaximumCost,AverageReturn,StdReturn,MinimumReturn,MaximumReturn"
        ));
        assert!(lines[1].starts_with("0,1.500000,0.500000,1.000000,2.000000,"));
        assert!(lines[2].starts_with("1,"));
        assert!(lines[2].contains(",12,0.25,"));
    }

    #[test]
    fn test_csv_logger_flushed_each_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let mut logger = CSVLogger::new(&path).unwrap();
        logger.log(&snapshot(0));
        logger.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_multi_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("multi.csv");

        let mut multi = MultiLogger::new()
            .add(ConsoleLogger::new())
            .add(CSVLogger::new(&path).unwrap());
        assert_eq!(multi.len(), 2);

        multi.log(&snapshot(3));
        multi.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.lines().nth(1).unwrap().starts_with("3,"));
    }
}
