//! Command performance metrics.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timings kept per command; older samples are dropped first.
const MAX_SAMPLES_PER_COMMAND: usize = 1000;

#[derive(Debug, Default)]
struct CommandRecord {
    samples: Vec<f64>,
    count: u64,
    errors: u64,
}

/// Aggregated statistics for one command. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandStats {
    /// Successful and failed executions timed so far.
    pub count: u64,
    /// Mean execution time.
    pub avg_time: f64,
    /// Fastest execution.
    pub min_time: f64,
    /// Slowest execution.
    pub max_time: f64,
    /// Executions that ended in an error.
    pub error_count: u64,
    /// `error_count / count`.
    pub error_rate: f64,
}

/// Point-in-time view over every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Seconds since the metrics were created.
    pub uptime_seconds: u64,
    /// Executions across all commands.
    pub total_commands: u64,
    /// Errors across all commands.
    pub total_errors: u64,
    /// Per-command statistics by name.
    pub commands: BTreeMap<String, CommandStats>,
}

/// One row of [`PerformanceMetrics::slowest_commands`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowCommand {
    /// Command name.
    pub command: String,
    /// Mean execution time in seconds.
    pub avg_time: f64,
    /// Number of executions.
    pub count: u64,
}

/// Thread-safe metrics store.
#[derive(Debug)]
pub struct PerformanceMetrics {
    commands: DashMap<String, CommandRecord>,
    slow_threshold: Duration,
    started: Instant,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl PerformanceMetrics {
    /// Creates an empty store that warns about commands slower than
    /// `slow_threshold`.
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            commands: DashMap::new(),
            slow_threshold,
            started: Instant::now(),
        }
    }

    /// Records one execution of `command`.
    pub fn record_command(&self, command: &str, elapsed: Duration) {
        let seconds = elapsed.as_secs_f64();
        {
            let mut record = self.commands.entry(command.to_string()).or_default();
            record.count += 1;
            record.samples.push(seconds);
            if record.samples.len() > MAX_SAMPLES_PER_COMMAND {
                let excess = record.samples.len() - MAX_SAMPLES_PER_COMMAND;
                record.samples.drain(..excess);
            }
        }

        if elapsed > self.slow_threshold {
            warn!("Slow command: {} took {:.2}s", command, seconds);
        } else {
            debug!("Command {} took {:.3}s", command, seconds);
        }
    }

    /// Records that `command` failed.
    pub fn record_error(&self, command: &str) {
        self.commands.entry(command.to_string()).or_default().errors += 1;
    }

    /// Statistics for `command`, or `None` when it was never timed.
    pub fn command_stats(&self, command: &str) -> Option<CommandStats> {
        self.commands.get(command).and_then(|record| stats_for(&record))
    }

    /// Snapshot of every metric.
    pub fn all_stats(&self) -> MetricsSnapshot {
        let mut commands = BTreeMap::new();
        let mut total_commands = 0;
        let mut total_errors = 0;
        for entry in &self.commands {
            total_commands += entry.count;
            total_errors += entry.errors;
            if let Some(stats) = stats_for(entry.value()) {
                commands.insert(entry.key().clone(), stats);
            }
        }

        MetricsSnapshot {
            uptime_seconds: self.started.elapsed().as_secs(),
            total_commands,
            total_errors,
            commands,
        }
    }

    /// The `limit` commands with the highest mean time, slowest first.
    pub fn slowest_commands(&self, limit: usize) -> Vec<SlowCommand> {
        let mut rows: Vec<SlowCommand> = self
            .commands
            .iter()
            .filter_map(|entry| {
                stats_for(entry.value()).map(|stats| SlowCommand {
                    command: entry.key().clone(),
                    avg_time: stats.avg_time,
                    count: stats.count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.avg_time.total_cmp(&a.avg_time));
        rows.truncate(limit);
        rows
    }

    /// Writes a short summary to the log.
    pub fn log_summary(&self) {
        let snapshot = self.all_stats();
        info!(
            "Performance summary: uptime {}s, {} commands, {} errors",
            snapshot.uptime_seconds, snapshot.total_commands, snapshot.total_errors
        );
        for row in self.slowest_commands(3) {
            info!(
                "  {}: {:.2}s avg over {} runs",
                row.command, row.avg_time, row.count
            );
        }
    }
}

fn stats_for(record: &CommandRecord) -> Option<CommandStats> {
    if record.count == 0 || record.samples.is_empty() {
        return None;
    }
    let sum: f64 = record.samples.iter().sum();
    let min = record.samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = record.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(CommandStats {
        count: record.count,
        avg_time: sum / record.samples.len() as f64,
        min_time: min,
        max_time: max,
        error_count: record.errors,
        error_rate: record.errors as f64 / record.count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use harry_common::test_utils::assert_approx_eq;

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[test]
    fn test_command_stats() {
        let metrics = PerformanceMetrics::default();
        metrics.record_command("test_cmd", secs(1.0));
        metrics.record_command("test_cmd", secs(2.0));
        metrics.record_command("test_cmd", secs(3.0));
        metrics.record_error("test_cmd");

        let stats = metrics.command_stats("test_cmd").unwrap();
        assert_eq!(stats.count, 3);
        assert_approx_eq(stats.avg_time, 2.0, 1e-9);
        assert_approx_eq(stats.min_time, 1.0, 1e-9);
        assert_approx_eq(stats.max_time, 3.0, 1e-9);
        assert_eq!(stats.error_count, 1);
        assert_approx_eq(stats.error_rate, 0.333, 0.01);
    }

    #[test]
    fn test_unknown_command_has_no_stats() {
        let metrics = PerformanceMetrics::default();
        assert!(metrics.command_stats("nonexistent").is_none());
        metrics.record_error("only_errors");
        assert!(metrics.command_stats("only_errors").is_none());
    }

    #[test]
    fn test_all_stats() {
        let metrics = PerformanceMetrics::default();
        metrics.record_command("cmd1", secs(1.0));
        metrics.record_command("cmd2", secs(2.0));

        let stats = metrics.all_stats();
        assert_eq!(stats.total_commands, 2);
        assert_eq!(stats.total_errors, 0);
        assert!(stats.commands.contains_key("cmd1"));
        assert!(stats.commands.contains_key("cmd2"));
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = PerformanceMetrics::default().all_stats();
        assert_eq!(stats.total_commands, 0);
        assert!(stats.commands.is_empty());
    }

    #[test]
    fn test_slowest_commands() {
        let metrics = PerformanceMetrics::default();
        metrics.record_command("fast_cmd", secs(0.5));
        metrics.record_command("medium_cmd", secs(2.0));
        metrics.record_command("slow_cmd", secs(5.0));

        let slowest = metrics.slowest_commands(2);
        assert_eq!(slowest.len(), 2);
        assert_eq!(slowest[0].command, "slow_cmd");
        assert_eq!(slowest[1].command, "medium_cmd");
    }

    #[test]
    fn test_samples_are_bounded() {
        let metrics = PerformanceMetrics::default();
        for _ in 0..(MAX_SAMPLES_PER_COMMAND + 10) {
            metrics.record_command("spam", secs(0.01));
        }
        let record = metrics.commands.get("spam").unwrap();
        assert_eq!(record.samples.len(), MAX_SAMPLES_PER_COMMAND);
        assert_eq!(record.count, (MAX_SAMPLES_PER_COMMAND + 10) as u64);
    }
}
