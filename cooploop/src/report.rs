//! Printable summaries of scenario runs

use std::fmt::Write as _;
use std::time::Duration;

use colored::*;
use serde::Serialize;

use crate::clock::ClockMode;
use crate::scenario::Scenario;
use crate::scheduler::{RunReport, SchedulerStats};
use crate::task::TaskId;
use crate::timing::Tolerance;
use crate::trace::{TraceEvent, TraceKind};

/// One task's result, labelled
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task: TaskId,
    pub name: String,
    pub result: String,
}

/// Everything worth printing about one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub clock: ClockMode,
    #[serde(rename = "elapsed-ms")]
    pub elapsed_ms: f64,
    #[serde(rename = "expected-ms", skip_serializing_if = "Option::is_none")]
    pub expected_ms: Option<f64>,
    #[serde(rename = "within-tolerance", skip_serializing_if = "Option::is_none")]
    pub within_tolerance: Option<bool>,
    pub results: Vec<TaskResult>,
    pub stats: SchedulerStats,
    pub trace: Vec<TraceEvent>,
}

impl RunSummary {
    pub fn new(
        scenario: &Scenario,
        clock: ClockMode,
        report: &RunReport<String>,
        unit: Duration,
        tolerance: Tolerance,
    ) -> Self {
        let expected = scenario.expected_elapsed(unit);
        let results = scenario
            .tasks
            .iter()
            .zip(&report.results)
            .enumerate()
            .map(|(i, (spec, result))| TaskResult {
                task: TaskId(i),
                name: spec.name.clone(),
                result: result.clone(),
            })
            .collect();

        Self {
            scenario: scenario.name.clone(),
            clock,
            elapsed_ms: millis(report.elapsed),
            expected_ms: expected.map(millis),
            within_tolerance: expected.map(|e| tolerance.approx(report.elapsed, e)),
            results,
            stats: report.stats.clone(),
            trace: report.trace.events().to_vec(),
        }
    }

    /// True unless an expectation was declared and missed
    pub fn is_ok(&self) -> bool {
        self.within_tolerance.unwrap_or(true)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} {} ({} clock)", "▶".cyan(), self.scenario.bold(), self.clock);

        if !self.trace.is_empty() {
            let width = self.trace.iter().map(|e| e.name.len()).max().unwrap_or(0);
            for event in &self.trace {
                let _ = writeln!(
                    out,
                    "  {:>9}  {} {:<width$}  {}",
                    format!("{:.3}s", event.at.as_secs_f64()).dimmed(),
                    event.task.to_string().yellow(),
                    event.name,
                    describe(&event.kind),
                    width = width
                );
            }
        }

        let _ = writeln!(out, "results:");
        for result in &self.results {
            let _ = writeln!(
                out,
                "  {} {} → {}",
                result.task.to_string().yellow(),
                result.name,
                result.result.green()
            );
        }

        let elapsed = format!("{:.3}s", self.elapsed_ms / 1000.0);
        match (self.expected_ms, self.within_tolerance) {
            (Some(expected), Some(true)) => {
                let _ = writeln!(
                    out,
                    "elapsed: {} (expected {:.3}s {})",
                    elapsed.bold(),
                    expected / 1000.0,
                    "✓".green()
                );
            }
            (Some(expected), _) => {
                let _ = writeln!(
                    out,
                    "elapsed: {} (expected {:.3}s {})",
                    elapsed.bold(),
                    expected / 1000.0,
                    "✗".red()
                );
            }
            _ => {
                let _ = writeln!(out, "elapsed: {}", elapsed.bold());
            }
        }

        let _ = writeln!(
            out,
            "stats: {} steps, {} suspensions, {} blocking steps ({}ms blocked)",
            self.stats.total_steps,
            self.stats.total_suspensions,
            self.stats.total_blocking_steps,
            self.stats.total_blocked_ms
        );
        out
    }
}

/// A scenario run cooperatively next to its all-blocking counterpart
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub cooperative: RunSummary,
    pub blocking: RunSummary,
    /// Blocking elapsed divided by cooperative elapsed
    pub speedup: f64,
}

impl Comparison {
    pub fn new(cooperative: RunSummary, blocking: RunSummary) -> Self {
        let speedup = if cooperative.elapsed_ms > 0.0 {
            blocking.elapsed_ms / cooperative.elapsed_ms
        } else {
            1.0
        };
        Self {
            cooperative,
            blocking,
            speedup,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.cooperative.scenario.bold());
        let _ = writeln!(out, "  cooperative: {:>9.3}s", self.cooperative.elapsed_ms / 1000.0);
        let _ = writeln!(out, "  blocking:    {:>9.3}s", self.blocking.elapsed_ms / 1000.0);
        let _ = writeln!(out, "  speedup:     {:>9.2}x", self.speedup);
        out
    }
}

fn describe(kind: &TraceKind) -> String {
    match kind {
        TraceKind::Started => "started".to_string(),
        TraceKind::Emitted { message } => message.clone(),
        TraceKind::Suspended { resume_at } => format!("suspended until {:.3}s", resume_at.as_secs_f64()),
        TraceKind::Resumed => "resumed".to_string(),
        TraceKind::Blocked { duration } => format!("blocking for {:.3}s", duration.as_secs_f64()),
        TraceKind::Completed => "completed".to_string(),
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
