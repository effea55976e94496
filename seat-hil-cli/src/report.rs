//! Report generation
//!
//! Renders a run summary as a plain text report, a JSON export or an HTML
//! page.

pub mod html;

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use chrono::Utc;
use seat_hil_bench::{FaultCode, RunSummary, TestOutcome, Timestamp, Verdict};
use serde::Serialize;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RULE: &str = "========================================";

/// Render the text report
pub fn render_text(summary: &RunSummary) -> Result<String> {
    let mut out = String::new();
    write_text(&mut out, summary).context("Failed to render text report")?;
    Ok(out)
}

/// Render the HTML report
pub fn render_html(summary: &RunSummary) -> Result<String> {
    let mut out = String::new();
    html::write_html(&mut out, summary).context("Failed to render HTML report")?;
    Ok(out)
}

fn write_text(out: &mut String, summary: &RunSummary) -> fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "SEAT COMFORT MODULE - TEST REPORT")?;
    writeln!(out, "Started:  {}", summary.started_at.to_rfc3339())?;
    writeln!(out, "Finished: {}", summary.finished_at.to_rfc3339())?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "Test Results Summary:")?;

    for outcome in &summary.outcomes {
        write!(out, "- {}: {}", outcome.case, outcome.verdict)?;
        if let Some(elapsed) = outcome.elapsed {
            write!(out, " [{:.2} ms]", as_ms(elapsed))?;
        }
        if let Some(code) = outcome.fault_code {
            write!(out, " [{}]", code)?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    writeln!(out, "Total Passed: {}/{}", summary.passed(), summary.total())?;
    writeln!(out, "Overall Result: {}", summary.overall())
}

/// JSON export layout
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated: Timestamp,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub summary: JsonSummary,
    pub test_results: Vec<JsonTestResult>,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub all_passed: bool,
}

#[derive(Debug, Serialize)]
pub struct JsonTestResult {
    pub test_id: &'static str,
    pub name: &'static str,
    pub status: &'static str,
    pub verdict: Verdict,
    pub elapsed_ms: Option<f64>,
    pub threshold_ms: u64,
    pub fault_code: Option<FaultCode>,
}

impl JsonReport {
    pub fn from_summary(summary: &RunSummary) -> Self {
        Self {
            generated: Utc::now(),
            started_at: summary.started_at,
            finished_at: summary.finished_at,
            summary: JsonSummary {
                total_tests: summary.total(),
                passed: summary.passed(),
                failed: summary.total() - summary.passed(),
                pass_rate: summary.pass_rate(),
                all_passed: summary.all_passed(),
            },
            test_results: summary.outcomes.iter().map(JsonTestResult::from_outcome).collect(),
        }
    }
}

impl JsonTestResult {
    fn from_outcome(outcome: &TestOutcome) -> Self {
        Self {
            test_id: outcome.case.id(),
            name: outcome.case.name(),
            status: if outcome.passed() { "PASS" } else { "FAIL" },
            verdict: outcome.verdict,
            elapsed_ms: outcome.elapsed.map(as_ms),
            threshold_ms: outcome.case.limits().threshold.as_millis() as u64,
            fault_code: outcome.fault_code,
        }
    }
}

/// Render the report in the requested format
pub fn render(summary: &RunSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => render_text(summary),
        OutputFormat::Html => render_html(summary),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport::from_summary(summary))
            .context("Failed to serialize JSON report"),
    }
}

/// Write the report into `output_dir` under a timestamped file name
pub fn write_report(summary: &RunSummary, format: OutputFormat, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let session_id = summary.started_at.format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("test_report_{}.{}", session_id, format.extension()));

    let content = render(summary, format)?;
    fs::write(&path, content).with_context(|| format!("Failed to write report: {:?}", path))?;

    log::info!("Report exported to {:?}", path);
    Ok(path)
}

pub(crate) fn as_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
