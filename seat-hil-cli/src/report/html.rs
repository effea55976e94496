//! HTML report generator

use super::as_ms;
use seat_hil_bench::RunSummary;
use std::fmt::{self, Write};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
h1 { color: #333; }
.summary { background-color: #f0f0f0; padding: 10px; margin: 10px 0; }
.pass { color: green; }
.fail { color: red; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #4CAF50; color: white; }";

/// Write the HTML document for `summary` into `out`
pub fn write_html(out: &mut String, summary: &RunSummary) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Seat Comfort Module - Test Report</title>")?;
    writeln!(out, "<style>\n{}\n</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>Seat Comfort Module - Test Execution Report</h1>")?;

    writeln!(out, "<div class=\"summary\">")?;
    writeln!(out, "<p><strong>Started:</strong> {}</p>", summary.started_at.to_rfc3339())?;
    writeln!(out, "<p><strong>Total Tests:</strong> {}</p>", summary.total())?;
    writeln!(out, "<p><strong class=\"pass\">Passed:</strong> {}</p>", summary.passed())?;
    writeln!(
        out,
        "<p><strong class=\"fail\">Failed:</strong> {}</p>",
        summary.total() - summary.passed()
    )?;
    writeln!(out, "<p><strong>Pass Rate:</strong> {:.1}%</p>", summary.pass_rate())?;
    writeln!(out, "<p><strong>Overall Result:</strong> {}</p>", summary.overall())?;
    writeln!(out, "</div>")?;

    writeln!(out, "<h2>Test Results</h2>")?;
    writeln!(out, "<table>")?;
    writeln!(
        out,
        "<tr><th>Test ID</th><th>Test</th><th>Status</th><th>Verdict</th>\
         <th>Elapsed (ms)</th><th>Threshold (ms)</th><th>Fault Code</th></tr>"
    )?;

    for outcome in &summary.outcomes {
        let (class, status) = if outcome.passed() {
            ("pass", "PASS")
        } else {
            ("fail", "FAIL")
        };
        let elapsed = outcome
            .elapsed
            .map(|elapsed| format!("{:.2}", as_ms(elapsed)))
            .unwrap_or_else(|| "-".to_string());
        let code = outcome
            .fault_code
            .map(|code| escape(&code.to_string()))
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td></tr>",
            outcome.case.id(),
            outcome.case.name(),
            class,
            status,
            outcome.verdict,
            elapsed,
            outcome.case.limits().threshold.as_millis(),
            code
        )?;
    }

    writeln!(out, "</table>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
