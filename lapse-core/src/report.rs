// Markdown run log

use chrono::{DateTime, Local};
use lapse_scanner::Finding;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub const REPORT_TITLE: &str = "# Expired Link Hunter Results Log";

/// Drops identical tuples and orders rows by reason code, then domain and
/// source so reruns produce stable tables.
pub fn prepare_findings(findings: &[Finding]) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Finding> = findings
        .iter()
        .filter(|f| seen.insert(*f))
        .cloned()
        .collect();

    unique.sort_by(|a, b| {
        a.reason_code()
            .cmp(b.reason_code())
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.source_url.cmp(&b.source_url))
    });
    unique
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// One timestamped section for a single run.
pub fn render_run_section(findings: &[Finding], timestamp: DateTime<Local>) -> String {
    let rows = prepare_findings(findings);
    let mut section = String::new();

    section.push_str(&format!(
        "\n## Scan Run: {}\n",
        timestamp.format("%Y-%m-%d %H:%M")
    ));
    section.push_str(&format!("Found **{}** opportunities.\n\n", rows.len()));
    section.push_str("| Domain | Reason | Source |\n| :--- | :--- | :--- |\n");

    for finding in &rows {
        section.push_str(&format!(
            "| **{}** | {} | {} |\n",
            escape_cell(&finding.domain),
            finding.reason_code(),
            escape_cell(&finding.source_url)
        ));
    }

    section
}

/// Appends this run to the report at `path`, writing the title first if the
/// file is new. Existing content is never rewritten. Returns the number of
/// rows written; an empty run leaves the file untouched.
pub fn append_markdown_report(
    path: &Path,
    findings: &[Finding],
    timestamp: DateTime<Local>,
) -> io::Result<usize> {
    let rows = prepare_findings(findings);
    if rows.is_empty() {
        return Ok(0);
    }

    let file_exists = path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    if !file_exists {
        writeln!(file, "{}", REPORT_TITLE)?;
        writeln!(file)?;
    }
    file.write_all(render_run_section(&rows, timestamp).as_bytes())?;
    file.flush()?;

    Ok(rows.len())
}

pub fn findings_to_json(findings: &[Finding]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&prepare_findings(findings))
}
