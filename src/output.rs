//! Progress and summary lines printed to stdout

use crate::core::error::Error;
use crate::index::IndexReport;
use crate::instrument::{FileOutcome, RunReport};
use std::path::Path;

pub fn format_found(count: usize, extension: &str, dir: &Path) -> String {
    let noun = if count == 1 { "file" } else { "files" };
    format!("Found {} .{} {} in {}", count, extension, noun, dir.display())
}

pub fn format_file_done(outcome: &FileOutcome) -> String {
    let stats = outcome.stats;
    format!(
        "Instrumented {} ({} methods, {} returns)",
        outcome.path.display(),
        stats.functions_instrumented,
        stats.returns_rewritten
    )
}

pub fn format_file_failed(path: &Path, error: &Error) -> String {
    format!("Failed {}: {}", path.display(), error)
}

/// Final line of an instrumentation run
pub fn format_summary(report: &RunReport) -> String {
    let total = report.total();
    let mut output = format!(
        "Done: {} files instrumented, {} methods, {} returns",
        report.instrumented.len(),
        total.functions_instrumented,
        total.returns_rewritten
    );
    if !report.failed.is_empty() {
        output.push_str(&format!(", {} failed", report.failed.len()));
    }
    output
}

pub fn format_index_summary(report: &IndexReport, written: &Path) -> String {
    let mut output = format!(
        "Indexed {} types from {} files into {}",
        report.index.len(),
        report.files_indexed,
        written.display()
    );
    if !report.failed.is_empty() {
        output.push_str(&format!(" ({} failed)", report.failed.len()));
    }
    output
}
