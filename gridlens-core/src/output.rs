//! Writing the trial summary table.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::attribution::TrialSummary;
use crate::error::OutputError;
use crate::literal::format_float;

/// Header of the output table.
pub const SUMMARY_HEADER: [&str; 11] = [
    "trial_name",
    "agent",
    "start_location",
    "start_location_row",
    "outcome",
    "path_true_reward",
    "discounted_expected_reward",
    "C_trait",
    "C_start",
    "w_trait",
    "w_start",
];

fn summary_record(summary: &TrialSummary) -> [String; 11] {
    [
        summary.trial_name.clone(),
        summary.agent.to_string(),
        summary.start_location.to_string(),
        summary.start_location_row.to_string(),
        if summary.outcome { "True" } else { "False" }.to_string(),
        summary.path_true_reward.to_string(),
        format_float(summary.discounted_expected_reward),
        format_float(summary.c_trait),
        format_float(summary.c_start),
        format_float(summary.w_trait),
        format_float(summary.w_start),
    ]
}

/// Write the header and one row per summary, in order.
pub fn write_summaries<W: Write>(writer: W, summaries: &[TrialSummary]) -> Result<(), OutputError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv.write_record(SUMMARY_HEADER)?;
    for summary in summaries {
        let record = summary_record(summary);
        debug!(trial = %summary.trial_name, row = ?record, "writing data row");
        csv.write_record(&record)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the table to `path` atomically.
///
/// Rows go to a temporary file next to `path`, which replaces `path` only
/// once everything is written. Missing parent directories are created.
pub fn write_summary_file(path: &Path, summaries: &[TrialSummary]) -> Result<(), OutputError> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    info!(path = %path.display(), rows = summaries.len(), "writing summary table");

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    write_summaries(tmp.as_file_mut(), summaries)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path)?;
    Ok(())
}
