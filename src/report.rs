use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::{fs::File, io::BufWriter, path::Path};

use crate::process::{Outcome, ParsePolicy};

/// Operator-facing record of one run, written as JSON.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub input: String,
    pub output: String,
    pub release_date: String,
    pub release_month: Option<NaiveDate>,
    pub on_parse_error: ParsePolicy,
    pub zip_codes: usize,
    pub records_processed: u64,
    pub records_skipped: u64,
    pub truncated_bytes: Option<usize>,
    pub processing_start: DateTime<Utc>,
    pub processing_end: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        input: &Path,
        output: &Path,
        policy: ParsePolicy,
        outcome: &Outcome,
        processing_start: DateTime<Utc>,
        processing_end: DateTime<Utc>,
    ) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            release_date: outcome.header.release_date.clone(),
            release_month: outcome.header.release_month(),
            on_parse_error: policy,
            zip_codes: outcome.aggregates.len(),
            records_processed: outcome.stats.records_processed,
            records_skipped: outcome.stats.records_skipped,
            truncated_bytes: outcome.stats.truncated_bytes,
            processing_start,
            processing_end,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing report {}", path.display()))?;
        Ok(())
    }
}
