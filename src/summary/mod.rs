use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::aggregate::ZipAggregates;
use crate::record::{HeaderRecord, RawText};

pub const CSV_HEADER: &str = "ZIPCODE,RESIDENT,BUSINESS";

/// Placeholder row so GIS tools type the ZIP column as text, not integer.
pub const TYPE_HINT_ROW: &str = "dummytext,0,0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    pub zip_code: RawText,
    pub resident: u64,
    pub business: u64,
}

/// The end-of-run summary: release tag plus one row per ZIP, ascending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub release_date: String,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn new(header: &HeaderRecord, aggregates: &ZipAggregates) -> Self {
        let rows = aggregates
            .iter()
            .map(|(zip, agg)| SummaryRow {
                zip_code: zip.clone(),
                resident: agg.residential_active,
                business: agg.business_active,
            })
            .collect();
        Self {
            release_date: header.release_date.clone(),
            rows,
        }
    }

    /// `summary_<release>.csv`
    pub fn file_name(&self) -> String {
        format!("summary_{}.csv", self.release_date)
    }

    /// Write the CSV body. ZIP codes are always quoted and written byte for
    /// byte; the mixed-delivery totals are not part of the output.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{}", CSV_HEADER)?;
        writeln!(out, "{}", TYPE_HINT_ROW)?;
        for row in &self.rows {
            out.write_all(b"\"")?;
            out.write_all(row.zip_code.as_bytes())?;
            writeln!(out, "\",{},{}", row.resident, row.business)?;
        }
        out.flush()
    }
}

/// Where the summary for `input` goes: `output_dir` if given, otherwise the
/// directory holding the input.
pub fn output_path(input: &Path, output_dir: Option<&Path>, summary: &Summary) -> PathBuf {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(summary.file_name())
}
