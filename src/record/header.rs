use chrono::NaiveDate;
use serde::Serialize;

use super::error::{RecordError, Result};
use super::layout::{RECORD_LEN, RELEASE_DATE};

/// The copyright record: always the first block of a delstat file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HeaderRecord {
    /// `MM-YY` release tag, verbatim. Used to name the summary file.
    pub release_date: String,
}

impl HeaderRecord {
    /// Interprets the release tag as the first day of its month.
    /// Returns `None` when the tag is not a real `MM-YY` month.
    pub fn release_month(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&format!("01-{}", self.release_date), "%d-%m-%y").ok()
    }
}

/// Decode the copyright record. Only the block length is checked; the tag's
/// bytes are taken as they are, with any non-UTF-8 byte rendered as U+FFFD.
pub fn decode_header(block: &[u8]) -> Result<HeaderRecord> {
    if block.len() != RECORD_LEN {
        return Err(RecordError::MalformedInput {
            expected: RECORD_LEN,
            found: block.len(),
        });
    }
    let raw = &block[RELEASE_DATE.0..RELEASE_DATE.1];
    Ok(HeaderRecord {
        release_date: String::from_utf8_lossy(raw).into_owned(),
    })
}

/// Build a copyright block carrying `release_date`; every other byte is a space
/// except the leading `C` detail code.
pub fn encode_header(release_date: &str) -> Result<[u8; RECORD_LEN]> {
    let width = RELEASE_DATE.1 - RELEASE_DATE.0;
    if release_date.len() != width {
        return Err(RecordError::FieldWidth {
            field: 0,
            name: "release_date",
            width,
            found: release_date.len(),
        });
    }
    let mut block = [b' '; RECORD_LEN];
    block[0] = b'C';
    block[RELEASE_DATE.0..RELEASE_DATE.1].copy_from_slice(release_date.as_bytes());
    Ok(block)
}
