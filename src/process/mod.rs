// src/process/mod.rs
pub mod blocks;

use rayon::prelude::*;
use serde::Serialize;
use std::{io, io::Read, path::Path};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::ZipAggregates;
use crate::input::with_input;
use crate::record::{
    decode_detail, decode_header, DetailRecord, HeaderRecord, RecordError, RECORD_LEN,
};
use crate::summary::Summary;
use blocks::{Block, BlockReader};

/// What to do with a detail record whose counts will not parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Stop the run at the first bad record.
    #[default]
    Halt,
    /// Leave the record out of the totals and keep going.
    Skip,
}

#[derive(Clone, Debug)]
pub struct ProcessOptions {
    pub on_parse_error: ParsePolicy,
    /// Records read and decoded together before being folded in.
    pub batch_size: usize,
    /// Decode each batch on the rayon pool.
    pub parallel: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            on_parse_error: ParsePolicy::Halt,
            batch_size: 4096,
            parallel: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub records_processed: u64,
    pub records_skipped: u64,
    /// Size of a dropped partial record at the end of the stream, if any.
    pub truncated_bytes: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("I/O error reading delstat stream: {0}")]
    Io(#[from] io::Error),

    #[error("copyright record: {0}")]
    Header(#[source] RecordError),

    #[error("detail record {record} (after {records_processed} records processed): {source}")]
    Record {
        record: u64,
        records_processed: u64,
        source: RecordError,
    },
}

/// Everything a run produced.
#[derive(Debug)]
pub struct Outcome {
    pub header: HeaderRecord,
    pub aggregates: ZipAggregates,
    pub stats: RunStats,
}

impl Outcome {
    pub fn summary(&self) -> Summary {
        Summary::new(&self.header, &self.aggregates)
    }
}

fn decode_batch(batch: &[u8], parallel: bool) -> Vec<Result<DetailRecord, RecordError>> {
    if parallel {
        batch.par_chunks_exact(RECORD_LEN).map(decode_detail).collect()
    } else {
        batch.chunks_exact(RECORD_LEN).map(decode_detail).collect()
    }
}

/// Single pass over a delstat stream: decode the copyright record, then fold
/// every full detail record into per-ZIP totals.
///
/// A partial block at the end is logged and dropped. Records are numbered from
/// 1, counting the first block after the copyright record.
pub fn process_stream<R: Read>(reader: R, opts: &ProcessOptions) -> Result<Outcome, ProcessError> {
    let mut blocks = BlockReader::new(reader);
    let mut buf = [0u8; RECORD_LEN];

    let header = match blocks.read_block(&mut buf)? {
        Block::Full => decode_header(&buf).map_err(ProcessError::Header)?,
        Block::Partial(found) => {
            return Err(ProcessError::Header(RecordError::MalformedInput {
                expected: RECORD_LEN,
                found,
            }))
        }
        Block::End => {
            return Err(ProcessError::Header(RecordError::MalformedInput {
                expected: RECORD_LEN,
                found: 0,
            }))
        }
    };
    info!(release = %header.release_date, "read copyright record");

    let batch_size = opts.batch_size.max(1);
    let mut batch: Vec<u8> = Vec::with_capacity(batch_size * RECORD_LEN);
    let mut aggregates = ZipAggregates::new();
    let mut stats = RunStats::default();
    let mut next_record: u64 = 1;
    let mut done = false;

    while !done {
        batch.clear();
        while batch.len() < batch_size * RECORD_LEN {
            match blocks.read_block(&mut buf)? {
                Block::Full => batch.extend_from_slice(&buf),
                Block::Partial(n) => {
                    let complete = next_record - 1 + (batch.len() / RECORD_LEN) as u64;
                    warn!(
                        bytes = n,
                        after_record = complete,
                        "truncated record at end of input, dropping it"
                    );
                    stats.truncated_bytes = Some(n);
                    done = true;
                    break;
                }
                Block::End => {
                    done = true;
                    break;
                }
            }
        }

        for decoded in decode_batch(&batch, opts.parallel) {
            let record = next_record;
            next_record += 1;
            match decoded {
                Ok(detail) => {
                    aggregates.observe(&detail);
                    stats.records_processed += 1;
                }
                Err(source) => match opts.on_parse_error {
                    ParsePolicy::Halt => {
                        return Err(ProcessError::Record {
                            record,
                            records_processed: stats.records_processed,
                            source,
                        })
                    }
                    ParsePolicy::Skip => {
                        warn!(record, error = %source, "skipping unparseable record");
                        stats.records_skipped += 1;
                    }
                },
            }
        }
        debug!(
            records = stats.records_processed,
            zip_codes = aggregates.len(),
            bytes = blocks.bytes_read(),
            "batch folded"
        );
    }

    info!(
        records = stats.records_processed,
        skipped = stats.records_skipped,
        zip_codes = aggregates.len(),
        "finished reading delstat records"
    );
    Ok(Outcome {
        header,
        aggregates,
        stats,
    })
}

/// Open `path` (plain or ZIP) and run [`process_stream`] over it.
#[instrument(level = "info", skip(path, opts), fields(path = %path.as_ref().display()))]
pub fn process_path<P: AsRef<Path>>(path: P, opts: &ProcessOptions) -> anyhow::Result<Outcome> {
    with_input(path.as_ref(), |reader| {
        process_stream(reader, opts).map_err(anyhow::Error::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{encode_detail, encode_header, DeliveryCounts};
    use std::io::Cursor;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,delstat::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn detail(zip: &str, business: u32, residential: u32) -> [u8; RECORD_LEN] {
        let rec = DetailRecord {
            copyright_detail_code: "D".into(),
            zip_code: zip.into(),
            update_key: "0000000001".into(),
            action_code: "A".into(),
            carrier_route_id: "C001".into(),
            active_business: DeliveryCounts {
                centralized: business,
                ..Default::default()
            },
            active_residential: DeliveryCounts {
                curb: residential,
                ..Default::default()
            },
            finance_number: "000000".into(),
            state_abbreviation: "NY".into(),
            county_code: "061".into(),
            municipality_key: "A00000".into(),
            preferred_last_line_key: "A00000".into(),
            ..Default::default()
        };
        encode_detail(&rec).unwrap()
    }

    fn stream(blocks: &[[u8; RECORD_LEN]]) -> Vec<u8> {
        let mut data = encode_header("11-15").unwrap().to_vec();
        for b in blocks {
            data.extend_from_slice(b);
        }
        data
    }

    fn opts(batch_size: usize, parallel: bool, policy: ParsePolicy) -> ProcessOptions {
        ProcessOptions {
            on_parse_error: policy,
            batch_size,
            parallel,
        }
    }

    #[test]
    fn header_only_has_no_records() {
        init_test_logging();
        let out = process_stream(Cursor::new(stream(&[])), &ProcessOptions::default()).unwrap();
        assert_eq!(out.header.release_date, "11-15");
        assert!(out.aggregates.is_empty());
        assert_eq!(out.stats, RunStats::default());
    }

    #[test]
    fn empty_or_short_stream_is_malformed() {
        for len in [0usize, 10, 308] {
            let err = process_stream(Cursor::new(vec![b' '; len]), &ProcessOptions::default())
                .unwrap_err();
            match err {
                ProcessError::Header(RecordError::MalformedInput { found, .. }) => {
                    assert_eq!(found, len)
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn batches_sum_the_same_as_single_records() {
        init_test_logging();
        let blocks: Vec<_> = (0..25u32)
            .map(|i| detail(if i % 3 == 0 { "00601" } else { "12345" }, i, 2 * i))
            .collect();
        let data = stream(&blocks);

        let one = process_stream(Cursor::new(&data), &opts(1, false, ParsePolicy::Halt)).unwrap();
        let many = process_stream(Cursor::new(&data), &opts(4, true, ParsePolicy::Halt)).unwrap();
        assert_eq!(one.aggregates, many.aggregates);
        assert_eq!(one.stats.records_processed, 25);
        assert_eq!(many.stats.records_processed, 25);
    }

    #[test]
    fn trailing_partial_block_is_dropped() {
        init_test_logging();
        let mut data = stream(&[
            detail("12345", 1, 1),
            detail("12345", 2, 2),
            detail("00601", 3, 3),
        ]);
        data.extend(vec![b'0'; 150]);

        let out = process_stream(Cursor::new(data), &opts(2, true, ParsePolicy::Halt)).unwrap();
        assert_eq!(out.stats.records_processed, 3);
        assert_eq!(out.stats.truncated_bytes, Some(150));
        assert_eq!(out.aggregates.get("12345").unwrap().business_active, 3);
        assert_eq!(out.aggregates.get("00601").unwrap().residential_active, 3);
    }

    #[test]
    fn halt_policy_reports_record_number() {
        let mut bad = detail("12345", 1, 1);
        bad[21..26].copy_from_slice(b"  1  ");
        let data = stream(&[detail("12345", 1, 1), bad, detail("12345", 1, 1)]);

        let err =
            process_stream(Cursor::new(data), &opts(8, true, ParsePolicy::Halt)).unwrap_err();
        match err {
            ProcessError::Record {
                record,
                records_processed,
                source,
            } => {
                assert_eq!(record, 2);
                assert_eq!(records_processed, 1);
                assert_eq!(source.field(), Some(6));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn latin1_identifier_does_not_halt() {
        let mut odd = detail("12345", 4, 4);
        odd[297] = 0xC9;
        let data = stream(&[odd, detail("12345", 1, 1)]);

        let out = process_stream(Cursor::new(data), &ProcessOptions::default()).unwrap();
        assert_eq!(out.stats.records_processed, 2);
        assert_eq!(out.stats.records_skipped, 0);
        assert_eq!(out.aggregates.get("12345").unwrap().business_active, 5);
    }

    #[test]
    fn skip_policy_counts_and_continues() {
        init_test_logging();
        let mut bad = detail("12345", 100, 100);
        bad[282] = b'x';
        let data = stream(&[detail("12345", 1, 1), bad, detail("12345", 1, 1)]);

        let out = process_stream(Cursor::new(data), &opts(2, false, ParsePolicy::Skip)).unwrap();
        assert_eq!(out.stats.records_processed, 2);
        assert_eq!(out.stats.records_skipped, 1);
        assert_eq!(out.aggregates.get("12345").unwrap().business_active, 2);
    }
}
