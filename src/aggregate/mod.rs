// src/aggregate/mod.rs
use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{DetailRecord, RawText};

/// Running totals for one ZIP code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ZipAggregate {
    pub residential_active: u64,
    pub business_active: u64,
    pub mixed_business_residential: u64,
    pub mixed_residential_business: u64,
}

impl ZipAggregate {
    fn add(&mut self, record: &DetailRecord) {
        self.residential_active += record.active_residential.legacy_total();
        self.business_active += record.active_business.legacy_total();
        self.mixed_business_residential += u64::from(record.active_business_residential_mixed);
        self.mixed_residential_business += u64::from(record.active_residential_business_mixed);
    }
}

/// Per-ZIP aggregation state, owned by whoever drives the stream.
///
/// Keys are the raw 5-byte ZIP codes; the map keeps them in ascending byte
/// order so leading zeros sort as characters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZipAggregates {
    by_zip: BTreeMap<RawText, ZipAggregate>,
}

impl ZipAggregates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one detail record into its ZIP's totals, creating a zeroed entry
    /// on first sight. Not idempotent: observing a record twice counts it twice.
    pub fn observe(&mut self, record: &DetailRecord) {
        match self.by_zip.get_mut(&record.zip_code) {
            Some(agg) => agg.add(record),
            None => {
                let mut agg = ZipAggregate::default();
                agg.add(record);
                self.by_zip.insert(record.zip_code.clone(), agg);
            }
        }
    }

    pub fn get(&self, zip_code: &str) -> Option<&ZipAggregate> {
        self.by_zip.get(zip_code.as_bytes())
    }

    /// Number of distinct ZIP codes seen.
    pub fn len(&self) -> usize {
        self.by_zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_zip.is_empty()
    }

    /// Iterate in ascending ZIP order.
    pub fn iter(&self) -> impl Iterator<Item = (&RawText, &ZipAggregate)> {
        self.by_zip.iter()
    }
}
