use serde::Serialize;

use super::error::{RecordError, Result};
use super::layout::{
    field, FieldSpec, ACTIVE_BUSINESS, ACTIVE_RESIDENTIAL, FIELDS, POSSIBLE_BUSINESS,
    POSSIBLE_RESIDENTIAL, RECORD_LEN,
};
use super::text::RawText;

/// The twelve delivery-type counts that make up each Active/Possible ×
/// Business/Residential group, in layout order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounts {
    pub centralized: u32,
    pub curb: u32,
    pub cbu: u32,
    pub other: u32,
    pub facility_box: u32,
    pub contract_box: u32,
    pub detached_box: u32,
    pub npu: u32,
    pub caller_service_box: u32,
    pub remittance_box: u32,
    pub contest_box: u32,
    pub other_box: u32,
}

impl DeliveryCounts {
    fn decode(block: &[u8], first: u8) -> Result<Self> {
        Ok(Self {
            centralized: count_field(block, first)?,
            curb: count_field(block, first + 1)?,
            cbu: count_field(block, first + 2)?,
            other: count_field(block, first + 3)?,
            facility_box: count_field(block, first + 4)?,
            contract_box: count_field(block, first + 5)?,
            detached_box: count_field(block, first + 6)?,
            npu: count_field(block, first + 7)?,
            caller_service_box: count_field(block, first + 8)?,
            remittance_box: count_field(block, first + 9)?,
            contest_box: count_field(block, first + 10)?,
            other_box: count_field(block, first + 11)?,
        })
    }

    fn encode(&self, block: &mut [u8; RECORD_LEN], first: u8) -> Result<()> {
        for (offset, value) in (0u8..).zip(self.values()) {
            put_count(block, first + offset, value)?;
        }
        Ok(())
    }

    /// Counts in layout order.
    pub fn values(&self) -> [u32; 12] {
        [
            self.centralized,
            self.curb,
            self.cbu,
            self.other,
            self.facility_box,
            self.contract_box,
            self.detached_box,
            self.npu,
            self.caller_service_box,
            self.remittance_box,
            self.contest_box,
            self.other_box,
        ]
    }

    /// Sum of the first eight categories (centralized through NPU).
    ///
    /// The four box categories after NPU are left out; this is the selection
    /// the downstream summary has always been built from.
    pub fn legacy_total(&self) -> u64 {
        self.values()[..8].iter().map(|&v| u64::from(v)).sum()
    }
}

/// One carrier route, decoded from a 309-byte detail block.
///
/// Text fields are kept byte for byte as they appear in the file, padding
/// included; they are never parsed, so they never fail to decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DetailRecord {
    pub copyright_detail_code: RawText,
    pub zip_code: RawText,
    pub update_key: RawText,
    pub action_code: RawText,
    pub carrier_route_id: RawText,

    pub active_business: DeliveryCounts,
    pub active_residential: DeliveryCounts,
    pub active_general_delivery: u32,

    pub possible_business: DeliveryCounts,
    pub possible_residential: DeliveryCounts,
    pub possible_general_delivery: u32,

    pub drop_business_families_served: u32,
    pub active_business_residential_mixed: u32,
    pub active_residential_business_mixed: u32,

    pub finance_number: RawText,
    pub state_abbreviation: RawText,
    pub county_code: RawText,
    pub municipality_key: RawText,
    pub preferred_last_line_key: RawText,
}

/// A single field value, borrowed from a [`DetailRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a [u8]),
    Count(u32),
}

impl DetailRecord {
    /// All 63 values in layout order; `values()[n - 1]` is field `n`.
    pub fn values(&self) -> Vec<FieldValue<'_>> {
        use FieldValue::{Count, Text};

        let mut out = Vec::with_capacity(FIELDS.len());
        out.extend([
            Text(self.copyright_detail_code.as_bytes()),
            Text(self.zip_code.as_bytes()),
            Text(self.update_key.as_bytes()),
            Text(self.action_code.as_bytes()),
            Text(self.carrier_route_id.as_bytes()),
        ]);
        out.extend(self.active_business.values().map(Count));
        out.extend(self.active_residential.values().map(Count));
        out.push(Count(self.active_general_delivery));
        out.extend(self.possible_business.values().map(Count));
        out.extend(self.possible_residential.values().map(Count));
        out.extend([
            Count(self.possible_general_delivery),
            Count(self.drop_business_families_served),
            Count(self.active_business_residential_mixed),
            Count(self.active_residential_business_mixed),
            Text(self.finance_number.as_bytes()),
            Text(self.state_abbreviation.as_bytes()),
            Text(self.county_code.as_bytes()),
            Text(self.municipality_key.as_bytes()),
            Text(self.preferred_last_line_key.as_bytes()),
        ]);
        out
    }

    /// Positional access by 1-based field number. `None` outside 1..=63.
    pub fn value(&self, index: u8) -> Option<FieldValue<'_>> {
        let pos = usize::from(index).checked_sub(1)?;
        self.values().get(pos).copied()
    }
}

fn parse_error(spec: &FieldSpec, raw: &[u8]) -> RecordError {
    RecordError::FieldParse {
        field: spec.index,
        name: spec.name,
        raw: String::from_utf8_lossy(raw).into_owned(),
    }
}

fn text_field(block: &[u8], index: u8) -> RawText {
    let spec = field(index);
    RawText::from(&block[spec.start..spec.end])
}

/// Parse a zero-padded count. Anything but ASCII digits is rejected, so spaces
/// and signs never turn into a silent default.
fn count_field(block: &[u8], index: u8) -> Result<u32> {
    let spec = field(index);
    let raw = &block[spec.start..spec.end];
    if !raw.iter().all(u8::is_ascii_digit) {
        return Err(parse_error(spec, raw));
    }
    Ok(raw.iter().fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')))
}

/// Decode a detail block into its 63 fields.
pub fn decode_detail(block: &[u8]) -> Result<DetailRecord> {
    if block.len() != RECORD_LEN {
        return Err(RecordError::MalformedInput {
            expected: RECORD_LEN,
            found: block.len(),
        });
    }

    Ok(DetailRecord {
        copyright_detail_code: text_field(block, 1),
        zip_code: text_field(block, 2),
        update_key: text_field(block, 3),
        action_code: text_field(block, 4),
        carrier_route_id: text_field(block, 5),

        active_business: DeliveryCounts::decode(block, ACTIVE_BUSINESS)?,
        active_residential: DeliveryCounts::decode(block, ACTIVE_RESIDENTIAL)?,
        active_general_delivery: count_field(block, 30)?,

        possible_business: DeliveryCounts::decode(block, POSSIBLE_BUSINESS)?,
        possible_residential: DeliveryCounts::decode(block, POSSIBLE_RESIDENTIAL)?,
        possible_general_delivery: count_field(block, 55)?,

        drop_business_families_served: count_field(block, 56)?,
        active_business_residential_mixed: count_field(block, 57)?,
        active_residential_business_mixed: count_field(block, 58)?,

        finance_number: text_field(block, 59),
        state_abbreviation: text_field(block, 60),
        county_code: text_field(block, 61),
        municipality_key: text_field(block, 62),
        preferred_last_line_key: text_field(block, 63),
    })
}

fn put_text(block: &mut [u8; RECORD_LEN], index: u8, value: &RawText) -> Result<()> {
    let spec = field(index);
    if value.len() != spec.width() {
        return Err(RecordError::FieldWidth {
            field: spec.index,
            name: spec.name,
            width: spec.width(),
            found: value.len(),
        });
    }
    block[spec.start..spec.end].copy_from_slice(value.as_bytes());
    Ok(())
}

fn put_count(block: &mut [u8; RECORD_LEN], index: u8, value: u32) -> Result<()> {
    let spec = field(index);
    let width = spec.width();
    let digits = format!("{:0width$}", value, width = width);
    if digits.len() != width {
        return Err(RecordError::FieldOverflow {
            field: spec.index,
            name: spec.name,
            value,
            width,
        });
    }
    block[spec.start..spec.end].copy_from_slice(digits.as_bytes());
    Ok(())
}

/// Lay a record out as a 309-byte detail block.
///
/// Counts are zero-padded to their field width. Gap bytes are spaces.
pub fn encode_detail(record: &DetailRecord) -> Result<[u8; RECORD_LEN]> {
    let mut block = [b' '; RECORD_LEN];

    put_text(&mut block, 1, &record.copyright_detail_code)?;
    put_text(&mut block, 2, &record.zip_code)?;
    put_text(&mut block, 3, &record.update_key)?;
    put_text(&mut block, 4, &record.action_code)?;
    put_text(&mut block, 5, &record.carrier_route_id)?;

    record.active_business.encode(&mut block, ACTIVE_BUSINESS)?;
    record.active_residential.encode(&mut block, ACTIVE_RESIDENTIAL)?;
    put_count(&mut block, 30, record.active_general_delivery)?;

    record.possible_business.encode(&mut block, POSSIBLE_BUSINESS)?;
    record.possible_residential.encode(&mut block, POSSIBLE_RESIDENTIAL)?;
    put_count(&mut block, 55, record.possible_general_delivery)?;

    put_count(&mut block, 56, record.drop_business_families_served)?;
    put_count(&mut block, 57, record.active_business_residential_mixed)?;
    put_count(&mut block, 58, record.active_residential_business_mixed)?;

    put_text(&mut block, 59, &record.finance_number)?;
    put_text(&mut block, 60, &record.state_abbreviation)?;
    put_text(&mut block, 61, &record.county_code)?;
    put_text(&mut block, 62, &record.municipality_key)?;
    put_text(&mut block, 63, &record.preferred_last_line_key)?;

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::layout::FieldKind;

    fn counts(start: u32) -> DeliveryCounts {
        DeliveryCounts {
            centralized: start,
            curb: start + 1,
            cbu: start + 2,
            other: start + 3,
            facility_box: start + 4,
            contract_box: start + 5,
            detached_box: start + 6,
            npu: start + 7,
            caller_service_box: start + 8,
            remittance_box: start + 9,
            contest_box: start + 10,
            other_box: start + 11,
        }
    }

    fn sample() -> DetailRecord {
        DetailRecord {
            copyright_detail_code: "D".into(),
            zip_code: "00601".into(),
            update_key: "0000012345".into(),
            action_code: "A".into(),
            carrier_route_id: "C001".into(),
            active_business: counts(100),
            active_residential: counts(200),
            active_general_delivery: 7,
            possible_business: DeliveryCounts {
                detached_box: 9876,
                ..counts(300)
            },
            possible_residential: DeliveryCounts {
                cbu: 42,
                ..counts(400)
            },
            possible_general_delivery: 8,
            drop_business_families_served: 9,
            active_business_residential_mixed: 11,
            active_residential_business_mixed: 12,
            finance_number: "012345".into(),
            state_abbreviation: "PR".into(),
            county_code: "001".into(),
            municipality_key: "X00001".into(),
            preferred_last_line_key: "Y00002".into(),
        }
    }

    #[test]
    fn values_follow_layout_kinds() {
        let rec = sample();
        let values = rec.values();
        assert_eq!(values.len(), FIELDS.len());
        for (spec, value) in FIELDS.iter().zip(values) {
            let kind = match value {
                FieldValue::Text(_) => FieldKind::Text,
                FieldValue::Count(_) => FieldKind::Count,
            };
            assert_eq!(spec.kind, kind, "field {}", spec.index);
        }
    }

    #[test]
    fn decodes_synthetic_block() {
        let rec = sample();
        let block = encode_detail(&rec).unwrap();
        let decoded = decode_detail(&block).unwrap();
        assert_eq!(decoded, rec);
        assert_eq!(decoded.zip_code, "00601");
        assert_eq!(decoded.possible_business.detached_box, 9876);
        assert_eq!(decoded.possible_residential.cbu, 42);
    }

    #[test]
    fn irregular_fields_read_exact_widths() {
        let mut block = encode_detail(&sample()).unwrap();
        // gap bytes hold garbage that must not leak into neighbours
        block[176] = b'X';
        block[216..219].copy_from_slice(b"ZZZ");
        block[177..181].copy_from_slice(b"0031");
        block[219..221].copy_from_slice(b"05");

        let rec = decode_detail(&block).unwrap();
        assert_eq!(rec.possible_business.contract_box, 305);
        assert_eq!(rec.possible_business.detached_box, 31);
        assert_eq!(rec.possible_residential.curb, 401);
        assert_eq!(rec.possible_residential.cbu, 5);
        assert_eq!(rec.value(37), Some(FieldValue::Count(31)));
        assert_eq!(rec.value(45), Some(FieldValue::Count(5)));
    }

    #[test]
    fn text_fields_are_not_trimmed() {
        let rec = DetailRecord {
            carrier_route_id: "C1  ".into(),
            ..sample()
        };
        let decoded = decode_detail(&encode_detail(&rec).unwrap()).unwrap();
        assert_eq!(decoded.carrier_route_id, "C1  ");
        assert_eq!(decoded.update_key, "0000012345");
    }

    #[test]
    fn blank_count_fails_with_field_index() {
        let mut block = encode_detail(&sample()).unwrap();
        block[81..86].copy_from_slice(b"   12");
        let err = decode_detail(&block).unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldParse {
                field: 18,
                name: "active_residential_centralized",
                raw: "   12".into(),
            }
        );
        assert_eq!(err.field(), Some(18));
    }

    #[test]
    fn signed_count_is_rejected() {
        let mut block = encode_detail(&sample()).unwrap();
        block[276..281].copy_from_slice(b"+0001");
        assert_eq!(decode_detail(&block).unwrap_err().field(), Some(57));
    }

    #[test]
    fn non_utf8_text_is_kept_byte_exact() {
        let mut block = encode_detail(&sample()).unwrap();
        block[297] = 0xC9;
        block[2] = 0xFF;

        let rec = decode_detail(&block).unwrap();
        assert_eq!(rec.municipality_key.as_bytes(), &[0xC9, b'0', b'0', b'0', b'0', b'1']);
        assert_eq!(rec.zip_code.as_bytes(), &[b'0', 0xFF, b'6', b'0', b'1']);
        assert_eq!(encode_detail(&rec).unwrap(), block);
    }

    #[test]
    fn wrong_length_is_malformed() {
        let err = decode_detail(&[b'0'; 150]).unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedInput {
                expected: RECORD_LEN,
                found: 150
            }
        );
    }

    #[test]
    fn legacy_total_skips_box_categories() {
        let c = counts(1);
        // 1..=8
        assert_eq!(c.legacy_total(), 36);
    }

    #[test]
    fn encode_rejects_values_too_wide() {
        let rec = DetailRecord {
            possible_residential: DeliveryCounts {
                cbu: 100,
                ..counts(0)
            },
            ..sample()
        };
        assert_eq!(encode_detail(&rec).unwrap_err().field(), Some(45));

        let rec = DetailRecord {
            zip_code: "601".into(),
            ..sample()
        };
        assert_eq!(encode_detail(&rec).unwrap_err().field(), Some(2));
    }

    #[test]
    fn value_out_of_range_is_none() {
        let rec = sample();
        assert_eq!(rec.value(0), None);
        assert_eq!(rec.value(64), None);
        assert_eq!(rec.value(2), Some(FieldValue::Text(&b"00601"[..])));
    }
}
