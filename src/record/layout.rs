// src/record/layout.rs

/// Every block in a delstat file, header and detail alike, is this many bytes.
pub const RECORD_LEN: usize = 309;

/// Byte range of the `MM-YY` release tag inside the copyright (header) record.
pub const RELEASE_DATE: (usize, usize) = (19, 24);

/// How a field's bytes are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw text, kept byte-exact.
    Text,
    /// Zero-padded base-10 count.
    Count,
}

/// One entry of the detail record layout. `start..end` is half-open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub index: u8,
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn width(&self) -> usize {
        self.end - self.start
    }
}

const fn text(index: u8, name: &'static str, start: usize, end: usize) -> FieldSpec {
    FieldSpec {
        index,
        name,
        start,
        end,
        kind: FieldKind::Text,
    }
}

const fn count(index: u8, name: &'static str, start: usize, end: usize) -> FieldSpec {
    FieldSpec {
        index,
        name,
        start,
        end,
        kind: FieldKind::Count,
    }
}

/// Detail record layout, fields 1..=63 stored at `FIELDS[index - 1]`.
///
/// Field 37 is only four bytes wide and starts one byte after field 36 ends;
/// field 45 is two bytes wide and starts three bytes after field 44 ends.
/// Both come straight from the USPS layout and must not be normalised.
pub static FIELDS: [FieldSpec; 63] = [
    text(1, "copyright_detail_code", 0, 1),
    text(2, "zip_code", 1, 6),
    text(3, "update_key", 6, 16),
    text(4, "action_code", 16, 17),
    text(5, "carrier_route_id", 17, 21),
    // ─── active / business ───────────────────────────────────────────
    count(6, "active_business_centralized", 21, 26),
    count(7, "active_business_curb", 26, 31),
    count(8, "active_business_cbu", 31, 36),
    count(9, "active_business_other", 36, 41),
    count(10, "active_business_facility_box", 41, 46),
    count(11, "active_business_contract_box", 46, 51),
    count(12, "active_business_detached_box", 51, 56),
    count(13, "active_business_npu", 56, 61),
    count(14, "active_business_caller_service_box", 61, 66),
    count(15, "active_business_remittance_box", 66, 71),
    count(16, "active_business_contest_box", 71, 76),
    count(17, "active_business_other_box", 76, 81),
    // ─── active / residential ────────────────────────────────────────
    count(18, "active_residential_centralized", 81, 86),
    count(19, "active_residential_curb", 86, 91),
    count(20, "active_residential_cbu", 91, 96),
    count(21, "active_residential_other", 96, 101),
    count(22, "active_residential_facility_box", 101, 106),
    count(23, "active_residential_contract_box", 106, 111),
    count(24, "active_residential_detached_box", 111, 116),
    count(25, "active_residential_npu", 116, 121),
    count(26, "active_residential_caller_service_box", 121, 126),
    count(27, "active_residential_remittance_box", 126, 131),
    count(28, "active_residential_contest_box", 131, 136),
    count(29, "active_residential_other_box", 136, 141),
    count(30, "active_general_delivery", 141, 146),
    // ─── possible / business ─────────────────────────────────────────
    count(31, "possible_business_centralized", 146, 151),
    count(32, "possible_business_curb", 151, 156),
    count(33, "possible_business_cbu", 156, 161),
    count(34, "possible_business_other", 161, 166),
    count(35, "possible_business_facility_box", 166, 171),
    count(36, "possible_business_contract_box", 171, 176),
    count(37, "possible_business_detached_box", 177, 181),
    count(38, "possible_business_npu", 181, 186),
    count(39, "possible_business_caller_service_box", 186, 191),
    count(40, "possible_business_remittance_box", 191, 196),
    count(41, "possible_business_contest_box", 196, 201),
    count(42, "possible_business_other_box", 201, 206),
    // ─── possible / residential ──────────────────────────────────────
    count(43, "possible_residential_centralized", 206, 211),
    count(44, "possible_residential_curb", 211, 216),
    count(45, "possible_residential_cbu", 219, 221),
    count(46, "possible_residential_other", 221, 226),
    count(47, "possible_residential_facility_box", 226, 231),
    count(48, "possible_residential_contract_box", 231, 236),
    count(49, "possible_residential_detached_box", 236, 241),
    count(50, "possible_residential_npu", 241, 246),
    count(51, "possible_residential_caller_service_box", 246, 251),
    count(52, "possible_residential_remittance_box", 251, 256),
    count(53, "possible_residential_contest_box", 256, 261),
    count(54, "possible_residential_other_box", 261, 266),
    count(55, "possible_general_delivery", 266, 271),
    count(56, "drop_business_families_served", 271, 276),
    count(57, "active_business_residential_mixed", 276, 281),
    count(58, "active_residential_business_mixed", 281, 286),
    text(59, "finance_number", 286, 292),
    text(60, "state_abbreviation", 292, 294),
    text(61, "county_code", 294, 297),
    text(62, "municipality_key", 297, 303),
    text(63, "preferred_last_line_key", 303, 309),
];

/// Looks up a field by its 1-based layout number.
///
/// Panics on an index outside 1..=63; callers only pass literal field numbers.
pub fn field(index: u8) -> &'static FieldSpec {
    &FIELDS[index as usize - 1]
}

/// First field number of each twelve-count delivery group.
pub const ACTIVE_BUSINESS: u8 = 6;
pub const ACTIVE_RESIDENTIAL: u8 = 18;
pub const POSSIBLE_BUSINESS: u8 = 31;
pub const POSSIBLE_RESIDENTIAL: u8 = 43;
