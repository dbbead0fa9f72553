use thiserror::Error;

/// Failures raised while decoding or encoding a single 309-byte block.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// A block is not exactly one record long where a full record was expected.
    #[error("malformed input: expected a {expected}-byte record, got {found} bytes")]
    MalformedInput { expected: usize, found: usize },

    /// A count field holds something other than ASCII digits.
    #[error("field {field} ({name}) could not be parsed from {raw:?}")]
    FieldParse {
        field: u8,
        name: &'static str,
        raw: String,
    },

    /// A count is too large for the fixed width its field allows.
    #[error("field {field} ({name}) value {value} does not fit in {width} digits")]
    FieldOverflow {
        field: u8,
        name: &'static str,
        value: u32,
        width: usize,
    },

    /// A text value does not have the exact width of its field. Header fields
    /// carry field number 0.
    #[error("field {field} ({name}) expects {width} bytes, got {found}")]
    FieldWidth {
        field: u8,
        name: &'static str,
        width: usize,
        found: usize,
    },
}

impl RecordError {
    /// Layout number of the offending field, for field-level failures.
    pub fn field(&self) -> Option<u8> {
        match self {
            RecordError::FieldParse { field, .. }
            | RecordError::FieldOverflow { field, .. }
            | RecordError::FieldWidth { field, .. } => Some(*field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
