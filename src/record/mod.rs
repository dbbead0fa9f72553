//! Fixed-width delstat record decoding.
//!
//! A delstat file is a flat run of 309-byte blocks: one copyright record
//! followed by one detail record per carrier route.

pub mod detail;
pub mod error;
pub mod header;
pub mod layout;
pub mod text;

pub use detail::{decode_detail, encode_detail, DeliveryCounts, DetailRecord, FieldValue};
pub use error::RecordError;
pub use header::{decode_header, encode_header, HeaderRecord};
pub use layout::{FieldKind, FieldSpec, FIELDS, RECORD_LEN};
pub use text::RawText;
