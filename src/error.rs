//! Error taxonomy for the toolkit's four top-level calls (`compile`,
//! `analyze`, `encode`, `decode`). Every variant carries enough context,
//! byte offset for parse errors, field name for codec errors, for a
//! caller to report a user-legible message.

use hid_report_primitives::ItemParseError;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// A truncated byte stream, invalid size code, or unterminated payload.
    #[error("malformed descriptor at byte offset {offset}")]
    MalformedDescriptor { offset: usize },

    /// The 0xFE long-item prefix was encountered.
    #[error("unsupported long item at byte offset {offset}")]
    UnsupportedLongItem { offset: usize },

    /// An `EndCollection` without a matching `Collection`, or a `Collection`
    /// left unterminated at end of stream.
    #[error("unbalanced collection at byte offset {offset}")]
    UnbalancedCollection { offset: usize },

    /// A `Pop` with an empty push stack.
    #[error("state stack underflow at byte offset {offset}")]
    StateStackUnderflow { offset: usize },

    /// A Collection without a usage page/usage, a widget claiming a
    /// negative count, or an Axis whose logical_min exceeds logical_max.
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// An encode value fell outside `[logical_min, logical_max]` while
    /// strict mode was requested.
    #[error("field `{field}` value {value} outside logical range [{logical_min}, {logical_max}]")]
    FieldOverflow {
        field: String,
        value: i64,
        logical_min: i64,
        logical_max: i64,
    },

    /// An encode mapping referenced a field name absent from the selected
    /// report section.
    #[error("unknown field `{field}` for report id {report_id:?}")]
    UnknownField { field: String, report_id: Option<u8> },

    /// A decode packet's leading byte matched no section.
    #[error("unknown report id {report_id}")]
    UnknownReportID { report_id: u8 },
}

impl From<ItemParseError> for Error {
    fn from(e: ItemParseError) -> Self {
        match e {
            ItemParseError::MalformedDescriptor { offset } => Error::MalformedDescriptor { offset },
            ItemParseError::UnsupportedLongItem { offset } => Error::UnsupportedLongItem { offset },
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
