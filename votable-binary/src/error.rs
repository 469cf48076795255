//! Error types for the BINARY stream codec.

use thiserror::Error;
use votable_tabular::TabularError;

/// Errors from decoding or encoding a BINARY stream.
///
/// Decode is all-or-nothing: any variant means no partial table was
/// produced.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream text is not valid base64.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The stream ended mid-field (or its length is not a multiple of the
    /// fixed row width).
    #[error("truncated row {row}: field `{field}` needs {need} bytes, {have} left")]
    TruncatedRow {
        row: usize,
        field: String,
        need: usize,
        have: usize,
    },

    /// Fixed-width stream whose byte length is not a multiple of the row
    /// width implied by the schema.
    #[error("truncated row: stream length {len} is not a multiple of row width {row_width}")]
    UnevenStream { len: usize, row_width: usize },

    /// A variable-length field's count prefix implies a read past the end
    /// of the stream.
    #[error(
        "length-prefix overflow in row {row}: field `{field}` declares {count} elements, \
         {have} bytes left"
    )]
    LengthPrefixOverflow {
        row: usize,
        field: String,
        count: u32,
        have: usize,
    },

    /// Row arity or cell types disagree with the table's schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A value exceeds the field's declared (or bounded) element count.
    #[error("field `{field}` too long: {len} elements exceed declared {max}")]
    FieldTooLong {
        field: String,
        len: usize,
        max: usize,
    },

    /// An absent cell in a field with no representable null.
    #[error("field `{field}` has no null sentinel; cannot encode an absent value")]
    NoNullSentinel { field: String },

    /// Character data that is not decodable (bad ASCII/UCS-2) or not
    /// encodable in the field's character set.
    #[error("invalid character data in row {row}, field `{field}`")]
    InvalidChar { row: usize, field: String },

    /// A logical byte outside the `T`/`F`/null alphabet.
    #[error("invalid logical byte 0x{byte:02x} in row {row}, field `{field}`")]
    InvalidLogical { row: usize, field: String, byte: u8 },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, FormatError>;

impl From<TabularError> for FormatError {
    fn from(e: TabularError) -> Self {
        Self::SchemaMismatch(e.to_string())
    }
}
