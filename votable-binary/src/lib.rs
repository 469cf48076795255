//! VOTable `BINARY` stream codec.
//!
//! Decodes (and encodes) the base64-wrapped, big-endian row stream carried
//! by a VOTable `STREAM` element, against an externally supplied field
//! schema. The codec is a pure, synchronous, single-pass transcoder: no
//! I/O, no shared state, all-or-nothing — an error never yields a partial
//! table.
//!
//! The schema comes from the surrounding `FIELD` declarations; parsing the
//! XML document is someone else's job. See `votable_tabular` for the
//! schema and table types.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use votable_tabular::{Datatype, FieldSpec, Row, Table, TableSchema, Value};
//! use votable_binary::{decode, encode};
//!
//! let schema = Arc::new(TableSchema::new(vec![
//!     FieldSpec::new("RAJ2000", Datatype::Double).with_unit("deg"),
//!     FieldSpec::new("DEJ2000", Datatype::Double).with_unit("deg"),
//! ]).unwrap());
//!
//! let mut table = Table::new(Arc::clone(&schema));
//! table.push_row(Row::new(vec![
//!     Some(Value::Double(96.5)),
//!     Some(Value::Double(-0.5)),
//! ])).unwrap();
//!
//! let stream = encode(&table).unwrap();
//! let back = decode(&schema, &stream).unwrap();
//! assert_eq!(back, table);
//! ```

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{FormatError, Result};
pub use reader::{decode, decode_bytes};
pub use writer::{encode, encode_bytes};
