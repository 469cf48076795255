//! Typed table model for VOTable tabular data.
//!
//! This crate provides format-agnostic table types used by the VOTable
//! `BINARY` stream codec: field descriptors, typed cell values, and the
//! row/table containers they hang off. It knows nothing about base64 or
//! byte layout beyond the per-element widths the field types declare.
//!
//! # Design
//!
//! - **Row-oriented**: the `BINARY` serialization is row-major, so data is
//!   stored as `Row`s of typed cells, not per-column vectors
//! - **Strongly typed**: all cell access goes through the `Value` enum,
//!   no `dyn Any`
//! - **Explicit absence**: a cell is `Option<Value>`; `None` means the
//!   field's null sentinel was hit, distinguishable from any zero value
//! - **Layout order is field order**: `TableSchema` field order is the
//!   physical byte order of the stream

pub mod error;
pub mod field;
pub mod table;
pub mod value;

pub use error::{Result, TabularError};
pub use field::{ArraySize, Datatype, FieldSpec};
pub use table::{Row, Table, TableSchema};
pub use value::Value;
