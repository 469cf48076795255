//! BINARY stream decoder: base64 text -> `Table`.
//!
//! Decoding is a single pass with a byte cursor. Per field: fixed-size
//! fields read `count * element_width` bytes; variable-length fields read
//! a 4-byte big-endian element count first. Null mapping happens after the
//! raw read: logical in-band nulls, NaN floats, and declared sentinels all
//! land on `None`.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use votable_tabular::{ArraySize, Datatype, FieldSpec, Row, Table, TableSchema, Value};

use crate::error::{FormatError, Result};

/// Decode a base64-wrapped BINARY stream against a schema.
///
/// ASCII whitespace is stripped first: `STREAM` content is line-wrapped
/// inside documents and the wrapping is not data.
pub fn decode(schema: &Arc<TableSchema>, encoded: &str) -> Result<Table> {
    let stripped: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let data = {
        let _span =
            tracing::debug_span!("binary_stream_b64_decode", chars = stripped.len()).entered();
        STANDARD.decode(&stripped)?
    };
    decode_bytes(schema, &data)
}

/// Decode an already-unwrapped byte stream against a schema.
pub fn decode_bytes(schema: &Arc<TableSchema>, data: &[u8]) -> Result<Table> {
    // With no variable-length field the stream must chunk evenly into rows.
    if let Some(width) = schema.row_width() {
        if data.len() % width != 0 {
            return Err(FormatError::UnevenStream {
                len: data.len(),
                row_width: width,
            });
        }
    }

    let mut table = Table::new(Arc::clone(schema));
    let mut cursor = Cursor::new(data);
    let mut row = 0usize;
    while !cursor.at_end() {
        let cells = schema
            .fields()
            .iter()
            .map(|field| read_cell(&mut cursor, field, row))
            .collect::<Result<Row>>()?;
        table.push_row(cells)?;
        row += 1;
    }

    tracing::debug!(
        rows = table.num_rows(),
        bytes = data.len(),
        "decoded BINARY stream"
    );
    Ok(table)
}

/// Byte cursor over the decoded stream.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Take `need` bytes, advancing, or fail with a truncated-row error.
    fn take(&mut self, need: usize, row: usize, field: &str) -> Result<&'a [u8]> {
        if self.remaining() < need {
            return Err(FormatError::TruncatedRow {
                row,
                field: field.to_string(),
                need,
                have: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + need];
        self.pos += need;
        Ok(slice)
    }

    /// Take `count * width` bytes (saturating, so a pathological declared
    /// count fails as truncation instead of overflowing).
    fn take_elems(&mut self, count: usize, width: usize, row: usize, field: &str) -> Result<&'a [u8]> {
        self.take(count.saturating_mul(width), row, field)
    }
}

/// Decode one cell, including the count prefix for variable fields and
/// the sentinel-to-absent mapping.
fn read_cell(cursor: &mut Cursor<'_>, field: &FieldSpec, row: usize) -> Result<Option<Value>> {
    let count = match field.arraysize {
        ArraySize::Scalar => 1,
        ArraySize::Fixed(n) => n,
        ArraySize::Variable | ArraySize::VariableMax(_) => read_count(cursor, field, row)?,
    };

    match read_raw(cursor, field, count, row)? {
        None => Ok(None),
        Some(value) if is_absent(&value, field) => Ok(None),
        Some(value) => Ok(Some(value)),
    }
}

/// Read the 4-byte big-endian element count of a variable-length field
/// and check it against the bytes actually left.
fn read_count(cursor: &mut Cursor<'_>, field: &FieldSpec, row: usize) -> Result<usize> {
    let bytes = cursor.take(4, row, &field.name)?;
    let count = u32::from_be_bytes(bytes.try_into().unwrap());
    let need = (count as usize).saturating_mul(field.datatype.element_width());
    if need > cursor.remaining() {
        return Err(FormatError::LengthPrefixOverflow {
            row,
            field: field.name.clone(),
            count,
            have: cursor.remaining(),
        });
    }
    Ok(count as usize)
}

/// Raw per-datatype decode. Returns `Ok(None)` only for a scalar logical
/// null byte; sentinel mapping is the caller's job.
fn read_raw(
    cursor: &mut Cursor<'_>,
    field: &FieldSpec,
    count: usize,
    row: usize,
) -> Result<Option<Value>> {
    let name = &field.name;
    let scalar = matches!(field.arraysize, ArraySize::Scalar);
    let fixed = !field.arraysize.is_variable();

    let value = match field.datatype {
        Datatype::Logical => {
            let bytes = cursor.take_elems(count, 1, row, name)?;
            if scalar {
                return match logical(bytes[0]) {
                    Ok(flag) => Ok(flag.map(Value::Logical)),
                    Err(byte) => Err(FormatError::InvalidLogical {
                        row,
                        field: name.clone(),
                        byte,
                    }),
                };
            }
            let mut flags = Vec::with_capacity(count);
            for &byte in bytes {
                match logical(byte) {
                    Ok(Some(flag)) => flags.push(flag),
                    // Per-element null needs the BINARY2 mask; not here.
                    _ => {
                        return Err(FormatError::InvalidLogical {
                            row,
                            field: name.clone(),
                            byte,
                        })
                    }
                }
            }
            Value::LogicalArray(flags)
        }
        Datatype::UnsignedByte => {
            let bytes = cursor.take_elems(count, 1, row, name)?;
            if scalar {
                Value::UnsignedByte(bytes[0])
            } else {
                Value::Bytes(bytes.to_vec())
            }
        }
        Datatype::Short => {
            let bytes = cursor.take_elems(count, 2, row, name)?;
            let vals: Vec<i16> = bytes
                .chunks_exact(2)
                .map(|c| i16::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if scalar {
                Value::Short(vals[0])
            } else {
                Value::ShortArray(vals)
            }
        }
        Datatype::Int => {
            let bytes = cursor.take_elems(count, 4, row, name)?;
            let vals: Vec<i32> = bytes
                .chunks_exact(4)
                .map(|c| i32::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if scalar {
                Value::Int(vals[0])
            } else {
                Value::IntArray(vals)
            }
        }
        Datatype::Long => {
            let bytes = cursor.take_elems(count, 8, row, name)?;
            let vals: Vec<i64> = bytes
                .chunks_exact(8)
                .map(|c| i64::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if scalar {
                Value::Long(vals[0])
            } else {
                Value::LongArray(vals)
            }
        }
        Datatype::Float => {
            let bytes = cursor.take_elems(count, 4, row, name)?;
            let vals: Vec<f32> = bytes
                .chunks_exact(4)
                .map(|c| f32::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if scalar {
                Value::Float(vals[0])
            } else {
                Value::FloatArray(vals)
            }
        }
        Datatype::Double => {
            let bytes = cursor.take_elems(count, 8, row, name)?;
            let vals: Vec<f64> = bytes
                .chunks_exact(8)
                .map(|c| f64::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if scalar {
                Value::Double(vals[0])
            } else {
                Value::DoubleArray(vals)
            }
        }
        Datatype::FloatComplex => {
            let bytes = cursor.take_elems(count, 8, row, name)?;
            let vals: Vec<(f32, f32)> = bytes
                .chunks_exact(8)
                .map(|c| {
                    (
                        f32::from_be_bytes(c[0..4].try_into().unwrap()),
                        f32::from_be_bytes(c[4..8].try_into().unwrap()),
                    )
                })
                .collect();
            if scalar {
                let (re, im) = vals[0];
                Value::FloatComplex(re, im)
            } else {
                Value::FloatComplexArray(vals)
            }
        }
        Datatype::DoubleComplex => {
            let bytes = cursor.take_elems(count, 16, row, name)?;
            let vals: Vec<(f64, f64)> = bytes
                .chunks_exact(16)
                .map(|c| {
                    (
                        f64::from_be_bytes(c[0..8].try_into().unwrap()),
                        f64::from_be_bytes(c[8..16].try_into().unwrap()),
                    )
                })
                .collect();
            if scalar {
                let (re, im) = vals[0];
                Value::DoubleComplex(re, im)
            } else {
                Value::DoubleComplexArray(vals)
            }
        }
        Datatype::Char => {
            let bytes = cursor.take_elems(count, 1, row, name)?;
            let trimmed = if fixed { trim_trailing_nuls(bytes) } else { bytes };
            let s = std::str::from_utf8(trimmed).map_err(|_| FormatError::InvalidChar {
                row,
                field: name.clone(),
            })?;
            Value::Char(s.to_string())
        }
        Datatype::UnicodeChar => {
            let bytes = cursor.take_elems(count, 2, row, name)?;
            let mut units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes(c.try_into().unwrap()))
                .collect();
            if fixed {
                let end = units.iter().rposition(|&u| u != 0).map_or(0, |i| i + 1);
                units.truncate(end);
            }
            let s = String::from_utf16(&units).map_err(|_| FormatError::InvalidChar {
                row,
                field: name.clone(),
            })?;
            Value::UnicodeChar(s)
        }
    };

    Ok(Some(value))
}

/// Map a decoded value onto the field's absent state: declared sentinel
/// first (bit-pattern float equality), then the floating-point NaN rule.
fn is_absent(value: &Value, field: &FieldSpec) -> bool {
    if let Some(sentinel) = &field.null {
        if value == sentinel {
            return true;
        }
    }
    match value {
        Value::Float(v) => v.is_nan(),
        Value::Double(v) => v.is_nan(),
        Value::FloatComplex(re, im) => re.is_nan() || im.is_nan(),
        Value::DoubleComplex(re, im) => re.is_nan() || im.is_nan(),
        _ => false,
    }
}

/// The VOTable logical alphabet: `T`/`t`/`1`, `F`/`f`/`0`, and the
/// in-band nulls `?`, space, NUL.
fn logical(byte: u8) -> std::result::Result<Option<bool>, u8> {
    match byte {
        b'T' | b't' | b'1' => Ok(Some(true)),
        b'F' | b'f' | b'0' => Ok(Some(false)),
        b'?' | b' ' | 0 => Ok(None),
        other => Err(other),
    }
}

fn trim_trailing_nuls(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
