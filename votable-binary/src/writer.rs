//! BINARY stream encoder: `Table` -> base64 text.
//!
//! Inverse of the reader, emitting canonical output: standard base64
//! alphabet, padded, no line wrapping. Absent cells emit the field's
//! declared sentinel, the logical `?` byte, or a quiet NaN; a field with
//! no representable null fails the whole encode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use votable_tabular::{ArraySize, Datatype, FieldSpec, Table, Value};

use crate::error::{FormatError, Result};

/// Encode a table to base64 stream text.
pub fn encode(table: &Table) -> Result<String> {
    let bytes = encode_bytes(table)?;
    Ok(STANDARD.encode(&bytes))
}

/// Encode a table to raw stream bytes.
pub fn encode_bytes(table: &Table) -> Result<Vec<u8>> {
    let schema = table.schema();
    let mut buf = Vec::new();

    for (row_idx, row) in table.rows().iter().enumerate() {
        if row.len() != schema.num_fields() {
            return Err(FormatError::SchemaMismatch(format!(
                "row {row_idx} has {} cells, schema has {} fields",
                row.len(),
                schema.num_fields()
            )));
        }
        for (field, cell) in schema.fields().iter().zip(row.cells()) {
            match cell {
                Some(value) => write_value(&mut buf, field, value, row_idx)?,
                None => write_absent(&mut buf, field, row_idx)?,
            }
        }
    }

    tracing::debug!(
        rows = table.num_rows(),
        bytes = buf.len(),
        "encoded BINARY stream"
    );
    Ok(buf)
}

/// Emit the field's null representation: declared sentinel first, then
/// the in-band nulls (`?` for scalar logical, quiet NaN for scalar
/// floating point).
fn write_absent(buf: &mut Vec<u8>, field: &FieldSpec, row: usize) -> Result<()> {
    if let Some(sentinel) = &field.null {
        return write_value(buf, field, sentinel, row);
    }
    match (field.datatype, field.arraysize) {
        (Datatype::Logical, ArraySize::Scalar) => buf.push(b'?'),
        (Datatype::Float, ArraySize::Scalar) => buf.extend_from_slice(&f32::NAN.to_be_bytes()),
        (Datatype::Double, ArraySize::Scalar) => buf.extend_from_slice(&f64::NAN.to_be_bytes()),
        (Datatype::FloatComplex, ArraySize::Scalar) => {
            buf.extend_from_slice(&f32::NAN.to_be_bytes());
            buf.extend_from_slice(&f32::NAN.to_be_bytes());
        }
        (Datatype::DoubleComplex, ArraySize::Scalar) => {
            buf.extend_from_slice(&f64::NAN.to_be_bytes());
            buf.extend_from_slice(&f64::NAN.to_be_bytes());
        }
        _ => {
            return Err(FormatError::NoNullSentinel {
                field: field.name.clone(),
            })
        }
    }
    Ok(())
}

/// Emit one cell value: count prefix for variable fields, payload, and
/// NUL padding for fixed-width character fields.
fn write_value(buf: &mut Vec<u8>, field: &FieldSpec, value: &Value, row: usize) -> Result<()> {
    if !value.matches(field) {
        return Err(FormatError::SchemaMismatch(format!(
            "row {row}: cell for `{}` has datatype {}, field declares {} (arraysize {})",
            field.name,
            value.datatype(),
            field.datatype,
            field.arraysize
        )));
    }

    let count = value.element_count();
    match field.arraysize {
        ArraySize::Scalar => {
            if field.datatype.is_character() && count > 1 {
                return Err(FormatError::FieldTooLong {
                    field: field.name.clone(),
                    len: count,
                    max: 1,
                });
            }
        }
        ArraySize::Fixed(n) => {
            if field.datatype.is_character() {
                if count > n {
                    return Err(FormatError::FieldTooLong {
                        field: field.name.clone(),
                        len: count,
                        max: n,
                    });
                }
            } else if count != n {
                return Err(FormatError::SchemaMismatch(format!(
                    "row {row}: field `{}` declares {n} elements, value has {count}",
                    field.name
                )));
            }
        }
        ArraySize::Variable | ArraySize::VariableMax(_) => {
            if let ArraySize::VariableMax(max) = field.arraysize {
                if count > max {
                    return Err(FormatError::FieldTooLong {
                        field: field.name.clone(),
                        len: count,
                        max,
                    });
                }
            }
            if count > u32::MAX as usize {
                return Err(FormatError::FieldTooLong {
                    field: field.name.clone(),
                    len: count,
                    max: u32::MAX as usize,
                });
            }
            buf.extend_from_slice(&(count as u32).to_be_bytes());
        }
    }

    write_payload(buf, field, value, row)?;

    // NUL-pad fixed-width character fields out to the declared width.
    if field.datatype.is_character() {
        if let Some(n) = field.arraysize.fixed_count() {
            let pad = (n - count) * field.datatype.element_width();
            buf.extend(std::iter::repeat(0u8).take(pad));
        }
    }
    Ok(())
}

fn write_payload(buf: &mut Vec<u8>, field: &FieldSpec, value: &Value, row: usize) -> Result<()> {
    match value {
        Value::Logical(flag) => buf.push(logical_byte(*flag)),
        Value::LogicalArray(flags) => buf.extend(flags.iter().map(|&f| logical_byte(f))),
        Value::UnsignedByte(b) => buf.push(*b),
        Value::Bytes(bytes) => buf.extend_from_slice(bytes),
        Value::Short(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::ShortArray(vals) => {
            for v in vals {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::IntArray(vals) => {
            for v in vals {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::LongArray(vals) => {
            for v in vals {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::FloatArray(vals) => {
            for v in vals {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::Double(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::DoubleArray(vals) => {
            for v in vals {
                buf.extend_from_slice(&v.to_be_bytes());
            }
        }
        Value::FloatComplex(re, im) => {
            buf.extend_from_slice(&re.to_be_bytes());
            buf.extend_from_slice(&im.to_be_bytes());
        }
        Value::FloatComplexArray(vals) => {
            for (re, im) in vals {
                buf.extend_from_slice(&re.to_be_bytes());
                buf.extend_from_slice(&im.to_be_bytes());
            }
        }
        Value::DoubleComplex(re, im) => {
            buf.extend_from_slice(&re.to_be_bytes());
            buf.extend_from_slice(&im.to_be_bytes());
        }
        Value::DoubleComplexArray(vals) => {
            for (re, im) in vals {
                buf.extend_from_slice(&re.to_be_bytes());
                buf.extend_from_slice(&im.to_be_bytes());
            }
        }
        Value::Char(s) => {
            if !s.is_ascii() {
                return Err(FormatError::InvalidChar {
                    row,
                    field: field.name.clone(),
                });
            }
            buf.extend_from_slice(s.as_bytes());
        }
        Value::UnicodeChar(s) => {
            for unit in s.encode_utf16() {
                buf.extend_from_slice(&unit.to_be_bytes());
            }
        }
    }
    Ok(())
}

#[inline]
fn logical_byte(flag: bool) -> u8 {
    if flag {
        b'T'
    } else {
        b'F'
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use votable_tabular::{Row, TableSchema};

    fn table_with(fields: Vec<FieldSpec>, rows: Vec<Vec<Option<Value>>>) -> Table {
        let schema = Arc::new(TableSchema::new(fields).unwrap());
        let mut table = Table::new(schema);
        for cells in rows {
            table.push_row(Row::new(cells)).unwrap();
        }
        table
    }

    #[test]
    fn test_fixed_char_is_nul_padded() {
        let table = table_with(
            vec![FieldSpec::new("name", Datatype::Char).with_arraysize(ArraySize::Fixed(6))],
            vec![vec![Some(Value::Char("vega".into()))]],
        );
        assert_eq!(encode_bytes(&table).unwrap(), b"vega\0\0");
    }

    #[test]
    fn test_fixed_char_too_long() {
        let table = table_with(
            vec![FieldSpec::new("name", Datatype::Char).with_arraysize(ArraySize::Fixed(3))],
            vec![vec![Some(Value::Char("altair".into()))]],
        );
        let err = encode_bytes(&table).unwrap_err();
        assert!(matches!(err, FormatError::FieldTooLong { len: 6, max: 3, .. }));
    }

    #[test]
    fn test_variable_field_gets_count_prefix() {
        let table = table_with(
            vec![FieldSpec::new("xs", Datatype::Short).with_arraysize(ArraySize::Variable)],
            vec![vec![Some(Value::ShortArray(vec![1, -1]))]],
        );
        assert_eq!(
            encode_bytes(&table).unwrap(),
            vec![0, 0, 0, 2, 0x00, 0x01, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_variable_max_bound_enforced() {
        let table = table_with(
            vec![FieldSpec::new("xs", Datatype::Short).with_arraysize(ArraySize::VariableMax(2))],
            vec![vec![Some(Value::ShortArray(vec![1, 2, 3]))]],
        );
        let err = encode_bytes(&table).unwrap_err();
        assert!(matches!(err, FormatError::FieldTooLong { len: 3, max: 2, .. }));
    }

    #[test]
    fn test_absent_without_sentinel_fails() {
        let table = table_with(
            vec![FieldSpec::new("recno", Datatype::Int)],
            vec![vec![None]],
        );
        let err = encode_bytes(&table).unwrap_err();
        assert!(matches!(err, FormatError::NoNullSentinel { .. }));
    }

    #[test]
    fn test_absent_sentinel_and_inband_nulls() {
        let table = table_with(
            vec![
                FieldSpec::new("recno", Datatype::Int).with_null(Value::Int(-1)),
                FieldSpec::new("flag", Datatype::Logical),
                FieldSpec::new("mag", Datatype::Double),
            ],
            vec![vec![None, None, None]],
        );
        let bytes = encode_bytes(&table).unwrap();
        assert_eq!(&bytes[0..4], &(-1i32).to_be_bytes());
        assert_eq!(bytes[4], b'?');
        assert!(f64::from_be_bytes(bytes[5..13].try_into().unwrap()).is_nan());
    }

    #[test]
    fn test_fixed_array_count_must_match() {
        let table = table_with(
            vec![FieldSpec::new("xs", Datatype::Int).with_arraysize(ArraySize::Fixed(3))],
            vec![vec![Some(Value::IntArray(vec![1, 2]))]],
        );
        let err = encode_bytes(&table).unwrap_err();
        assert!(matches!(err, FormatError::SchemaMismatch(_)));
    }
}
