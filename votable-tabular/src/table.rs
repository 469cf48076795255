//! Table schema and row containers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TabularError};
use crate::field::FieldSpec;
use crate::value::Value;

/// Ordered field list for one table.
///
/// Field order is the physical byte layout order of the stream. Validates
/// on construction: at least one field, unique names, and null sentinels
/// that agree with their field's datatype. Sentinels are only meaningful
/// for scalar and character-valued fields — a numeric array field has no
/// single bit pattern to compare against.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    fields: Vec<FieldSpec>,
    name_to_index: HashMap<String, usize>,
}

impl TableSchema {
    /// Create a schema from field definitions.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(TabularError::schema("schema has no fields"));
        }

        let mut name_to_index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if name_to_index.insert(field.name.clone(), i).is_some() {
                return Err(TabularError::schema(format!(
                    "duplicate field name `{}`",
                    field.name
                )));
            }

            if let Some(sentinel) = &field.null {
                if sentinel.datatype() != field.datatype {
                    return Err(TabularError::schema(format!(
                        "null sentinel for `{}` is {}, field is {}",
                        field.name,
                        sentinel.datatype(),
                        field.datatype
                    )));
                }
                if sentinel.is_array() {
                    return Err(TabularError::schema(format!(
                        "null sentinel for `{}` must be a scalar value",
                        field.name
                    )));
                }
                if !field.datatype.is_character()
                    && !matches!(field.arraysize, crate::field::ArraySize::Scalar)
                {
                    return Err(TabularError::schema(format!(
                        "null sentinel on array field `{}` is not supported",
                        field.name
                    )));
                }
            }
        }

        Ok(Self {
            fields,
            name_to_index,
        })
    }

    /// Fields in layout order.
    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of fields.
    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Get field index by name.
    #[inline]
    pub fn index_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get field info by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldSpec> {
        self.index_by_name(name).map(|i| &self.fields[i])
    }

    /// Fixed byte width of one row, or `None` if any field is
    /// variable-length or the total does not fit `usize`.
    pub fn row_width(&self) -> Option<usize> {
        self.fields
            .iter()
            .map(|f| f.fixed_byte_width())
            .try_fold(0usize, |acc, w| w.and_then(|w| acc.checked_add(w)))
    }

    /// Whether any field is length-prefixed in the stream.
    pub fn has_variable_field(&self) -> bool {
        self.fields.iter().any(|f| f.is_variable())
    }
}

/// One decoded row: an ordered cell per field, `None` meaning absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Option<Value>>,
}

impl Row {
    pub fn new(cells: Vec<Option<Value>>) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell by position. `None` for out-of-range, `Some(None)` for an
    /// in-range absent cell.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Option<Value>> {
        self.cells.get(index)
    }
}

impl FromIterator<Option<Value>> for Row {
    fn from_iter<I: IntoIterator<Item = Option<Value>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ordered rows plus the owning schema.
///
/// Append-only during construction (`push_row` validates against the
/// schema); callers treat a decoded table as immutable. Row order is
/// stream order and carries no further guarantee — it must be preserved,
/// not resorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Arc<TableSchema>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table over a schema.
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Append a row, validating arity and per-cell shape against the
    /// schema. Absent cells are always structurally valid; whether a
    /// field can *encode* absence is the codec's concern.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.schema.num_fields() {
            return Err(TabularError::row(format!(
                "arity mismatch: schema has {} fields, row has {} cells",
                self.schema.num_fields(),
                row.len()
            )));
        }
        for (field, cell) in self.schema.fields().iter().zip(row.cells()) {
            if let Some(value) = cell {
                if !value.matches(field) {
                    return Err(TabularError::row(format!(
                        "cell for `{}` has datatype {}, field declares {} (arraysize {})",
                        field.name,
                        value.datatype(),
                        field.datatype,
                        field.arraysize
                    )));
                }
            }
        }
        self.rows.push(row);
        Ok(())
    }

    #[inline]
    pub fn schema(&self) -> &Arc<TableSchema> {
        &self.schema
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell by row index and field name.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Option<Value>> {
        let col = self.schema.index_by_name(name)?;
        self.rows.get(row)?.get(col)
    }
}
