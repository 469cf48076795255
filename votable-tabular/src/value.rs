//! Typed cell values.

use serde::{Deserialize, Serialize};

use crate::field::{ArraySize, Datatype, FieldSpec};

/// A single typed cell value.
///
/// One variant per datatype, plus a flat array variant for every datatype
/// that admits `arraysize > 1`. Character data is carried as `String`
/// regardless of array size (`char`/`unicodeChar` arrays are strings).
/// Multi-dimensional arrays are flattened; shape is not modeled.
///
/// Equality compares `float`/`double` payloads by bit pattern, so NaN
/// sentinels and negative zero survive round-trip assertions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Logical(bool),
    UnsignedByte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// (real, imaginary)
    FloatComplex(f32, f32),
    /// (real, imaginary)
    DoubleComplex(f64, f64),
    /// ASCII character data (`char` fields of any array size).
    Char(String),
    /// UCS-2 character data (`unicodeChar` fields of any array size).
    UnicodeChar(String),
    LogicalArray(Vec<bool>),
    /// `unsignedByte` array.
    Bytes(Vec<u8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    FloatComplexArray(Vec<(f32, f32)>),
    DoubleComplexArray(Vec<(f64, f64)>),
}

impl Value {
    /// The datatype this value is carried as.
    pub fn datatype(&self) -> Datatype {
        match self {
            Self::Logical(_) | Self::LogicalArray(_) => Datatype::Logical,
            Self::UnsignedByte(_) | Self::Bytes(_) => Datatype::UnsignedByte,
            Self::Short(_) | Self::ShortArray(_) => Datatype::Short,
            Self::Int(_) | Self::IntArray(_) => Datatype::Int,
            Self::Long(_) | Self::LongArray(_) => Datatype::Long,
            Self::Float(_) | Self::FloatArray(_) => Datatype::Float,
            Self::Double(_) | Self::DoubleArray(_) => Datatype::Double,
            Self::FloatComplex(_, _) | Self::FloatComplexArray(_) => Datatype::FloatComplex,
            Self::DoubleComplex(_, _) | Self::DoubleComplexArray(_) => Datatype::DoubleComplex,
            Self::Char(_) => Datatype::Char,
            Self::UnicodeChar(_) => Datatype::UnicodeChar,
        }
    }

    /// Whether this is one of the array variants. Character values are
    /// never "arrays" here — a string covers every `char` array size.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::LogicalArray(_)
                | Self::Bytes(_)
                | Self::ShortArray(_)
                | Self::IntArray(_)
                | Self::LongArray(_)
                | Self::FloatArray(_)
                | Self::DoubleArray(_)
                | Self::FloatComplexArray(_)
                | Self::DoubleComplexArray(_)
        )
    }

    /// Number of stream elements this value occupies (code units for
    /// `unicodeChar`, bytes for `char`, elements for arrays, 1 for
    /// scalars).
    pub fn element_count(&self) -> usize {
        match self {
            Self::Char(s) => s.len(),
            Self::UnicodeChar(s) => s.encode_utf16().count(),
            Self::LogicalArray(v) => v.len(),
            Self::Bytes(v) => v.len(),
            Self::ShortArray(v) => v.len(),
            Self::IntArray(v) => v.len(),
            Self::LongArray(v) => v.len(),
            Self::FloatArray(v) => v.len(),
            Self::DoubleArray(v) => v.len(),
            Self::FloatComplexArray(v) => v.len(),
            Self::DoubleComplexArray(v) => v.len(),
            _ => 1,
        }
    }

    /// Whether this value has the shape a field's declaration calls for:
    /// same datatype, and scalar/array-ness agreeing with the arraysize.
    /// Element counts are checked at encode time, not here.
    pub fn matches(&self, field: &FieldSpec) -> bool {
        if self.datatype() != field.datatype {
            return false;
        }
        if field.datatype.is_character() {
            // Strings cover every char array size.
            return true;
        }
        match field.arraysize {
            ArraySize::Scalar => !self.is_array(),
            ArraySize::Fixed(_) | ArraySize::Variable | ArraySize::VariableMax(_) => {
                self.is_array()
            }
        }
    }
}

#[inline]
fn f32_eq(a: f32, b: f32) -> bool {
    a.to_bits() == b.to_bits()
}

#[inline]
fn f64_eq(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Logical(a), Logical(b)) => a == b,
            (UnsignedByte(a), UnsignedByte(b)) => a == b,
            (Short(a), Short(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Long(a), Long(b)) => a == b,
            (Float(a), Float(b)) => f32_eq(*a, *b),
            (Double(a), Double(b)) => f64_eq(*a, *b),
            (FloatComplex(ar, ai), FloatComplex(br, bi)) => f32_eq(*ar, *br) && f32_eq(*ai, *bi),
            (DoubleComplex(ar, ai), DoubleComplex(br, bi)) => {
                f64_eq(*ar, *br) && f64_eq(*ai, *bi)
            }
            (Char(a), Char(b)) => a == b,
            (UnicodeChar(a), UnicodeChar(b)) => a == b,
            (LogicalArray(a), LogicalArray(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (ShortArray(a), ShortArray(b)) => a == b,
            (IntArray(a), IntArray(b)) => a == b,
            (LongArray(a), LongArray(b)) => a == b,
            (FloatArray(a), FloatArray(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| f32_eq(*x, *y))
            }
            (DoubleArray(a), DoubleArray(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| f64_eq(*x, *y))
            }
            (FloatComplexArray(a), FloatComplexArray(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((xr, xi), (yr, yi))| f32_eq(*xr, *yr) && f32_eq(*xi, *yi))
            }
            (DoubleComplexArray(a), DoubleComplexArray(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((xr, xi), (yr, yi))| f64_eq(*xr, *yr) && f64_eq(*xi, *yi))
            }
            _ => false,
        }
    }
}
