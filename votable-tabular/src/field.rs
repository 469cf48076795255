//! Field descriptors: datatype, arraysize, and per-column metadata.
//!
//! A `FieldSpec` describes one column of a VOTable table the way the
//! surrounding `FIELD` declaration does: name, primitive datatype, array
//! size, optional unit/UCD, and an optional declared null sentinel. Field
//! order in a schema is significant — it is the physical byte layout order
//! of the `BINARY` stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TabularError;
use crate::value::Value;

/// VOTable primitive datatypes supported by the `BINARY` serialization.
///
/// All multi-byte values are big-endian (network byte order). The `bit`
/// datatype (packed bit arrays) is not supported and fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Datatype {
    /// ASCII `T`/`F`, with `?`, space, or NUL as in-band null.
    Logical,
    UnsignedByte,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Pair of big-endian f32 (real, imaginary).
    FloatComplex,
    /// Pair of big-endian f64 (real, imaginary).
    DoubleComplex,
    /// One ASCII byte per element.
    Char,
    /// One UCS-2 (UTF-16 code unit) big-endian u16 per element.
    UnicodeChar,
}

impl Datatype {
    /// Byte width of a single element in the `BINARY` serialization.
    pub fn element_width(self) -> usize {
        match self {
            Self::Logical | Self::UnsignedByte | Self::Char => 1,
            Self::Short | Self::UnicodeChar => 2,
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double | Self::FloatComplex => 8,
            Self::DoubleComplex => 16,
        }
    }

    /// The VOTable datatype token, as written in a `FIELD` declaration.
    pub fn token(self) -> &'static str {
        match self {
            Self::Logical => "boolean",
            Self::UnsignedByte => "unsignedByte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::FloatComplex => "floatComplex",
            Self::DoubleComplex => "doubleComplex",
            Self::Char => "char",
            Self::UnicodeChar => "unicodeChar",
        }
    }

    /// Whether this datatype carries character data (valued as a string).
    pub fn is_character(self) -> bool {
        matches!(self, Self::Char | Self::UnicodeChar)
    }
}

impl FromStr for Datatype {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" => Ok(Self::Logical),
            "unsignedByte" => Ok(Self::UnsignedByte),
            "short" => Ok(Self::Short),
            "int" => Ok(Self::Int),
            "long" => Ok(Self::Long),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "floatComplex" => Ok(Self::FloatComplex),
            "doubleComplex" => Ok(Self::DoubleComplex),
            "char" => Ok(Self::Char),
            "unicodeChar" => Ok(Self::UnicodeChar),
            other => Err(TabularError::Datatype(other.to_string())),
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl TryFrom<String> for Datatype {
    type Error = TabularError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Datatype> for String {
    fn from(dt: Datatype) -> String {
        dt.token().to_string()
    }
}

/// Parsed VOTable `arraysize` attribute.
///
/// Multi-dimensional sizes (`"N1xN2"`) are flattened to their element
/// product; a `*` in the last dimension makes the whole field
/// variable-length. `arraysize="1"` normalizes to `Scalar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArraySize {
    /// One element (no `arraysize` attribute).
    Scalar,
    /// Exactly `n` elements, fixed width in the stream.
    Fixed(usize),
    /// Length-prefixed in the stream, no declared bound.
    Variable,
    /// Length-prefixed in the stream; `n` is an upper bound enforced on
    /// encode (advisory on decode).
    VariableMax(usize),
}

impl Default for ArraySize {
    fn default() -> Self {
        Self::Scalar
    }
}

impl ArraySize {
    /// Whether the field is length-prefixed in the stream.
    pub fn is_variable(self) -> bool {
        matches!(self, Self::Variable | Self::VariableMax(_))
    }

    /// Fixed element count, if the field has one.
    pub fn fixed_count(self) -> Option<usize> {
        match self {
            Self::Scalar => Some(1),
            Self::Fixed(n) => Some(n),
            Self::Variable | Self::VariableMax(_) => None,
        }
    }
}

impl FromStr for ArraySize {
    type Err = TabularError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TabularError::ArraySize(s.to_string());

        let mut fixed_product: usize = 1;
        let dims: Vec<&str> = s.split('x').collect();
        if dims.is_empty() || dims.iter().any(|d| d.is_empty()) {
            return Err(err());
        }

        let (last, leading) = dims.split_last().ok_or_else(err)?;
        for dim in leading {
            // Only the last dimension may be variable.
            let n: usize = dim.parse().map_err(|_| err())?;
            if n == 0 {
                return Err(err());
            }
            fixed_product = fixed_product.checked_mul(n).ok_or_else(err)?;
        }

        if let Some(bound) = last.strip_suffix('*') {
            if bound.is_empty() {
                return Ok(Self::Variable);
            }
            let n: usize = bound.parse().map_err(|_| err())?;
            if n == 0 {
                return Err(err());
            }
            let total = fixed_product.checked_mul(n).ok_or_else(err)?;
            Ok(Self::VariableMax(total))
        } else {
            let n: usize = last.parse().map_err(|_| err())?;
            if n == 0 {
                return Err(err());
            }
            let total = fixed_product.checked_mul(n).ok_or_else(err)?;
            if total == 1 {
                Ok(Self::Scalar)
            } else {
                Ok(Self::Fixed(total))
            }
        }
    }
}

impl fmt::Display for ArraySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("1"),
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Variable => f.write_str("*"),
            Self::VariableMax(n) => write!(f, "{n}*"),
        }
    }
}

impl TryFrom<String> for ArraySize {
    type Error = TabularError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ArraySize> for String {
    fn from(size: ArraySize) -> String {
        size.to_string()
    }
}

/// Schema descriptor for one table column.
///
/// Immutable once handed to a `TableSchema`; built with the fluent
/// constructors:
///
/// ```
/// use votable_tabular::{Datatype, FieldSpec, Value};
///
/// let field = FieldSpec::new("RAJ2000", Datatype::Double)
///     .with_unit("deg")
///     .with_ucd("pos.eq.ra;meta.main");
///
/// let mag = FieldSpec::new("Bmag", Datatype::Short)
///     .with_null(Value::Short(i16::MIN));
/// # let _ = (field, mag);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column name.
    pub name: String,
    /// Primitive datatype.
    pub datatype: Datatype,
    /// Array size; `Scalar` when the declaration carries no `arraysize`.
    #[serde(default)]
    pub arraysize: ArraySize,
    /// Physical unit, as declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// UCD tag, as declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucd: Option<String>,
    /// Declared null sentinel: a scalar value of this field's datatype
    /// whose bit pattern means "absent" in the stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null: Option<Value>,
}

impl FieldSpec {
    /// Create a scalar field with no unit, UCD, or null sentinel.
    pub fn new(name: impl Into<String>, datatype: Datatype) -> Self {
        Self {
            name: name.into(),
            datatype,
            arraysize: ArraySize::Scalar,
            unit: None,
            ucd: None,
            null: None,
        }
    }

    /// Set the array size.
    pub fn with_arraysize(mut self, arraysize: ArraySize) -> Self {
        self.arraysize = arraysize;
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Set the UCD tag.
    pub fn with_ucd(mut self, ucd: impl Into<String>) -> Self {
        self.ucd = Some(ucd.into());
        self
    }

    /// Declare the null sentinel. Datatype agreement is checked when the
    /// field is assembled into a `TableSchema`.
    pub fn with_null(mut self, sentinel: Value) -> Self {
        self.null = Some(sentinel);
        self
    }

    /// Whether this field is length-prefixed in the stream.
    pub fn is_variable(&self) -> bool {
        self.arraysize.is_variable()
    }

    /// Byte width this field occupies in a row. `None` when the field is
    /// variable-length, or when the declared width does not fit `usize`
    /// (such a field can never decode; the cursor reports truncation).
    pub fn fixed_byte_width(&self) -> Option<usize> {
        self.arraysize
            .fixed_count()
            .and_then(|n| n.checked_mul(self.datatype.element_width()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_token_roundtrip() {
        let tokens = [
            "boolean",
            "unsignedByte",
            "short",
            "int",
            "long",
            "float",
            "double",
            "floatComplex",
            "doubleComplex",
            "char",
            "unicodeChar",
        ];
        for token in tokens {
            let dt: Datatype = token.parse().unwrap();
            assert_eq!(dt.to_string(), token);
        }
    }

    #[test]
    fn test_datatype_rejects_unknown_tokens() {
        assert!("bit".parse::<Datatype>().is_err());
        assert!("Double".parse::<Datatype>().is_err());
        assert!("".parse::<Datatype>().is_err());
    }

    #[test]
    fn test_element_widths() {
        assert_eq!(Datatype::Logical.element_width(), 1);
        assert_eq!(Datatype::Short.element_width(), 2);
        assert_eq!(Datatype::Int.element_width(), 4);
        assert_eq!(Datatype::Long.element_width(), 8);
        assert_eq!(Datatype::Float.element_width(), 4);
        assert_eq!(Datatype::Double.element_width(), 8);
        assert_eq!(Datatype::FloatComplex.element_width(), 8);
        assert_eq!(Datatype::DoubleComplex.element_width(), 16);
        assert_eq!(Datatype::UnicodeChar.element_width(), 2);
    }

    #[test]
    fn test_arraysize_parsing() {
        assert_eq!("7".parse::<ArraySize>().unwrap(), ArraySize::Fixed(7));
        assert_eq!("1".parse::<ArraySize>().unwrap(), ArraySize::Scalar);
        assert_eq!("*".parse::<ArraySize>().unwrap(), ArraySize::Variable);
        assert_eq!("12*".parse::<ArraySize>().unwrap(), ArraySize::VariableMax(12));
    }

    #[test]
    fn test_arraysize_multidimensional_flattens() {
        assert_eq!("3x4".parse::<ArraySize>().unwrap(), ArraySize::Fixed(12));
        assert_eq!("2x3x4".parse::<ArraySize>().unwrap(), ArraySize::Fixed(24));
        assert_eq!("3x*".parse::<ArraySize>().unwrap(), ArraySize::Variable);
        assert_eq!(
            "3x4*".parse::<ArraySize>().unwrap(),
            ArraySize::VariableMax(12)
        );
    }

    #[test]
    fn test_arraysize_rejects_malformed_tokens() {
        for bad in ["", "0", "x3", "3x", "-2", "3**", "*4", "3x0"] {
            assert!(bad.parse::<ArraySize>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_arraysize_display_roundtrip() {
        for token in ["1", "7", "*", "12*"] {
            let size: ArraySize = token.parse().unwrap();
            assert_eq!(size.to_string(), token);
        }
    }

    #[test]
    fn test_fixed_byte_width() {
        let ra = FieldSpec::new("RAJ2000", Datatype::Double);
        assert_eq!(ra.fixed_byte_width(), Some(8));

        let name = FieldSpec::new("name", Datatype::Char)
            .with_arraysize(ArraySize::Fixed(16));
        assert_eq!(name.fixed_byte_width(), Some(16));

        let notes = FieldSpec::new("notes", Datatype::Char)
            .with_arraysize(ArraySize::Variable);
        assert_eq!(notes.fixed_byte_width(), None);
        assert!(notes.is_variable());
    }

    #[test]
    fn test_fixed_byte_width_overflow_is_none() {
        // 2^61 doubles would be 2^64 bytes; the width must not wrap.
        let size: ArraySize = "2305843009213693952".parse().unwrap();
        let huge = FieldSpec::new("huge", Datatype::Double).with_arraysize(size);
        assert_eq!(huge.fixed_byte_width(), None);
        assert!(!huge.is_variable());
    }

    #[test]
    fn test_fieldspec_from_json() {
        // Schemas arrive from an external document parser as data.
        let json = r#"{
            "name": "DEJ2000",
            "datatype": "double",
            "unit": "deg",
            "ucd": "pos.eq.dec;meta.main"
        }"#;
        let field: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(field.name, "DEJ2000");
        assert_eq!(field.datatype, Datatype::Double);
        assert_eq!(field.arraysize, ArraySize::Scalar);
        assert_eq!(field.unit.as_deref(), Some("deg"));
        assert!(field.null.is_none());
    }

    #[test]
    fn test_fieldspec_json_with_arraysize_and_null() {
        let json = r#"{
            "name": "ID",
            "datatype": "char",
            "arraysize": "10*",
            "null": {"Char": ""}
        }"#;
        let field: FieldSpec = serde_json::from_str(json).unwrap();
        assert_eq!(field.arraysize, ArraySize::VariableMax(10));
        assert_eq!(field.null, Some(Value::Char(String::new())));
    }
}
