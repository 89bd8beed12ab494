//! Field types and descriptors.

use std::fmt;

use super::Value;
use crate::error::CodecError;
use crate::transcode::ccsid;
use crate::Result;

/// Kind of a fixed-layout record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Signed two's-complement integer of 2, 4 or 8 bytes.
    Binary,
    /// IEEE float of 4 or 8 bytes.
    Float,
    /// Zoned decimal.
    Zoned,
    /// Packed decimal.
    Packed,
    /// Fixed-width single-byte character data.
    Char,
    /// Character data behind a two-byte length prefix.
    VarChar,
    /// Fixed-width double-byte character data.
    Graphic,
    /// Double-byte character data behind a two-byte length prefix.
    VarGraphic,
    /// Date text.
    Date,
    /// Time text.
    Time,
    /// Timestamp text.
    Timestamp,
}

impl FieldType {
    /// All supported field types.
    pub const ALL: [FieldType; 11] = [
        FieldType::Binary,
        FieldType::Float,
        FieldType::Zoned,
        FieldType::Packed,
        FieldType::Char,
        FieldType::VarChar,
        FieldType::Graphic,
        FieldType::VarGraphic,
        FieldType::Date,
        FieldType::Time,
        FieldType::Timestamp,
    ];

    /// Map an external type code to a field type.
    ///
    /// Codes without a variant here (DBCS-only 6, BLOB `0x4004`, DBCLOB
    /// `0x4005` and anything unknown) return `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// External type code.
    pub fn code(self) -> u16 {
        match self {
            FieldType::Binary => 0,
            FieldType::Float => 1,
            FieldType::Zoned => 2,
            FieldType::Packed => 3,
            FieldType::Char => 4,
            FieldType::Graphic => 5,
            FieldType::Date => 11,
            FieldType::Time => 12,
            FieldType::Timestamp => 13,
            FieldType::VarChar => 0x8004,
            FieldType::VarGraphic => 0x8005,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Binary => "BINARY",
            FieldType::Float => "FLOAT",
            FieldType::Zoned => "ZONED",
            FieldType::Packed => "PACKED",
            FieldType::Char => "CHAR",
            FieldType::VarChar => "VARCHAR",
            FieldType::Graphic => "GRAPHIC",
            FieldType::VarGraphic => "VARGRAPHIC",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Timestamp => "TIMESTAMP",
        }
    }

    /// Zoned or Packed.
    pub fn is_decimal(self) -> bool {
        matches!(self, FieldType::Zoned | FieldType::Packed)
    }

    /// Binary, Float, Zoned or Packed.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Binary | FieldType::Float) || self.is_decimal()
    }

    /// VarChar or VarGraphic.
    pub fn is_varying(self) -> bool {
        matches!(self, FieldType::VarChar | FieldType::VarGraphic)
    }

    /// Graphic or VarGraphic.
    pub fn is_graphic(self) -> bool {
        matches!(self, FieldType::Graphic | FieldType::VarGraphic)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field of a record format.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its layout.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Field kind.
    pub field_type: FieldType,
    /// Byte offset within the record.
    pub offset: usize,
    /// Byte width, including the length prefix of varying fields.
    pub length: usize,
    /// Total decimal digits (Zoned, Packed).
    pub digits: usize,
    /// Digits right of the decimal point.
    pub dec: usize,
    /// CCSID of character data; 0 means the job CCSID.
    pub ccsid: u32,
    /// Whether `Value::Null` may be encoded into the field.
    pub allow_null: bool,
    /// Default value. Numeric defaults given as text are parsed when the
    /// layout is built.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    /// Create a descriptor with no digits, the job CCSID and no default.
    pub fn new(name: impl Into<String>, field_type: FieldType, offset: usize, length: usize) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            field_type,
            offset,
            length,
            digits: 0,
            dec: 0,
            ccsid: ccsid::JOB_DEFAULT,
            allow_null: false,
            default: None,
        }
    }

    /// Create a descriptor from an external type code.
    pub fn from_code(name: impl Into<String>, code: u16, offset: usize, length: usize) -> Result<Self> {
        let name = name.into();
        match FieldType::from_code(code) {
            Some(field_type) => Ok(Self::new(name, field_type, offset, length)),
            None => Err(CodecError::layout(
                &name,
                format!("unsupported field type code 0x{:04X}", code),
            )),
        }
    }

    /// Zoned field of `digits` digits, `dec` of them fractional.
    pub fn zoned(name: impl Into<String>, offset: usize, digits: usize, dec: usize) -> Self {
        Self::new(name, FieldType::Zoned, offset, digits).with_digits(digits, dec)
    }

    /// Packed field of `digits` digits, `dec` of them fractional.
    pub fn packed(name: impl Into<String>, offset: usize, digits: usize, dec: usize) -> Self {
        let length = crate::decimal::packed_len(digits);
        Self::new(name, FieldType::Packed, offset, length).with_digits(digits, dec)
    }

    /// Char field of `length` bytes in `ccsid`.
    pub fn char(name: impl Into<String>, offset: usize, length: usize, ccsid: u32) -> Self {
        Self::new(name, FieldType::Char, offset, length).with_ccsid(ccsid)
    }

    /// Set the digit and decimal-position counts.
    pub fn with_digits(mut self, digits: usize, dec: usize) -> Self {
        self.digits = digits;
        self.dec = dec;
        self
    }

    /// Set the CCSID.
    pub fn with_ccsid(mut self, ccsid: u32) -> Self {
        self.ccsid = ccsid;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Allow or forbid nulls.
    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Set the default value from its textual form.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = Some(Value::Text(text.into()));
        self
    }

    /// Byte offset just past the field.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Bytes available for data after the length prefix of varying fields.
    pub fn capacity(&self) -> usize {
        if self.field_type.is_varying() {
            self.length.saturating_sub(2)
        } else {
            self.length
        }
    }
}

/// Parse the textual default of a field.
///
/// Numeric fields without decimals parse to `Int`, numeric fields with
/// decimals to `Float`; other fields keep the text. Returns `None` when a
/// numeric default does not parse.
pub fn parse_default(field_type: FieldType, dec: usize, text: &str) -> Option<Value> {
    if !field_type.is_numeric() {
        return Some(Value::Text(text.to_string()));
    }
    let trimmed = text.trim();
    if dec == 0 {
        trimmed.parse().ok().map(Value::Int)
    } else {
        trimmed.parse().ok().map(Value::Float)
    }
}
