use std::fmt;

use rust_decimal::Decimal;

/// A decoded field value, or a value to encode into a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Binary fields and Zoned/Packed fields without decimals.
    Int(i64),
    /// Float fields and fractional Zoned/Packed fields.
    Float(f64),
    /// Exact fractional Zoned/Packed value.
    Decimal(Decimal),
    /// Converted character data.
    Text(String),
    /// Unconverted field bytes.
    Bytes(Vec<u8>),
    /// No value.
    Null,
}

impl Value {
    /// Short name of the value's kind, used in type-mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Null => "null",
        }
    }

    /// The integer, if this is an `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The numeric value as `f64`, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(d) => d.to_string().parse().ok(),
            _ => None,
        }
    }

    /// The text, if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The bytes, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_accessors() {
        assert_eq!(Value::from(7).kind(), "integer");
        assert_eq!(Value::from(7).as_f64(), Some(7.0));
        assert_eq!(Value::from(Decimal::new(125, 2)).as_f64(), Some(1.25));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("abc").as_i64(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Bytes(vec![0xC1, 0x40]).to_string(), "C140");
        assert_eq!(Value::Decimal(Decimal::new(-5, 1)).to_string(), "-0.5");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
