//! Binary integer and IEEE float fields.
//!
//! Binary fields are signed two's complement of 2, 4 or 8 bytes; Float
//! fields are IEEE 754 single (4 bytes, widened to `f64` on decode) or
//! double (8 bytes). Both use the configured buffer byte order.

use crate::config::ByteOrder;
use crate::error::CodecError;
use crate::Result;

const BINARY: &str = "BINARY";
const FLOAT: &str = "FLOAT";

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

/// Decode a Binary field.
pub fn decode_binary(bytes: &[u8], order: ByteOrder) -> Result<i64> {
    let big = order == ByteOrder::Big;
    match bytes.len() {
        2 => {
            let b = array::<2>(bytes);
            Ok(i64::from(if big { i16::from_be_bytes(b) } else { i16::from_le_bytes(b) }))
        }
        4 => {
            let b = array::<4>(bytes);
            Ok(i64::from(if big { i32::from_be_bytes(b) } else { i32::from_le_bytes(b) }))
        }
        8 => {
            let b = array::<8>(bytes);
            Ok(if big { i64::from_be_bytes(b) } else { i64::from_le_bytes(b) })
        }
        width => Err(CodecError::UnsupportedFieldWidth {
            field_type: BINARY,
            width,
        }),
    }
}

/// Encode a Binary field, failing with `ValueOverflow` when `value` does
/// not fit the field width.
pub fn encode_binary(value: i64, order: ByteOrder, out: &mut [u8]) -> Result<()> {
    let big = order == ByteOrder::Big;
    let width = out.len();
    let overflow = || CodecError::ValueOverflow {
        field_type: BINARY,
        value: value.to_string(),
        capacity: format!("{}-byte integer", width),
    };
    match width {
        2 => {
            let v = i16::try_from(value).map_err(|_| overflow())?;
            out.copy_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() });
        }
        4 => {
            let v = i32::try_from(value).map_err(|_| overflow())?;
            out.copy_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() });
        }
        8 => {
            out.copy_from_slice(&if big { value.to_be_bytes() } else { value.to_le_bytes() });
        }
        _ => {
            return Err(CodecError::UnsupportedFieldWidth {
                field_type: BINARY,
                width,
            })
        }
    }
    Ok(())
}

/// Decode a Float field.
pub fn decode_float(bytes: &[u8], order: ByteOrder) -> Result<f64> {
    let big = order == ByteOrder::Big;
    match bytes.len() {
        4 => {
            let b = array::<4>(bytes);
            Ok(f64::from(if big { f32::from_be_bytes(b) } else { f32::from_le_bytes(b) }))
        }
        8 => {
            let b = array::<8>(bytes);
            Ok(if big { f64::from_be_bytes(b) } else { f64::from_le_bytes(b) })
        }
        width => Err(CodecError::UnsupportedFieldWidth {
            field_type: FLOAT,
            width,
        }),
    }
}

/// Encode a Float field. A finite value too large for single precision is
/// a `ValueOverflow`.
pub fn encode_float(value: f64, order: ByteOrder, out: &mut [u8]) -> Result<()> {
    let big = order == ByteOrder::Big;
    match out.len() {
        4 => {
            let v = value as f32;
            if v.is_infinite() && value.is_finite() {
                return Err(CodecError::ValueOverflow {
                    field_type: FLOAT,
                    value: value.to_string(),
                    capacity: "single precision".to_string(),
                });
            }
            out.copy_from_slice(&if big { v.to_be_bytes() } else { v.to_le_bytes() });
        }
        8 => {
            out.copy_from_slice(&if big { value.to_be_bytes() } else { value.to_le_bytes() });
        }
        width => {
            return Err(CodecError::UnsupportedFieldWidth {
                field_type: FLOAT,
                width,
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_widths_and_order() {
        assert_eq!(decode_binary(&[0xFF, 0xFE], ByteOrder::Big).unwrap(), -2);
        assert_eq!(decode_binary(&[0xFE, 0xFF], ByteOrder::Little).unwrap(), -2);
        assert_eq!(decode_binary(&[0, 0, 0x30, 0x39], ByteOrder::Big).unwrap(), 12345);
        assert_eq!(
            decode_binary(&i64::MIN.to_be_bytes(), ByteOrder::Big).unwrap(),
            i64::MIN
        );
    }

    #[test]
    fn test_binary_unsupported_width() {
        for width in [0usize, 1, 3, 5, 16] {
            let bytes = vec![0u8; width];
            assert!(matches!(
                decode_binary(&bytes, ByteOrder::Big),
                Err(CodecError::UnsupportedFieldWidth { width: w, .. }) if w == width
            ));
        }
        let mut out = [0u8; 3];
        assert!(matches!(
            encode_binary(1, ByteOrder::Big, &mut out),
            Err(CodecError::UnsupportedFieldWidth { .. })
        ));
    }

    #[test]
    fn test_binary_encode() {
        let mut out = [0u8; 4];
        encode_binary(-2, ByteOrder::Big, &mut out).unwrap();
        assert_eq!(out, [0xFF, 0xFF, 0xFF, 0xFE]);
        encode_binary(258, ByteOrder::Little, &mut out).unwrap();
        assert_eq!(out, [0x02, 0x01, 0, 0]);

        let mut small = [0u8; 2];
        assert!(matches!(
            encode_binary(40_000, ByteOrder::Big, &mut small),
            Err(CodecError::ValueOverflow { .. })
        ));
    }

    #[test]
    fn test_float_round_trip_and_widening() {
        let mut out = [0u8; 4];
        encode_float(1.5, ByteOrder::Big, &mut out).unwrap();
        assert_eq!(out, 1.5f32.to_be_bytes());
        assert_eq!(decode_float(&out, ByteOrder::Big).unwrap(), 1.5);

        let mut wide = [0u8; 8];
        encode_float(-0.1, ByteOrder::Little, &mut wide).unwrap();
        assert_eq!(decode_float(&wide, ByteOrder::Little).unwrap(), -0.1);
    }

    #[test]
    fn test_float_errors() {
        let mut out = [0u8; 4];
        assert!(matches!(
            encode_float(1e300, ByteOrder::Big, &mut out),
            Err(CodecError::ValueOverflow { .. })
        ));
        assert!(matches!(
            decode_float(&[0u8; 2], ByteOrder::Big),
            Err(CodecError::UnsupportedFieldWidth { width: 2, .. })
        ));
    }
}
