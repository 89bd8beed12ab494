//! Packed decimal encoding and decoding.
//!
//! Packed decimal stores two digits per byte with the sign in the
//! rightmost nibble. The digit count is forced odd, so the leading nibble of
//! an even-digit field is an extra zero digit.
//!
//! Example: 123.45 with 5 digits, 2 decimals
//! - Layout: d1|d2 d3|d4 d5|sign
//! - Binary: 0x12 0x34 0x5F
//! - The 'F' nibble indicates positive; 'D' would make it -123.45

use rust_decimal::Decimal;

use super::{
    capacity, scale_decimal, scale_float, scale_int, scale_text, split_digits, uses_integer_path,
    Sign, Unpacked,
};
use crate::error::CodecError;
use crate::Result;

const PACKED: &str = "PACKED";

/// Byte length of a packed field holding `digits` digits.
pub fn packed_len(digits: usize) -> usize {
    digits / 2 + 1
}

fn window(bytes: &[u8], digits: usize) -> Result<&[u8]> {
    let required = packed_len(digits);
    bytes.get(..required).ok_or(CodecError::BufferTooShort {
        required,
        actual: bytes.len(),
    })
}

fn nibbles(field: &[u8], count: usize) -> impl Iterator<Item = Result<u8>> + '_ {
    (0..count).map(move |i| {
        let byte = field[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        if nibble > 9 {
            Err(CodecError::invalid_data(
                PACKED,
                format!("invalid digit nibble in byte {} (0x{:02X})", i / 2, byte),
            ))
        } else {
            Ok(nibble)
        }
    })
}

/// Read the digits and sign of a packed field.
pub(crate) fn unpack(bytes: &[u8], digits: usize) -> Result<Unpacked> {
    let count = digits | 1;
    let field = window(bytes, digits)?;
    Ok(Unpacked {
        digits: nibbles(field, count).collect::<Result<_>>()?,
        sign: Sign::from_nibble(field[count / 2]),
    })
}

/// Decode a packed field to decimal text.
///
/// ```
/// use ibmi_codec::decimal::packed_to_decimal_text;
///
/// assert_eq!(packed_to_decimal_text(&[0x12, 0x34, 0x5F], 5, 2, '.').unwrap(), "123.45");
/// assert_eq!(packed_to_decimal_text(&[0x12, 0x34, 0x5D], 5, 2, '.').unwrap(), "-123.45");
/// // Nibbles 0,1,2,3,4 with two decimal positions.
/// assert_eq!(packed_to_decimal_text(&[0x01, 0x23, 0x4F], 5, 2, '.').unwrap(), "12.34");
/// ```
pub fn packed_to_decimal_text(
    bytes: &[u8],
    digits: usize,
    dec: usize,
    separator: char,
) -> Result<String> {
    Ok(unpack(bytes, digits)?.text(dec, separator))
}

/// Decode a packed field with no decimal positions straight to an integer.
pub fn packed_to_int(bytes: &[u8], digits: usize) -> Result<i64> {
    let count = digits | 1;
    let field = window(bytes, digits)?;
    let mut value: i64 = 0;
    for nibble in nibbles(field, count) {
        let nibble = nibble?;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(nibble)))
            .ok_or_else(|| CodecError::ValueOverflow {
                field_type: PACKED,
                value: format!("{} digits", digits),
                capacity: "64-bit integer".to_string(),
            })?;
    }
    Ok(match Sign::from_nibble(field[count / 2]) {
        Sign::Positive => value,
        Sign::Negative => -value,
    })
}

fn write(
    out: &mut [u8],
    digits: usize,
    dec: usize,
    scaled: Option<(u128, Sign)>,
    shown: impl FnOnce() -> String,
) -> Result<()> {
    let required = packed_len(digits);
    let actual = out.len();
    let out = out
        .get_mut(..required)
        .ok_or(CodecError::BufferTooShort { required, actual })?;
    let Some((magnitude, sign)) = scaled else {
        return Err(CodecError::ValueOverflow {
            field_type: PACKED,
            value: shown(),
            capacity: capacity(digits, dec),
        });
    };

    let mut nibbles = split_digits(magnitude, digits, PACKED, || capacity(digits, dec), shown)?;
    if digits % 2 == 0 {
        nibbles.insert(0, 0);
    }
    nibbles.push(sign.nibble());
    for (byte, pair) in out.iter_mut().zip(nibbles.chunks(2)) {
        *byte = (pair[0] << 4) | pair[1];
    }
    Ok(())
}

/// Encode an integer into a packed field.
///
/// Fields with fewer than ten integer digits are filled exactly; wider
/// fields go through `f64` like [`float_to_packed`].
pub fn int_to_packed(value: i64, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    let scaled = if uses_integer_path(digits, dec) {
        scale_int(value, dec)
    } else {
        scale_float(value as f64, dec)
    };
    write(out, digits, dec, scaled, || value.to_string())
}

/// Encode a float into a packed field, rounding half away from zero.
pub fn float_to_packed(value: f64, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    write(out, digits, dec, scale_float(value, dec), || value.to_string())
}

/// Encode a decimal into a packed field exactly, rounding half away from
/// zero past `dec` fractional digits.
pub fn decimal_to_packed(value: &Decimal, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    write(out, digits, dec, scale_decimal(value, dec), || value.to_string())
}

/// Encode decimal text such as `-123.45` into a packed field exactly.
pub fn decimal_text_to_packed(text: &str, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    let scaled = scale_text(text, dec, PACKED)?;
    write(out, digits, dec, scaled, || text.to_string())
}

/// Write positive zero: all digit nibbles zero, sign nibble `0xF`.
pub fn clear_packed(out: &mut [u8]) {
    out.fill(0x00);
    if let Some(last) = out.last_mut() {
        *last = 0x0F;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::MAX_DIGITS;

    const SOURCE_DIGITS: &str = "1234567890123456789012345678901";

    fn encode_int(value: i64, digits: usize, dec: usize) -> Vec<u8> {
        let mut buf = vec![0u8; packed_len(digits)];
        int_to_packed(value, digits, dec, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_decode_examples() {
        assert_eq!(
            packed_to_decimal_text(&[0x12, 0x34, 0x5F], 5, 2, '.').unwrap(),
            "123.45"
        );
        assert_eq!(
            packed_to_decimal_text(&[0x12, 0x34, 0x5D], 5, 2, '.').unwrap(),
            "-123.45"
        );
        assert_eq!(
            packed_to_decimal_text(&[0x12, 0x34, 0x5F], 5, 2, ',').unwrap(),
            "123,45"
        );
        // The leading nibble is a digit, so these bytes hold 0,1,2,3,4.
        assert_eq!(
            packed_to_decimal_text(&[0x01, 0x23, 0x4F], 5, 2, '.').unwrap(),
            "12.34"
        );
        assert_eq!(
            packed_to_decimal_text(&[0x01, 0x23, 0x4D], 5, 2, '.').unwrap(),
            "-12.34"
        );
    }

    #[test]
    fn test_even_digits_forced_odd() {
        assert_eq!(packed_len(4), 3);
        assert_eq!(packed_len(5), 3);
        assert_eq!(
            packed_to_decimal_text(&[0x01, 0x23, 0x4F], 4, 2, '.').unwrap(),
            "12.34"
        );
        assert_eq!(encode_int(1234, 4, 0), [0x01, 0x23, 0x4F]);
    }

    #[test]
    fn test_sign_convention() {
        for nibble in 0x0..=0xF {
            let text = packed_to_decimal_text(&[0x00, 0x10 | nibble], 3, 0, '.').unwrap();
            let expected = if nibble == 0xF { "1" } else { "-1" };
            assert_eq!(text, expected, "sign nibble {:X}", nibble);
        }
    }

    #[test]
    fn test_all_zero_fields() {
        for digits in 1..=MAX_DIGITS {
            let mut buf = vec![0xAAu8; packed_len(digits)];
            clear_packed(&mut buf);
            for dec in 0..=digits {
                let expected = if dec == 0 {
                    "0".to_string()
                } else {
                    format!("0.{}", "0".repeat(dec))
                };
                assert_eq!(packed_to_decimal_text(&buf, digits, dec, '.').unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_negative_zero() {
        assert_eq!(packed_to_decimal_text(&[0x00, 0x0D], 3, 0, '.').unwrap(), "-0");
        assert_eq!(packed_to_decimal_text(&[0x00, 0x0D], 3, 2, '.').unwrap(), "-0.00");
        assert_eq!(packed_to_int(&[0x00, 0x0D], 3).unwrap(), 0);
    }

    #[test]
    fn test_text_round_trip_all_shapes() {
        for digits in 1..=MAX_DIGITS {
            let source = &SOURCE_DIGITS[..digits];
            for dec in 0..=digits {
                let (int_part, frac_part) = source.split_at(digits - dec);
                let mut text = if int_part.is_empty() { "0".to_string() } else { int_part.to_string() };
                if dec > 0 {
                    text = format!("{}.{}", text, frac_part);
                }
                for candidate in [text.clone(), format!("-{}", text)] {
                    let mut buf = vec![0u8; packed_len(digits)];
                    decimal_text_to_packed(&candidate, digits, dec, &mut buf).unwrap();
                    assert_eq!(
                        packed_to_decimal_text(&buf, digits, dec, '.').unwrap(),
                        candidate
                    );
                }
            }
        }
    }

    #[test]
    fn test_int_fast_path_matches_text() {
        for digits in 1..10 {
            let max = 10i64.pow(digits as u32) - 1;
            for value in [0, 1, -1, 7, max, -max, max / 3, -(max / 7)] {
                let buf = encode_int(value, digits, 0);
                let text = packed_to_decimal_text(&buf, digits, 0, '.').unwrap();
                let fast = packed_to_int(&buf, digits).unwrap();
                assert_eq!(fast, text.parse::<i64>().unwrap());
                assert_eq!(fast, value);
            }
        }
    }

    #[test]
    fn test_int_encode() {
        assert_eq!(encode_int(12345, 5, 0), [0x12, 0x34, 0x5F]);
        assert_eq!(encode_int(-12345, 5, 0), [0x12, 0x34, 0x5D]);
        assert_eq!(encode_int(-123, 5, 2), [0x12, 0x30, 0x0D]);
        assert_eq!(encode_int(0, 1, 0), [0x0F]);
    }

    #[test]
    fn test_int_encode_wide_field_uses_float_path() {
        let buf = encode_int(123_456_789_012, 15, 0);
        assert_eq!(packed_to_decimal_text(&buf, 15, 0, '.').unwrap(), "123456789012");
    }

    #[test]
    fn test_float_encode_rounds_half_away() {
        let mut buf = [0u8; 2];
        float_to_packed(0.125, 3, 2, &mut buf).unwrap();
        assert_eq!(packed_to_decimal_text(&buf, 3, 2, '.').unwrap(), "0.13");
        float_to_packed(-0.125, 3, 2, &mut buf).unwrap();
        assert_eq!(packed_to_decimal_text(&buf, 3, 2, '.').unwrap(), "-0.13");
    }

    #[test]
    fn test_decimal_encode() {
        let mut buf = [0u8; 4];
        decimal_to_packed(&Decimal::new(-987_654, 3), 7, 2, &mut buf).unwrap();
        assert_eq!(packed_to_decimal_text(&buf, 7, 2, '.').unwrap(), "-987.65");
    }

    #[test]
    fn test_overflow() {
        let mut buf = [0u8; 3];
        let err = int_to_packed(100_000, 5, 0, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::ValueOverflow { .. }));
        let err = float_to_packed(f64::INFINITY, 5, 0, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::ValueOverflow { .. }));
        let err = decimal_text_to_packed("1000.00", 5, 2, &mut buf).unwrap_err();
        assert!(matches!(err, CodecError::ValueOverflow { .. }));
    }

    #[test]
    fn test_invalid_nibble() {
        let err = packed_to_decimal_text(&[0x1A, 0x2F], 3, 0, '.').unwrap_err();
        assert!(matches!(err, CodecError::InvalidFieldData { .. }));
        let err = packed_to_int(&[0x1A, 0x2F], 3).unwrap_err();
        assert!(matches!(err, CodecError::InvalidFieldData { .. }));
    }

    #[test]
    fn test_short_buffer() {
        let err = packed_to_decimal_text(&[0x12], 5, 0, '.').unwrap_err();
        assert!(matches!(
            err,
            CodecError::BufferTooShort {
                required: 3,
                actual: 1
            }
        ));
    }
}
