//! Zoned decimal encoding and decoding.
//!
//! Zoned decimal uses one byte per digit. The low nibble holds the digit;
//! the high nibble is a zone (`0xF`) except on the last byte, where it
//! carries the sign.
//!
//! Example: -123 with 3 digits
//! - Binary: 0xF1 0xF2 0xD3

use rust_decimal::Decimal;

use super::{
    capacity, scale_decimal, scale_float, scale_int, scale_text, split_digits, uses_integer_path,
    Sign, Unpacked,
};
use crate::error::CodecError;
use crate::Result;

const ZONED: &str = "ZONED";

/// Zone nibble written above every digit.
const ZONE: u8 = 0xF0;

fn window(bytes: &[u8], digits: usize) -> Result<&[u8]> {
    bytes.get(..digits).ok_or(CodecError::BufferTooShort {
        required: digits,
        actual: bytes.len(),
    })
}

fn digit(byte: u8, index: usize) -> Result<u8> {
    let d = byte & 0x0F;
    if d > 9 {
        return Err(CodecError::invalid_data(
            ZONED,
            format!("invalid digit in byte {} (0x{:02X})", index, byte),
        ));
    }
    Ok(d)
}

fn sign_of(field: &[u8]) -> Sign {
    field
        .last()
        .map_or(Sign::Positive, |&last| Sign::from_nibble(last >> 4))
}

/// Read the digits and sign of a zoned field.
pub(crate) fn unzone(bytes: &[u8], digits: usize) -> Result<Unpacked> {
    let field = window(bytes, digits)?;
    Ok(Unpacked {
        digits: field
            .iter()
            .enumerate()
            .map(|(i, &b)| digit(b, i))
            .collect::<Result<_>>()?,
        sign: sign_of(field),
    })
}

/// Decode a zoned field to decimal text.
pub fn zoned_to_decimal_text(
    bytes: &[u8],
    digits: usize,
    dec: usize,
    separator: char,
) -> Result<String> {
    Ok(unzone(bytes, digits)?.text(dec, separator))
}

/// Decode a zoned field with no decimal positions straight to an integer.
pub fn zoned_to_int(bytes: &[u8], digits: usize) -> Result<i64> {
    let field = window(bytes, digits)?;
    let mut value: i64 = 0;
    for (i, &b) in field.iter().enumerate() {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(b & 0x0F)))
            .ok_or_else(|| CodecError::ValueOverflow {
                field_type: ZONED,
                value: format!("{} digits", digits),
                capacity: "64-bit integer".to_string(),
            })?;
        digit(b, i)?;
    }
    Ok(match sign_of(field) {
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
    let actual = out.len();
    let out = out.get_mut(..digits).ok_or(CodecError::BufferTooShort {
        required: digits,
        actual,
    })?;
    let Some((magnitude, sign)) = scaled else {
        return Err(CodecError::ValueOverflow {
            field_type: ZONED,
            value: shown(),
            capacity: capacity(digits, dec),
        });
    };

    let values = split_digits(magnitude, digits, ZONED, || capacity(digits, dec), shown)?;
    for (byte, d) in out.iter_mut().zip(&values) {
        *byte = ZONE | d;
    }
    if let Some(last) = out.last_mut() {
        *last = (sign.nibble() << 4) | (*last & 0x0F);
    }
    Ok(())
}

/// Encode an integer into a zoned field.
///
/// Fields with fewer than ten integer digits are filled exactly; wider
/// fields go through `f64` like [`float_to_zoned`].
pub fn int_to_zoned(value: i64, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    let scaled = if uses_integer_path(digits, dec) {
        scale_int(value, dec)
    } else {
        scale_float(value as f64, dec)
    };
    write(out, digits, dec, scaled, || value.to_string())
}

/// Encode a float into a zoned field, rounding half away from zero.
pub fn float_to_zoned(value: f64, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    write(out, digits, dec, scale_float(value, dec), || value.to_string())
}

/// Encode a decimal into a zoned field exactly.
pub fn decimal_to_zoned(value: &Decimal, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    write(out, digits, dec, scale_decimal(value, dec), || value.to_string())
}

/// Encode decimal text into a zoned field exactly.
pub fn decimal_text_to_zoned(text: &str, digits: usize, dec: usize, out: &mut [u8]) -> Result<()> {
    let scaled = scale_text(text, dec, ZONED)?;
    write(out, digits, dec, scaled, || text.to_string())
}

/// Write unsigned zero: every byte `0xF0`.
pub fn clear_zoned(out: &mut [u8]) {
    out.fill(ZONE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::MAX_DIGITS;

    #[test]
    fn test_decode_examples() {
        assert_eq!(zoned_to_decimal_text(&[0xF1, 0xF2, 0xF3], 3, 0, '.').unwrap(), "123");
        assert_eq!(zoned_to_decimal_text(&[0xF1, 0xF2, 0xD3], 3, 0, '.').unwrap(), "-123");
        assert_eq!(zoned_to_int(&[0xF1, 0xF2, 0xD3], 3).unwrap(), -123);
        assert_eq!(
            zoned_to_decimal_text(&[0xF0, 0xF0, 0xF5], 3, 2, '.').unwrap(),
            "0.05"
        );
    }

    #[test]
    fn test_sign_high_nibble() {
        for zone in 0x0..=0xF_u8 {
            let bytes = [0xF0, 0xF4, (zone << 4) | 0x02];
            let value = zoned_to_int(&bytes, 3).unwrap();
            assert_eq!(value, if zone == 0xF { 42 } else { -42 });
        }
    }

    #[test]
    fn test_all_zero_fields() {
        for digits in 1..=MAX_DIGITS {
            let mut buf = vec![0u8; digits];
            clear_zoned(&mut buf);
            assert!(buf.iter().all(|&b| b == 0xF0));
            assert_eq!(zoned_to_decimal_text(&buf, digits, 0, '.').unwrap(), "0");
            let text = zoned_to_decimal_text(&buf, digits, digits, '.').unwrap();
            assert_eq!(text, format!("0.{}", "0".repeat(digits)));
        }
    }

    #[test]
    fn test_int_encode() {
        let mut buf = [0u8; 5];
        int_to_zoned(-123, 5, 0, &mut buf).unwrap();
        assert_eq!(buf, [0xF0, 0xF0, 0xF1, 0xF2, 0xD3]);
        int_to_zoned(45, 5, 2, &mut buf).unwrap();
        assert_eq!(buf, [0xF0, 0xF4, 0xF5, 0xF0, 0xF0]);
        assert_eq!(zoned_to_decimal_text(&buf, 5, 2, '.').unwrap(), "45.00");
    }

    #[test]
    fn test_fast_path_matches_text() {
        let mut buf = [0u8; 9];
        for value in [0, 5, -5, 999_999_999, -999_999_999, 120_034_005] {
            int_to_zoned(value, 9, 0, &mut buf).unwrap();
            let text = zoned_to_decimal_text(&buf, 9, 0, '.').unwrap();
            assert_eq!(zoned_to_int(&buf, 9).unwrap(), text.parse::<i64>().unwrap());
        }
    }

    #[test]
    fn test_text_round_trip_wide() {
        let text = "-1234567890123456789012345.678901";
        let mut buf = [0u8; 31];
        decimal_text_to_zoned(text, 31, 6, &mut buf).unwrap();
        assert_eq!(zoned_to_decimal_text(&buf, 31, 6, '.').unwrap(), text);
    }

    #[test]
    fn test_decimal_and_float_encode() {
        let mut buf = [0u8; 4];
        decimal_to_zoned(&Decimal::new(15, 1), 4, 2, &mut buf).unwrap();
        assert_eq!(zoned_to_decimal_text(&buf, 4, 2, '.').unwrap(), "1.50");
        float_to_zoned(-2.5, 4, 0, &mut buf).unwrap();
        assert_eq!(zoned_to_decimal_text(&buf, 4, 0, '.').unwrap(), "-3");
    }

    #[test]
    fn test_overflow_and_invalid() {
        let mut buf = [0u8; 3];
        assert!(matches!(
            int_to_zoned(1000, 3, 0, &mut buf),
            Err(CodecError::ValueOverflow { .. })
        ));
        assert!(matches!(
            zoned_to_decimal_text(&[0xF1, 0xFC, 0xF3], 3, 0, '.'),
            Err(CodecError::InvalidFieldData { .. })
        ));
        assert!(matches!(
            zoned_to_int(&[0xF1, 0xFC, 0xF3], 3),
            Err(CodecError::InvalidFieldData { .. })
        ));
    }
}
