//! Packed and zoned decimal encoding.
//!
//! - **Packed decimal**: two digits per byte, high nibble first, with the
//!   sign in the low nibble of the last byte. The digit count is always
//!   treated as odd, so a field of `n` digits occupies `n / 2 + 1` bytes.
//! - **Zoned decimal**: one digit per byte in the low nibble, with the sign
//!   in the high nibble of the last byte.
//!
//! A sign nibble of `0xF` is positive; any other value is negative. On
//! encode, positive values get `0xF` and negative values `0xD`.
//!
//! # Encode paths
//!
//! Integers bound for a field with fewer than ten integer digits are scaled
//! exactly. Larger fields and floating values go through an `f64`, which
//! rounds half away from zero at the last fractional digit and is exact
//! only up to about 15 significant digits. Use the `Decimal` or decimal-text
//! encoders when every digit matters.

mod packed;
mod zoned;

pub use packed::{
    clear_packed, decimal_text_to_packed, decimal_to_packed, float_to_packed, int_to_packed,
    packed_len, packed_to_decimal_text, packed_to_int,
};
pub use zoned::{
    clear_zoned, decimal_text_to_zoned, decimal_to_zoned, float_to_zoned, int_to_zoned,
    zoned_to_decimal_text, zoned_to_int,
};

pub(crate) use packed::unpack;
pub(crate) use zoned::unzone;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::CodecError;
use crate::Result;

/// Largest digit count of a Zoned or Packed field.
pub const MAX_DIGITS: usize = 31;

/// Fields with this many integer digits or more encode integers through `f64`.
const INTEGER_PATH_LIMIT: usize = 10;

/// Sign of a packed or zoned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Sign nibble `0xF`.
    Positive,
    /// Any other sign nibble; written as `0xD`.
    Negative,
}

impl Sign {
    /// Preferred sign nibble written on encode.
    pub fn nibble(self) -> u8 {
        match self {
            Sign::Positive => 0x0F,
            Sign::Negative => 0x0D,
        }
    }

    /// Interpret a sign nibble. Only `0xF` is positive.
    pub fn from_nibble(nibble: u8) -> Self {
        if nibble & 0x0F == 0x0F {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    fn of(negative: bool) -> Self {
        if negative {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }
}

/// Whether an integer encoded into a field of this shape takes the exact
/// integer path.
pub fn uses_integer_path(digits: usize, dec: usize) -> bool {
    digits.saturating_sub(dec) < INTEGER_PATH_LIMIT
}

/// Digits and sign read out of a decimal field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unpacked {
    pub digits: Vec<u8>,
    pub sign: Sign,
}

impl Unpacked {
    /// Render as decimal text.
    ///
    /// The separator goes before digit `digits.len() - dec`, with a `0` in
    /// front of it when nothing else precedes it. Leading zero digits are
    /// dropped. A value with no significant digit renders as `0` after the
    /// sign, so negative zero is `-0`.
    pub fn text(&self, dec: usize, separator: char) -> String {
        let point = self.digits.len().saturating_sub(dec);
        let mut out = String::with_capacity(self.digits.len() + 3);
        if self.sign == Sign::Negative {
            out.push('-');
        }
        let lead = out.len();
        for (i, &d) in self.digits.iter().enumerate() {
            if dec > 0 && i == point {
                if out.len() == lead {
                    out.push('0');
                }
                out.push(separator);
            }
            if d != 0 || out.len() > lead {
                out.push(char::from(b'0' + d));
            }
        }
        if out.len() == lead {
            out.push('0');
        }
        out
    }

    /// The unscaled magnitude; exact for every digit count up to [`MAX_DIGITS`].
    pub fn magnitude(&self) -> u128 {
        self.digits
            .iter()
            .fold(0u128, |acc, &d| acc.saturating_mul(10).saturating_add(u128::from(d)))
    }

    /// Signed integer value, if it fits an `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        let magnitude = i128::try_from(self.magnitude()).ok()?;
        let value = if self.sign == Sign::Negative {
            -magnitude
        } else {
            magnitude
        };
        i64::try_from(value).ok()
    }

    /// Exact decimal with `dec` fractional digits, if it fits a `Decimal`.
    pub fn to_decimal(&self, dec: usize) -> Option<Decimal> {
        let magnitude = i128::try_from(self.magnitude()).ok()?;
        let mantissa = if self.sign == Sign::Negative {
            -magnitude
        } else {
            magnitude
        };
        Decimal::try_from_i128_with_scale(mantissa, u32::try_from(dec).ok()?).ok()
    }

    /// Nearest `f64`, parsed from the decimal text.
    pub fn to_f64(&self, dec: usize) -> f64 {
        self.text(dec, '.').parse().unwrap_or(0.0)
    }
}

pub(crate) fn pow10(exp: usize) -> Option<u128> {
    10u128.checked_pow(u32::try_from(exp).ok()?)
}

/// Scale an integer by `10^dec` without rounding.
pub(crate) fn scale_int(value: i64, dec: usize) -> Option<(u128, Sign)> {
    let magnitude = u128::from(value.unsigned_abs()).checked_mul(pow10(dec)?)?;
    Some((magnitude, Sign::of(value < 0)))
}

/// Scale a float by `10^dec`, rounding half away from zero.
pub(crate) fn scale_float(value: f64, dec: usize) -> Option<(u128, Sign)> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (value * 10f64.powi(i32::try_from(dec).ok()?)).round();
    // u128::MAX is about 3.4e38; anything near it is far beyond 31 digits.
    if scaled.abs() >= 1e38 {
        return None;
    }
    let magnitude = scaled.abs() as u128;
    Some((magnitude, Sign::of(scaled < 0.0 && magnitude != 0)))
}

/// Scale a decimal to `dec` fractional digits, rounding half away from zero.
pub(crate) fn scale_decimal(value: &Decimal, dec: usize) -> Option<(u128, Sign)> {
    let rounded = value.round_dp_with_strategy(
        u32::try_from(dec).ok()?,
        RoundingStrategy::MidpointAwayFromZero,
    );
    let mantissa = rounded.mantissa().unsigned_abs();
    let pad = dec.checked_sub(usize::try_from(rounded.scale()).ok()?)?;
    let magnitude = mantissa.checked_mul(pow10(pad)?)?;
    Some((magnitude, Sign::of(rounded.is_sign_negative() && magnitude != 0)))
}

/// Parse decimal text (`[+-]digits[.digits]`, `.` or `,` as separator) and
/// scale it to `dec` fractional digits, rounding half away from zero.
///
/// Returns `Ok(None)` when the value is too large to scale.
pub(crate) fn scale_text(
    text: &str,
    dec: usize,
    field_type: &'static str,
) -> Result<Option<(u128, Sign)>> {
    let malformed =
        || CodecError::invalid_data(field_type, format!("malformed decimal text '{}'", text));
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = body
        .split_once(|c: char| c == '.' || c == ',')
        .unwrap_or((body, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return Err(malformed());
    }

    let frac = frac_part.as_bytes();
    let kept = int_part
        .bytes()
        .chain((0..dec).map(|i| frac.get(i).copied().unwrap_or(b'0')));
    let mut magnitude: u128 = 0;
    for b in kept {
        magnitude = match magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(u128::from(b - b'0')))
        {
            Some(m) => m,
            None => return Ok(None),
        };
    }
    if frac.get(dec).is_some_and(|&b| b >= b'5') {
        magnitude = match magnitude.checked_add(1) {
            Some(m) => m,
            None => return Ok(None),
        };
    }
    Ok(Some((magnitude, Sign::of(negative && magnitude != 0))))
}

/// Split a magnitude into exactly `count` digits, failing when it does not fit.
pub(crate) fn split_digits(
    magnitude: u128,
    count: usize,
    field_type: &'static str,
    capacity: impl FnOnce() -> String,
    shown: impl FnOnce() -> String,
) -> Result<Vec<u8>> {
    if pow10(count).is_some_and(|limit| magnitude >= limit) {
        return Err(CodecError::ValueOverflow {
            field_type,
            value: shown(),
            capacity: capacity(),
        });
    }
    let mut digits = vec![0u8; count];
    let mut rest = magnitude;
    for d in digits.iter_mut().rev() {
        *d = (rest % 10) as u8;
        rest /= 10;
    }
    Ok(digits)
}

pub(crate) fn capacity(digits: usize, dec: usize) -> String {
    format!("{} digits, {} decimals", digits, dec)
}
