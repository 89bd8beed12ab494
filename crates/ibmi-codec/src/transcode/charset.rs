//! CCSID sentinels and charset resolution.

use crate::config::ByteOrder;
use crate::ebcdic::{CodePage, CodePageRegistry};
use crate::error::CodecError;
use crate::Result;

/// Well-known CCSID values.
pub mod ccsid {
    /// Job default; resolved through the configured job CCSID.
    pub const JOB_DEFAULT: u32 = 0;
    /// ISO-8859-1.
    pub const LATIN1: u32 = 819;
    /// UTF-16 (surrogate pairs allowed).
    pub const UTF16: u32 = 1200;
    /// UTF-8.
    pub const UTF8: u32 = 1208;
    /// UCS-2, the fixed two-byte form of UTF-16.
    pub const UCS2: u32 = 13488;
    /// Binary data, never converted.
    pub const RAW: u32 = 65535;
}

/// A resolved character set.
#[derive(Debug, Clone, Copy)]
pub enum Charset {
    /// Single-byte EBCDIC code page.
    Ebcdic(&'static CodePage),
    /// UTF-8.
    Utf8,
    /// UTF-16 in the given byte order.
    Utf16(ByteOrder),
    /// UCS-2 in the given byte order.
    Ucs2(ByteOrder),
    /// ISO-8859-1.
    Latin1,
}

/// Outcome of reading one character from the front of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// A character and the number of bytes it occupied.
    Char(char, usize),
    /// The slice ends inside a character.
    Incomplete,
    /// The bytes are not valid in this charset.
    Invalid,
}

/// U+FFFD, written for characters UCS-2 cannot hold.
const REPLACEMENT_UNIT: u16 = 0xFFFD;

impl Charset {
    /// Resolve a CCSID to a charset.
    ///
    /// CCSID 0 resolves through `job_ccsid`. CCSID 65535 has no charset: the
    /// field codec handles it without conversion.
    pub fn resolve(ccsid: u32, job_ccsid: u32, order: ByteOrder) -> Result<Charset> {
        let effective = if ccsid == ccsid::JOB_DEFAULT { job_ccsid } else { ccsid };
        match effective {
            ccsid::UTF8 => Ok(Charset::Utf8),
            ccsid::UTF16 => Ok(Charset::Utf16(order)),
            ccsid::UCS2 => Ok(Charset::Ucs2(order)),
            ccsid::LATIN1 => Ok(Charset::Latin1),
            other => u16::try_from(other)
                .ok()
                .and_then(|c| CodePageRegistry::from_ccsid(c).ok())
                .map(Charset::Ebcdic)
                .ok_or(CodecError::UnsupportedEncoding { ccsid }),
        }
    }

    /// The CCSID this charset represents.
    pub fn ccsid(&self) -> u32 {
        match self {
            Charset::Ebcdic(cp) => u32::from(cp.ccsid),
            Charset::Utf8 => ccsid::UTF8,
            Charset::Utf16(_) => ccsid::UTF16,
            Charset::Ucs2(_) => ccsid::UCS2,
            Charset::Latin1 => ccsid::LATIN1,
        }
    }

    /// Encoded form of a blank in this charset.
    pub fn pad(&self) -> &'static [u8] {
        match self {
            Charset::Ebcdic(_) => &[0x40],
            Charset::Utf8 | Charset::Latin1 => &[0x20],
            Charset::Utf16(ByteOrder::Big) | Charset::Ucs2(ByteOrder::Big) => &[0x00, 0x20],
            Charset::Utf16(ByteOrder::Little) | Charset::Ucs2(ByteOrder::Little) => &[0x20, 0x00],
        }
    }

    pub(crate) fn decode_char(&self, input: &[u8]) -> Decoded {
        let Some(&first) = input.first() else {
            return Decoded::Incomplete;
        };
        match self {
            Charset::Ebcdic(cp) => Decoded::Char(cp.ebcdic_to_char(first), 1),
            Charset::Latin1 => Decoded::Char(char::from(first), 1),
            Charset::Utf8 => decode_utf8(input),
            Charset::Utf16(order) => decode_utf16(input, *order, true),
            Charset::Ucs2(order) => decode_utf16(input, *order, false),
        }
    }

    /// Encode one character into `buf`, returning the byte count.
    ///
    /// Characters the target cannot represent are substituted.
    pub(crate) fn encode_char(&self, ch: char, buf: &mut [u8; 4]) -> usize {
        match self {
            Charset::Ebcdic(cp) => {
                buf[0] = cp.char_to_ebcdic(ch).unwrap_or(crate::ebcdic::EBCDIC_SUB);
                1
            }
            Charset::Latin1 => {
                buf[0] = u8::try_from(u32::from(ch)).unwrap_or(0x1A);
                1
            }
            Charset::Utf8 => ch.encode_utf8(buf).len(),
            Charset::Utf16(order) => {
                let mut units = [0u16; 2];
                let units = ch.encode_utf16(&mut units);
                for (i, unit) in units.iter().enumerate() {
                    buf[i * 2..i * 2 + 2].copy_from_slice(&order.u16_bytes(*unit));
                }
                units.len() * 2
            }
            Charset::Ucs2(order) => {
                let unit = u16::try_from(u32::from(ch)).unwrap_or(REPLACEMENT_UNIT);
                buf[..2].copy_from_slice(&order.u16_bytes(unit));
                2
            }
        }
    }
}

fn decode_utf8(input: &[u8]) -> Decoded {
    let width = match input[0] {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Decoded::Invalid,
    };
    if input.len() < width {
        // A truncated sequence is only incomplete if what is there is valid so far.
        return if input[1..].iter().all(|b| b & 0xC0 == 0x80) {
            Decoded::Incomplete
        } else {
            Decoded::Invalid
        };
    }
    match std::str::from_utf8(&input[..width]) {
        Ok(s) => s
            .chars()
            .next()
            .map_or(Decoded::Invalid, |ch| Decoded::Char(ch, width)),
        Err(_) => Decoded::Invalid,
    }
}

fn decode_utf16(input: &[u8], order: ByteOrder, surrogates: bool) -> Decoded {
    if input.len() < 2 {
        return Decoded::Incomplete;
    }
    let first = order.read_u16([input[0], input[1]]);
    if !(0xD800..=0xDFFF).contains(&first) {
        return char::from_u32(u32::from(first)).map_or(Decoded::Invalid, |ch| Decoded::Char(ch, 2));
    }
    if !surrogates || first >= 0xDC00 {
        return Decoded::Invalid;
    }
    if input.len() < 4 {
        return Decoded::Incomplete;
    }
    let second = order.read_u16([input[2], input[3]]);
    match char::decode_utf16([first, second]).next() {
        Some(Ok(ch)) => Decoded::Char(ch, 4),
        _ => Decoded::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sentinels() {
        let big = ByteOrder::Big;
        assert!(matches!(Charset::resolve(1208, 37, big).unwrap(), Charset::Utf8));
        assert!(matches!(Charset::resolve(1200, 37, big).unwrap(), Charset::Utf16(_)));
        assert!(matches!(Charset::resolve(13488, 37, big).unwrap(), Charset::Ucs2(_)));
        assert!(matches!(Charset::resolve(819, 37, big).unwrap(), Charset::Latin1));
        assert_eq!(Charset::resolve(500, 37, big).unwrap().ccsid(), 500);
    }

    #[test]
    fn test_resolve_job_default() {
        let cs = Charset::resolve(ccsid::JOB_DEFAULT, 1047, ByteOrder::Big).unwrap();
        assert_eq!(cs.ccsid(), 1047);
    }

    #[test]
    fn test_resolve_unsupported() {
        for bad in [ccsid::RAW, 935, 70000] {
            let err = Charset::resolve(bad, 37, ByteOrder::Big).unwrap_err();
            assert!(matches!(err, CodecError::UnsupportedEncoding { ccsid: c } if c == bad));
        }
    }

    #[test]
    fn test_pad_units() {
        let cp = Charset::resolve(37, 37, ByteOrder::Big).unwrap();
        assert_eq!(cp.pad(), &[0x40]);
        assert_eq!(Charset::Utf8.pad(), &[0x20]);
        assert_eq!(Charset::Ucs2(ByteOrder::Big).pad(), &[0x00, 0x20]);
        assert_eq!(Charset::Utf16(ByteOrder::Little).pad(), &[0x20, 0x00]);
    }

    #[test]
    fn test_decode_utf8_edges() {
        assert_eq!(decode_utf8("é".as_bytes()), Decoded::Char('é', 2));
        assert_eq!(decode_utf8(&[0xE2, 0x82]), Decoded::Incomplete);
        assert_eq!(decode_utf8(&[0xE2, 0x41]), Decoded::Invalid);
        assert_eq!(decode_utf8(&[0xFF]), Decoded::Invalid);
    }

    #[test]
    fn test_decode_utf16_surrogates() {
        // U+1F600 as a big-endian surrogate pair.
        let pair = [0xD8, 0x3D, 0xDE, 0x00];
        assert_eq!(
            decode_utf16(&pair, ByteOrder::Big, true),
            Decoded::Char('\u{1F600}', 4)
        );
        assert_eq!(decode_utf16(&pair, ByteOrder::Big, false), Decoded::Invalid);
        assert_eq!(decode_utf16(&pair[..2], ByteOrder::Big, true), Decoded::Incomplete);
    }

    #[test]
    fn test_encode_ucs2_substitutes_astral() {
        let mut buf = [0u8; 4];
        let n = Charset::Ucs2(ByteOrder::Big).encode_char('\u{1F600}', &mut buf);
        assert_eq!(&buf[..n], &[0xFF, 0xFD]);
    }
}
