//! Character-set transcoding between CCSIDs.
//!
//! A [`Converter`] performs one iconv-style step: it converts as much of its
//! input as fits into the output slice and reports how far it got. Two
//! drivers sit on top of that step:
//!
//! - [`convert_fixed`] writes into a caller-sized buffer and silently stops
//!   when the buffer is full. Fixed-width field writes rely on this
//!   truncation.
//! - [`convert_growable`] keeps growing an owned buffer until all input is
//!   converted, and fails with [`CodecError::ConversionStalled`] instead of
//!   looping when the converter stops making progress.
//!
//! Converters are obtained from a [`TranscoderRegistry`], which caches one
//! converter per `(from, to)` pair.

mod charset;
mod codec;
mod registry;

pub use charset::{ccsid, Charset};
pub use codec::Codec;
pub use registry::{
    ebcdic_to_utf16, ebcdic_to_utf8, utf16_to_ebcdic_padded, utf8_to_ebcdic_padded,
    TranscoderRegistry,
};

use std::fmt;

use tracing::{trace, warn};

use crate::config::ByteOrder;
use crate::ebcdic::EBCDIC_SPACE;
use crate::error::CodecError;
use crate::Result;
use charset::Decoded;

/// Minimum number of bytes added to the output buffer per growth step.
const MIN_GROWTH: usize = 10;

/// Result of one conversion step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Input bytes converted.
    pub consumed: usize,
    /// Output bytes produced.
    pub written: usize,
}

/// A reusable, stateless converter between two CCSIDs.
pub trait Converter: Send + Sync + fmt::Debug {
    /// Source CCSID.
    fn from_ccsid(&self) -> u32;

    /// Target CCSID.
    fn to_ccsid(&self) -> u32;

    /// Convert a prefix of `input` into `output`.
    ///
    /// Stops when the next character does not fit in `output`, or when the
    /// remaining input is malformed or ends inside a character. A partial
    /// character is never written.
    fn convert(&self, input: &[u8], output: &mut [u8]) -> Progress;
}

/// Converter between two resolved charsets, pivoting through `char`.
#[derive(Debug, Clone, Copy)]
pub struct CharsetConverter {
    from: Charset,
    to: Charset,
}

impl CharsetConverter {
    /// Create a converter from `from` to `to`.
    pub fn new(from: Charset, to: Charset) -> Self {
        Self { from, to }
    }
}

impl Converter for CharsetConverter {
    fn from_ccsid(&self) -> u32 {
        self.from.ccsid()
    }

    fn to_ccsid(&self) -> u32 {
        self.to.ccsid()
    }

    fn convert(&self, input: &[u8], output: &mut [u8]) -> Progress {
        let mut progress = Progress::default();
        let mut buf = [0u8; 4];
        while progress.consumed < input.len() {
            let (ch, width) = match self.from.decode_char(&input[progress.consumed..]) {
                Decoded::Char(ch, width) => (ch, width),
                Decoded::Incomplete | Decoded::Invalid => break,
            };
            let n = self.to.encode_char(ch, &mut buf);
            let end = progress.written + n;
            if end > output.len() {
                break;
            }
            output[progress.written..end].copy_from_slice(&buf[..n]);
            progress.consumed += width;
            progress.written = end;
        }
        progress
    }
}

/// Convert `input` into the fixed buffer `output`, returning the bytes written.
///
/// When `output` is too small the conversion stops at the last whole
/// character that fits. No error is raised; callers writing fixed-width
/// fields depend on this truncation.
pub fn convert_fixed(conv: &dyn Converter, input: &[u8], output: &mut [u8]) -> usize {
    conv.convert(input, output).written
}

/// Convert all of `input` into a newly allocated buffer.
///
/// The buffer starts at `input.len()` bytes. Whenever a step leaves input
/// unconverted, the buffer grows by `max(10, 2 * remaining)` and conversion
/// resumes from the first unconverted byte. If a step after growth still
/// consumes nothing, the call fails with [`CodecError::ConversionStalled`].
pub fn convert_growable(conv: &dyn Converter, input: &[u8]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; input.len()];
    let mut consumed = 0;
    let mut written = 0;
    let mut starved = false;

    loop {
        let step = conv.convert(&input[consumed..], &mut out[written..]);
        consumed += step.consumed;
        written += step.written;
        if consumed == input.len() {
            out.truncate(written);
            return Ok(out);
        }

        let remaining = input.len() - consumed;
        if step.consumed == 0 {
            if starved {
                warn!(
                    from = conv.from_ccsid(),
                    to = conv.to_ccsid(),
                    remaining,
                    written,
                    "conversion stalled"
                );
                return Err(CodecError::ConversionStalled {
                    from: conv.from_ccsid(),
                    to: conv.to_ccsid(),
                    remaining,
                    written,
                });
            }
            starved = true;
        } else {
            starved = false;
        }

        let growth = MIN_GROWTH.max(2 * remaining);
        trace!(remaining, growth, capacity = out.len(), "growing conversion buffer");
        out.resize(out.len() + growth, 0);
    }
}

/// Strip trailing EBCDIC blanks (`0x40`).
pub fn trim_ebcdic_blanks(bytes: &[u8]) -> &[u8] {
    trim_trailing(bytes, EBCDIC_SPACE)
}

/// Strip trailing ASCII blanks (`0x20`).
pub fn trim_ascii_blanks(bytes: &[u8]) -> &[u8] {
    trim_trailing(bytes, b' ')
}

/// Strip trailing two-byte blank units (`0x0020`) read in `order`.
///
/// An odd trailing byte is left in place.
pub fn trim_wide_blanks(bytes: &[u8], order: ByteOrder) -> &[u8] {
    let blank = order.u16_bytes(0x0020);
    let mut end = bytes.len() - bytes.len() % 2;
    while end >= 2 && bytes[end - 2..end] == blank {
        end -= 2;
    }
    if end == bytes.len() - bytes.len() % 2 {
        bytes
    } else {
        &bytes[..end]
    }
}

fn trim_trailing(bytes: &[u8], pad: u8) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != pad).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Turn converter output known to be UTF-8 into a `String`.
pub(crate) fn utf8_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        let written = e.utf8_error().valid_up_to();
        CodecError::ConversionStalled {
            from: ccsid::UTF8,
            to: ccsid::UTF8,
            remaining: e.as_bytes().len() - written,
            written,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebcdic::{CP037, CP1140};

    /// Copies bytes one-for-one and refuses to convert a `0xFF` byte.
    #[derive(Debug)]
    struct PoisonStub;

    impl Converter for PoisonStub {
        fn from_ccsid(&self) -> u32 {
            1
        }

        fn to_ccsid(&self) -> u32 {
            2
        }

        fn convert(&self, input: &[u8], output: &mut [u8]) -> Progress {
            let n = input
                .iter()
                .take(output.len())
                .take_while(|&&b| b != 0xFF)
                .count();
            output[..n].copy_from_slice(&input[..n]);
            Progress {
                consumed: n,
                written: n,
            }
        }
    }

    /// Writes every input byte three times.
    #[derive(Debug)]
    struct Tripler;

    impl Converter for Tripler {
        fn from_ccsid(&self) -> u32 {
            1
        }

        fn to_ccsid(&self) -> u32 {
            3
        }

        fn convert(&self, input: &[u8], output: &mut [u8]) -> Progress {
            let n = input.len().min(output.len() / 3);
            for (i, b) in input[..n].iter().enumerate() {
                output[i * 3..i * 3 + 3].fill(*b);
            }
            Progress {
                consumed: n,
                written: n * 3,
            }
        }
    }

    fn cp037_to_utf8() -> CharsetConverter {
        CharsetConverter::new(Charset::Ebcdic(&CP037), Charset::Utf8)
    }

    #[test]
    fn test_growable_expands_buffer() {
        let input: Vec<u8> = (0u8..40).collect();
        let out = convert_growable(&Tripler, &input).unwrap();
        assert_eq!(out.len(), 120);
        assert_eq!(&out[117..], &[39, 39, 39]);
    }

    #[test]
    fn test_growable_empty_input() {
        assert!(convert_growable(&Tripler, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_growable_stall_terminates() {
        for k in 0..20 {
            let mut input = vec![0x41u8; 20];
            input[k] = 0xFF;
            let err = convert_growable(&PoisonStub, &input).unwrap_err();
            match err {
                CodecError::ConversionStalled {
                    remaining, written, ..
                } => {
                    assert_eq!(written, k);
                    assert_eq!(remaining, 20 - k);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_growable_ebcdic_to_utf8_multibyte() {
        // "é" is 0x51 in CP037 and two bytes in UTF-8, so the first buffer is too small.
        let input = [0x51u8; 8];
        let out = convert_growable(&cp037_to_utf8(), &input).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "éééééééé");
    }

    #[test]
    fn test_fixed_truncation_every_capacity() {
        let conv = CharsetConverter::new(Charset::Ebcdic(&CP1140), Charset::Utf8);
        let input = CP1140.encode("aé€b");
        let full = convert_growable(&conv, &input).unwrap();
        let text = String::from_utf8(full.clone()).unwrap();

        for n in 0..=full.len() + 2 {
            let mut out = vec![0xAAu8; n];
            let written = convert_fixed(&conv, &input, &mut out);
            assert!(written <= n);
            assert_eq!(&out[..written], &full[..written]);
            assert!(text.is_char_boundary(written));
            // The next whole character would not have fit.
            let next = text[written..].chars().next().map_or(0, char::len_utf8);
            assert!(written == full.len() || written + next > n);
            assert!(out[written..].iter().all(|&b| b == 0xAA));
        }
    }

    #[test]
    fn test_converter_stops_at_malformed_input() {
        let conv = CharsetConverter::new(Charset::Utf8, Charset::Ebcdic(&CP037));
        let mut out = [0u8; 8];
        let p = conv.convert(&[b'A', 0xFF, b'B'], &mut out);
        assert_eq!(p, Progress { consumed: 1, written: 1 });
        assert_eq!(out[0], 0xC1);
    }

    #[test]
    fn test_trim_helpers() {
        assert_eq!(trim_ebcdic_blanks(&[0xC1, 0x40, 0x40]), &[0xC1]);
        assert_eq!(trim_ebcdic_blanks(&[0x40, 0x40]), &[] as &[u8]);
        assert_eq!(trim_ascii_blanks(b"AB  "), b"AB");
        assert_eq!(trim_ascii_blanks(&[0x40, 0x20]), &[0x40]);

        let wide = [0x00, 0x41, 0x00, 0x20, 0x00, 0x20];
        assert_eq!(trim_wide_blanks(&wide, ByteOrder::Big), &[0x00, 0x41]);
        assert_eq!(trim_wide_blanks(&wide, ByteOrder::Little), &wide[..]);
        // A trailing 0x20 in the low byte of a non-blank unit is kept.
        let tricky = [0x20, 0x20, 0x00];
        assert_eq!(trim_wide_blanks(&tricky, ByteOrder::Big), &tricky[..]);
    }

    #[test]
    fn test_utf8_string_reports_invalid_tail() {
        let err = utf8_string(vec![b'o', b'k', 0xFF, b'x']).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ConversionStalled {
                written: 2,
                remaining: 2,
                ..
            }
        ));
    }
}
