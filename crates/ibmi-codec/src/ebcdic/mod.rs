//! EBCDIC single-byte code pages.
//!
//! - **Base pages:** CP037, CP500, CP1047
//! - **Euro-enabled pages:** CP1140, CP1148
//!
//! Use [`CodePageRegistry`] or [`CodePage::from_ccsid`] for runtime lookup.

mod registry;
mod tables;

pub use registry::CodePageRegistry;
pub use tables::{CodePage, CP037, CP1047, CP1140, CP1148, CP500};

use crate::error::CodecError;

/// EBCDIC blank, the pad byte of single-byte character fields.
pub const EBCDIC_SPACE: u8 = 0x40;

/// EBCDIC SUB, written for characters the code page cannot represent.
pub const EBCDIC_SUB: u8 = 0x3F;

impl CodePage {
    /// Decode EBCDIC bytes to a UTF-8 string.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.ebcdic_to_char(b)).collect()
    }

    /// Encode a string to EBCDIC bytes, substituting [`EBCDIC_SUB`] for
    /// characters outside the code page.
    pub fn encode(&self, s: &str) -> Vec<u8> {
        s.chars()
            .map(|ch| self.char_to_ebcdic(ch).unwrap_or(EBCDIC_SUB))
            .collect()
    }

    /// Convert a single EBCDIC byte to its Unicode character.
    pub fn ebcdic_to_char(&self, ebcdic: u8) -> char {
        if let Some(&(_, ch)) = self.special_chars.iter().find(|&&(eb, _)| eb == ebcdic) {
            ch
        } else {
            char::from(self.ebcdic_to_ascii[ebcdic as usize])
        }
    }

    /// Convert a Unicode character to its EBCDIC byte, if the page has one.
    pub fn char_to_ebcdic(&self, ch: char) -> Option<u8> {
        if let Some(&(eb, _)) = self.special_chars.iter().find(|&&(_, c)| c == ch) {
            return Some(eb);
        }
        let latin1 = u8::try_from(u32::from(ch)).ok()?;
        let eb = self.ascii_to_ebcdic[latin1 as usize];
        // A position taken over by a special character no longer carries
        // its ISO-8859-1 character.
        if self.special_chars.iter().any(|&(s, _)| s == eb) {
            None
        } else {
            Some(eb)
        }
    }

    /// Convert a single EBCDIC byte to ISO-8859-1.
    #[inline]
    pub fn ebcdic_to_ascii_byte(&self, ebcdic: u8) -> u8 {
        self.ebcdic_to_ascii[ebcdic as usize]
    }

    /// Convert a single ISO-8859-1 byte to EBCDIC.
    #[inline]
    pub fn ascii_to_ebcdic_byte(&self, ascii: u8) -> u8 {
        self.ascii_to_ebcdic[ascii as usize]
    }

    /// Look up a code page by CCSID number.
    ///
    /// # Errors
    /// Returns `CodecError::UnsupportedEncoding` if the CCSID is not recognized.
    pub fn from_ccsid(ccsid: u16) -> Result<&'static CodePage, CodecError> {
        CodePageRegistry::from_ccsid(ccsid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp037_roundtrip() {
        let original = "HELLO WORLD";
        let encoded = CP037.encode(original);
        assert_eq!(CP037.decode(&encoded), original);
    }

    #[test]
    fn test_hello_cp037() {
        assert_eq!(CP037.encode("HELLO"), vec![0xC8, 0xC5, 0xD3, 0xD3, 0xD6]);
        assert_eq!(CP037.encode("hello"), vec![0x88, 0x85, 0x93, 0x93, 0x96]);
    }

    #[test]
    fn test_digits_and_space() {
        for cp in CodePageRegistry::all() {
            assert_eq!(cp.encode("0123456789"), (0xF0..=0xF9).collect::<Vec<u8>>(), "{}", cp.name);
            assert_eq!(cp.encode(" "), vec![EBCDIC_SPACE], "{}", cp.name);
        }
    }

    #[test]
    fn test_every_byte_roundtrips() {
        for cp in CodePageRegistry::all() {
            for b in 0u8..=255 {
                let decoded = cp.decode(&[b]);
                assert_eq!(cp.encode(&decoded), vec![b], "{} byte 0x{:02X}", cp.name, b);
            }
        }
    }

    #[test]
    fn test_bracket_positions_differ() {
        assert_eq!(CP037.char_to_ebcdic('['), Some(0xBA));
        assert_eq!(CP500.char_to_ebcdic('['), Some(0x4A));
        assert_eq!(CP1047.char_to_ebcdic('['), Some(0xAD));
    }

    #[test]
    fn test_euro_pages() {
        assert_eq!(CP1140.decode(&[0x9F]), "€");
        assert_eq!(CP1148.encode("€"), vec![0x9F]);
        // The currency sign lost its slot to the Euro sign.
        assert_eq!(CP1140.char_to_ebcdic('¤'), None);
        assert_eq!(CP037.char_to_ebcdic('¤'), Some(0x9F));
    }

    #[test]
    fn test_unmappable_substitutes() {
        assert_eq!(CP037.encode("a€b"), vec![0x81, EBCDIC_SUB, 0x82]);
    }

    #[test]
    fn test_from_ccsid_unknown() {
        let err = CodePage::from_ccsid(1208).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedEncoding { ccsid: 1208 }));
    }
}
