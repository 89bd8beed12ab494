//! Runtime lookup of EBCDIC code pages by CCSID or name.

use super::tables::{CodePage, CP037, CP1047, CP1140, CP1148, CP500};
use crate::error::CodecError;

static ALL: &[&CodePage] = &[&CP037, &CP500, &CP1047, &CP1140, &CP1148];

/// Registry of the built-in EBCDIC code pages.
pub struct CodePageRegistry;

impl CodePageRegistry {
    /// Look up a code page by CCSID.
    ///
    /// # Errors
    /// Returns `CodecError::UnsupportedEncoding` if the CCSID is not an
    /// EBCDIC page this crate carries.
    pub fn from_ccsid(ccsid: u16) -> Result<&'static CodePage, CodecError> {
        ALL.iter()
            .copied()
            .find(|cp| cp.ccsid == ccsid)
            .ok_or(CodecError::UnsupportedEncoding {
                ccsid: u32::from(ccsid),
            })
    }

    /// Look up a code page by name.
    ///
    /// Accepts "CP037", "IBM-037", "IBM037", "EBCDIC-037", and the same
    /// forms without leading zeros ("CP37"). Case-insensitive.
    pub fn by_name(name: &str) -> Option<&'static CodePage> {
        let upper = name.trim().to_ascii_uppercase();
        let number = ["EBCDIC-", "IBM-", "IBM", "CP"]
            .iter()
            .find_map(|prefix| upper.strip_prefix(prefix))?;
        let ccsid: u16 = number.parse().ok()?;
        Self::from_ccsid(ccsid).ok()
    }

    /// All registered code pages.
    pub fn all() -> &'static [&'static CodePage] {
        ALL
    }
}
