//! Named text codec converting between UTF-8 and one other CCSID.

use std::sync::Arc;

use super::{ccsid, convert_growable, utf8_string, Converter, TranscoderRegistry};
use crate::error::CodecError;
use crate::Result;

/// A codec between UTF-8 and a CCSID picked by name.
///
/// Names are `latin1` (819), `utf8` (1208), `ucs2` (13488) or a decimal CCSID
/// of at most five digits. `0` means the job CCSID.
#[derive(Debug, Clone)]
pub struct Codec {
    name: String,
    ccsid: u32,
    encoder: Arc<dyn Converter>,
    decoder: Arc<dyn Converter>,
}

impl Codec {
    /// Build a codec, taking both converters from `registry`.
    pub fn new(registry: &TranscoderRegistry, name: &str) -> Result<Self> {
        let ccsid = Self::ccsid_for_name(name)?;
        Ok(Self {
            name: name.to_string(),
            ccsid,
            encoder: registry.get_converter(ccsid::UTF8, ccsid)?,
            decoder: registry.get_converter(ccsid, ccsid::UTF8)?,
        })
    }

    /// Map a codec name to its CCSID.
    pub fn ccsid_for_name(name: &str) -> Result<u32> {
        match name {
            "latin1" => Ok(ccsid::LATIN1),
            "utf8" => Ok(ccsid::UTF8),
            "ucs2" => Ok(ccsid::UCS2),
            digits
                if (1..=5).contains(&digits.len())
                    && digits.bytes().all(|b| b.is_ascii_digit()) =>
            {
                digits.parse().map_err(|_| CodecError::InvalidCodecName {
                    name: name.to_string(),
                })
            }
            _ => Err(CodecError::InvalidCodecName {
                name: name.to_string(),
            }),
        }
    }

    /// The name the codec was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The CCSID on the non-UTF-8 side.
    pub fn ccsid(&self) -> u32 {
        self.ccsid
    }

    /// Encode UTF-8 text to the codec's CCSID.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        convert_growable(self.encoder.as_ref(), text.as_bytes())
    }

    /// Decode bytes in the codec's CCSID to UTF-8 text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        utf8_string(convert_growable(self.decoder.as_ref(), bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;

    #[test]
    fn test_name_mapping() {
        assert_eq!(Codec::ccsid_for_name("latin1").unwrap(), 819);
        assert_eq!(Codec::ccsid_for_name("utf8").unwrap(), 1208);
        assert_eq!(Codec::ccsid_for_name("ucs2").unwrap(), 13488);
        assert_eq!(Codec::ccsid_for_name("00037").unwrap(), 37);
        for bad in ["", "123456", "cp037", "UTF8"] {
            assert!(matches!(
                Codec::ccsid_for_name(bad),
                Err(CodecError::InvalidCodecName { .. })
            ));
        }
    }

    #[test]
    fn test_ebcdic_codec() {
        let registry = TranscoderRegistry::new(&CodecConfig::default());
        let codec = Codec::new(&registry, "37").unwrap();
        assert_eq!(codec.name(), "37");
        let bytes = codec.encode("Hi!").unwrap();
        assert_eq!(bytes, [0xC8, 0x89, 0x5A]);
        assert_eq!(codec.decode(&bytes).unwrap(), "Hi!");
        assert_eq!(registry.cached_len(), 2);
    }

    #[test]
    fn test_job_default_and_ucs2() {
        let registry = TranscoderRegistry::new(&CodecConfig::default());
        assert_eq!(Codec::new(&registry, "0").unwrap().encode("A").unwrap(), [0xC1]);

        let ucs2 = Codec::new(&registry, "ucs2").unwrap();
        assert_eq!(ucs2.encode("Aé").unwrap(), [0x00, 0x41, 0x00, 0xE9]);
        assert_eq!(ucs2.decode(&[0x00, 0x41, 0x00, 0xE9]).unwrap(), "Aé");
    }

    #[test]
    fn test_unknown_ccsid() {
        let registry = TranscoderRegistry::new(&CodecConfig::default());
        assert!(matches!(
            Codec::new(&registry, "99999"),
            Err(CodecError::UnsupportedEncoding { ccsid: 99999 })
        ));
    }
}
