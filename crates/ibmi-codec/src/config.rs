//! Codec configuration: the job CCSID, buffer byte order, converter cache
//! size and the text and decimal decoding options.
//!
//! Loaded from TOML:
//!
//! ```toml
//! job_ccsid = 37
//! byte_order = "big"
//! converter_cache_capacity = 30
//! decimal_separator = ","
//! char_conversion = "convert"
//! exact_decimals = false
//! even_packed_digits = "reject"
//! ```

use serde::{Deserialize, Serialize};

use crate::ebcdic::CodePageRegistry;
use crate::error::CodecError;
use crate::Result;

/// Byte order of multi-byte integers, floats, length prefixes and UTF-16
/// units inside record buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Most significant byte first (the originating platform's order).
    #[default]
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Read a 16-bit unsigned value.
    pub fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    /// Serialize a 16-bit unsigned value.
    pub fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        }
    }
}

/// How character, date, time and timestamp fields are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharConversion {
    /// Transcode to UTF-8 text according to the field CCSID.
    #[default]
    Convert,
    /// Hand back the raw field bytes untouched.
    Raw,
}

/// Treatment of Packed descriptors declaring an even digit count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvenPackedDigits {
    /// Reject the descriptor with `FieldLayoutInvalid`.
    #[default]
    Reject,
    /// Accept it and treat the digit count as the next odd number.
    RoundUp,
}

/// Top-level codec configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// CCSID substituted for CCSID 0 ("job default").
    pub job_ccsid: u32,
    /// Byte order of numeric data inside record buffers.
    pub byte_order: ByteOrder,
    /// Maximum number of cached converters.
    pub converter_cache_capacity: usize,
    /// Decimal separator used when rendering fields as text.
    pub decimal_separator: char,
    /// Character field decoding mode.
    pub char_conversion: CharConversion,
    /// Decode fractional Zoned/Packed values to exact decimals instead of floats.
    pub exact_decimals: bool,
    /// Treatment of even digit counts on Packed fields.
    pub even_packed_digits: EvenPackedDigits,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            job_ccsid: 37,
            byte_order: ByteOrder::Big,
            converter_cache_capacity: 30,
            decimal_separator: '.',
            char_conversion: CharConversion::Convert,
            exact_decimals: false,
            even_packed_digits: EvenPackedDigits::Reject,
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CodecError::Config {
            message: format!("cannot read {}: {}", path, e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| CodecError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the codec cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.converter_cache_capacity == 0 {
            return Err(CodecError::Config {
                message: "converter_cache_capacity must be at least 1".to_string(),
            });
        }
        let sep = self.decimal_separator;
        if !sep.is_ascii() || sep.is_ascii_digit() || sep.is_ascii_control() {
            return Err(CodecError::Config {
                message: format!("invalid decimal separator {:?}", sep),
            });
        }
        let job = u16::try_from(self.job_ccsid).ok();
        if job.and_then(|c| CodePageRegistry::from_ccsid(c).ok()).is_none() {
            return Err(CodecError::Config {
                message: format!("job CCSID {} is not a supported EBCDIC code page", self.job_ccsid),
            });
        }
        Ok(())
    }
}
