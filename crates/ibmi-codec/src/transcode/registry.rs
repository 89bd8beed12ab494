//! Converter cache keyed by `(from, to)` CCSID pairs.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace, warn};

use super::{
    ccsid, convert_fixed, convert_growable, trim_ebcdic_blanks, utf8_string, Charset,
    CharsetConverter, Converter,
};
use crate::config::{ByteOrder, CodecConfig};
use crate::ebcdic::EBCDIC_SPACE;
use crate::Result;

type CacheEntry = ((u32, u32), Arc<dyn Converter>);

/// Hands out converters, caching up to a configured number of them.
///
/// The cache is append-only: entries live as long as the registry. Once it
/// holds `converter_cache_capacity` entries, further pairs get a fresh
/// uncached converter on every call.
#[derive(Debug)]
pub struct TranscoderRegistry {
    job_ccsid: u32,
    byte_order: ByteOrder,
    capacity: usize,
    cache: Mutex<Vec<CacheEntry>>,
}

impl TranscoderRegistry {
    /// Create an empty registry.
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            job_ccsid: config.job_ccsid,
            byte_order: config.byte_order,
            capacity: config.converter_cache_capacity,
            cache: Mutex::new(Vec::new()),
        }
    }

    /// CCSID substituted for CCSID 0.
    pub fn job_ccsid(&self) -> u32 {
        self.job_ccsid
    }

    /// Byte order used for UTF-16 and UCS-2 data.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Resolve a CCSID with this registry's job CCSID and byte order.
    pub fn resolve(&self, ccsid: u32) -> Result<Charset> {
        Charset::resolve(ccsid, self.job_ccsid, self.byte_order)
    }

    /// Get a converter from `from` to `to`.
    ///
    /// Fails with `UnsupportedEncoding` when either CCSID cannot be resolved.
    pub fn get_converter(&self, from: u32, to: u32) -> Result<Arc<dyn Converter>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, conv)) = cache.iter().find(|(key, _)| *key == (from, to)) {
            trace!(from, to, "converter cache hit");
            return Ok(Arc::clone(conv));
        }

        let conv: Arc<dyn Converter> =
            Arc::new(CharsetConverter::new(self.resolve(from)?, self.resolve(to)?));
        if cache.len() < self.capacity {
            cache.push(((from, to), Arc::clone(&conv)));
            debug!(from, to, cached = cache.len(), "converter cached");
        } else {
            warn!(
                from,
                to,
                capacity = self.capacity,
                "converter cache full, using uncached converter"
            );
        }
        Ok(conv)
    }

    /// Number of cached converters.
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Decode blank-padded EBCDIC text to UTF-8, dropping trailing `0x40` bytes.
pub fn ebcdic_to_utf8(registry: &TranscoderRegistry, bytes: &[u8], from: u32) -> Result<String> {
    let conv = registry.get_converter(from, ccsid::UTF8)?;
    utf8_string(convert_growable(conv.as_ref(), trim_ebcdic_blanks(bytes))?)
}

/// Encode UTF-8 text into `width` bytes of EBCDIC, truncating or padding
/// with `0x40`.
pub fn utf8_to_ebcdic_padded(
    registry: &TranscoderRegistry,
    text: &str,
    to: u32,
    width: usize,
) -> Result<Vec<u8>> {
    let conv = registry.get_converter(ccsid::UTF8, to)?;
    let mut out = vec![EBCDIC_SPACE; width];
    convert_fixed(conv.as_ref(), text.as_bytes(), &mut out);
    Ok(out)
}

/// Convert blank-padded EBCDIC text to UCS-2 in the registry's byte order.
pub fn ebcdic_to_utf16(registry: &TranscoderRegistry, bytes: &[u8], from: u32) -> Result<Vec<u8>> {
    let conv = registry.get_converter(from, ccsid::UCS2)?;
    convert_growable(conv.as_ref(), trim_ebcdic_blanks(bytes))
}

/// Convert UCS-2 text into `width` bytes of EBCDIC, truncating or padding
/// with `0x40`.
pub fn utf16_to_ebcdic_padded(
    registry: &TranscoderRegistry,
    units: &[u8],
    to: u32,
    width: usize,
) -> Result<Vec<u8>> {
    let conv = registry.get_converter(ccsid::UCS2, to)?;
    let mut out = vec![EBCDIC_SPACE; width];
    convert_fixed(conv.as_ref(), units, &mut out);
    Ok(out)
}
