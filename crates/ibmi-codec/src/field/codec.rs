//! Field-level decode, encode and clear.

use tracing::warn;

use super::numeric::{decode_binary, decode_float, encode_binary, encode_float};
use super::{
    FieldDescriptor, FieldType, FieldView, FieldViewMut, RecordLayout, RecordLayoutBuilder, Value,
};
use crate::config::{ByteOrder, CharConversion, CodecConfig};
use crate::decimal::{
    self, clear_packed, clear_zoned, decimal_to_packed, decimal_to_zoned, float_to_packed,
    float_to_zoned, int_to_packed, int_to_zoned, packed_to_decimal_text, packed_to_int,
    zoned_to_decimal_text, zoned_to_int,
};
use crate::ebcdic::EBCDIC_SPACE;
use crate::error::CodecError;
use crate::transcode::{
    ccsid, convert_fixed, convert_growable, trim_ascii_blanks, trim_ebcdic_blanks,
    trim_wide_blanks, utf8_string, TranscoderRegistry,
};
use crate::Result;

/// Width of the length prefix of VarChar and VarGraphic fields.
const PREFIX_LEN: usize = 2;

/// Converts between field bytes and [`Value`]s.
///
/// Holds a borrowed [`TranscoderRegistry`] for character conversion. The
/// registry should be built from the same configuration.
#[derive(Debug)]
pub struct FieldCodec<'r> {
    registry: &'r TranscoderRegistry,
    config: CodecConfig,
}

impl<'r> FieldCodec<'r> {
    /// Create a codec over `registry`.
    pub fn new(registry: &'r TranscoderRegistry, config: CodecConfig) -> Self {
        if registry.byte_order() != config.byte_order || registry.job_ccsid() != config.job_ccsid {
            warn!(
                registry_job_ccsid = registry.job_ccsid(),
                job_ccsid = config.job_ccsid,
                registry_byte_order = ?registry.byte_order(),
                byte_order = ?config.byte_order,
                "transcoder registry and field codec were configured differently"
            );
        }
        Self { registry, config }
    }

    /// The codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Start a record layout governed by this codec's configuration.
    pub fn layout_builder(&self, name: impl Into<String>, record_length: usize) -> RecordLayoutBuilder {
        RecordLayout::builder_with_config(name, record_length, &self.config)
    }

    /// Decode the field described by `field` from a record buffer.
    pub fn decode_field(&self, field: &FieldDescriptor, record: &[u8]) -> Result<Value> {
        let bytes = FieldView::of(field, record)?.as_bytes();
        let mode = self.config.char_conversion;
        match field.field_type {
            FieldType::Binary => decode_binary(bytes, self.config.byte_order).map(Value::Int),
            FieldType::Float => decode_float(bytes, self.config.byte_order).map(Value::Float),
            FieldType::Zoned | FieldType::Packed => self.decode_decimal(field, bytes),
            FieldType::Char => self.char_value(field, bytes, true, mode),
            FieldType::VarChar => self.char_value(field, self.varying_body(field, bytes)?, true, mode),
            FieldType::Date | FieldType::Time | FieldType::Timestamp => {
                self.char_value(field, bytes, false, mode)
            }
            FieldType::Graphic => self.graphic_value(field, bytes, mode),
            FieldType::VarGraphic => {
                self.graphic_value(field, self.varying_body(field, bytes)?, mode)
            }
        }
    }

    /// Encode `value` into the field described by `field`.
    ///
    /// Character data longer than the field is truncated at the last whole
    /// character that fits; shorter data is padded.
    pub fn encode_field(&self, field: &FieldDescriptor, record: &mut [u8], value: &Value) -> Result<()> {
        let mut view = FieldViewMut::of(field, record)?;
        let out = view.as_bytes_mut();
        let order = self.config.byte_order;

        if value.is_null() {
            if field.allow_null {
                self.clear_field(field, out);
                return Ok(());
            }
            return Err(mismatch(field, "non-null value", value));
        }

        match field.field_type {
            FieldType::Binary => match value {
                Value::Int(v) => encode_binary(*v, order, out),
                other => Err(mismatch(field, "integer", other)),
            },
            FieldType::Float => match value.as_f64() {
                Some(v) => encode_float(v, order, out),
                None => Err(mismatch(field, "number", value)),
            },
            FieldType::Zoned | FieldType::Packed => self.encode_decimal(field, out, value),
            FieldType::Char | FieldType::Date | FieldType::Time | FieldType::Timestamp => {
                out.fill(self.char_pad(field));
                self.write_char(field, value, out).map(|_| ())
            }
            FieldType::VarChar => {
                let (prefix, body) = split_prefix(field, out)?;
                body.fill(0);
                let written = self.write_char(field, value, body)?;
                write_prefix(field, prefix, written, order)
            }
            FieldType::Graphic => {
                fill_wide_blanks(out, order);
                self.write_graphic(field, value, out).map(|_| ())
            }
            FieldType::VarGraphic => {
                let (prefix, body) = split_prefix(field, out)?;
                body.fill(0);
                let written = self.write_graphic(field, value, body)?;
                write_prefix(field, prefix, written, order)
            }
        }
    }

    /// Reset every field of a record to its zero value.
    ///
    /// Binary, Float, Date, Time, Timestamp and varying fields become
    /// `0x00`; Zoned becomes `0xF0`; Packed becomes zero with sign `0xF`;
    /// Char becomes blanks (`0x20` for UTF-8, else `0x40`); Graphic becomes
    /// `0x0020` units.
    pub fn clear_record(&self, layout: &RecordLayout, record: &mut [u8]) -> Result<()> {
        check_record(layout, record.len())?;
        for field in layout {
            let mut view = FieldViewMut::of(field, record)?;
            self.clear_field(field, view.as_bytes_mut());
        }
        Ok(())
    }

    /// Decode every field of a record, in declared order.
    pub fn decode_record(&self, layout: &RecordLayout, record: &[u8]) -> Result<Vec<(String, Value)>> {
        check_record(layout, record.len())?;
        layout
            .iter()
            .map(|field| Ok((field.name.clone(), self.decode_field(field, record)?)))
            .collect()
    }

    /// Encode named values into a record. Fields not named are left alone.
    pub fn encode_record(
        &self,
        layout: &RecordLayout,
        record: &mut [u8],
        values: &[(&str, Value)],
    ) -> Result<()> {
        check_record(layout, record.len())?;
        for (name, value) in values {
            let field = layout.field_by_name(name)?;
            self.encode_field(field, record, value)?;
        }
        Ok(())
    }

    /// Render a field as display text.
    ///
    /// Integers print in decimal, floats with six fractional digits, Zoned
    /// and Packed through the decimal text decoder. Both use the configured
    /// decimal separator. Character fields are trimmed and converted to
    /// UTF-8 whatever the `char_conversion` setting; unconvertible bytes
    /// print as hex.
    pub fn render_field_text(&self, field: &FieldDescriptor, record: &[u8]) -> Result<String> {
        let bytes = FieldView::of(field, record)?.as_bytes();
        let sep = self.config.decimal_separator;
        let order = self.config.byte_order;
        let convert = CharConversion::Convert;
        let value = match field.field_type {
            FieldType::Binary => return Ok(decode_binary(bytes, order)?.to_string()),
            FieldType::Float => {
                let text = format!("{:.6}", decode_float(bytes, order)?);
                return Ok(text.replacen('.', &sep.to_string(), 1));
            }
            FieldType::Zoned => return zoned_to_decimal_text(bytes, field.digits, field.dec, sep),
            FieldType::Packed => return packed_to_decimal_text(bytes, field.digits, field.dec, sep),
            FieldType::Char | FieldType::Date | FieldType::Time | FieldType::Timestamp => {
                self.char_value(field, bytes, true, convert)?
            }
            FieldType::VarChar => {
                self.char_value(field, self.varying_body(field, bytes)?, true, convert)?
            }
            FieldType::Graphic => self.graphic_value(field, bytes, convert)?,
            FieldType::VarGraphic => {
                self.graphic_value(field, self.varying_body(field, bytes)?, convert)?
            }
        };
        Ok(value.to_string())
    }

    fn effective_ccsid(&self, field: &FieldDescriptor) -> u32 {
        if field.ccsid == ccsid::JOB_DEFAULT {
            self.config.job_ccsid
        } else {
            field.ccsid
        }
    }

    fn char_pad(&self, field: &FieldDescriptor) -> u8 {
        if self.effective_ccsid(field) == ccsid::UTF8 {
            b' '
        } else {
            EBCDIC_SPACE
        }
    }

    fn clear_field(&self, field: &FieldDescriptor, out: &mut [u8]) {
        match field.field_type {
            FieldType::Zoned => clear_zoned(out),
            FieldType::Packed => clear_packed(out),
            FieldType::Char => out.fill(self.char_pad(field)),
            FieldType::Graphic => fill_wide_blanks(out, self.config.byte_order),
            FieldType::Binary
            | FieldType::Float
            | FieldType::Date
            | FieldType::Time
            | FieldType::Timestamp
            | FieldType::VarChar
            | FieldType::VarGraphic => out.fill(0x00),
        }
    }

    fn varying_body<'b>(&self, field: &FieldDescriptor, bytes: &'b [u8]) -> Result<&'b [u8]> {
        let name = field.field_type.name();
        if bytes.len() < PREFIX_LEN {
            return Err(short_prefix(field));
        }
        let declared = usize::from(self.config.byte_order.read_u16([bytes[0], bytes[1]]));
        let body = &bytes[PREFIX_LEN..];
        body.get(..declared).ok_or_else(|| {
            CodecError::invalid_data(
                name,
                format!("length prefix {} exceeds capacity {}", declared, body.len()),
            )
        })
    }

    fn decode_decimal(&self, field: &FieldDescriptor, bytes: &[u8]) -> Result<Value> {
        let (digits, dec) = (field.digits, field.dec);
        let packed = field.field_type == FieldType::Packed;
        if dec == 0 && digits < 10 {
            let value = if packed {
                packed_to_int(bytes, digits)?
            } else {
                zoned_to_int(bytes, digits)?
            };
            return Ok(Value::Int(value));
        }

        let unpacked = if packed {
            decimal::unpack(bytes, digits)?
        } else {
            decimal::unzone(bytes, digits)?
        };
        if dec == 0 {
            if let Some(v) = unpacked.to_i64() {
                return Ok(Value::Int(v));
            }
        }
        if dec == 0 || self.config.exact_decimals {
            if let Some(d) = unpacked.to_decimal(dec) {
                return Ok(Value::Decimal(d));
            }
        }
        Ok(Value::Float(unpacked.to_f64(dec)))
    }

    fn encode_decimal(&self, field: &FieldDescriptor, out: &mut [u8], value: &Value) -> Result<()> {
        let (digits, dec) = (field.digits, field.dec);
        let packed = field.field_type == FieldType::Packed;
        match value {
            Value::Int(v) if packed => int_to_packed(*v, digits, dec, out),
            Value::Int(v) => int_to_zoned(*v, digits, dec, out),
            Value::Float(v) if packed => float_to_packed(*v, digits, dec, out),
            Value::Float(v) => float_to_zoned(*v, digits, dec, out),
            Value::Decimal(d) if packed => decimal_to_packed(d, digits, dec, out),
            Value::Decimal(d) => decimal_to_zoned(d, digits, dec, out),
            other => Err(mismatch(field, "number", other)),
        }
    }

    fn char_value(
        &self,
        field: &FieldDescriptor,
        bytes: &[u8],
        trim: bool,
        mode: CharConversion,
    ) -> Result<Value> {
        if mode == CharConversion::Raw {
            return Ok(Value::Bytes(bytes.to_vec()));
        }
        match self.effective_ccsid(field) {
            ccsid::RAW => Ok(Value::Bytes(bytes.to_vec())),
            ccsid::UTF8 => {
                let body = if trim { trim_ascii_blanks(bytes) } else { bytes };
                utf8_string(body.to_vec()).map(Value::Text)
            }
            from => {
                let body = if trim { trim_ebcdic_blanks(bytes) } else { bytes };
                let conv = self.registry.get_converter(from, ccsid::UTF8)?;
                utf8_string(convert_growable(conv.as_ref(), body)?).map(Value::Text)
            }
        }
    }

    fn graphic_value(&self, field: &FieldDescriptor, bytes: &[u8], mode: CharConversion) -> Result<Value> {
        match self.effective_ccsid(field) {
            from @ (ccsid::UTF16 | ccsid::UCS2) if mode == CharConversion::Convert => {
                let body = trim_wide_blanks(bytes, self.config.byte_order);
                let conv = self.registry.get_converter(from, ccsid::UTF8)?;
                utf8_string(convert_growable(conv.as_ref(), body)?).map(Value::Text)
            }
            _ => Ok(Value::Bytes(bytes.to_vec())),
        }
    }

    /// Write character data into `out`, returning the bytes written.
    fn write_char(&self, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<usize> {
        match (value, self.effective_ccsid(field)) {
            (Value::Bytes(raw), _) => Ok(copy_prefix(raw, out, 1)),
            (Value::Text(text), ccsid::RAW) => Ok(copy_prefix(text.as_bytes(), out, 1)),
            (Value::Text(text), to) => {
                let conv = self.registry.get_converter(ccsid::UTF8, to)?;
                Ok(convert_fixed(conv.as_ref(), text.as_bytes(), out))
            }
            (other, _) => Err(mismatch(field, "text", other)),
        }
    }

    /// Write double-byte data into `out`, returning the bytes written.
    fn write_graphic(&self, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<usize> {
        match (value, self.effective_ccsid(field)) {
            (Value::Bytes(raw), _) => Ok(copy_prefix(raw, out, 2)),
            (Value::Text(text), to @ (ccsid::UTF16 | ccsid::UCS2)) => {
                let conv = self.registry.get_converter(ccsid::UTF8, to)?;
                Ok(convert_fixed(conv.as_ref(), text.as_bytes(), out))
            }
            (Value::Text(_), other) => Err(CodecError::UnsupportedEncoding { ccsid: other }),
            (other, _) => Err(mismatch(field, "text", other)),
        }
    }
}

fn mismatch(field: &FieldDescriptor, expected: &'static str, found: &Value) -> CodecError {
    CodecError::TypeMismatch {
        field_type: field.field_type.name(),
        expected,
        found: found.kind(),
    }
}

fn check_record(layout: &RecordLayout, actual: usize) -> Result<()> {
    if actual < layout.record_length() {
        return Err(CodecError::BufferTooShort {
            required: layout.record_length(),
            actual,
        });
    }
    Ok(())
}

/// Copy as many whole `unit`-byte pieces of `src` as fit into `out`.
fn copy_prefix(src: &[u8], out: &mut [u8], unit: usize) -> usize {
    let n = src.len().min(out.len());
    let n = n - n % unit;
    out[..n].copy_from_slice(&src[..n]);
    n
}

fn short_prefix(field: &FieldDescriptor) -> CodecError {
    CodecError::invalid_data(field.field_type.name(), "field is shorter than its length prefix")
}

/// Split a varying field into its length prefix and body.
fn split_prefix<'b>(field: &FieldDescriptor, out: &'b mut [u8]) -> Result<(&'b mut [u8], &'b mut [u8])> {
    if out.len() < PREFIX_LEN {
        return Err(short_prefix(field));
    }
    Ok(out.split_at_mut(PREFIX_LEN))
}

fn fill_wide_blanks(out: &mut [u8], order: ByteOrder) {
    let blank = order.u16_bytes(0x0020);
    for unit in out.chunks_exact_mut(2) {
        unit.copy_from_slice(&blank);
    }
}

fn write_prefix(field: &FieldDescriptor, prefix: &mut [u8], written: usize, order: ByteOrder) -> Result<()> {
    let len = u16::try_from(written).map_err(|_| CodecError::ValueOverflow {
        field_type: field.field_type.name(),
        value: format!("{} bytes", written),
        capacity: "16-bit length prefix".to_string(),
    })?;
    prefix.copy_from_slice(&order.u16_bytes(len));
    Ok(())
}
