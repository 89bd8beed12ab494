//! Record layouts: ordered, validated field descriptors.

use std::collections::HashMap;

use tracing::debug;

use super::{parse_default, FieldDescriptor, FieldType, Value};
use crate::config::{CodecConfig, EvenPackedDigits};
use crate::decimal::{packed_len, MAX_DIGITS};
use crate::error::CodecError;
use crate::Result;

/// Immutable description of one record format.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    name: String,
    record_length: usize,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl RecordLayout {
    /// Start building a layout for records of `record_length` bytes.
    pub fn builder(name: impl Into<String>, record_length: usize) -> RecordLayoutBuilder {
        RecordLayoutBuilder {
            name: name.into(),
            record_length,
            fields: Vec::new(),
            even_packed_digits: EvenPackedDigits::default(),
        }
    }

    /// Start building a layout that takes its Packed digit policy from
    /// `config`.
    pub fn builder_with_config(
        name: impl Into<String>,
        record_length: usize,
        config: &CodecConfig,
    ) -> RecordLayoutBuilder {
        Self::builder(name, record_length).even_packed_digits(config.even_packed_digits)
    }

    /// Record format name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record length in bytes.
    pub fn record_length(&self) -> usize {
        self.record_length
    }

    /// Fields in declared order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Iterate over the fields in declared order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the layout has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> Option<&FieldDescriptor> {
        self.fields.get(index)
    }

    /// Position of the field called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Field called `name`.
    pub fn field_by_name(&self, name: &str) -> Result<&FieldDescriptor> {
        self.position(name)
            .map(|i| &self.fields[i])
            .ok_or_else(|| CodecError::FieldNotFound {
                record: self.name.clone(),
                name: name.to_string(),
            })
    }
}

impl<'a> IntoIterator for &'a RecordLayout {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Builder for [`RecordLayout`]; every descriptor is checked once in
/// [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RecordLayoutBuilder {
    name: String,
    record_length: usize,
    fields: Vec<FieldDescriptor>,
    even_packed_digits: EvenPackedDigits,
}

impl RecordLayoutBuilder {
    /// Append a field.
    pub fn add_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// How Packed fields with an even digit count are treated.
    pub fn even_packed_digits(mut self, policy: EvenPackedDigits) -> Self {
        self.even_packed_digits = policy;
        self
    }

    /// Validate all fields and build the layout.
    pub fn build(self) -> Result<RecordLayout> {
        let mut index = HashMap::with_capacity(self.fields.len());
        let mut fields = Vec::with_capacity(self.fields.len());
        for (i, mut field) in self.fields.into_iter().enumerate() {
            validate(&field, self.record_length, self.even_packed_digits)?;
            field.default = normalize_default(&field)?;
            if index.insert(field.name.clone(), i).is_some() {
                return Err(CodecError::layout(&field.name, "duplicate field name"));
            }
            fields.push(field);
        }
        debug!(
            record = %self.name,
            record_length = self.record_length,
            fields = fields.len(),
            "record layout built"
        );
        Ok(RecordLayout {
            name: self.name,
            record_length: self.record_length,
            fields,
            index,
        })
    }
}

fn validate(field: &FieldDescriptor, record_length: usize, even: EvenPackedDigits) -> Result<()> {
    let fail = |reason: String| Err(CodecError::layout(&field.name, reason));

    if field.name.is_empty() {
        return fail("field name is empty".to_string());
    }
    if field.length == 0 {
        return fail("length must be at least 1".to_string());
    }
    match field.offset.checked_add(field.length) {
        Some(end) if end <= record_length => {}
        _ => {
            return fail(format!(
                "bytes {}..{} fall outside the {}-byte record",
                field.offset,
                field.offset.saturating_add(field.length),
                record_length
            ))
        }
    }
    if field.dec > field.digits {
        return fail(format!(
            "{} decimal positions exceed {} digits",
            field.dec, field.digits
        ));
    }

    match field.field_type {
        FieldType::Zoned | FieldType::Packed => {
            if !(1..=MAX_DIGITS).contains(&field.digits) {
                return fail(format!("digits must be 1..={}, got {}", MAX_DIGITS, field.digits));
            }
            if field.field_type == FieldType::Packed
                && field.digits % 2 == 0
                && even == EvenPackedDigits::Reject
            {
                return fail(format!("packed field declares an even digit count {}", field.digits));
            }
            let expected = if field.field_type == FieldType::Packed {
                packed_len(field.digits)
            } else {
                field.digits
            };
            if field.length != expected {
                return fail(format!(
                    "{} digits need {} bytes, field has {}",
                    field.digits, expected, field.length
                ));
            }
        }
        FieldType::VarChar | FieldType::VarGraphic if field.length < 2 => {
            return fail("varying field needs room for its length prefix".to_string());
        }
        _ => {}
    }
    if field.field_type.is_graphic() && field.capacity() % 2 != 0 {
        return fail(format!("graphic data of {} bytes is not whole units", field.capacity()));
    }
    Ok(())
}

fn normalize_default(field: &FieldDescriptor) -> Result<Option<Value>> {
    match &field.default {
        Some(Value::Text(text)) if field.field_type.is_numeric() => {
            parse_default(field.field_type, field.dec, text)
                .map(Some)
                .ok_or_else(|| {
                    CodecError::layout(&field.name, format!("default '{}' is not numeric", text))
                })
        }
        other => Ok(other.clone()),
    }
}
