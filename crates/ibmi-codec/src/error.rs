//! Codec error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by the record-field codec.
///
/// Every variant is local to the call that produced it; the buffer-owning
/// caller decides how to surface it.
#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    /// A CCSID cannot be mapped to a known charset.
    #[error("unsupported encoding: CCSID {ccsid}")]
    #[diagnostic(code(codec::unsupported_encoding))]
    UnsupportedEncoding {
        /// The CCSID that failed to resolve.
        ccsid: u32,
    },

    /// A codec name is neither a known alias nor a CCSID of at most five digits.
    #[error("invalid codec name '{name}'")]
    #[diagnostic(
        code(codec::invalid_codec_name),
        help("use latin1, utf8, ucs2 or a numeric CCSID such as 37")
    )]
    InvalidCodecName {
        /// The rejected name.
        name: String,
    },

    /// A growable conversion made no forward progress in one iteration.
    #[error(
        "conversion from CCSID {from} to CCSID {to} stalled with {remaining} input bytes left \
         after {written} bytes of output"
    )]
    #[diagnostic(
        code(codec::conversion_stalled),
        help("the input is malformed for the source CCSID, or the converter is broken")
    )]
    ConversionStalled {
        /// Source CCSID.
        from: u32,
        /// Target CCSID.
        to: u32,
        /// Input bytes that could not be converted.
        remaining: usize,
        /// Output bytes produced before the stall.
        written: usize,
    },

    /// A Binary, Float or wide-character field has an unsupported byte length.
    #[error("unsupported width {width} for {field_type} field")]
    #[diagnostic(code(codec::unsupported_field_width))]
    UnsupportedFieldWidth {
        /// Field type name.
        field_type: &'static str,
        /// Byte length of the field.
        width: usize,
    },

    /// The value kind does not match the field kind.
    #[error("type mismatch for {field_type} field: expected {expected}, found {found}")]
    #[diagnostic(code(codec::type_mismatch))]
    TypeMismatch {
        /// Field type name.
        field_type: &'static str,
        /// What the field accepts.
        expected: &'static str,
        /// What was supplied.
        found: &'static str,
    },

    /// A field descriptor is inconsistent; detected when the layout is built.
    #[error("invalid layout for field '{field}': {reason}")]
    #[diagnostic(code(codec::field_layout_invalid))]
    FieldLayoutInvalid {
        /// Field name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The bytes of a field are structurally corrupt.
    #[error("invalid data in {field_type} field: {reason}")]
    #[diagnostic(code(codec::invalid_field_data))]
    InvalidFieldData {
        /// Field type name.
        field_type: &'static str,
        /// Description of the corruption.
        reason: String,
    },

    /// A numeric value does not fit in the target field.
    #[error("value {value} does not fit in {field_type} field ({capacity})")]
    #[diagnostic(code(codec::value_overflow))]
    ValueOverflow {
        /// Field type name.
        field_type: &'static str,
        /// Display form of the rejected value.
        value: String,
        /// Capacity description, e.g. "7 digits, 2 decimals".
        capacity: String,
    },

    /// No field with the given name exists in the layout.
    #[error("field '{name}' not found in record format {record}")]
    #[diagnostic(code(codec::field_not_found))]
    FieldNotFound {
        /// Record format name.
        record: String,
        /// Requested field name.
        name: String,
    },

    /// The caller's buffer is too short for the record or field window.
    #[error("buffer of {actual} bytes is shorter than the required {required} bytes")]
    #[diagnostic(code(codec::buffer_too_short))]
    BufferTooShort {
        /// Bytes required.
        required: usize,
        /// Bytes supplied.
        actual: usize,
    },

    /// The configuration could not be loaded or is invalid.
    #[error("configuration error: {message}")]
    #[diagnostic(code(codec::config))]
    Config {
        /// Description.
        message: String,
    },
}

impl CodecError {
    /// Shorthand for [`CodecError::InvalidFieldData`].
    pub(crate) fn invalid_data(field_type: &'static str, reason: impl Into<String>) -> Self {
        CodecError::InvalidFieldData {
            field_type,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`CodecError::FieldLayoutInvalid`].
    pub(crate) fn layout(field: &str, reason: impl Into<String>) -> Self {
        CodecError::FieldLayoutInvalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
