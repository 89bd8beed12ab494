//! Record-field codec for IBM i data.
//!
//! Converts between the raw bytes of fixed-layout records and native
//! values. Records arrive as byte buffers together with a description of
//! their fields; this crate reads and writes each field in place.
//!
//! # Features
//!
//! - **Decimal fields**: Zoned and Packed decimal of up to 31 digits, decoded
//!   to text, integers, floats or exact decimals
//! - **Numeric fields**: Binary integers of 2, 4 or 8 bytes and IEEE floats
//!   of 4 or 8 bytes in a configurable byte order
//! - **Character fields**: Char, VarChar, Graphic, VarGraphic, Date, Time and
//!   Timestamp data transcoded between CCSIDs, with blank trimming on read
//!   and padding on write
//! - **Transcoding**: a shared, bounded cache of converters plus named
//!   codecs (`latin1`, `utf8`, `ucs2` or a numeric CCSID)
//!
//! # Example
//!
//! ```rust
//! use ibmi_codec::decimal::{int_to_packed, packed_to_decimal_text};
//! use ibmi_codec::ebcdic::CP037;
//!
//! // EBCDIC conversion
//! let ebcdic = CP037.encode("HELLO");
//! assert_eq!(CP037.decode(&ebcdic), "HELLO");
//!
//! // Packed decimal
//! let mut field = [0u8; 3];
//! int_to_packed(-123, 5, 2, &mut field).unwrap();
//! assert_eq!(field, [0x12, 0x30, 0x0D]);
//! assert_eq!(packed_to_decimal_text(&field, 5, 2, '.').unwrap(), "-123.00");
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod decimal;
pub mod ebcdic;
pub mod error;
pub mod field;
pub mod transcode;

// Re-export commonly used types at crate root
pub use config::{ByteOrder, CharConversion, CodecConfig, EvenPackedDigits};
pub use decimal::{
    packed_to_decimal_text, packed_to_int, uses_integer_path, zoned_to_decimal_text, zoned_to_int,
    Sign,
};
pub use ebcdic::{CodePage, CodePageRegistry, CP037, CP1047, CP1140, CP1148, CP500};
pub use error::CodecError;
pub use field::{
    FieldCodec, FieldDescriptor, FieldType, FieldView, FieldViewMut, RecordLayout,
    RecordLayoutBuilder, Value,
};
pub use transcode::{ccsid, Codec, Converter, TranscoderRegistry};

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
