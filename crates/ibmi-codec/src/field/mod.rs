//! Record fields: descriptors, layouts and the field codec.
//!
//! A [`RecordLayout`] is an ordered list of [`FieldDescriptor`]s validated
//! against the record length. A [`FieldCodec`] reads and writes those
//! fields inside caller-owned record buffers, producing and consuming
//! [`Value`]s.
//!
//! ```
//! use ibmi_codec::{CodecConfig, FieldCodec, FieldDescriptor, RecordLayout, TranscoderRegistry, Value};
//!
//! let config = CodecConfig::default();
//! let registry = TranscoderRegistry::new(&config);
//! let codec = FieldCodec::new(&registry, config);
//!
//! let layout = RecordLayout::builder("ITEM", 13)
//!     .add_field(FieldDescriptor::packed("PRICE", 0, 5, 2))
//!     .add_field(FieldDescriptor::char("NAME", 3, 10, 37))
//!     .build()
//!     .unwrap();
//!
//! let mut record = vec![0u8; layout.record_length()];
//! codec.clear_record(&layout, &mut record).unwrap();
//! codec
//!     .encode_record(&layout, &mut record, &[("PRICE", Value::Float(19.99)), ("NAME", Value::from("WIDGET"))])
//!     .unwrap();
//!
//! let price = layout.field_by_name("PRICE").unwrap();
//! assert_eq!(codec.render_field_text(price, &record).unwrap(), "19.99");
//! ```

mod codec;
mod descriptor;
mod layout;
mod numeric;
mod value;
mod view;

pub use codec::FieldCodec;
pub use descriptor::{parse_default, FieldDescriptor, FieldType};
pub use layout::{RecordLayout, RecordLayoutBuilder};
pub use numeric::{decode_binary, decode_float, encode_binary, encode_float};
pub use value::Value;
pub use view::{FieldView, FieldViewMut};
