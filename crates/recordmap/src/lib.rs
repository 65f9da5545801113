//! # recordmap
//!
//! Decode dynamically typed JSON objects into Rust structs through compiled, cached decoders.
//!
//! A record declares its fields once, usually with `#[derive(Record)]`. The first time a
//! [`RecordMapper`] sees a record type it compiles a decoder for it: each field is matched with a
//! coercion (`String` from a JSON string, `i32`/`i64` from a JSON number, nested records from a
//! JSON object). The decoder is memoized per type and reused for every later call.
//!
//! ```rust
//! use recordmap::{Record, RecordMapper};
//! use serde_json::json;
//!
//! #[derive(Debug, Record)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! #[derive(Debug, Record)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     address: Address,
//! }
//!
//! let mapper = RecordMapper::of(recordmap::lookup!());
//! let value = json!({
//!     "name": "Bob",
//!     "age": 25,
//!     "address": {"street": "123 Main St", "city": "Anytown"}
//! });
//! let person: Person = mapper.from_value(&value)?;
//! assert_eq!(person.address.street, "123 Main St");
//! # Ok::<(), recordmap::Error>(())
//! ```
//!
//! Every declared field is mandatory; keys a record does not declare are ignored.
//!
//! ## Errors
//!
//! Value-level errors ([`ErrorKind::MissingField`], [`ErrorKind::TypeMismatch`],
//! [`ErrorKind::NumericOverflow`]) describe one input object. [`RecordMapper::try_match`] turns
//! them into `None`. Structural errors ([`ErrorKind::UnsupportedFieldType`],
//! [`ErrorKind::ConstructorAccess`], [`ErrorKind::RecursiveType`]) describe the record itself and
//! are always returned; decoders that fail to compile are never cached, so the same error is
//! reported on every attempt.
//!
//! ## Access
//!
//! A mapper constructs records through a [`Lookup`], created with [`lookup!`] in the calling
//! module. Records that are not `pub` can only be decoded by mappers whose lookup comes from a
//! module that can see them.
extern crate self as recordmap;

mod access;
mod cache;
mod coercion;
mod compiler;
mod error;
mod mapper;
mod options;
mod shape;

pub use access::Lookup;
pub use error::{Error, ErrorKind, Location};
pub use mapper::{RecordMapper, TypedDecoder};
pub use options::MapperOptions;
#[cfg(feature = "derive")]
pub use recordmap_derive::Record;
pub use shape::{
    Field, FieldDescriptor, FieldType, Fields, NativeValue, Record, Shape, Target, Visibility,
};

/// Create a default [`MapperOptions`] builder.
///
/// ```rust
/// let mapper = recordmap::options()
///     .with_integral_floats(true)
///     .build(recordmap::lookup!());
/// ```
#[must_use]
pub fn options() -> MapperOptions {
    MapperOptions::default()
}
