//! Lossless JSON round-tripping for typed records.
//!
//! A record decoded through this crate keeps every member of its input
//! object, including the ones no field claims, and writes them back out on
//! encode. Fields are projected into the retained [`Document`] right before
//! serialization, so unknown members, key order and number text survive.
//!
//! ```
//! use lossless_json::{Describe, Lossless, LosslessRecord};
//!
//! #[derive(Debug, Default, Describe)]
//! struct Person {
//!     name: String,
//!     #[lossless(omit_empty)]
//!     age: i64,
//!     #[lossless(state)]
//!     state: Lossless,
//! }
//!
//! let mut person = Person::decode(br#"{"name":"Jack Doe","age":"42","Extra":{"foo":"bar"}}"#).unwrap();
//! person.name = "Jack".into();
//! person.age += 1;
//! person.set("note", "hi").unwrap();
//!
//! assert_eq!(
//!     person.encode().unwrap(),
//!     br#"{"name":"Jack","age":43,"Extra":{"foo":"bar"},"note":"hi"}"#
//! );
//! ```

extern crate self as lossless_json;

pub mod coerce;
pub mod document;
pub mod empty;
pub mod error;
pub mod lossless;
pub mod options;
pub mod path;
pub mod projector;

pub use document::Document;
pub use error::{LosslessError, Result, UsageError};
pub use lossless::{Lossless, LosslessRecord};
pub use options::Options;
pub use path::KeyPath;
pub use projector::{coerce_field, Describe, FieldDescriptor, FieldValue};
pub use serde_json::Value;

/// Derives [`Describe`] and, for structs with a `#[lossless(state)]` field,
/// [`LosslessRecord`].
///
/// Field directives: `rename = "name"`, `skip`, `omit_empty`, `state`.
/// Struct directive: `serde`, which also emits `Serialize` and `Deserialize`
/// impls that route through the record's document.
pub use lossless_json_derive::Describe;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
