//! Derive macro for lossless-json records.
//!
//! `#[derive(Describe)]` generates:
//! - `impl Describe for {Name}`: the field descriptor table plus indexed
//!   getters and setters used by flatten and hydrate
//! - `impl LosslessRecord for {Name}` when one field is marked
//!   `#[lossless(state)]`
//! - `Serialize`/`Deserialize` impls routed through the record's document
//!   when the struct is marked `#[lossless(serde)]`
//!
//! # Usage
//!
//! ```ignore
//! use lossless_json::{Describe, Lossless};
//!
//! #[derive(Default, Describe)]
//! struct Person {
//!     #[lossless(rename = "fullName")]
//!     name: String,
//!     #[lossless(omit_empty)]
//!     age: i64,
//!     #[lossless(skip)]
//!     cache: Vec<u8>,
//!     #[lossless(state)]
//!     state: Lossless,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod parse;

/// Derive `Describe` (and `LosslessRecord`) for a struct with named fields.
///
/// # Attributes
///
/// ## Struct Attributes
///
/// - `#[lossless(serde)]`: Also implement `Serialize` and `Deserialize` by
///   delegating to `lossless_json::lossless::{serialize, deserialize}`.
///   Requires a state field; deserializing requires `Default`.
///
/// ## Field Attributes
///
/// - `#[lossless(rename = "json_name")]`: Use a different member name
/// - `#[lossless(skip)]`: Never write or read this field
/// - `#[lossless(omit_empty)]`: Delete the member instead of writing an empty
///   value
/// - `#[lossless(state)]`: The `Lossless` field holding the document
#[proc_macro_derive(Describe, attributes(lossless))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
