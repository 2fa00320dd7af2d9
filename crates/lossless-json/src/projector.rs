//! Projection between typed record fields and a [`Document`].
//!
//! A record exposes its fields through [`Describe`], normally generated by
//! `#[derive(Describe)]`. [`flatten`] pushes field values into a document
//! before it is serialized; [`hydrate`] pulls document members back into the
//! fields after a parse. Both read the same [`FieldDescriptor`] table, so
//! names and exclusions agree in both directions.

use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::Value;

use crate::coerce;
use crate::empty::is_empty;
use crate::error::{value_type_name, LosslessError, Result};
use crate::{Document, Options};

/// Serialization directives of one declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The Rust field identifier.
    pub ident: &'static str,
    /// Effective member name in the document.
    pub name: &'static str,
    /// Never written to or read from the document.
    pub skip: bool,
    /// Removed from the document, rather than written, when empty.
    pub omit_empty: bool,
    /// Holds a dynamic [`Value`], which is empty only when `null`.
    pub dynamic: bool,
}

impl FieldDescriptor {
    /// A plain field serialized under its identifier.
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            name: ident,
            skip: false,
            omit_empty: false,
            dynamic: false,
        }
    }

    pub const fn rename(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub const fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }

    pub const fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }
}

/// A captured field value, ready to be flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// An `omit_empty` field holding an empty value.
    Omitted,
    /// The field's value, serialized.
    Value(Value),
}

impl FieldValue {
    /// Capture `value` for `field`, checking emptiness only when the field
    /// asks for it. A dynamic field is empty only when it serializes to
    /// `null`.
    pub fn capture<T: Serialize + ?Sized>(field: &FieldDescriptor, value: &T) -> Result<Self> {
        if field.omit_empty && !field.dynamic && is_empty(value) {
            return Ok(FieldValue::Omitted);
        }
        let value =
            serde_json::to_value(value).map_err(|source| LosslessError::encode(field.name, source))?;
        if field.omit_empty && field.dynamic && value.is_null() {
            return Ok(FieldValue::Omitted);
        }
        Ok(FieldValue::Value(value))
    }
}

/// Field access for a typed record.
///
/// Indices refer to positions in [`Describe::fields`]. Implementations are
/// generated by `#[derive(Describe)]`; the hand-written form looks like:
///
/// ```
/// use lossless_json::{coerce_field, Describe, FieldDescriptor, FieldValue, Options, Result, Value};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Describe for Person {
///     fn fields() -> &'static [FieldDescriptor] {
///         const FIELDS: &[FieldDescriptor] = &[
///             FieldDescriptor::new("name"),
///             FieldDescriptor::new("age").omit_empty(),
///         ];
///         FIELDS
///     }
///
///     fn capture(&self, index: usize) -> Result<Option<FieldValue>> {
///         let fields = Self::fields();
///         match index {
///             0 => FieldValue::capture(&fields[0], &self.name).map(Some),
///             1 => FieldValue::capture(&fields[1], &self.age).map(Some),
///             _ => Ok(None),
///         }
///     }
///
///     fn assign(&mut self, index: usize, value: &Value, options: &Options) -> Result<()> {
///         let fields = Self::fields();
///         match index {
///             0 => self.name = coerce_field(&fields[0], value, options)?,
///             1 => self.age = coerce_field(&fields[1], value, options)?,
///             _ => {}
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Describe {
    /// Descriptors of every declared field, in declaration order.
    fn fields() -> &'static [FieldDescriptor]
    where
        Self: Sized;

    /// Read the field at `index`. `None` for skipped fields.
    fn capture(&self, index: usize) -> Result<Option<FieldValue>>;

    /// Overwrite the field at `index` from a document value. Never called
    /// for skipped fields.
    fn assign(&mut self, index: usize, value: &Value, options: &Options) -> Result<()>;
}

/// Decode a document value into a field's type, tagging errors with the
/// field's effective name.
pub fn coerce_field<T: DeserializeOwned>(
    field: &FieldDescriptor,
    value: &Value,
    options: &Options,
) -> Result<T> {
    coerce::from_value(value, options).map_err(|source| LosslessError::coerce(field.name, source))
}

/// Write the current field values of `source` into `document`.
///
/// Skipped fields are left alone. Empty `omit_empty` fields delete their
/// member; every other field overwrites it, keeping its position, or appends
/// it if the member is new.
pub fn flatten<R: Describe>(source: &R, document: &mut Document) -> Result<()> {
    for (index, field) in R::fields().iter().enumerate() {
        if field.skip {
            continue;
        }
        match source.capture(index)? {
            Some(FieldValue::Value(value)) => {
                document.set(field.name, value)?;
            }
            Some(FieldValue::Omitted) => {
                document.delete(field.name)?;
            }
            None => {}
        }
    }
    Ok(())
}

/// Populate the fields of `target` from `document`.
///
/// Only members matching a non-skipped field's name are read. Fields whose
/// member is absent or `null` keep their current value.
pub fn hydrate<R: Describe>(target: &mut R, document: &Document, options: &Options) -> Result<()> {
    if !document.is_object() {
        let source = coerce::CoerceError::custom(format!(
            "expected object, found {}",
            value_type_name(document.as_value())
        ));
        return Err(LosslessError::coerce(std::any::type_name::<R>(), source));
    }
    for (index, field) in R::fields().iter().enumerate() {
        if field.skip {
            continue;
        }
        let member = if options.case_insensitive {
            document.get_folded(field.name)?
        } else {
            document.get(field.name)?
        };
        if let Some(value) = member.filter(|value| !value.is_null()) {
            target.assign(index, value, options)?;
        }
    }
    Ok(())
}
