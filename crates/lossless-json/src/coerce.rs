//! Lenient conversion of document values into typed values.
//!
//! [`from_value`] decodes a `serde_json::Value` into any `DeserializeOwned`
//! type. With [`Options::weakly_typed`] off it is plain serde_json. With it
//! on, the value goes through [`WeakDeserializer`], which accepts the
//! conversions below on top of the exact ones:
//!
//! | target   | accepted                                                      |
//! |----------|---------------------------------------------------------------|
//! | bool     | numbers (non-zero is true), `1 0 t f T F true false`, `""` |
//! | integer  | bools, floats (truncated), `""`, text in decimal or with a    |
//! |          | `0x`/`0o`/`0b`/leading-`0` radix prefix and `_` separators    |
//! | float    | bools, numeric text, `""`                                     |
//! | string   | numbers as their text, bools as `"1"`/`"0"`                   |
//! | sequence | a single value (wrapped), `{}`                                |
//! | map      | `[]`, an array of objects (merged, later keys win)            |
//! | any      | `null` gives the zero value of scalars and empty containers   |
//!
//! Conversions apply recursively to sequence elements, map values and
//! struct fields.

use std::borrow::Cow;
use std::{fmt, iter};

use serde::de::{
    self, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, Expected, IntoDeserializer,
    MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};
use serde::de::value::StrDeserializer;
use serde::forward_to_deserialize_any;
use serde_json::Value;
use thiserror::Error;

use crate::Options;

/// A value could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CoerceError(String);

impl CoerceError {
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl de::Error for CoerceError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CoerceError(msg.to_string())
    }
}

impl From<serde_json::Error> for CoerceError {
    fn from(err: serde_json::Error) -> Self {
        CoerceError(err.to_string())
    }
}

/// Decode `value` into `T` according to `options`.
///
/// ```
/// use lossless_json::{coerce::from_value, Options};
/// use serde_json::json;
///
/// let n: i32 = from_value(&json!("42"), &Options::default()).unwrap();
/// assert_eq!(n, 42);
/// assert!(from_value::<i32>(&json!("42"), &Options::strict()).is_err());
/// ```
pub fn from_value<T: DeserializeOwned>(value: &Value, options: &Options) -> Result<T, CoerceError> {
    if options.weakly_typed {
        T::deserialize(WeakDeserializer::new(value))
    } else {
        T::deserialize(value).map_err(CoerceError::from)
    }
}

/// Weakly typed deserializer over a borrowed value.
#[derive(Clone, Copy)]
pub struct WeakDeserializer<'de> {
    value: &'de Value,
}

impl<'de> WeakDeserializer<'de> {
    pub fn new(value: &'de Value) -> Self {
        Self { value }
    }

    fn invalid_type(&self, exp: &dyn Expected) -> CoerceError {
        de::Error::invalid_type(unexpected(self.value), exp)
    }

    fn deserialize_integer<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else if let Ok(i) = n.to_string().parse::<i128>() {
                    visitor.visit_i128(i)
                } else if let Ok(u) = n.to_string().parse::<u128>() {
                    visitor.visit_u128(u)
                } else {
                    match n.as_f64() {
                        Some(f) if f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                            visitor.visit_i64(f.trunc() as i64)
                        }
                        _ => Err(de::Error::invalid_value(
                            Unexpected::Other("out of range number"),
                            &visitor,
                        )),
                    }
                }
            }
            Value::Bool(b) => visitor.visit_u64(u64::from(*b)),
            Value::Null => visitor.visit_u64(0),
            Value::String(s) if s.is_empty() => visitor.visit_u64(0),
            Value::String(s) => match parse_integer_text(s) {
                Some(ParsedInt::Signed(i)) => visitor.visit_i64(i),
                Some(ParsedInt::Unsigned(u)) => visitor.visit_u64(u),
                None => Err(de::Error::invalid_value(Unexpected::Str(s), &visitor)),
            },
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_float<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Number(n) => match n.as_f64() {
                Some(f) => visitor.visit_f64(f),
                None => Err(de::Error::invalid_value(
                    Unexpected::Other("out of range number"),
                    &visitor,
                )),
            },
            Value::Bool(b) => visitor.visit_f64(if *b { 1.0 } else { 0.0 }),
            Value::Null => visitor.visit_f64(0.0),
            Value::String(s) if s.is_empty() => visitor.visit_f64(0.0),
            Value::String(s) => match s.parse::<f64>() {
                Ok(f) => visitor.visit_f64(f),
                Err(_) => Err(de::Error::invalid_value(Unexpected::Str(s), &visitor)),
            },
            _ => Err(self.invalid_type(&visitor)),
        }
    }
}

enum ParsedInt {
    Signed(i64),
    Unsigned(u64),
}

/// Integer text with an optional sign and a radix taken from the prefix:
/// `0x`, `0o`, `0b`, or a bare leading `0` for octal. `_` may separate
/// digits.
fn parse_integer_text(text: &str) -> Option<ParsedInt> {
    let (negative, rest) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, prefixed, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, true, &rest[2..]),
        Some("0o" | "0O") => (8, true, &rest[2..]),
        Some("0b" | "0B") => (2, true, &rest[2..]),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, true, &rest[1..]),
        _ => (10, false, rest),
    };
    let digits = strip_separators(digits, prefixed)?;
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = u64::from_str_radix(&digits, radix).ok()?;
    if !negative {
        return Some(ParsedInt::Unsigned(magnitude));
    }
    if magnitude <= i64::MAX as u64 + 1 {
        Some(ParsedInt::Signed((magnitude as i64).wrapping_neg()))
    } else {
        None
    }
}

/// Drops `_` separators. Each must sit between two digits, except that one
/// may directly follow a radix prefix.
fn strip_separators(digits: &str, prefixed: bool) -> Option<Cow<'_, str>> {
    if !digits.contains('_') {
        return Some(Cow::Borrowed(digits));
    }
    let body = match digits.strip_prefix('_') {
        Some(body) if prefixed => body,
        _ => digits,
    };
    if body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    Some(Cow::Owned(body.replace('_', "")))
}

/// Members of every object in `items`, in order. A repeated key takes the
/// later value and keeps its first position.
fn merge_objects(items: &[Value]) -> Vec<(&String, &Value)> {
    let mut merged: Vec<(&String, &Value)> = Vec::new();
    for (key, value) in items.iter().filter_map(Value::as_object).flatten() {
        match merged.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

/// Accepted boolean spellings.
fn parse_bool_text(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => Unexpected::Float(f),
            None => Unexpected::Other("number"),
        },
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

macro_rules! forward_integer {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
            self.deserialize_integer(visitor)
        }
    )*};
}

impl<'de> Deserializer<'de> for WeakDeserializer<'de> {
    type Error = CoerceError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(WeakSeq::new(items)),
            Value::Object(map) => visitor.visit_map(WeakMap::new(map.iter())),
            // serde_json's own impl keeps arbitrary-precision numbers intact.
            scalar => scalar.deserialize_any(visitor).map_err(CoerceError::from),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Null => visitor.visit_bool(false),
            Value::Number(n) => visitor.visit_bool(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) if s.is_empty() => visitor.visit_bool(false),
            Value::String(s) => match parse_bool_text(s) {
                Some(b) => visitor.visit_bool(b),
                None => Err(de::Error::invalid_value(Unexpected::Str(s), &visitor)),
            },
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    forward_integer! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_float(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_float(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Number(n) => visitor.visit_string(n.to_string()),
            Value::Bool(b) => visitor.visit_borrowed_str(if *b { "1" } else { "0" }),
            Value::Null => visitor.visit_borrowed_str(""),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            _ => self.deserialize_seq(visitor),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(WeakSeq::new(items)),
            Value::Null => visitor.visit_seq(WeakSeq::new(&[])),
            Value::Object(map) if map.is_empty() => visitor.visit_seq(WeakSeq::new(&[])),
            Value::Object(_) => Err(self.invalid_type(&visitor)),
            single => visitor.visit_seq(WeakSeq::new(std::slice::from_ref(single))),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Object(map) => visitor.visit_map(WeakMap::new(map.iter())),
            Value::Null => visitor.visit_map(WeakMap::new(iter::empty())),
            Value::Array(items) if items.iter().all(Value::is_object) => {
                visitor.visit_map(WeakMap::new(merge_objects(items).into_iter()))
            }
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::Array(items) => visitor.visit_seq(WeakSeq::new(items)),
            _ => self.deserialize_map(visitor),
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        match self.value {
            Value::String(variant) => {
                let unit: StrDeserializer<'_, CoerceError> = variant.as_str().into_deserializer();
                visitor.visit_enum(unit)
            }
            Value::Object(map) if map.len() == 1 => {
                let (variant, value) = map.iter().next().ok_or_else(|| {
                    <CoerceError as de::Error>::custom("enum object has no variant")
                })?;
                visitor.visit_enum(WeakEnum { variant, value })
            }
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        visitor.visit_unit()
    }
}

struct WeakSeq<'de> {
    iter: std::slice::Iter<'de, Value>,
}

impl<'de> WeakSeq<'de> {
    fn new(items: &'de [Value]) -> Self {
        Self { iter: items.iter() }
    }
}

impl<'de> SeqAccess<'de> for WeakSeq<'de> {
    type Error = CoerceError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, CoerceError> {
        match self.iter.next() {
            Some(value) => seed.deserialize(WeakDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct WeakMap<'de, I> {
    iter: I,
    value: Option<&'de Value>,
}

impl<'de, I> WeakMap<'de, I> {
    fn new(iter: I) -> Self {
        Self { iter, value: None }
    }
}

impl<'de, I> MapAccess<'de> for WeakMap<'de, I>
where
    I: Iterator<Item = (&'de String, &'de Value)>,
{
    type Error = CoerceError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, CoerceError> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.value = Some(value);
        seed.deserialize(KeyDeserializer { key }).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, CoerceError> {
        match self.value.take() {
            Some(value) => seed.deserialize(WeakDeserializer::new(value)),
            None => Err(de::Error::custom("value requested before key")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower),
            _ => None,
        }
    }
}

/// Object keys are always text; numeric and boolean map keys parse it.
struct KeyDeserializer<'de> {
    key: &'de str,
}

macro_rules! parse_key {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
            match self.key.parse::<$ty>() {
                Ok(v) => visitor.$visit(v),
                Err(_) => Err(de::Error::invalid_value(Unexpected::Str(self.key), &visitor)),
            }
        }
    )*};
}

impl<'de> Deserializer<'de> for KeyDeserializer<'de> {
    type Error = CoerceError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        visitor.visit_borrowed_str(self.key)
    }

    parse_key! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, CoerceError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        let unit: StrDeserializer<'_, CoerceError> = self.key.into_deserializer();
        visitor.visit_enum(unit)
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct WeakEnum<'de> {
    variant: &'de str,
    value: &'de Value,
}

impl<'de> EnumAccess<'de> for WeakEnum<'de> {
    type Error = CoerceError;
    type Variant = WeakDeserializer<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), CoerceError> {
        let variant = seed.deserialize(KeyDeserializer { key: self.variant })?;
        Ok((variant, WeakDeserializer::new(self.value)))
    }
}

impl<'de> VariantAccess<'de> for WeakDeserializer<'de> {
    type Error = CoerceError;

    fn unit_variant(self) -> Result<(), CoerceError> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(de::Error::invalid_type(unexpected(other), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, CoerceError> {
        seed.deserialize(self)
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        self.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, CoerceError> {
        self.deserialize_map(visitor)
    }
}
