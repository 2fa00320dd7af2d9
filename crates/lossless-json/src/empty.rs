//! Structural emptiness of serializable values.
//!
//! A value is empty when its top-level shape is a zero value: a zero-length
//! string, byte string, sequence or map, `false`, numeric zero, `'\0'`,
//! `None` or `()`. Structs, enum variants and `Some(_)` are never empty,
//! whatever they contain. Newtype structs are empty when their inner value
//! is. There is no user-defined emptiness hook.
//!
//! A field typed as a dynamic `serde_json::Value` does not use this check.
//! Its descriptor is marked dynamic and it counts as empty only when `null`,
//! so `""`, `false`, `[]` and `{}` held in a `Value` are still written.
//!
//! The check runs the value's own `Serialize` impl against a serializer
//! that only records the top-level shape, so it works for any field type
//! without reflection.

use std::fmt;

use serde::ser::{self, Serialize};

/// Returns true if `value` is structurally empty.
///
/// ```
/// use lossless_json::empty::is_empty;
///
/// assert!(is_empty(""));
/// assert!(is_empty(&0u8));
/// assert!(is_empty(&Vec::<String>::new()));
/// assert!(is_empty(&None::<u32>));
/// assert!(!is_empty(&Some(0u32)));
/// ```
pub fn is_empty<T: Serialize + ?Sized>(value: &T) -> bool {
    value.serialize(Shape).unwrap_or(false)
}

#[derive(Debug)]
struct ShapeError(String);

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ShapeError {}

impl ser::Error for ShapeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        ShapeError(msg.to_string())
    }
}

struct Shape;

/// Counts elements of sequences and maps without looking at them.
struct Count(usize);

/// Swallows the members of structs and variants, which are never empty.
struct Opaque;

macro_rules! shape_zero {
    ($($method:ident: $ty:ty => $zero:expr),* $(,)?) => {$(
        fn $method(self, v: $ty) -> Result<bool, ShapeError> {
            Ok(v == $zero)
        }
    )*};
}

impl ser::Serializer for Shape {
    type Ok = bool;
    type Error = ShapeError;
    type SerializeSeq = Count;
    type SerializeTuple = Count;
    type SerializeTupleStruct = Count;
    type SerializeTupleVariant = Opaque;
    type SerializeMap = Count;
    type SerializeStruct = Opaque;
    type SerializeStructVariant = Opaque;

    shape_zero! {
        serialize_i8: i8 => 0,
        serialize_i16: i16 => 0,
        serialize_i32: i32 => 0,
        serialize_i64: i64 => 0,
        serialize_i128: i128 => 0,
        serialize_u8: u8 => 0,
        serialize_u16: u16 => 0,
        serialize_u32: u32 => 0,
        serialize_u64: u64 => 0,
        serialize_u128: u128 => 0,
        serialize_f32: f32 => 0.0,
        serialize_f64: f64 => 0.0,
        serialize_char: char => '\0',
        serialize_bool: bool => false,
    }

    fn serialize_str(self, v: &str) -> Result<bool, ShapeError> {
        Ok(v.is_empty())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<bool, ShapeError> {
        Ok(v.is_empty())
    }

    fn serialize_none(self) -> Result<bool, ShapeError> {
        Ok(true)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<bool, ShapeError> {
        Ok(false)
    }

    fn serialize_unit(self) -> Result<bool, ShapeError> {
        Ok(true)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<bool, ShapeError> {
        Ok(false)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<bool, ShapeError> {
        Ok(false)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<bool, ShapeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<bool, ShapeError> {
        Ok(false)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Count, ShapeError> {
        Ok(Count(0))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Count, ShapeError> {
        Ok(Count(0))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Count, ShapeError> {
        Ok(Count(0))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Opaque, ShapeError> {
        Ok(Opaque)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Count, ShapeError> {
        Ok(Count(0))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Opaque, ShapeError> {
        Ok(Opaque)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Opaque, ShapeError> {
        Ok(Opaque)
    }
}

impl ser::SerializeSeq for Count {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), ShapeError> {
        self.0 += 1;
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeTuple for Count {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), ShapeError> {
        self.0 += 1;
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeTupleStruct for Count {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), ShapeError> {
        self.0 += 1;
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeMap for Count {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), ShapeError> {
        self.0 += 1;
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), ShapeError> {
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(self.0 == 0)
    }
}

impl ser::SerializeTupleVariant for Opaque {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), ShapeError> {
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(false)
    }
}

impl ser::SerializeStruct for Opaque {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), ShapeError> {
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(false)
    }
}

impl ser::SerializeStructVariant for Opaque {
    type Ok = bool;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), ShapeError> {
        Ok(())
    }

    fn end(self) -> Result<bool, ShapeError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Address {
        detail: String,
    }

    #[derive(Serialize)]
    struct Meters(f64);

    #[derive(Serialize)]
    struct Marker;

    #[derive(Serialize)]
    enum Kind {
        Plain,
    }

    #[test]
    fn scalars_are_empty_at_zero() {
        assert!(is_empty(&false));
        assert!(!is_empty(&true));
        assert!(is_empty(&0i64));
        assert!(!is_empty(&-1i64));
        assert!(is_empty(&0u16));
        assert!(is_empty(&0.0f64));
        assert!(is_empty(&-0.0f32));
        assert!(!is_empty(&0.5f64));
        assert!(is_empty(&'\0'));
        assert!(!is_empty(&'a'));
    }

    #[test]
    fn text_and_containers_are_empty_at_zero_length() {
        assert!(is_empty(""));
        assert!(is_empty(&String::new()));
        assert!(!is_empty("x"));
        assert!(is_empty(&Vec::<u8>::new()));
        assert!(!is_empty(&vec![0]));
        assert!(is_empty(&HashMap::<String, i32>::new()));
        assert!(!is_empty(&BTreeMap::from([("k", 0)])));
        assert!(is_empty(&[0u8; 0]));
        assert!(!is_empty(&(0, 0)));
    }

    #[test]
    fn options_and_units() {
        assert!(is_empty(&None::<String>));
        assert!(!is_empty(&Some(String::new())));
        assert!(is_empty(&()));
    }

    #[test]
    fn structs_and_variants_are_never_empty() {
        assert!(!is_empty(&Address {
            detail: String::new()
        }));
        assert!(!is_empty(&Marker));
        assert!(!is_empty(&Kind::Plain));
    }

    #[test]
    fn newtypes_follow_their_inner_value() {
        assert!(is_empty(&Meters(0.0)));
        assert!(!is_empty(&Meters(1.5)));
    }
}
