//! XDR encoder.

use serde::ser::{self, Impossible, Serialize};

use crate::error::{Error, Result};
use crate::uuid::UUID_TOKEN;

/// Serializes serde values into an XDR byte buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    out: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }

    fn word(&mut self, v: u32) {
        self.out.extend_from_slice(&v.to_be_bytes());
    }

    fn opaque(&mut self, data: &[u8]) {
        self.out.extend_from_slice(data);
        self.out.resize(self.out.len() + crate::padding(data.len()), 0);
    }

    fn counted_opaque(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len()).map_err(|_| Error::Unsupported("opaque > 4 GiB"))?;
        self.word(len);
        self.opaque(data);
        Ok(())
    }
}

/// Writes fixed-length opaque data: raw bytes plus padding, no length.
struct RawOpaque<'a> {
    encoder: &'a mut Encoder,
}

macro_rules! reject {
    ($($name:ident($($arg:ty),*) -> $ret:ty;)*) => {
        $(
            fn $name(self, $(_: $arg),*) -> Result<$ret> {
                Err(Error::Unsupported(stringify!($name)))
            }
        )*
    };
}

impl<'a> ser::Serializer for RawOpaque<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Impossible<(), Error>;
    type SerializeTuple = Impossible<(), Error>;
    type SerializeTupleStruct = Impossible<(), Error>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Impossible<(), Error>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.encoder.opaque(v);
        Ok(())
    }

    reject! {
        serialize_bool(bool) -> ();
        serialize_i8(i8) -> ();
        serialize_i16(i16) -> ();
        serialize_i32(i32) -> ();
        serialize_i64(i64) -> ();
        serialize_u8(u8) -> ();
        serialize_u16(u16) -> ();
        serialize_u32(u32) -> ();
        serialize_u64(u64) -> ();
        serialize_f32(f32) -> ();
        serialize_f64(f64) -> ();
        serialize_char(char) -> ();
        serialize_str(&str) -> ();
        serialize_none() -> ();
        serialize_unit() -> ();
        serialize_unit_struct(&'static str) -> ();
        serialize_unit_variant(&'static str, u32, &'static str) -> ();
        serialize_seq(Option<usize>) -> Self::SerializeSeq;
        serialize_tuple(usize) -> Self::SerializeTuple;
        serialize_tuple_struct(&'static str, usize) -> Self::SerializeTupleStruct;
        serialize_tuple_variant(&'static str, u32, &'static str, usize) -> Self::SerializeTupleVariant;
        serialize_map(Option<usize>) -> Self::SerializeMap;
        serialize_struct(&'static str, usize) -> Self::SerializeStruct;
        serialize_struct_variant(&'static str, u32, &'static str, usize) -> Self::SerializeStructVariant;
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<()> {
        Err(Error::Unsupported("serialize_some"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _: &'static str, _: &T) -> Result<()> {
        Err(Error::Unsupported("serialize_newtype_struct"))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<()> {
        Err(Error::Unsupported("serialize_newtype_variant"))
    }
}

impl<'a> ser::Serializer for &'a mut Encoder {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.word(v as u32);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i32(v as i32)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i32(v as i32)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.out.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.out.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.word(v as u32);
        Ok(())
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.word(v as u32);
        Ok(())
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.word(v);
        Ok(())
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.out.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.word(v.to_bits());
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.out.extend_from_slice(&v.to_bits().to_be_bytes());
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.word(v as u32);
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.counted_opaque(v.as_bytes())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.counted_opaque(v)
    }

    fn serialize_none(self) -> Result<()> {
        self.word(0);
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        self.word(1);
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(self, _name: &'static str, index: u32, _variant: &'static str) -> Result<()> {
        self.serialize_i32(index as i32)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, name: &'static str, value: &T) -> Result<()> {
        if name == UUID_TOKEN {
            value.serialize(RawOpaque { encoder: self })
        } else {
            value.serialize(self)
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.serialize_i32(index as i32)?;
        value.serialize(self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self> {
        let len = len.ok_or(Error::UnknownLength)?;
        self.word(len as u32);
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self> {
        self.serialize_i32(index as i32)?;
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self> {
        self.serialize_i32(index as i32)?;
        Ok(self)
    }
}

macro_rules! sequential {
    ($($trait:ident::$method:ident($($key:ty)?)),* $(,)?) => {
        $(
            impl<'a> ser::$trait for &'a mut Encoder {
                type Ok = ();
                type Error = Error;

                fn $method<T: ?Sized + Serialize>(&mut self, $(_key: $key,)? value: &T) -> Result<()> {
                    value.serialize(&mut **self)
                }

                fn end(self) -> Result<()> {
                    Ok(())
                }
            }
        )*
    };
}

sequential! {
    SerializeSeq::serialize_element(),
    SerializeTuple::serialize_element(),
    SerializeTupleStruct::serialize_field(),
    SerializeTupleVariant::serialize_field(),
    SerializeStruct::serialize_field(&'static str),
    SerializeStructVariant::serialize_field(&'static str),
}

#[cfg(test)]
mod tests {
    use crate::to_bytes;
    use serde::Serialize;

    #[test]
    fn test_encode_words() {
        assert_eq!(to_bytes(&42i32).unwrap(), vec![0, 0, 0, 42]);
        assert_eq!(to_bytes(&-1i32).unwrap(), vec![255, 255, 255, 255]);
        assert_eq!(to_bytes(&7u8).unwrap(), vec![0, 0, 0, 7]);
        assert_eq!(to_bytes(&true).unwrap(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_encode_hyper() {
        assert_eq!(to_bytes(&0x0102u64).unwrap(), vec![0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_encode_string_padding() {
        assert_eq!(to_bytes("hi").unwrap(), vec![0, 0, 0, 2, b'h', b'i', 0, 0]);
        assert_eq!(to_bytes("vm01").unwrap(), vec![0, 0, 0, 4, b'v', b'm', b'0', b'1']);
    }

    #[test]
    fn test_encode_optional_string() {
        assert_eq!(to_bytes(&None::<String>).unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(
            to_bytes(&Some("a")).unwrap(),
            vec![0, 0, 0, 1, 0, 0, 0, 1, b'a', 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_args_struct() {
        #[derive(Serialize)]
        struct ListArgs {
            need_results: i32,
            flags: u32,
        }

        let args = ListArgs {
            need_results: 1,
            flags: 16,
        };
        assert_eq!(to_bytes(&args).unwrap(), vec![0, 0, 0, 1, 0, 0, 0, 16]);
    }

    #[test]
    fn test_maps_rejected() {
        let map: std::collections::BTreeMap<u32, u32> = [(1, 2)].into_iter().collect();
        assert!(to_bytes(&map).is_err());
    }
}
