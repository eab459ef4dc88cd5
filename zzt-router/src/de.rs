use serde::{
    de::{self, Deserializer, Error as DeError, IntoDeserializer, Visitor},
    forward_to_deserialize_any,
};

use crate::params::{Params, ParamsIter};

macro_rules! single_value {
    ($($trait_fn:ident)*) => {
        $(
            fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                match self.params.len() {
                    1 => Value(&self.params[0]).$trait_fn(visitor),
                    n => Err(de::value::Error::custom(format!(
                        "wrong number of parameters: {} expected 1",
                        n
                    ))),
                }
            }
        )*
    };
}

macro_rules! parse_value {
    ($($trait_fn:ident => $visit_fn:ident,)*) => {
        $(
            fn $trait_fn<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                let v = self.0.parse().map_err(|_| {
                    de::value::Error::custom(format!(
                        "can not parse {:?} to a {}",
                        self.0,
                        stringify!($visit_fn).trim_start_matches("visit_")
                    ))
                })?;

                visitor.$visit_fn(v)
            }
        )*
    };
}

/// Deserializes the captured parameters of a match.
///
/// Structs and maps are filled by parameter name; tuples and sequences take values in
/// declaration order; scalar types require exactly one captured parameter.
pub struct ParamsDeserializer<'de> {
    params: &'de Params,
}

impl<'de> ParamsDeserializer<'de> {
    pub fn new(params: &'de Params) -> Self {
        ParamsDeserializer { params }
    }

    fn check_len(&self, len: usize) -> Result<(), de::value::Error> {
        if self.params.len() < len {
            Err(de::value::Error::custom(format!(
                "wrong number of parameters: {} expected {}",
                self.params.len(),
                len
            )))
        } else {
            Ok(())
        }
    }
}

impl<'de> Deserializer<'de> for ParamsDeserializer<'de> {
    type Error = de::value::Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(ParamsMap {
            params: self.params.iter(),
            value: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(ParamsSeq {
            params: self.params.iter(),
        })
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.check_len(len)?;
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    single_value! {
        deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_f32
        deserialize_f64 deserialize_char deserialize_str deserialize_string deserialize_bytes
        deserialize_byte_buf deserialize_option
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.check_len(1)?;
        Value(&self.params[0]).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! { identifier ignored_any }
}

struct ParamsMap<'de> {
    params: ParamsIter<'de>,
    value: Option<&'de str>,
}

impl<'de> de::MapAccess<'de> for ParamsMap<'de> {
    type Error = de::value::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.params.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(Value(value)),
            None => Err(de::value::Error::custom("unexpected item")),
        }
    }
}

struct ParamsSeq<'de> {
    params: ParamsIter<'de>,
}

impl<'de> de::SeqAccess<'de> for ParamsSeq<'de> {
    type Error = de::value::Error;

    fn next_element_seed<U>(&mut self, seed: U) -> Result<Option<U::Value>, Self::Error>
    where
        U: de::DeserializeSeed<'de>,
    {
        match self.params.next() {
            Some((_, value)) => seed.deserialize(Value(value)).map(Some),
            None => Ok(None),
        }
    }
}

/// A single captured value.
///
/// Values only ever hold `a-z`, `A-Z`, `0-9`, `-` and `_`, so no further decoding is needed.
struct Value<'de>(&'de str);

impl<'de> Deserializer<'de> for Value<'de> {
    type Error = de::value::Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.0)
    }

    parse_value! {
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
        deserialize_char => visit_char,
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(self.0.into_deserializer())
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
