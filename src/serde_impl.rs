#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]
//! `SetObject` (de)serializes as a sequence of its elements (§6,
//! persistence / wire format): each element is an integer or a byte
//! string depending on which side produced it, mirroring the teacher's
//! own optional `serde` feature for `OrderMap`/`OrderSet`.

use serde::de::{Deserialize, Deserializer, Error as DeError, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::object::{Element, SetObject};
use crate::{SetConfig, Value};

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Element::Int(n) => serializer.serialize_i64(*n),
            Element::Bytes(v) => serializer.serialize_bytes(v.as_bytes()),
        }
    }
}

struct ElementVisitor;

impl<'de> Visitor<'de> for ElementVisitor {
    type Value = Element;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an integer or a byte string")
    }

    fn visit_i64<E: DeError>(self, v: i64) -> Result<Element, E> {
        Ok(Element::Int(v))
    }

    fn visit_u64<E: DeError>(self, v: u64) -> Result<Element, E> {
        i64::try_from(v)
            .map(Element::Int)
            .map_err(|_| E::custom("integer out of range for a SET element"))
    }

    fn visit_bytes<E: DeError>(self, v: &[u8]) -> Result<Element, E> {
        Ok(Element::Bytes(Value::from(v)))
    }

    fn visit_str<E: DeError>(self, v: &str) -> Result<Element, E> {
        Ok(Element::Bytes(Value::from(v)))
    }

    // Formats with no native byte-string type (JSON among them) carry
    // `serialize_bytes` across the wire as a sequence of small integers.
    fn visit_seq<A>(self, mut seq: A) -> Result<Element, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut bytes = Vec::new();
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Element::Bytes(Value::from(bytes.as_slice())))
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ElementVisitor)
    }
}

impl Serialize for SetObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for SetObject {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let elements = Vec::<Element>::deserialize(deserializer)?;
        let config = SetConfig::default();
        let mut set = SetObject::empty();
        for elem in elements {
            set.add(elem.to_value(), &config);
        }
        Ok(set)
    }
}
