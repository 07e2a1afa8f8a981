//! JSON shape adapters: `StringOrSlice` and `IntOrRange` (spec.md §6/§9).
//!
//! Both round-trip through the scalar form whenever the scalar form is
//! lossless, and through the list/object form otherwise, as required by
//! testable property 10 (validate . default_apply . parse . serialize is
//! idempotent).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field accepting either a single value or a list of values in JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringOrSlice(pub Vec<String>);

impl StringOrSlice {
    pub fn one(s: impl Into<String>) -> Self {
        Self(vec![s.into()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Serialize for StringOrSlice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.len() == 1 {
            self.0[0].serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrSliceRaw {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for StringOrSlice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StringOrSliceRaw::deserialize(deserializer)? {
            StringOrSliceRaw::One(s) => StringOrSlice(vec![s]),
            StringOrSliceRaw::Many(v) => StringOrSlice(v),
        })
    }
}

/// A field accepting either a single integer `n` (== `{min: n, max: n}`) or
/// an explicit `{min, max}` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntOrRange {
    pub min: i64,
    pub max: i64,
}

impl IntOrRange {
    pub fn scalar(n: i64) -> Self {
        Self { min: n, max: n }
    }
}

impl Serialize for IntOrRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.min == self.max {
            self.min.serialize(serializer)
        } else {
            #[derive(Serialize)]
            struct Range {
                min: i64,
                max: i64,
            }
            Range { min: self.min, max: self.max }.serialize(serializer)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrRangeRaw {
    Scalar(i64),
    Range { min: i64, max: i64 },
}

impl<'de> Deserialize<'de> for IntOrRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match IntOrRangeRaw::deserialize(deserializer)? {
            IntOrRangeRaw::Scalar(n) => IntOrRange::scalar(n),
            IntOrRangeRaw::Range { min, max } => IntOrRange { min, max },
        })
    }
}
