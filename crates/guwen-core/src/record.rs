//! Record model for one line of a corpus shard.
//!
//! Each shard line is a JSON object:
//!
//! ```text
//! {"original":"行也宜，立也宜。","description":"…","id":6,"en":"…","jp":"…",
//!  "annotation":[{"行":"行走"},{"宜":"适宜，恰当"},{"宜":"适宜，相配"}]}
//! ```
//!
//! Decoding is explicit and fallible. A line that does not decode is reported
//! as a [`DecodeError`]; it is never replaced by a default-populated record.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record line failed to decode.
#[derive(Debug, thiserror::Error)]
#[error("record decode failed: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// One text entry of a corpus.
///
/// Text fields default to the empty string when absent or `null`. `id` is
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jp: String,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub annotation: Vec<Annotation>,
}

impl Record {
    /// Create a record with only an id and source text.
    #[must_use]
    pub fn new(id: i64, original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            description: String::new(),
            id,
            en: String::new(),
            jp: String::new(),
            annotation: Vec::new(),
        }
    }

    /// Decode one JSONL line.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the line is not a JSON object with an
    /// integer `id`, or if any annotation entry is not a single
    /// string-to-string mapping.
    pub fn decode_line(line: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(line)?)
    }

    /// Decode one raw shard line. Invalid UTF-8 is a decode error.
    ///
    /// # Errors
    ///
    /// Same as [`Record::decode_line`].
    pub fn decode_bytes(line: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(line)?)
    }

    /// Encode as a single JSONL line (no trailing newline).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if serialization fails.
    pub fn encode_line(&self) -> Result<String, DecodeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Gloss of the first annotation whose term equals `term`.
    #[must_use]
    pub fn gloss_for(&self, term: &str) -> Option<&str> {
        self.annotation
            .iter()
            .find(|a| a.term == term)
            .map(|a| a.gloss.as_str())
    }
}

/// A single `{term: gloss}` annotation entry.
///
/// On the wire this is a JSON object with exactly one key. Order and
/// duplicates across entries are significant and preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Substring of [`Record::original`] being glossed.
    pub term: String,
    pub gloss: String,
}

impl Annotation {
    #[must_use]
    pub fn new(term: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            gloss: gloss.into(),
        }
    }
}

impl Serialize for Annotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.term, &self.gloss)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Annotation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnnotationVisitor;

        impl<'de> Visitor<'de> for AnnotationVisitor {
            type Value = Annotation;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object with exactly one string entry")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Annotation, A::Error> {
                let Some((term, gloss)) = map.next_entry::<String, String>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if map.next_key::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Annotation { term, gloss })
            }
        }

        deserializer.deserialize_map(AnnotationVisitor)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_vec<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Annotation>, D::Error> {
    Ok(Option::<Vec<Annotation>>::deserialize(deserializer)?.unwrap_or_default())
}
