//! SimpleMetric - ready-to-use Metric implementation
//!
//! Serialized form (tags/fields keep document order):
//!
//! ```json
//! {"name": "cpu", "time": "1970-01-01T00:00:01Z", "tags": {"host": "a"}, "fields": {"load": 0.5}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Field, FieldValue, Metric, Tag};

/// Owned metric record with builder-style construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleMetric {
    name: String,

    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,

    #[serde(default, with = "ordered_pairs")]
    tags: Vec<Tag>,

    #[serde(default, with = "ordered_pairs")]
    fields: Vec<Field>,
}

impl SimpleMetric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: None,
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Pin the record time; without this, `time()` reports "now"
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.timestamp = Some(time);
    }

    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.push(Tag::new(key, value));
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.push(Field::new(key, value));
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.set_time(time);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_tag(key, value);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.add_field(key, value);
        self
    }

    /// Explicit timestamp, if one was set
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

impl Metric for SimpleMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn time(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }

    fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// (De)serializes `Vec<Tag>` / `Vec<Field>` as a JSON-style map, preserving order
mod ordered_pairs {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{DeserializeOwned, MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serialize, Serializer};

    use crate::{Field, FieldValue, Tag};

    pub trait Pair: Sized {
        type Value: Serialize + DeserializeOwned;

        fn key(&self) -> &str;
        fn value(&self) -> &Self::Value;
        fn from_parts(key: String, value: Self::Value) -> Self;
    }

    impl Pair for Tag {
        type Value = String;

        fn key(&self) -> &str {
            &self.key
        }

        fn value(&self) -> &String {
            &self.value
        }

        fn from_parts(key: String, value: String) -> Self {
            Tag { key, value }
        }
    }

    impl Pair for Field {
        type Value = FieldValue;

        fn key(&self) -> &str {
            &self.key
        }

        fn value(&self) -> &FieldValue {
            &self.value
        }

        fn from_parts(key: String, value: FieldValue) -> Self {
            Field { key, value }
        }
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S, T>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Pair,
    {
        let mut map = serializer.serialize_map(Some(items.len()))?;
        for item in items {
            map.serialize_entry(item.key(), item.value())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Pair,
    {
        deserializer.deserialize_map(PairsVisitor(PhantomData))
    }

    struct PairsVisitor<T>(PhantomData<T>);

    impl<'de, T: Pair> Visitor<'de> for PairsVisitor<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of key/value pairs")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut items = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, T::Value>()? {
                items.push(T::from_parts(key, value));
            }
            Ok(items)
        }
    }
}
