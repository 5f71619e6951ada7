// BucketDetails and its display form
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use chrono::{
    DateTime,
    Utc,
};
use serde_json::{
    Map,
    Value,
};
use std::fmt;
use super::SizeUnit;

// Matches the `YYYY-MM-DD HH:MM:SS+00:00` form used in tables and exports.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Render a timestamp the way every table and export shows it.
pub fn display_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Name of the size column for the given `unit`, e.g. `size (mb)`.
pub fn size_header(unit: SizeUnit) -> String {
    format!("size ({unit})")
}

/// Metrics of a single bucket with the size expressed in `unit`.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketDetails {
    /// Bucket name.
    pub name:          String,

    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,

    /// Number of objects in the bucket.
    pub count:         u64,

    /// Total size of all objects, always in bytes.
    pub size_bytes:    u64,

    /// Unit that `size()` reports in.
    pub unit:          SizeUnit,

    /// Most recent object modification, or the creation date when empty.
    pub last_modified: DateTime<Utc>,
}

impl BucketDetails {
    /// Total size converted to `self.unit`.
    pub fn size(&self) -> f64 {
        self.unit.convert(self.size_bytes)
    }

    /// Display form of the size, exact for byte counts.
    pub fn display_size(&self) -> String {
        self.unit.display(self.size_bytes)
    }

    /// The same details reported in a different `unit`.
    pub fn with_unit(&self, unit: SizeUnit) -> Self {
        Self {
            unit,
            ..self.clone()
        }
    }

    /// All fields as display strings, size last under its unit-bearing key.
    pub fn to_string_map(&self) -> Map<String, Value> {
        let mut map = Map::new();

        map.insert("name".into(), Value::String(self.name.clone()));
        map.insert(
            "creation_date".into(),
            Value::String(display_timestamp(&self.creation_date)),
        );
        map.insert("count".into(), Value::String(self.count.to_string()));
        map.insert(
            "last_modified".into(),
            Value::String(display_timestamp(&self.last_modified)),
        );
        map.insert(
            size_header(self.unit),
            Value::String(self.display_size()),
        );

        map
    }
}

/// Pretty printed JSON object of `to_string_map`.
impl fmt::Display for BucketDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self.to_string_map())
            .map_err(|_| fmt::Error)?;

        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::object_storage::tests::timestamp;
    use pretty_assertions::assert_eq;

    fn details() -> BucketDetails {
        BucketDetails {
            name:          "logs-2023".into(),
            creation_date: timestamp("2023-01-02T03:04:05Z"),
            count:         3,
            size_bytes:    1_500_000,
            unit:          SizeUnit::Byte,
            last_modified: timestamp("2023-06-07T08:09:10Z"),
        }
    }

    #[test]
    fn test_display_timestamp() {
        let ret = display_timestamp(&timestamp("2020-03-12T14:45:00.000Z"));

        assert_eq!(ret, "2020-03-12 14:45:00+00:00");
    }

    #[test]
    fn test_size_follows_unit() {
        let details = details();

        assert_eq!(details.size(), 1_500_000.0);
        assert_eq!(details.with_unit(SizeUnit::Megabyte).size(), 1.5);
        assert_eq!(details.with_unit(SizeUnit::Megabyte).size_bytes, 1_500_000);
    }

    #[test]
    fn test_display() {
        let ret = details().with_unit(SizeUnit::Megabyte).to_string();

        let expected = r#"{
  "name": "logs-2023",
  "creation_date": "2023-01-02 03:04:05+00:00",
  "count": "3",
  "last_modified": "2023-06-07 08:09:10+00:00",
  "size (mb)": "1.5"
}"#;

        assert_eq!(ret, expected);
    }

    #[test]
    fn test_display_bytes_has_no_fraction() {
        let map = details().to_string_map();

        assert_eq!(map["size (byte)"], Value::String("1500000".into()));
    }

    #[test]
    fn test_display_bytes_past_f64_precision() {
        let details = BucketDetails {
            size_bytes: 9_007_199_254_740_993,
            ..details()
        };

        let map = details.to_string_map();

        assert_eq!(details.display_size(), "9007199254740993");
        assert_eq!(map["size (byte)"], Value::String("9007199254740993".into()));
    }
}
