//! Tagged parsing of the JSON text columns written by the analysis service.
//!
//! Every payload is parsed once, at the boundary, into a [`JsonField`].
//! Renderers match on the tag instead of handling parse errors themselves.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

use crate::model::OrderedMap;

/// Outcome of parsing one stored JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonField<T> {
    /// Column is NULL, blank, or JSON `null`.
    Absent,
    Parsed(T),
    /// Column holds text that is not the expected shape.
    Invalid { error: String, raw: String },
}

impl<T: DeserializeOwned> JsonField<T> {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Absent;
        };
        match serde_json::from_str::<Option<T>>(text) {
            Ok(Some(value)) => Self::Parsed(value),
            Ok(None) => Self::Absent,
            Err(e) => Self::Invalid {
                error: e.to_string(),
                raw: text.to_string(),
            },
        }
    }
}

impl<T> JsonField<T> {
    #[must_use]
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Absent | Self::Invalid { .. } => None,
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Parse error message, if the field was invalid.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Invalid { error, .. } => Some(error),
            Self::Absent | Self::Parsed(_) => None,
        }
    }
}

impl<T> JsonField<Vec<T>> {
    /// Parsed items, or an empty slice when absent or invalid.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.parsed().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Absent and invalid both serialize as `null`; the parsed value serializes as itself.
impl<T: Serialize> Serialize for JsonField<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(value) => value.serialize(serializer),
            Self::Absent | Self::Invalid { .. } => serializer.serialize_none(),
        }
    }
}

/// Rounds a count that arrived as a JSON number.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn count(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Reads JSON `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn zero_nulls(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(Option::unwrap_or_default).collect()
}

/// A list of numbers where a `null` list is empty and a `null` entry is 0.
pub(crate) fn number_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let values: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(zero_nulls(values.unwrap_or_default()))
}

pub(crate) fn number_grid<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Vec<f64>>>, D::Error> {
    let rows: Option<Vec<Option<Vec<Option<f64>>>>> = Option::deserialize(deserializer)?;
    Ok(rows.map(|rows| {
        rows.into_iter()
            .map(|row| zero_nulls(row.unwrap_or_default()))
            .collect()
    }))
}

fn zero_null_values(map: OrderedMap<Option<f64>>) -> OrderedMap<f64> {
    OrderedMap(
        map.0
            .into_iter()
            .map(|(k, v)| (k, v.unwrap_or_default()))
            .collect(),
    )
}

/// An object of numbers where a `null` object is empty and a `null` value is 0.
pub(crate) fn number_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<OrderedMap<f64>, D::Error> {
    let map: Option<OrderedMap<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(map.map(zero_null_values).unwrap_or_default())
}

pub(crate) fn optional_number_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<OrderedMap<f64>>, D::Error> {
    let map: Option<OrderedMap<Option<f64>>> = Option::deserialize(deserializer)?;
    Ok(map.map(zero_null_values))
}
