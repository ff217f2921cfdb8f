//! Shapes of the JSON documents the analysis service writes.
//!
//! Keys are camelCase. Unknown keys are ignored. Missing or `null` values
//! read as the type's default, so one gap never fails a whole section.

use std::fmt;
use std::marker::PhantomData;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::fields::{null_as_default, number_grid, number_list, number_map, optional_number_map};

/// A JSON object kept in document order.
///
/// Platform maps drive chart axis order, so the order the analysis service
/// wrote them in is preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// audience_comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudienceEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    pub is_focus: Option<bool>,
    #[serde(deserialize_with = "null_as_default")]
    pub platforms: OrderedMap<PlatformAudience>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformAudience {
    #[serde(deserialize_with = "null_as_default")]
    pub followers: f64,
    pub engagement_rate: Option<f64>,
    pub avg_likes: Option<f64>,
    pub avg_comments: Option<f64>,
}

// ---------------------------------------------------------------------------
// post_channel_distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "number_map")]
    pub channels: OrderedMap<f64>,
}

// ---------------------------------------------------------------------------
// hashtag_analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HashtagEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hashtags: Vec<Hashtag>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hashtag {
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(deserialize_with = "null_as_default")]
    pub count: f64,
    pub avg_engagement: Option<f64>,
}

// ---------------------------------------------------------------------------
// post_type_engagement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostTypeEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub types: Vec<PostTypeStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostTypeStat {
    #[serde(deserialize_with = "null_as_default")]
    pub post_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub count: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub avg_engagement: f64,
}

// ---------------------------------------------------------------------------
// post_timing_data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub platforms: OrderedMap<PlatformTiming>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformTiming {
    /// 24 buckets, hour 0 first.
    #[serde(deserialize_with = "number_list")]
    pub by_hour: Vec<f64>,
    /// 7 buckets, Monday first.
    #[serde(deserialize_with = "number_list")]
    pub by_day: Vec<f64>,
    /// Optional day x hour matrix for heatmaps.
    #[serde(deserialize_with = "number_grid")]
    pub grid: Option<Vec<Vec<f64>>>,
}

// ---------------------------------------------------------------------------
// brand_equity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquityEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reach: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub engagement: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub velocity: f64,
    pub sentiment: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub overall: f64,
}

// ---------------------------------------------------------------------------
// keyword_clustering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeywordCluster {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub volume: f64,
    pub sentiment: Option<f64>,
    #[serde(deserialize_with = "optional_number_map")]
    pub brands: Option<OrderedMap<f64>>,
}

// ---------------------------------------------------------------------------
// voice_analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owned_posts: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub earned_mentions: f64,
    pub share_of_voice: Option<f64>,
}

// ---------------------------------------------------------------------------
// ai_insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StructuredInsights {
    pub executive_summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub opportunities: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub risks: Vec<String>,
}

/// AI insights are either the structured object or free text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Insights {
    Structured(StructuredInsights),
    PlainText(String),
}

impl Insights {
    /// Parses the stored column. Anything that is not a JSON object becomes
    /// plain text; a JSON string is unquoted first.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let text = raw.map(str::trim).filter(|s| !s.is_empty())?;
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Null) => None,
            Ok(value @ serde_json::Value::Object(_)) => {
                match serde_json::from_value::<StructuredInsights>(value) {
                    Ok(structured) => Some(Self::Structured(structured)),
                    Err(_) => Some(Self::PlainText(text.to_string())),
                }
            }
            Ok(serde_json::Value::String(s)) => Some(Self::PlainText(s)),
            Ok(_) | Err(_) => Some(Self::PlainText(text.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// author categories
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesDoc {
    List(Vec<String>),
    Wrapped { topics: Vec<String> },
}

/// Topics from an author's `categories` column: `["a", ..]` or
/// `{"topics": ["a", ..]}`. Anything else yields no topics.
#[must_use]
pub fn parse_author_topics(raw: Option<&str>) -> Vec<String> {
    let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<CategoriesDoc>(text) {
        Ok(CategoriesDoc::List(topics) | CategoriesDoc::Wrapped { topics }) => topics,
        Err(_) => Vec::new(),
    }
}
