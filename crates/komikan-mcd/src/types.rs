use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::error::McdError;
use crate::models::{SearchResult, SeriesMetadata};

// ── Search response ──────────────────────────────────────────────

/// Top-level search response. `Results` must be present; each entry inside
/// it is validated individually.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "Results")]
    pub results: Vec<Value>,
}

impl SearchResponse {
    /// Decodes a search body. The top level must be a JSON object carrying a
    /// `Results` array.
    pub fn from_value(value: Value) -> Result<Self, McdError> {
        if !value.is_object() {
            return Err(McdError::Parse("search response is not a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| McdError::Parse(e.to_string()))
    }

    /// Converts the raw `Results` entries, dropping malformed ones.
    ///
    /// A well-formed entry is a 2-element array `[id, title]` with an
    /// unsigned integer id and a string title. Anything else is skipped
    /// without failing the search; order is preserved.
    pub fn into_results(self) -> Vec<SearchResult> {
        let total = self.results.len();
        let results: Vec<SearchResult> =
            self.results.iter().filter_map(search_entry).collect();
        if results.len() < total {
            tracing::trace!(
                skipped = total - results.len(),
                "dropped malformed search entries"
            );
        }
        results
    }
}

fn search_entry(entry: &Value) -> Option<SearchResult> {
    let pair = entry.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    Some(SearchResult {
        id: pair[0].as_u64()?,
        title: pair[1].as_str()?.to_owned(),
    })
}

// ── Series response ──────────────────────────────────────────────

/// Wire-level series record. Every field is optional and decodes leniently:
/// a mistyped field becomes its default rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct SeriesResponse {
    #[serde(rename = "Title", default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(rename = "AlternativeTitles", default, deserialize_with = "lenient_strings")]
    pub alternative_titles: Vec<String>,
    #[serde(rename = "Artists", default, deserialize_with = "lenient_strings")]
    pub artists: Vec<String>,
    #[serde(rename = "Authors", default, deserialize_with = "lenient_strings")]
    pub authors: Vec<String>,
    #[serde(rename = "Covers", default)]
    pub covers: Value,
    #[serde(rename = "Tags", default, deserialize_with = "lenient_strings")]
    pub tags: Vec<String>,
    #[serde(rename = "Volumes", default, deserialize_with = "lenient")]
    pub volumes: Option<u32>,
}

impl SeriesResponse {
    /// Decodes a series body. The top level must be a JSON object; every
    /// field inside it degrades independently.
    pub fn from_value(value: Value) -> Result<Self, McdError> {
        if !value.is_object() {
            return Err(McdError::Parse("series response is not a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| McdError::Parse(e.to_string()))
    }

    pub fn into_metadata(self) -> SeriesMetadata {
        SeriesMetadata {
            title: self.title.unwrap_or_default(),
            alternate_titles: self.alternative_titles,
            artists: self.artists,
            writers: self.authors,
            cover_urls: front_cover_urls(&self.covers),
            tags: self.tags,
            volumes: self.volumes.unwrap_or(0),
        }
    }
}

// ── Lenient field decoding ───────────────────────────────────────

/// Accepts any value, mapping a type mismatch to `None` instead of an error.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Accepts any value; keeps the string elements of an array, yields an empty
/// vec for anything else.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

// ── Cover selection ──────────────────────────────────────────────

/// Collects front-cover URLs from the `Covers` structure: a mapping or array
/// of groups, each group a mapping or array of entries.
///
/// An entry qualifies only when its `Side` is exactly `"front"`; `Normal`
/// (reduced resolution) is preferred, `Raw` (full size) is the fallback.
/// Entries whose URL doesn't parse are skipped.
pub fn front_cover_urls(covers: &Value) -> Vec<Url> {
    let mut urls = Vec::new();
    for group in children(covers) {
        for entry in children(group) {
            if entry.get("Side").and_then(Value::as_str) != Some("front") {
                continue;
            }
            let location = entry
                .get("Normal")
                .and_then(Value::as_str)
                .or_else(|| entry.get("Raw").and_then(Value::as_str));
            let Some(location) = location else { continue };
            match Url::parse(location) {
                Ok(url) => urls.push(url),
                Err(error) => {
                    tracing::trace!(%error, location, "skipping unparsable cover URL");
                }
            }
        }
    }
    urls
}

/// Iterates the members of a JSON object or array; anything else is empty.
fn children(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        Value::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}
