use serde::{Deserialize, Serialize};
use url::Url;

/// One match from a catalog title search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title of the matched series.
    pub title: String,
    /// Catalog id, unique per series; the key for detail fetches.
    pub id: u64,
}

/// Full metadata for one series, as the catalog knows it.
///
/// Every field defaults to empty/zero: a missing or malformed field in the
/// catalog response degrades to its default instead of failing the fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    /// Primary display title.
    pub title: String,
    /// Alternate titles (translations, romanizations), catalog order.
    pub alternate_titles: Vec<String>,
    pub artists: Vec<String>,
    pub writers: Vec<String>,
    /// Front-cover image URLs, normal resolution where available.
    pub cover_urls: Vec<Url>,
    pub tags: Vec<String>,
    /// Known volume count; zero when the catalog doesn't say.
    pub volumes: u32,
}
