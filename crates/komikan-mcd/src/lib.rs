//! Client for the Manga Cover Database (MCD) series-metadata catalog.
//!
//! Two operations: search the catalog by title, then fetch full metadata for
//! one of the matches. Both are plain async calls that complete exactly once;
//! there is no shared state between calls and no caching.
//!
//! ```no_run
//! # async fn run() -> Result<(), komikan_mcd::McdError> {
//! let client = komikan_mcd::McdClient::new();
//! let results = client.search("Nichijou").await?;
//! if let Some(first) = results.first() {
//!     let metadata = client.get_series(first).await?;
//!     println!("{} ({} volumes)", metadata.title, metadata.volumes);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod types;

pub use client::McdClient;
pub use error::McdError;
pub use models::{SearchResult, SeriesMetadata};
