//! Storage abstractions for the JSON content store.
//!
//! ## Directory Structure
//!
//! ```text
//! contents/
//! ├── news-list.json        # Every abstract seen, newest first
//! ├── en/
//! │   └── contents.json     # Scraped records, sorted by date descending
//! ├── cn/
//! │   └── contents.json     # Translations, same slugs and dates
//! ├── jp/
//! │   └── contents.json
//! └── kp/
//!     └── contents.json
//! ```
//!
//! Every save rewrites the whole file through a temporary sibling and a
//! rename, so a file on disk is always a complete JSON document.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Language, NewsAbstract, NewsContent};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for content store backends.
#[async_trait]
pub trait NewsStorage: Send + Sync {
    /// Load `news-list.json`. A missing file is an empty list.
    async fn load_abstracts(&self) -> Result<Vec<NewsAbstract>>;

    /// Overwrite `news-list.json`, preserving the given order.
    async fn save_abstracts(&self, items: &[NewsAbstract]) -> Result<()>;

    /// Load a language's `contents.json`. A missing file is an empty list.
    async fn load_contents(&self, lang: Language) -> Result<Vec<NewsContent>>;

    /// Overwrite a language's `contents.json`, preserving the given order.
    async fn save_contents(&self, lang: Language, items: &[NewsContent]) -> Result<()>;

    /// Like [`load_abstracts`](Self::load_abstracts), but an unreadable or
    /// malformed file is logged and treated as empty.
    async fn load_abstracts_or_empty(&self) -> Vec<NewsAbstract> {
        self.load_abstracts().await.unwrap_or_else(|e| {
            log::warn!("Failed to read news list, proceeding with an empty list: {e}");
            Vec::new()
        })
    }

    /// Like [`load_contents`](Self::load_contents), but an unreadable or
    /// malformed file is logged and treated as empty.
    async fn load_contents_or_empty(&self, lang: Language) -> Vec<NewsContent> {
        self.load_contents(lang).await.unwrap_or_else(|e| {
            log::warn!("Failed to read {lang}/contents.json, proceeding with an empty array: {e}");
            Vec::new()
        })
    }
}
