//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── news-list.json
//! └── {lang}/
//!     └── contents.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Category, Language, NewsAbstract, NewsContent};
use crate::storage::NewsStorage;

const NEWS_LIST_KEY: &str = "news-list.json";

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Key of a language's content collection.
    fn contents_key(lang: Language) -> String {
        format!("{}/contents.json", lang.code())
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data, pretty-printed.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Records of one category for a language, in stored order.
    ///
    /// Matches on the category's label localized for `lang`. Never fails:
    /// an unreadable collection yields an empty list.
    pub async fn articles_by_category(&self, lang: Language, category: Category) -> Vec<NewsContent> {
        let label = category.localized(lang);
        match self.load_contents(lang).await {
            Ok(items) => items.into_iter().filter(|c| c.category == label).collect(),
            Err(e) => {
                log::error!("Error loading articles for {lang}/{category}: {e}");
                Vec::new()
            }
        }
    }

    /// A single record by slug. Never fails: an unreadable collection yields `None`.
    pub async fn article(&self, lang: Language, slug: &str) -> Option<NewsContent> {
        match self.load_contents(lang).await {
            Ok(items) => items.into_iter().find(|c| c.slug == slug),
            Err(e) => {
                log::error!("Error loading article {lang}/{slug}: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl NewsStorage for LocalStorage {
    async fn load_abstracts(&self) -> Result<Vec<NewsAbstract>> {
        match self.read_json(NEWS_LIST_KEY).await? {
            Some(items) => Ok(items),
            None => {
                log::info!("No {NEWS_LIST_KEY} found in {}", self.root_dir.display());
                Ok(Vec::new())
            }
        }
    }

    async fn save_abstracts(&self, items: &[NewsAbstract]) -> Result<()> {
        self.write_json(NEWS_LIST_KEY, items).await
    }

    async fn load_contents(&self, lang: Language) -> Result<Vec<NewsContent>> {
        let key = Self::contents_key(lang);
        match self.read_json(&key).await? {
            Some(items) => Ok(items),
            None => {
                log::info!("No {key} found, starting from an empty collection");
                Ok(Vec::new())
            }
        }
    }

    async fn save_contents(&self, lang: Language, items: &[NewsContent]) -> Result<()> {
        self.write_json(&Self::contents_key(lang), items).await
    }
}
