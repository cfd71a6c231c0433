//! News abstract and content records.

use serde::{Deserialize, Serialize};

/// A news item as it appears on a listing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsAbstract {
    /// Headline, whitespace-collapsed
    pub title: String,

    /// English category label
    pub category: String,

    /// Absolute URL of the article page
    pub url: String,

    /// Publication date (`YYYY-MM-DD`)
    pub date: String,

    /// Unique identifier derived from the URL path
    pub slug: String,
}

/// A fully parsed article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NewsContent {
    pub title: String,
    pub category: String,
    pub date: String,
    pub slug: String,

    /// Body text, one paragraph or list item per line
    pub content: String,
}

impl NewsContent {
    /// Build a stored record from a listing abstract and the body extracted
    /// from its article page.
    ///
    /// Title, category and date come from the abstract; only the body is
    /// taken from the article page.
    pub fn from_abstract(item: &NewsAbstract, content: String) -> Self {
        Self {
            title: item.title.clone(),
            category: item.category.clone(),
            date: item.date.clone(),
            slug: item.slug.clone(),
            content,
        }
    }
}
