// src/models/selectors.rs

//! CSS selectors for scraping the news listing and article pages.

use serde::{Deserialize, Serialize};

/// CSS selectors describing one site layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteSelectors {
    /// Selector for each item in the listing
    pub listing_item: String,

    /// Selector for the title element within an item
    pub listing_title: String,

    /// Selector for the link element within the title
    pub listing_link: String,

    /// Selector for the category element within an item
    pub listing_category: String,

    /// Selector for the date element within an item
    pub listing_date: String,

    /// Category "eyebrow" on the article page
    pub article_category: String,

    /// Headline on the article page
    pub article_title: String,

    /// Timestamp element on the article page
    pub article_date: String,

    /// Meta tag carrying the canonical URL
    pub canonical_url: String,

    /// Top-level paragraphs and lists of the article body
    pub article_body: String,

    /// HTML attribute name for extracting links (usually "href")
    pub attr_name: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            listing_item: ".wp-block-post-template > li".to_string(),
            listing_title: ".wp-block-post-title".to_string(),
            listing_link: "a".to_string(),
            listing_category: ".taxonomy-category a".to_string(),
            listing_date: ".wp-block-post-date".to_string(),
            article_category: ".wp-block-whitehouse-topper__eyebrow a".to_string(),
            article_title: ".wp-block-whitehouse-topper__headline".to_string(),
            article_date: ".wp-block-whitehouse-topper__meta--date time".to_string(),
            canonical_url: r#"meta[property="og:url"]"#.to_string(),
            article_body: ".entry-content.wp-block-post-content > p, \
                           .entry-content.wp-block-post-content > ul"
                .to_string(),
            attr_name: "href".to_string(),
        }
    }
}

impl SiteSelectors {
    /// All selectors paired with their field names, for validation.
    pub fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("listing_item", &self.listing_item),
            ("listing_title", &self.listing_title),
            ("listing_link", &self.listing_link),
            ("listing_category", &self.listing_category),
            ("listing_date", &self.listing_date),
            ("article_category", &self.article_category),
            ("article_title", &self.article_title),
            ("article_date", &self.article_date),
            ("canonical_url", &self.canonical_url),
            ("article_body", &self.article_body),
        ]
    }
}
