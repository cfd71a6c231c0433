// src/services/extractor.rs

//! HTML extraction for listing and article pages.
//!
//! Extraction is best effort: malformed listing items are dropped and missing
//! article fields come back as empty strings. Neither operation fails on
//! unexpected markup.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NewsAbstract, NewsContent, SiteSelectors};
use crate::utils::{normalize_date, normalize_whitespace, resolve_url, slug_from_url};

/// Parses the pages of one site layout.
pub trait SiteAdapter: Send + Sync {
    /// Extract every well-formed item on a listing page, in document order.
    /// An empty result means the listing has no more items.
    fn extract_listing(&self, html: &str) -> Vec<NewsAbstract>;

    /// Extract an article page.
    fn extract_article(&self, html: &str) -> NewsContent;
}

/// Site adapter driven by [`SiteSelectors`].
#[derive(Debug, Clone)]
pub struct SelectorAdapter {
    base_url: Url,
    attr_name: String,
    listing_item: Selector,
    listing_title: Selector,
    listing_link: Selector,
    listing_category: Selector,
    listing_date: Selector,
    article_category: Selector,
    article_title: Selector,
    article_date: Selector,
    canonical_url: Selector,
    article_body: Selector,
    list_item: Selector,
}

impl SelectorAdapter {
    /// Compile the selectors. Relative links are resolved against `origin`.
    pub fn new(selectors: &SiteSelectors, origin: &str) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(origin)?,
            attr_name: selectors.attr_name.clone(),
            listing_item: Self::parse_selector(&selectors.listing_item)?,
            listing_title: Self::parse_selector(&selectors.listing_title)?,
            listing_link: Self::parse_selector(&selectors.listing_link)?,
            listing_category: Self::parse_selector(&selectors.listing_category)?,
            listing_date: Self::parse_selector(&selectors.listing_date)?,
            article_category: Self::parse_selector(&selectors.article_category)?,
            article_title: Self::parse_selector(&selectors.article_title)?,
            article_date: Self::parse_selector(&selectors.article_date)?,
            canonical_url: Self::parse_selector(&selectors.canonical_url)?,
            article_body: Self::parse_selector(&selectors.article_body)?,
            list_item: Self::parse_selector("li")?,
        })
    }

    fn parse_listing_item(&self, item: &ElementRef<'_>) -> Option<NewsAbstract> {
        let title_elem = item.select(&self.listing_title).next()?;
        let title = normalize_whitespace(&title_elem.text().collect::<String>());
        if title.is_empty() {
            return None;
        }

        let href = title_elem
            .select(&self.listing_link)
            .next()
            .and_then(|a| a.value().attr(&self.attr_name))
            .map(str::trim)
            .filter(|href| !href.is_empty())?;
        let url = resolve_url(&self.base_url, href);
        let slug = slug_from_url(&url);

        let category = first_text(item, &self.listing_category);
        let raw_date = first_text(item, &self.listing_date);
        let Some(date) = normalize_date(&raw_date) else {
            log::debug!("Skipping listing item {slug}: unparseable date {raw_date:?}");
            return None;
        };

        Some(NewsAbstract {
            title,
            category,
            url,
            date,
            slug,
        })
    }

    fn article_date(&self, document: &Html) -> String {
        let Some(elem) = document.select(&self.article_date).next() else {
            return String::new();
        };
        normalize_date(&elem.text().collect::<String>())
            .or_else(|| elem.value().attr("datetime").and_then(normalize_date))
            .unwrap_or_default()
    }

    fn article_body(&self, document: &Html) -> String {
        let mut lines = Vec::new();
        for block in document.select(&self.article_body) {
            if block.value().name() == "ul" {
                for li in block.select(&self.list_item) {
                    lines.push(format!("- {}", li.text().collect::<String>().trim()));
                }
            } else {
                lines.push(block.text().collect::<String>().trim().to_string());
            }
        }
        lines.join("\n")
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

impl SiteAdapter for SelectorAdapter {
    fn extract_listing(&self, html: &str) -> Vec<NewsAbstract> {
        let document = Html::parse_document(html);
        document
            .select(&self.listing_item)
            .filter_map(|item| self.parse_listing_item(&item))
            .collect()
    }

    fn extract_article(&self, html: &str) -> NewsContent {
        let document = Html::parse_document(html);

        let canonical = document
            .select(&self.canonical_url)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .unwrap_or("");

        NewsContent {
            title: normalize_whitespace(&first_text(&document.root_element(), &self.article_title)),
            category: first_text(&document.root_element(), &self.article_category),
            date: self.article_date(&document),
            slug: slug_from_url(canonical),
            content: self.article_body(&document),
        }
    }
}

/// Trimmed text of the first element matching `selector`, or empty.
fn first_text(scope: &ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = include_str!("../../tests/fixtures/listing.html");
    const ARTICLE: &str = include_str!("../../tests/fixtures/article.html");

    fn adapter() -> SelectorAdapter {
        SelectorAdapter::new(&SiteSelectors::default(), "https://www.whitehouse.gov").unwrap()
    }

    fn is_iso_date(s: &str) -> bool {
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() && s.len() == 10
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(SelectorAdapter::parse_selector("[[invalid").is_err());
        let mut selectors = SiteSelectors::default();
        selectors.article_body = "p >".to_string();
        assert!(SelectorAdapter::new(&selectors, "https://example.com").is_err());
    }

    #[test]
    fn test_extract_listing_fixture() {
        let items = adapter().extract_listing(LISTING);

        let slugs: Vec<_> = items.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec![
                "week-eight-wins-a-testament-to-american-greatness-under-president-trump",
                "remarks-by-president-trump-and-nato-secretary-general-mark-rutte-before-bilateral-meeting",
                "winning-inflation-eases-as-job-creation-soars-and-border-security-pays-off",
                "nominations-sent-to-the-senate-8355",
            ]
        );

        let first = &items[0];
        assert_eq!(
            first.title,
            "WEEK EIGHT WINS: A Testament to American Greatness Under President Trump"
        );
        assert_eq!(first.category, "Articles");
        assert_eq!(first.date, "2025-03-14");
        assert_eq!(items[2].category, "Briefings & Statements");
    }

    #[test]
    fn test_listing_slug_and_date_invariants() {
        for item in adapter().extract_listing(LISTING) {
            assert!(item.url.starts_with("https://"), "{}", item.url);
            assert_eq!(item.slug, slug_from_url(&item.url));
            assert!(is_iso_date(&item.date), "{}", item.date);
        }
    }

    #[test]
    fn test_listing_resolves_relative_links() {
        let items = adapter().extract_listing(LISTING);
        assert_eq!(
            items[1].url,
            "https://www.whitehouse.gov/remarks/2025/03/remarks-by-president-trump-and-nato-secretary-general-mark-rutte-before-bilateral-meeting/"
        );
    }

    #[test]
    fn test_listing_skips_items_with_bad_dates() {
        let html = r#"<ul class="wp-block-post-template">
            <li><h2 class="wp-block-post-title"><a href="/a/x/">X</a></h2>
                <div class="wp-block-post-date">sometime</div></li>
            <li><h2 class="wp-block-post-title"><a href="/a/y/">Y</a></h2>
                <div class="wp-block-post-date">January 2, 2025</div></li>
        </ul>"#;
        let items = adapter().extract_listing(html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "y");
        assert_eq!(items[0].category, "");
    }

    #[test]
    fn test_listing_without_items_is_empty() {
        assert!(adapter().extract_listing("<html><body><p>Nothing here</p></body></html>").is_empty());
        assert!(adapter().extract_listing("").is_empty());
    }

    #[test]
    fn test_extract_article_fixture() {
        let article = adapter().extract_article(ARTICLE);

        assert_eq!(
            article.title,
            "WEEK EIGHT WINS: A Testament to American Greatness Under President Trump"
        );
        assert_eq!(article.category, "Articles");
        assert_eq!(article.date, "2025-03-14");
        assert_eq!(
            article.slug,
            "week-eight-wins-a-testament-to-american-greatness-under-president-trump"
        );
        assert_eq!(
            article.content,
            "This week, President Trump continued delivering for the American people.\n\
             - Jobs: Hiring beat expectations.\n\
             - Inflation cooled for the month.\n\
             The work continues next week."
        );
    }

    #[test]
    fn test_article_without_container_has_empty_content() {
        let html = r#"<html><head></head><body>
            <h1 class="wp-block-whitehouse-topper__headline">Only a headline</h1>
            <p>Stray paragraph outside the body container.</p>
        </body></html>"#;
        let article = adapter().extract_article(html);

        assert_eq!(article.title, "Only a headline");
        assert_eq!(article.content, "");
        assert_eq!(article.category, "");
        assert_eq!(article.date, "");
        assert_eq!(article.slug, "");
    }

    #[test]
    fn test_article_date_falls_back_to_datetime_attr() {
        let html = r#"<div class="wp-block-whitehouse-topper__meta--date">
            <time datetime="2025-02-01T09:00:00-05:00"></time></div>"#;
        assert_eq!(adapter().extract_article(html).date, "2025-02-01");
    }
}
