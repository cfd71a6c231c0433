// src/pipeline/walk.rs

//! Pagination over the news listing.
//!
//! The walker never fails. Whatever ends the walk, the caller gets every
//! abstract collected up to that point along with the reason it stopped.

use std::collections::HashSet;
use std::fmt;

use crate::models::NewsAbstract;
use crate::services::{PageFetcher, SiteAdapter};
use crate::utils::pacer::Pacer;

/// Why a walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A listing page had no items.
    EmptyPage,
    /// The listing page does not exist.
    NotFound,
    /// An already-known slug was reached (incremental walks only).
    KnownSlug(String),
    /// The configured page limit was reached.
    PageLimit,
    /// A page fetch failed; the collection is partial.
    Failed(String),
}

impl StopReason {
    /// True for the two expected ends of the listing.
    pub fn is_end_of_pages(&self) -> bool {
        matches!(self, StopReason::EmptyPage | StopReason::NotFound)
    }

    /// True when the walk was cut short by an error.
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::Failed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::EmptyPage => f.write_str("end of pages (empty page)"),
            StopReason::NotFound => f.write_str("end of pages (not found)"),
            StopReason::KnownSlug(slug) => write!(f, "reached known item {slug}"),
            StopReason::PageLimit => f.write_str("page limit reached"),
            StopReason::Failed(reason) => write!(f, "fetch failed: {reason}"),
        }
    }
}

/// Result of a listing walk.
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    /// Abstracts in listing order, newest first
    pub abstracts: Vec<NewsAbstract>,
    /// Listing pages requested, including the one that ended the walk
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Drives fetch and extraction across sequential listing pages.
pub struct Walker<'a> {
    fetcher: &'a dyn PageFetcher,
    adapter: &'a dyn SiteAdapter,
    pacer: &'a dyn Pacer,
    max_pages: Option<u32>,
}

impl<'a> Walker<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, adapter: &'a dyn SiteAdapter, pacer: &'a dyn Pacer) -> Self {
        Self {
            fetcher,
            adapter,
            pacer,
            max_pages: None,
        }
    }

    /// Stop after `max_pages` listing pages.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Collect every abstract until the listing runs out.
    pub async fn walk_all(&self) -> WalkOutcome {
        self.walk(None).await
    }

    /// Collect abstracts until one whose slug is in `known` appears.
    ///
    /// That abstract and everything after it, on the same page or later
    /// pages, is left out.
    pub async fn walk_new(&self, known: &HashSet<String>) -> WalkOutcome {
        self.walk(Some(known)).await
    }

    async fn walk(&self, known: Option<&HashSet<String>>) -> WalkOutcome {
        let mut collected: Vec<NewsAbstract> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page: u32 = 1;

        let stop = loop {
            if self.max_pages.is_some_and(|max| page > max) {
                break StopReason::PageLimit;
            }

            log::info!("Fetching page {page}...");
            let html = match self.fetcher.fetch_listing_page(page).await {
                Ok(html) => html,
                Err(e) if e.is_not_found() => {
                    log::info!("Fetching complete - reached the end of available pages.");
                    break StopReason::NotFound;
                }
                Err(e) => {
                    log::error!("Error on page {page}: {e}");
                    break StopReason::Failed(e.to_string());
                }
            };

            let items = self.adapter.extract_listing(&html);
            if items.is_empty() {
                log::info!("No news items found on page {page}. Stopping.");
                break StopReason::EmptyPage;
            }
            log::info!("Found {} news items on page {page}", items.len());

            if let Some(slug) = Self::collect_page(items, known, &mut seen, &mut collected) {
                log::info!("Found existing news item: \"{slug}\". Synchronization complete.");
                break StopReason::KnownSlug(slug);
            }

            self.pacer.pause().await;
            page += 1;
        };

        let pages_fetched = match stop {
            StopReason::PageLimit => page - 1,
            _ => page,
        };
        log::info!(
            "Listing walk finished after {pages_fetched} page(s): {stop}. Total news items: {}",
            collected.len()
        );

        WalkOutcome {
            abstracts: collected,
            pages_fetched,
            stop,
        }
    }

    /// Append a page's items in order. Returns the first known slug, if any,
    /// without appending it or anything after it.
    fn collect_page(
        items: Vec<NewsAbstract>,
        known: Option<&HashSet<String>>,
        seen: &mut HashSet<String>,
        collected: &mut Vec<NewsAbstract>,
    ) -> Option<String> {
        for item in items {
            if known.is_some_and(|k| k.contains(&item.slug)) {
                return Some(item.slug);
            }
            if seen.insert(item.slug.clone()) {
                collected.push(item);
            } else {
                log::debug!("Duplicate slug {} in listing, skipping", item.slug);
            }
        }
        None
    }
}
