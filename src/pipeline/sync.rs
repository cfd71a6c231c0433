// src/pipeline/sync.rs

//! Content synchronization: backfill and incremental update.
//!
//! Each article is fetched, merged into the canonical collection and written
//! out before the next one is handled, so an interrupted run keeps everything
//! fetched so far and a rerun resumes from the first missing slug.

use std::collections::HashSet;
use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;

use crate::error::Result;
use crate::models::{Config, Language, NewsAbstract, NewsContent};
use crate::pipeline::merge::{ContentAccumulator, missing_from, prepend_abstracts};
use crate::pipeline::walk::{WalkOutcome, Walker};
use crate::services::{HttpFetcher, PageFetcher, SelectorAdapter, SiteAdapter};
use crate::storage::NewsStorage;
use crate::utils::pacer::{FixedDelay, Pacer};

/// Summary of one per-item content loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Abstracts not yet in the canonical collection
    pub candidates: usize,
    pub fetched: usize,
    pub failed: usize,
    /// Writes that failed; the run carried on in memory
    pub persist_failures: usize,
    /// Records in the collection at the end of the run
    pub total: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates, {} fetched, {} failed, {} failed writes, {} stored",
            self.candidates, self.fetched, self.failed, self.persist_failures, self.total
        )
    }
}

/// Result of a full listing crawl.
#[derive(Debug, Clone)]
pub struct ListReport {
    pub walk: WalkOutcome,
    /// Whether `news-list.json` was rewritten
    pub persisted: bool,
}

/// Result of an incremental update.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub list: ListReport,
    pub contents: SyncReport,
}

/// Keeps the canonical collection in step with the news listing.
pub struct Synchronizer {
    fetcher: Arc<dyn PageFetcher>,
    adapter: Arc<dyn SiteAdapter>,
    storage: Arc<dyn NewsStorage>,
    pacer: Arc<dyn Pacer>,
    max_concurrent: usize,
    max_pages: Option<u32>,
}

impl Synchronizer {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        adapter: Arc<dyn SiteAdapter>,
        storage: Arc<dyn NewsStorage>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            fetcher,
            adapter,
            storage,
            pacer,
            max_concurrent: 1,
            max_pages: None,
        }
    }

    /// Wire up the HTTP fetcher, selector adapter and fixed pacing from config.
    pub fn from_config(config: &Config, storage: Arc<dyn NewsStorage>) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.crawler)?;
        let adapter = SelectorAdapter::new(&config.selectors, &config.crawler.origin)?;
        let pacer = FixedDelay::new(config.crawler.request_delay());

        Ok(Self::new(Arc::new(fetcher), Arc::new(adapter), storage, Arc::new(pacer))
            .with_max_concurrent(config.crawler.max_concurrent)
            .with_max_pages(config.crawler.max_pages))
    }

    /// Allow up to `max_concurrent` article fetches in flight.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn walker(&self) -> Walker<'_> {
        Walker::new(self.fetcher.as_ref(), self.adapter.as_ref(), self.pacer.as_ref())
            .with_max_pages(self.max_pages)
    }

    /// Walk every listing page and overwrite `news-list.json` with the result.
    ///
    /// A walk that collects nothing leaves the stored list alone.
    pub async fn crawl_list(&self) -> ListReport {
        let walk = self.walker().walk_all().await;
        if walk.abstracts.is_empty() {
            log::warn!("Listing walk collected no items ({}); keeping the stored list", walk.stop);
            return ListReport {
                walk,
                persisted: false,
            };
        }

        let persisted = match self.storage.save_abstracts(&walk.abstracts).await {
            Ok(()) => {
                log::info!("Saved {} news items to the news list", walk.abstracts.len());
                true
            }
            Err(e) => {
                log::error!("Failed to save the news list: {e}");
                false
            }
        };
        ListReport { walk, persisted }
    }

    /// Fetch every abstract missing from the canonical collection.
    pub async fn backfill(&self, abstracts: &[NewsAbstract]) -> SyncReport {
        self.sync_contents(abstracts).await
    }

    /// Collect listing items newer than the stored list, prepend them and
    /// fetch their articles.
    pub async fn update(&self) -> UpdateReport {
        let existing = self.storage.load_abstracts_or_empty().await;
        let known: HashSet<String> = existing.iter().map(|a| a.slug.clone()).collect();
        log::info!("Loaded {} known news items", known.len());

        let walk = self.walker().walk_new(&known).await;
        let mut persisted = false;
        if walk.abstracts.is_empty() {
            log::info!("No new news items found");
        } else {
            log::info!("Found {} new news items", walk.abstracts.len());
            let combined = prepend_abstracts(&walk.abstracts, &existing);
            match self.storage.save_abstracts(&combined).await {
                Ok(()) => persisted = true,
                Err(e) => log::error!("Failed to save the news list: {e}"),
            }
        }

        let contents = self.sync_contents(&walk.abstracts).await;
        UpdateReport {
            list: ListReport { walk, persisted },
            contents,
        }
    }

    async fn sync_contents(&self, abstracts: &[NewsAbstract]) -> SyncReport {
        let existing = self.storage.load_contents_or_empty(Language::CANONICAL).await;
        let pending = missing_from(abstracts, &existing);
        let mut report = SyncReport {
            candidates: pending.len(),
            total: existing.len(),
            ..SyncReport::default()
        };

        if pending.is_empty() {
            log::info!("All {} listed items are already stored", abstracts.len());
            return report;
        }
        log::info!("Fetching {} articles", pending.len());

        let mut acc = ContentAccumulator::new(existing);
        let mut results = pin!(
            stream::iter(pending.iter())
                .map(|item| self.fetch_content(item))
                .buffered(self.max_concurrent)
        );

        let mut index = 0;
        while let Some((item, result)) = results.next().await {
            index += 1;
            match result {
                Ok(content) => {
                    log::info!("[{index}/{}] Fetched {}", pending.len(), item.slug);
                    acc.push(content);
                    report.fetched += 1;
                }
                Err(e) => {
                    log::error!("[{index}/{}] Error processing {}: {e}", pending.len(), item.url);
                    report.failed += 1;
                }
            }

            let snapshot = acc.snapshot();
            report.total = snapshot.len();
            if let Err(e) = self
                .storage
                .save_contents(Language::CANONICAL, &snapshot)
                .await
            {
                log::error!("Failed to write contents after {}: {e}", item.slug);
                report.persist_failures += 1;
            }

            if index < pending.len() {
                self.pacer.pause().await;
            }
        }

        log::info!("Content sync finished: {report}");
        report
    }

    async fn fetch_content<'a>(
        &self,
        item: &'a NewsAbstract,
    ) -> (&'a NewsAbstract, Result<NewsContent>) {
        let result = async {
            let html = self.fetcher.fetch_article_page(&item.url).await?;
            let article = self.adapter.extract_article(&html);
            if !article.slug.is_empty() && article.slug != item.slug {
                log::debug!(
                    "Article slug {} differs from listing slug {}; keeping the listing's",
                    article.slug,
                    item.slug
                );
            }
            Ok(NewsContent::from_abstract(item, article.content))
        }
        .await;
        (item, result)
    }
}
