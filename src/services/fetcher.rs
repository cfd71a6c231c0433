// src/services/fetcher.rs

//! Page fetching with status-code classification.
//!
//! A 404 on a listing page is reported as [`AppError::NotFound`], which the
//! walker treats as the end of the listing. Every other non-success status
//! and every network-level error becomes [`AppError::FetchFailed`]. Nothing
//! is retried here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http::create_async_client;

/// Source of raw listing and article HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch listing page `page` (1-based).
    async fn fetch_listing_page(&self, page: u32) -> Result<String>;

    /// Fetch an article page by absolute URL.
    async fn fetch_article_page(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    origin: Url,
}

impl HttpFetcher {
    /// Build a fetcher with its own client from crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Self::with_client(client, &config.origin)
    }

    /// Build a fetcher around an existing client.
    pub fn with_client(client: Client, origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)?;
        Ok(Self { client, origin })
    }

    /// Listing URL for a page: `{origin}/news/page/{page}/`.
    pub fn listing_url(&self, page: u32) -> Result<Url> {
        Ok(self.origin.join(&format!("/news/page/{page}/"))?)
    }

    async fn get_text(&self, url: &str, not_found_is_end: bool) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch_failed(url, e.status().map(|s| s.as_u16()), e))?;

        let status = response.status();
        if not_found_is_end && status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(AppError::fetch_failed(
                url,
                Some(status.as_u16()),
                format!("HTTP {status}"),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::fetch_failed(url, Some(status.as_u16()), e))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_listing_page(&self, page: u32) -> Result<String> {
        let url = self.listing_url(page)?;
        log::debug!("GET {url}");
        self.get_text(url.as_str(), true).await
    }

    async fn fetch_article_page(&self, url: &str) -> Result<String> {
        log::debug!("GET {url}");
        self.get_text(url, false).await
    }
}
