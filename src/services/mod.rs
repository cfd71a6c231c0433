//! Service layer for the scraper.
//!
//! This module contains:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - HTML extraction behind a site adapter (`SiteAdapter`, `SelectorAdapter`)
//! - Record translation (`Translator`, `ChatTranslator`)

mod extractor;
mod fetcher;
mod translator;

pub use extractor::{SelectorAdapter, SiteAdapter};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use translator::{ChatTranslator, RetryPolicy, Translator, system_prompt};
