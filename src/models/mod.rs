// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod news;
mod selectors;

// Re-export all public types
pub use category::{Category, Language};
pub use config::{Config, CrawlerConfig, PathsConfig, TranslationConfig};
pub use news::{NewsAbstract, NewsContent};
pub use selectors::SiteSelectors;
