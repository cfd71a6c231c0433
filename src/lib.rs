// src/lib.rs

//! Newsroom: scraper and content store for a paginated news listing.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
