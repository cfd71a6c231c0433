//! Diff and merge of content collections.
//!
//! Slugs are the only identity: an item whose slug is already stored is
//! "already present" and never replaces the stored record.

use std::collections::HashSet;

use crate::models::{NewsAbstract, NewsContent};

/// Abstracts whose slug is not in `existing`, in input order.
///
/// Repeated slugs within `abstracts` are kept once.
pub fn missing_from(abstracts: &[NewsAbstract], existing: &[NewsContent]) -> Vec<NewsAbstract> {
    let mut seen: HashSet<&str> = existing.iter().map(|c| c.slug.as_str()).collect();
    abstracts
        .iter()
        .filter(|a| seen.insert(a.slug.as_str()))
        .cloned()
        .collect()
}

/// Stable sort by `date` descending. Records with equal dates keep their
/// relative order; empty dates sort last.
pub fn sort_by_date_desc(items: &mut [NewsContent]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Merge newly fetched records into a stored collection.
///
/// New records go in front of existing ones before the stable date sort,
/// so on equal dates the newer fetch comes first. New records whose slug is
/// already stored are dropped.
pub fn merge(existing: &[NewsContent], new_items: &[NewsContent]) -> Vec<NewsContent> {
    let mut seen: HashSet<&str> = existing.iter().map(|c| c.slug.as_str()).collect();
    let mut merged: Vec<NewsContent> = new_items
        .iter()
        .filter(|c| seen.insert(c.slug.as_str()))
        .cloned()
        .collect();
    merged.extend(existing.iter().cloned());
    sort_by_date_desc(&mut merged);
    merged
}

/// Prepend newly discovered abstracts to the stored list. The list is not
/// re-sorted: it is newest-first because the listing is.
pub fn prepend_abstracts(new_items: &[NewsAbstract], existing: &[NewsAbstract]) -> Vec<NewsAbstract> {
    let mut seen: HashSet<&str> = existing.iter().map(|a| a.slug.as_str()).collect();
    let mut combined: Vec<NewsAbstract> = new_items
        .iter()
        .filter(|a| seen.insert(a.slug.as_str()))
        .cloned()
        .collect();
    combined.extend(existing.iter().cloned());
    combined
}

/// Records fetched during one run, held apart from the collection they
/// will be merged into.
#[derive(Debug, Clone, Default)]
pub struct ContentAccumulator {
    existing: Vec<NewsContent>,
    added: Vec<NewsContent>,
}

impl ContentAccumulator {
    pub fn new(existing: Vec<NewsContent>) -> Self {
        Self {
            existing,
            added: Vec::new(),
        }
    }

    pub fn push(&mut self, item: NewsContent) {
        self.added.push(item);
    }

    /// The collection as it should be on disk right now.
    pub fn snapshot(&self) -> Vec<NewsContent> {
        merge(&self.existing, &self.added)
    }
}
