// src/pipeline/translate.rs

//! Batch translation of the canonical collection.
//!
//! For a target language, every canonical record whose slug is missing from
//! that language's collection is sent to the translator. The collection is
//! written after each record and sorted by date once the batch is done.

use std::collections::HashSet;
use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Category, Language, NewsContent, TranslationConfig};
use crate::pipeline::merge::ContentAccumulator;
use crate::services::{RetryPolicy, Translator};
use crate::storage::NewsStorage;

/// Summary of one language's translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Canonical records missing from the target collection
    pub candidates: usize,
    pub translated: usize,
    /// Malformed replies stored untranslated, category label aside
    pub fallbacks: usize,
    /// Records whose retries ran out; left for the next run
    pub skipped: usize,
    pub persist_failures: usize,
    pub total: usize,
}

impl fmt::Display for TranslationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates, {} translated, {} untranslated fallbacks, {} skipped, {} failed writes, {} stored",
            self.candidates,
            self.translated,
            self.fallbacks,
            self.skipped,
            self.persist_failures,
            self.total
        )
    }
}

enum Outcome {
    Translated(NewsContent),
    Fallback(NewsContent),
    Skipped,
}

pub struct TranslationJob {
    storage: Arc<dyn NewsStorage>,
    translator: Arc<dyn Translator>,
    policy: RetryPolicy,
    concurrency: usize,
}

impl TranslationJob {
    pub fn new(
        storage: Arc<dyn NewsStorage>,
        translator: Arc<dyn Translator>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            storage,
            translator,
            policy,
            concurrency: 1,
        }
    }

    pub fn from_config(
        config: &TranslationConfig,
        storage: Arc<dyn NewsStorage>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self::new(storage, translator, RetryPolicy::from_config(config))
            .with_concurrency(config.concurrency)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Translate each language in turn. One language failing does not stop
    /// the others.
    pub async fn run_all(&self, languages: &[Language]) -> Vec<(Language, Result<TranslationReport>)> {
        let mut reports = Vec::with_capacity(languages.len());
        for &lang in languages {
            log::info!("Translating to {} ({lang})", lang.native_name());
            reports.push((lang, self.run(lang).await));
        }
        reports
    }

    /// Bring `lang`'s collection up to date with the canonical one.
    pub async fn run(&self, lang: Language) -> Result<TranslationReport> {
        if lang == Language::CANONICAL {
            return Err(AppError::validation(format!(
                "{lang} is the source language and cannot be a translation target"
            )));
        }

        let source = self.storage.load_contents_or_empty(Language::CANONICAL).await;
        let target = self.storage.load_contents_or_empty(lang).await;
        let done: HashSet<&str> = target.iter().map(|c| c.slug.as_str()).collect();
        let pending: Vec<&NewsContent> = source
            .iter()
            .filter(|c| !done.contains(c.slug.as_str()))
            .collect();

        let mut report = TranslationReport {
            candidates: pending.len(),
            total: target.len(),
            ..TranslationReport::default()
        };
        if pending.is_empty() {
            log::info!("No new items to translate for {lang}");
            return Ok(report);
        }
        log::info!("Translating {} items to {lang}", pending.len());

        let mut acc = ContentAccumulator::new(target);
        let mut outcomes = pin!(
            stream::iter(pending.iter().copied())
                .map(|item| self.translate_one(item, lang))
                .buffer_unordered(self.concurrency)
        );

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Outcome::Translated(item) => {
                    report.translated += 1;
                    acc.push(item);
                }
                Outcome::Fallback(item) => {
                    report.fallbacks += 1;
                    acc.push(item);
                }
                Outcome::Skipped => report.skipped += 1,
            }
            if self.persist(lang, &acc).await.is_err() {
                report.persist_failures += 1;
            }
        }

        // Final sorted write for the batch.
        if self.persist(lang, &acc).await.is_err() {
            report.persist_failures += 1;
        }
        report.total = acc.snapshot().len();

        log::info!("Translation to {lang} finished: {report}");
        Ok(report)
    }

    async fn persist(&self, lang: Language, acc: &ContentAccumulator) -> Result<()> {
        self.storage
            .save_contents(lang, &acc.snapshot())
            .await
            .inspect_err(|e| log::error!("Failed to write {lang}/contents.json: {e}"))
    }

    async fn translate_one(&self, item: &NewsContent, lang: Language) -> Outcome {
        let payload = match serde_json::to_string(item) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Could not serialize {}: {e}", item.slug);
                return Outcome::Skipped;
            }
        };

        let reply = match self.policy.run(self.translator.as_ref(), &payload, lang).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Skipping {} for {lang}: {e}", item.slug);
                return Outcome::Skipped;
            }
        };

        match parse_translation(&reply, item) {
            Ok(translated) => {
                log::info!("Translated {} to {lang}", item.slug);
                Outcome::Translated(translated)
            }
            Err(e) => {
                log::warn!(
                    "Malformed {lang} translation for {}, keeping the original with a localized category: {e}",
                    item.slug
                );
                Outcome::Fallback(untranslated(item, lang))
            }
        }
    }
}

/// The source record with only its category label localized, so it still
/// shows up under its category in the target language.
fn untranslated(item: &NewsContent, lang: Language) -> NewsContent {
    let mut record = item.clone();
    if let Some(category) = Category::from_label(&item.category) {
        record.category = category.localized(lang).to_string();
    }
    record
}

#[derive(Deserialize)]
struct TranslatedRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    content: String,
}

/// Parse a translator reply into a record for `source`.
///
/// Every field must be present and non-empty. The source's slug and date
/// replace whatever the reply carries.
pub fn parse_translation(reply: &str, source: &NewsContent) -> Result<NewsContent> {
    let record: TranslatedRecord = serde_json::from_str(reply)?;
    let fields = [
        ("title", &record.title),
        ("category", &record.category),
        ("date", &record.date),
        ("slug", &record.slug),
        ("content", &record.content),
    ];
    if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(AppError::translation(format!("reply is missing {name}")));
    }

    Ok(NewsContent {
        title: record.title,
        category: record.category,
        date: source.date.clone(),
        slug: source.slug.clone(),
        content: record.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Copy)]
    enum Reply {
        Good,
        Garbage,
        Down,
    }

    /// Behaves per slug; unlisted slugs translate fine.
    #[derive(Default)]
    struct ScriptedTranslator {
        replies: HashMap<&'static str, Reply>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTranslator {
        fn with(replies: &[(&'static str, Reply)]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, payload: &str, lang: Language) -> Result<String> {
            let record: NewsContent = serde_json::from_str(payload)?;
            self.calls.lock().unwrap().push(record.slug.clone());
            match self.replies.get(record.slug.as_str()).copied().unwrap_or(Reply::Good) {
                Reply::Good => Ok(serde_json::json!({
                    "title": format!("[{lang}] {}", record.title),
                    "category": "記事",
                    "date": "1999-01-01",
                    "slug": "rewritten-by-model",
                    "content": format!("[{lang}] {}", record.content),
                })
                .to_string()),
                Reply::Garbage => Ok("Sorry, I cannot help with that.".into()),
                Reply::Down => Err(AppError::translation("HTTP 503")),
            }
        }
    }

    fn record(slug: &str, date: &str) -> NewsContent {
        NewsContent {
            title: format!("Title {slug}"),
            category: "Articles".into(),
            date: date.into(),
            slug: slug.into(),
            content: format!("Body {slug}"),
        }
    }

    fn job(storage: Arc<LocalStorage>, translator: Arc<ScriptedTranslator>) -> TranslationJob {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::ZERO,
        };
        TranslationJob::new(storage, translator, policy)
    }

    async fn seeded_storage(tmp: &TempDir) -> Arc<LocalStorage> {
        let storage = Arc::new(LocalStorage::new(tmp.path()));
        storage
            .save_contents(
                Language::En,
                &[
                    record("c", "2025-03-03"),
                    record("b", "2025-03-02"),
                    record("a", "2025-03-01"),
                ],
            )
            .await
            .unwrap();
        storage
    }

    #[test]
    fn test_parse_translation_forces_source_identity() {
        let source = record("a", "2025-03-01");
        let reply = r#"{"title":"標題","category":"記事","date":"2020-01-01","slug":"x","content":"本文"}"#;

        let parsed = parse_translation(reply, &source).unwrap();
        assert_eq!(parsed.slug, "a");
        assert_eq!(parsed.date, "2025-03-01");
        assert_eq!(parsed.title, "標題");
    }

    #[test]
    fn test_parse_translation_rejects_missing_fields() {
        let source = record("a", "2025-03-01");
        assert!(parse_translation(r#"{"title":"標題","slug":"a","date":"d"}"#, &source).is_err());
        assert!(parse_translation("not json", &source).is_err());
    }

    #[tokio::test]
    async fn test_translates_missing_records_sorted() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::default());

        let report = job(storage.clone(), translator).run(Language::Jp).await.unwrap();

        assert_eq!(report.candidates, 3);
        assert_eq!(report.translated, 3);
        let stored = storage.load_contents(Language::Jp).await.unwrap();
        let slugs: Vec<_> = stored.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b", "a"]);
        assert_eq!(stored[0].title, "[jp] Title c");
        assert_eq!(stored[0].date, "2025-03-03");
    }

    #[tokio::test]
    async fn test_only_missing_slugs_are_sent() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        storage
            .save_contents(Language::Cn, &[record("b", "2025-03-02")])
            .await
            .unwrap();
        let translator = Arc::new(ScriptedTranslator::default());

        let report = job(storage.clone(), translator.clone())
            .run(Language::Cn)
            .await
            .unwrap();

        assert_eq!(report.candidates, 2);
        assert_eq!(report.total, 3);
        assert_eq!(*translator.calls.lock().unwrap(), vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back_to_original() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::with(&[("b", Reply::Garbage)]));

        let report = job(storage.clone(), translator).run(Language::Kp).await.unwrap();

        assert_eq!(report.translated, 2);
        assert_eq!(report.fallbacks, 1);
        let stored = storage.article(Language::Kp, "b").await.unwrap();
        let original = record("b", "2025-03-02");
        assert_eq!(stored.title, original.title);
        assert_eq!(stored.content, original.content);
        assert_eq!(stored.date, original.date);
        assert_eq!(stored.category, Category::Articles.localized(Language::Kp));
    }

    #[tokio::test]
    async fn test_fallback_record_is_listed_under_its_category() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::with(&[
            ("a", Reply::Garbage),
            ("b", Reply::Garbage),
            ("c", Reply::Garbage),
        ]));

        job(storage.clone(), translator).run(Language::Jp).await.unwrap();

        let listed = storage
            .articles_by_category(Language::Jp, Category::Articles)
            .await;
        let slugs: Vec<_> = listed.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_exhausted_retries_skip_the_record() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::with(&[("a", Reply::Down)]));

        let report = job(storage.clone(), translator.clone())
            .run(Language::Jp)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.total, 2);
        let attempts_for_a = translator
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.as_str() == "a")
            .count();
        assert_eq!(attempts_for_a, 4);
        assert!(storage.article(Language::Jp, "a").await.is_none());
    }

    #[tokio::test]
    async fn test_canonical_language_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::default());

        assert!(job(storage, translator).run(Language::En).await.is_err());
    }

    #[tokio::test]
    async fn test_run_all_covers_each_language() {
        let tmp = TempDir::new().unwrap();
        let storage = seeded_storage(&tmp).await;
        let translator = Arc::new(ScriptedTranslator::default());

        let reports = job(storage, translator)
            .with_concurrency(2)
            .run_all(&[Language::Cn, Language::Jp])
            .await;

        assert_eq!(reports.len(), 2);
        for (_, report) in reports {
            assert_eq!(report.unwrap().translated, 3);
        }
    }
}
