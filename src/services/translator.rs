// src/services/translator.rs

//! Translation client for content records.
//!
//! Records are sent as a JSON object and the model is asked to return the same
//! object with `title`, `category` and `content` translated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Category, Language, TranslationConfig};

/// Proper names with a fixed rendering in every target language.
const FIXED_TRANSLATIONS: &[(&str, [(Language, &str); 3])] = &[(
    "Donald J. Trump",
    [
        (Language::Cn, "唐纳德·J·特朗普"),
        (Language::Jp, "ドナルド・J・トランプ"),
        (Language::Kp, "도널드 제이 트럼프"),
    ],
)];

/// Turns a serialized record into its translated form.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a JSON-encoded record into `lang`, returning the raw reply.
    async fn translate(&self, payload: &str, lang: Language) -> Result<String>;
}

/// Attempt cap and linear backoff for translation calls.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            base_delay: config.retry_delay(),
        }
    }

    /// Wait after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }

    /// Call the translator until it succeeds or attempts run out.
    pub async fn run(
        &self,
        translator: &dyn Translator,
        payload: &str,
        lang: Language,
    ) -> Result<String> {
        let mut attempt = 0;
        loop {
            match translator.translate(payload, lang).await {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt + 1 >= self.max_attempts => {
                    log::error!(
                        "Translation to {lang} failed after {} attempts: {e}",
                        attempt + 1
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    log::warn!(
                        "Translation to {lang} failed (attempt {}/{}): {e}. Retrying in {:?}",
                        attempt + 1,
                        self.max_attempts,
                        delay
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct ChatTranslator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatTranslator {
    /// Build a translator, reading the API key from the configured variable.
    pub fn from_config(client: Client, config: &TranslationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            AppError::config(format!("{} is not set", config.api_key_env))
        })?;
        Ok(Self::new(client, &config.api_base, &config.model, api_key))
    }

    pub fn new(client: Client, api_base: &str, model: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Translator for ChatTranslator {
    async fn translate(&self, payload: &str, lang: Language) -> Result<String> {
        let prompt = system_prompt(lang);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: payload,
                },
            ],
        };

        log::debug!("Requesting {lang} translation, {} bytes", payload.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::translation(format!("HTTP {status}")));
        }

        let body: ChatResponse = response.json().await?;
        let reply = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(strip_code_fence(reply.trim()).to_string())
    }
}

/// Instructions sent with every record.
pub fn system_prompt(lang: Language) -> String {
    let mut prompt = format!(
        "You are a professional translator. Translate the JSON object to {}. \
         Only translate the values of \"title\", \"category\", and \"content\" fields. \
         Do not translate any other fields or keys. \
         Preserve all formatting, markdown, and structure in the content.\n\n\
         Use these specific translations for the following terms:\n",
        lang.native_name()
    );
    for (term, renderings) in FIXED_TRANSLATIONS {
        if let Some((_, rendered)) = renderings.iter().find(|(l, _)| *l == lang) {
            prompt.push_str(&format!("- \"{term}\" should be translated as \"{rendered}\"\n"));
        }
    }
    prompt.push_str("\nFor categories, use these specific translations:\n");
    for category in Category::ALL {
        prompt.push_str(&format!(
            "- \"{}\" should be translated as \"{}\"\n",
            category.label(),
            category.localized(lang)
        ));
    }
    prompt.push_str("\nReturn only the translated JSON object.");
    prompt
}

/// Models sometimes wrap JSON in a ```json fence.
fn strip_code_fence(reply: &str) -> &str {
    let Some(inner) = reply.strip_prefix("```") else {
        return reply;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Flaky {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Translator for Flaky {
        async fn translate(&self, payload: &str, _lang: Language) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(AppError::translation("busy"))
            } else {
                Ok(payload.to_uppercase())
            }
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_retry_recovers_within_cap() {
        let flaky = Flaky {
            failures: 3,
            calls: AtomicU32::new(0),
        };
        let reply = policy(4).run(&flaky, "abc", Language::Jp).await.unwrap();
        assert_eq!(reply, "ABC");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_retry_gives_up_at_cap() {
        let flaky = Flaky {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        assert!(policy(4).run(&flaky, "abc", Language::Jp).await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_system_prompt_mentions_category_labels() {
        let prompt = system_prompt(Language::Jp);
        assert!(prompt.contains("日本語"));
        assert!(prompt.contains("\"Remarks\" should be translated as \"発言\""));
        assert!(prompt.contains("ドナルド・J・トランプ"));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_chat_translator_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": " {\"title\":\"記事\"} " } }]
            })))
            .mount(&server)
            .await;

        let translator = ChatTranslator::new(Client::new(), &server.uri(), "deepseek-chat", "test-key");
        let reply = translator.translate("{}", Language::Jp).await.unwrap();
        assert_eq!(reply, "{\"title\":\"記事\"}");
    }

    #[tokio::test]
    async fn test_chat_translator_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = ChatTranslator::new(Client::new(), &server.uri(), "m", "k");
        assert!(matches!(
            translator.translate("{}", Language::Cn).await,
            Err(AppError::Translation(_))
        ));
    }
}
