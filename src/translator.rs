//! Bulk text translation through the Google Cloud Translation v2 API.
//!
//! The pipeline only depends on the [`Translator`] trait, so tests and
//! other providers can stand in for the HTTP client.

use crate::config::{ApiConfig, TranslationConfig};
use crate::console::Console;
use crate::error::TranslationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of strings the provider accepts in one request.
pub const PROVIDER_MAX_BATCH: usize = 128;

/// A capability that translates many strings in one call.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Largest number of strings accepted by one `translate_batch` call.
    fn max_batch_size(&self) -> usize;

    /// Translates `texts` from `source` to `target`.
    ///
    /// The result has the same length and order as `texts`.
    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, TranslationError>;
}

/// Request body for the translate endpoint.
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

/// Response from the translate endpoint.
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Translator backed by the Google Cloud Translation REST API.
pub struct GoogleTranslator {
    /// HTTP client for API requests.
    client: Client,
    /// API configuration.
    api_config: ApiConfig,
    /// Retry and pacing configuration.
    translation_config: TranslationConfig,
    /// Console for output.
    console: Console,
}

impl GoogleTranslator {
    /// Create a new GoogleTranslator.
    pub fn new(api_config: ApiConfig, translation_config: TranslationConfig) -> Self {
        Self {
            client: Client::new(),
            api_config,
            translation_config,
            console: Console::new(),
        }
    }

    /// Sends one request without retrying.
    async fn request_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let request = TranslateRequest {
            q: texts,
            source,
            target,
            format: "text",
        };

        let response = self
            .client
            .post(&self.api_config.base_url)
            .header("X-Goog-Api-Key", &self.api_config.key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TranslationError::ApiError(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let body = response.text().await?;
        let parsed: TranslateResponse =
            serde_json::from_str(&body).map_err(|e| TranslationError::ParseError(e.to_string()))?;

        let translations: Vec<String> = parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect();

        if translations.len() != texts.len() {
            return Err(TranslationError::LengthMismatch {
                expected: texts.len(),
                actual: translations.len(),
            });
        }

        Ok(translations)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn max_batch_size(&self) -> usize {
        self.translation_config.batch_size.min(PROVIDER_MAX_BATCH)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, TranslationError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.len() > self.max_batch_size() {
            return Err(TranslationError::InvalidConfig(format!(
                "batch of {} strings exceeds the limit of {}",
                texts.len(),
                self.max_batch_size()
            )));
        }

        let attempts = self.translation_config.retries.max(1);
        let mut attempt = 0;

        loop {
            match self.request_batch(texts, source, target).await {
                Ok(translations) => {
                    if self.translation_config.delay_between_requests_sec > 0.0 {
                        tokio::time::sleep(Duration::from_secs_f64(
                            self.translation_config.delay_between_requests_sec,
                        ))
                        .await;
                    }
                    return Ok(translations);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(TranslationError::RetriesExhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }

                    // Exponential backoff
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    self.console.warning(&format!(
                        "Translation failed ({}), retrying in {:?} (attempt {}/{})",
                        e,
                        delay,
                        attempt + 1,
                        attempts
                    ));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let texts = vec!["Attack".to_string(), "Flee".to_string()];
        let request = TranslateRequest {
            q: &texts,
            source: "en",
            target: "fr",
            format: "text",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"][1], "Flee");
        assert_eq!(json["source"], "en");
        assert_eq!(json["target"], "fr");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"data":{"translations":[{"translatedText":"Attaquer","detectedSourceLanguage":"en"},{"translatedText":"Fuir"}]}}"#;
        let parsed: TranslateResponse = serde_json::from_str(body).unwrap();
        let texts: Vec<String> = parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect();
        assert_eq!(texts, vec!["Attaquer", "Fuir"]);
    }

    #[test]
    fn test_batch_size_capped_by_provider() {
        let mut config = TranslationConfig::default();
        config.batch_size = 500;
        let translator = GoogleTranslator::new(ApiConfig::default(), config);
        assert_eq!(translator.max_batch_size(), PROVIDER_MAX_BATCH);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let translator = GoogleTranslator::new(ApiConfig::default(), TranslationConfig::default());
        let result = translator.translate_batch(&[], "en", "fr").await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let mut config = TranslationConfig::default();
        config.batch_size = 2;
        let translator = GoogleTranslator::new(ApiConfig::default(), config);
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(matches!(
            translator.translate_batch(&texts, "en", "fr").await,
            Err(TranslationError::InvalidConfig(_))
        ));
    }
}
