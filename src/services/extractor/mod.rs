pub mod html;
pub mod profiles;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use url::Url;

use crate::{
    config::Config,
    errors::ExtractionError,
    models::domain::Article,
    services::extractor::profiles::SourceProfiles,
};

/// Host prefixes that must never be fetched on behalf of a caller.
const BLOCKED_HOST_PREFIXES: &[&str] = &[
    "localhost",
    "127.",
    "0.0.0.0",
    "10.",
    "172.16.",
    "192.168.",
    "169.254.",
    "[::1]",
    "metadata.google.internal",
];

/// Fetches raw HTML. Split out so the extractor can be driven from fixtures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, ExtractionError>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| ExtractionError::unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String, ExtractionError> {
        let response = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, &self.user_agent)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::unreachable(format!(
                        "request timed out after {}s",
                        timeout.as_secs()
                    ))
                } else {
                    ExtractionError::unreachable(format!("failed to fetch URL: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::unreachable(format!(
                "source returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ExtractionError::unreachable(format!("failed to read response body: {}", e)))
    }
}

/// Parses and screens a caller-supplied URL before any network access.
pub fn validate_url(raw: &str) -> Result<Url, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::invalid_url("URL is empty"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ExtractionError::invalid_url(format!("'{}' is not a valid URL: {}", trimmed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ExtractionError::invalid_url(format!(
            "unsupported scheme '{}', only http and https are allowed",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .ok_or_else(|| ExtractionError::invalid_url("URL has no host"))?
        .to_lowercase();

    if BLOCKED_HOST_PREFIXES
        .iter()
        .any(|prefix| host.starts_with(prefix))
    {
        return Err(ExtractionError::blocked(format!(
            "access to '{}' is not allowed",
            host
        )));
    }

    Ok(url)
}

pub struct ContentExtractor {
    fetcher: Arc<dyn PageFetcher>,
    profiles: SourceProfiles,
    timeout: Duration,
    min_words: usize,
}

impl ContentExtractor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        profiles: SourceProfiles,
        timeout: Duration,
        min_words: usize,
    ) -> Self {
        Self {
            fetcher,
            profiles,
            timeout,
            min_words,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ExtractionError> {
        let fetcher = HttpPageFetcher::new(&config.user_agent)?;
        Ok(Self::new(
            Arc::new(fetcher),
            SourceProfiles::default(),
            config.request_timeout(),
            config.min_content_words,
        ))
    }

    /// Fetches `raw_url` and returns its cleaned, sectioned text.
    pub async fn extract(&self, raw_url: &str) -> Result<Article, ExtractionError> {
        let url = validate_url(raw_url)?;
        let profile = self.profiles.for_url(&url);

        log::info!("Extracting {} with the {} profile", url, profile.name());

        let html = tokio::time::timeout(self.timeout, self.fetcher.fetch(&url, self.timeout))
            .await
            .map_err(|_| {
                ExtractionError::unreachable(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        if html.trim().is_empty() {
            return Err(ExtractionError::empty("source returned an empty page"));
        }

        let article = html::parse_article(raw_url.trim(), &html, profile.as_ref())?;

        if article.word_count == 0 {
            return Err(ExtractionError::empty("no readable text found on the page"));
        }

        if article.word_count < self.min_words {
            return Err(ExtractionError::empty(format!(
                "article is too short ({} words), minimum required is {} words",
                article.word_count, self.min_words
            )));
        }

        log::info!(
            "Extracted '{}' ({} words, {} sections)",
            article.title,
            article.word_count,
            article.sections.len()
        );

        Ok(article)
    }
}
