use std::sync::Arc;

use url::Url;

use crate::{
    errors::{AppResult, ExtractionError},
    models::domain::QuizBundle,
    repositories::QuizBundleRepository,
};

/// Canonical lookup key for a source URL: scheme, lowercased host,
/// non-default port and path without trailing slashes. Query strings and
/// fragments are dropped.
pub fn normalize_url(raw: &str) -> Result<String, ExtractionError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ExtractionError::invalid_url(format!("'{}' is not a valid URL: {}", raw.trim(), e)))?;

    let host = url
        .host_str()
        .ok_or_else(|| ExtractionError::invalid_url("URL has no host"))?
        .to_lowercase();

    let mut normalized = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }
    normalized.push_str(url.path().trim_end_matches('/'));

    Ok(normalized)
}

/// Short-circuits generation for URLs that already have a bundle.
pub struct DuplicateUrlResolver {
    repository: Arc<dyn QuizBundleRepository>,
}

impl DuplicateUrlResolver {
    pub fn new(repository: Arc<dyn QuizBundleRepository>) -> Self {
        Self { repository }
    }

    pub async fn resolve(&self, normalized_url: &str) -> AppResult<Option<QuizBundle>> {
        let existing = self.repository.find_by_normalized_url(normalized_url).await?;
        if let Some(bundle) = &existing {
            log::info!(
                "Found existing quiz {} for {}",
                bundle.id,
                normalized_url
            );
        }
        Ok(existing)
    }
}
