use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizBundle,
    repositories::{quiz_bundle_repository::page_offset, QuizBundleRepository},
};

/// Process-local storage. The duplicate check and the insert happen under
/// one write lock, which gives the same guarantee as a unique index.
#[derive(Default)]
pub struct MemoryQuizBundleRepository {
    bundles: RwLock<Vec<QuizBundle>>,
}

impl MemoryQuizBundleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bundles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bundles.read().await.is_empty()
    }
}

fn matches_search(bundle: &QuizBundle, term: &str) -> bool {
    bundle.title.to_lowercase().contains(term) || bundle.normalized_url.to_lowercase().contains(term)
}

#[async_trait]
impl QuizBundleRepository for MemoryQuizBundleRepository {
    async fn find_by_normalized_url(&self, normalized_url: &str) -> AppResult<Option<QuizBundle>> {
        let bundles = self.bundles.read().await;
        Ok(bundles
            .iter()
            .find(|b| b.normalized_url == normalized_url)
            .cloned())
    }

    async fn persist(&self, bundle: QuizBundle) -> AppResult<QuizBundle> {
        let mut bundles = self.bundles.write().await;

        if bundles
            .iter()
            .any(|b| b.normalized_url == bundle.normalized_url)
        {
            return Err(AppError::DuplicateUrl(bundle.normalized_url));
        }

        if bundles.iter().any(|b| b.id == bundle.id) {
            return Err(AppError::PersistenceError(format!(
                "bundle id {} already exists",
                bundle.id
            )));
        }

        bundles.push(bundle.clone());
        Ok(bundle)
    }

    async fn list_page(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>,
    ) -> AppResult<(Vec<QuizBundle>, u64)> {
        let skip = page_offset(page, limit)? as usize;
        let bundles = self.bundles.read().await;
        let term = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matching: Vec<&QuizBundle> = bundles
            .iter()
            .filter(|b| term.as_deref().map_or(true, |t| matches_search(b, t)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<QuizBundle>> {
        let bundles = self.bundles.read().await;
        Ok(bundles.iter().find(|b| b.id == id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        let mut bundles = self.bundles.write().await;
        let before = bundles.len();
        bundles.retain(|b| b.id != id);
        Ok(bundles.len() < before)
    }
}
