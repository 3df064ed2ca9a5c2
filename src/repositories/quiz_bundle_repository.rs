use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::FindOptions,
    Collection,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::MongoStore,
    errors::{AppError, AppResult},
    models::domain::QuizBundle,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Storage boundary for generated bundles. `persist` is all-or-nothing and
/// must fail with [`AppError::DuplicateUrl`] when the normalized URL is taken.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizBundleRepository: Send + Sync {
    async fn find_by_normalized_url(&self, normalized_url: &str) -> AppResult<Option<QuizBundle>>;
    async fn persist(&self, bundle: QuizBundle) -> AppResult<QuizBundle>;
    /// Newest first. `page` is 1-based. Returns the page and the total match count.
    async fn list_page(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>,
    ) -> AppResult<(Vec<QuizBundle>, u64)>;
    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<QuizBundle>>;
    async fn delete_by_id(&self, id: &str) -> AppResult<bool>;

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}

/// One document per bundle with its questions, entities and topics embedded,
/// so a single insert is the atomic unit. `created_at_ms` gives a sort key
/// that orders correctly regardless of timestamp formatting.
#[derive(Debug, Serialize, Deserialize)]
struct QuizBundleDocument {
    #[serde(flatten)]
    bundle: QuizBundle,
    created_at_ms: i64,
}

impl From<QuizBundle> for QuizBundleDocument {
    fn from(bundle: QuizBundle) -> Self {
        let created_at_ms = bundle.created_at.timestamp_millis();
        Self {
            bundle,
            created_at_ms,
        }
    }
}

pub struct MongoQuizBundleRepository {
    collection: Collection<QuizBundleDocument>,
    store: MongoStore,
}

impl MongoQuizBundleRepository {
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.quiz_bundles(),
            store: store.clone(),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

/// Number of bundles to skip for a 1-based `page`. Offsets that overflow or
/// that storage cannot represent as a signed 64-bit skip are rejected.
pub fn page_offset(page: u64, limit: u64) -> AppResult<u64> {
    page.saturating_sub(1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| AppError::BadRequest(format!("page {} is out of range", page)))
}

pub(crate) fn search_filter(search: Option<&str>) -> Document {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let pattern = regex::escape(term);
            doc! {
                "$or": [
                    { "title": { "$regex": &pattern, "$options": "i" } },
                    { "normalized_url": { "$regex": &pattern, "$options": "i" } },
                ]
            }
        }
        None => doc! {},
    }
}

#[async_trait]
impl QuizBundleRepository for MongoQuizBundleRepository {
    async fn find_by_normalized_url(&self, normalized_url: &str) -> AppResult<Option<QuizBundle>> {
        let found = self
            .collection
            .find_one(doc! { "normalized_url": normalized_url })
            .await?;
        Ok(found.map(|d| d.bundle))
    }

    async fn persist(&self, bundle: QuizBundle) -> AppResult<QuizBundle> {
        let document = QuizBundleDocument::from(bundle);

        match self.collection.insert_one(&document).await {
            Ok(_) => Ok(document.bundle),
            Err(e) if is_duplicate_key(&e) => {
                Err(AppError::DuplicateUrl(document.bundle.normalized_url))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_page(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>,
    ) -> AppResult<(Vec<QuizBundle>, u64)> {
        let skip = page_offset(page, limit)?;
        let filter = search_filter(search.as_deref());

        let total = self.collection.count_documents(filter.clone()).await?;

        let find_options = FindOptions::builder()
            .sort(doc! { "created_at_ms": -1 })
            .skip(Some(skip))
            .limit(Some(limit as i64))
            .build();

        let cursor = self.collection.find(filter).with_options(find_options).await?;
        let documents: Vec<QuizBundleDocument> = cursor.try_collect().await?;

        Ok((documents.into_iter().map(|d| d.bundle).collect(), total))
    }

    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<QuizBundle>> {
        let found = self.collection.find_one(doc! { "id": id }).await?;
        Ok(found.map(|d| d.bundle))
    }

    async fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_escapes_regex_metacharacters() {
        let filter = search_filter(Some("c++ (lang)"));
        let clauses = filter.get_array("$or").expect("search builds an $or filter");
        assert_eq!(clauses.len(), 2);

        let title = clauses[0]
            .as_document()
            .and_then(|d| d.get_document("title").ok())
            .expect("title clause");
        assert_eq!(title.get_str("$regex").ok(), Some(r"c\+\+ \(lang\)"));
        assert_eq!(title.get_str("$options").ok(), Some("i"));
    }

    #[test]
    fn test_page_offset_rejects_overflowing_pages() {
        assert_eq!(page_offset(1, 20).ok(), Some(0));
        assert_eq!(page_offset(3, 20).ok(), Some(40));
        assert!(matches!(
            page_offset(u64::MAX, 100),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            page_offset(u64::MAX / 100, 100),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_blank_search_matches_everything() {
        assert!(search_filter(None).is_empty());
        assert!(search_filter(Some("   ")).is_empty());
    }
}
