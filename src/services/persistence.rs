use std::sync::Arc;

use uuid::Uuid;

use crate::{errors::AppResult, models::domain::QuizBundle, repositories::QuizBundleRepository};

/// Assigns identifiers and hands the bundle to storage in one write.
pub struct PersistenceCoordinator {
    repository: Arc<dyn QuizBundleRepository>,
}

impl PersistenceCoordinator {
    pub fn new(repository: Arc<dyn QuizBundleRepository>) -> Self {
        Self { repository }
    }

    pub async fn persist(&self, bundle: QuizBundle) -> AppResult<QuizBundle> {
        let bundle = assign_ids(bundle);
        log::info!(
            "Persisting quiz {} for {} ({} questions)",
            bundle.id,
            bundle.normalized_url,
            bundle.questions.len()
        );
        self.repository.persist(bundle).await
    }
}

fn assign_ids(mut bundle: QuizBundle) -> QuizBundle {
    bundle.id = Uuid::new_v4().to_string();
    for question in &mut bundle.questions {
        question.id = Uuid::new_v4().to_string();
    }
    for topic in &mut bundle.related_topics {
        topic.id = Uuid::new_v4().to_string();
    }
    bundle
}
