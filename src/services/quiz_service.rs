use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    config::Config,
    errors::{AppError, AppResult, GenerationError},
    models::domain::{
        quiz::{MAX_QUESTIONS, MIN_QUESTIONS},
        GenerationStage, KeyEntities, QualityWarning, QuizBundle,
    },
    repositories::QuizBundleRepository,
    services::{
        extractor::{validate_url, ContentExtractor},
        llm::LanguageModel,
        normalizer::Normalizer,
        persistence::PersistenceCoordinator,
        retry::RetryPolicy,
        stages::{extract_entities, generate_quiz, suggest_topics, summarize, StageRunner},
        url_resolver::{normalize_url, DuplicateUrlResolver},
        validator::{grounding_warnings, recheck_bundle, suppress_duplicates},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub attempt_timeout: Duration,
    pub content_token_budget: usize,
    pub topic_token_budget: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.llm_max_attempts,
            backoff_base: config.llm_backoff_base(),
            attempt_timeout: config.llm_timeout(),
            content_token_budget: config.content_token_budget,
            topic_token_budget: config.topic_token_budget,
        }
    }
}

/// Entry point for quiz generation and the stored-quiz queries.
pub struct QuizService {
    repository: Arc<dyn QuizBundleRepository>,
    extractor: ContentExtractor,
    runner: StageRunner,
    resolver: DuplicateUrlResolver,
    persistence: PersistenceCoordinator,
    content_normalizer: Normalizer,
    topic_normalizer: Normalizer,
}

impl QuizService {
    pub fn new(
        repository: Arc<dyn QuizBundleRepository>,
        extractor: ContentExtractor,
        model: Arc<dyn LanguageModel>,
        settings: PipelineSettings,
    ) -> Self {
        let policy = RetryPolicy::new(settings.max_attempts, settings.backoff_base);

        Self {
            resolver: DuplicateUrlResolver::new(repository.clone()),
            persistence: PersistenceCoordinator::new(repository.clone()),
            repository,
            extractor,
            runner: StageRunner::new(model, policy, settings.attempt_timeout),
            content_normalizer: Normalizer::new(settings.content_token_budget),
            topic_normalizer: Normalizer::new(settings.topic_token_budget),
        }
    }

    /// Runs the whole pipeline for `raw_url`, or returns the stored bundle
    /// when the normalized URL was generated before.
    pub async fn generate(&self, raw_url: &str, num_questions: usize) -> AppResult<QuizBundle> {
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&num_questions) {
            return Err(AppError::BadRequest(format!(
                "num_questions must be between {} and {}",
                MIN_QUESTIONS, MAX_QUESTIONS
            )));
        }

        validate_url(raw_url)?;
        let normalized_url = normalize_url(raw_url)?;

        if let Some(existing) = self.resolver.resolve(&normalized_url).await? {
            return Ok(existing);
        }

        let article = self.extractor.extract(raw_url).await?;
        let content = self.content_normalizer.truncate(&article);
        let topic_content = self.topic_normalizer.truncate(&article);
        let title = article.title.as_str();

        let mut warnings = Vec::new();

        let (summary, entities) = tokio::join!(
            summarize(&self.runner, title, &content),
            extract_entities(&self.runner, title, &content),
        );
        let summary = summary?;
        let entities = degrade(entities, &mut warnings);

        let (quiz, topics) = tokio::join!(
            generate_quiz(&self.runner, title, &content, num_questions),
            suggest_topics(&self.runner, title, &topic_content, &summary, &entities),
        );
        let draft = quiz?;
        let related_topics = degrade(topics, &mut warnings);

        warnings.extend(
            draft
                .dropped
                .into_iter()
                .map(|(index, reason)| QualityWarning::QuestionDropped { index, reason }),
        );

        let suppression = suppress_duplicates(draft.questions);
        warnings.extend(
            suppression
                .warnings
                .into_iter()
                .map(|w| to_reply_positions(w, &draft.positions)),
        );

        let kept_positions: Vec<usize> = suppression
            .kept_indices
            .iter()
            .map(|&i| draft.positions[i])
            .collect();
        let questions = suppression.kept;
        warnings.extend(
            grounding_warnings(&questions, &article.full_text)
                .into_iter()
                .map(|w| to_reply_positions(w, &kept_positions)),
        );

        let bundle = QuizBundle {
            id: String::new(),
            normalized_url: normalized_url.clone(),
            title: article.title.clone(),
            summary,
            sections: article.section_headings(),
            entities,
            questions,
            related_topics,
            warnings,
            created_at: Utc::now(),
        };
        recheck_bundle(&bundle)?;

        match self.persistence.persist(bundle).await {
            Ok(saved) => {
                log::info!(
                    "Generated quiz {} for {} with {} questions and {} warnings",
                    saved.id,
                    saved.normalized_url,
                    saved.questions.len(),
                    saved.warnings.len()
                );
                Ok(saved)
            }
            Err(AppError::DuplicateUrl(url)) => {
                log::info!("Another request stored {} first, returning its quiz", url);
                self.resolver
                    .resolve(&url)
                    .await?
                    .ok_or(AppError::DuplicateUrl(url))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_history(
        &self,
        page: u64,
        limit: u64,
        search: Option<String>,
    ) -> AppResult<(Vec<QuizBundle>, u64)> {
        self.repository.list_page(page, limit, search).await
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<QuizBundle> {
        self.repository
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    pub async fn delete_quiz(&self, id: &str) -> AppResult<()> {
        if self.repository.delete_by_id(id).await? {
            log::info!("Deleted quiz {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)))
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.repository.health_check().await
    }
}

/// Rewrites a question index that counts within `positions` into the
/// question's position in the model's quiz reply.
fn to_reply_positions(warning: QualityWarning, positions: &[usize]) -> QualityWarning {
    let at = |i: usize| positions.get(i).copied().unwrap_or(i);
    match warning {
        QualityWarning::DuplicateRemoved {
            removed_index,
            kept_index,
            similarity,
        } => QualityWarning::DuplicateRemoved {
            removed_index: at(removed_index),
            kept_index: at(kept_index),
            similarity,
        },
        QualityWarning::WeakGrounding {
            question_index,
            score,
        } => QualityWarning::WeakGrounding {
            question_index: at(question_index),
            score,
        },
        other => other,
    }
}

/// Non-critical stages fall back to an empty result and leave a warning.
fn degrade<T: Default>(
    result: Result<T, GenerationError>,
    warnings: &mut Vec<QualityWarning>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Continuing without {}: {}", e.stage, e.reason);
            warnings.push(QualityWarning::DegradedStage {
                stage: e.stage,
                reason: e.reason,
            });
            T::default()
        }
    }
}
