use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    db::MongoStore,
    errors::AppResult,
    repositories::{MemoryQuizBundleRepository, MongoQuizBundleRepository, QuizBundleRepository},
    services::{
        extractor::ContentExtractor,
        llm::{OpenAiLanguageModel, PromptTemplates},
        quiz_service::{PipelineSettings, QuizService},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let repository: Arc<dyn QuizBundleRepository> = match config.storage_backend {
            StorageBackend::Mongo => {
                let store = MongoStore::connect(&config).await?;
                Arc::new(MongoQuizBundleRepository::new(&store))
            }
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage, quizzes will not survive a restart");
                Arc::new(MemoryQuizBundleRepository::new())
            }
        };

        let templates = PromptTemplates::load(config.prompts_dir.as_deref())?;
        let model = Arc::new(OpenAiLanguageModel::new(&config, templates));
        let extractor = ContentExtractor::from_config(&config)?;

        let quiz_service = Arc::new(QuizService::new(
            repository,
            extractor,
            model,
            PipelineSettings::from_config(&config),
        ));

        Ok(Self::from_parts(quiz_service, config))
    }

    pub fn from_parts(quiz_service: Arc<QuizService>, config: Config) -> Self {
        Self {
            quiz_service,
            config: Arc::new(config),
        }
    }
}
