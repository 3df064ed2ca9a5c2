pub mod openai;
pub mod templates;

use std::{collections::BTreeMap, fmt, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiLanguageModel;
pub use templates::PromptTemplates;

/// Named prompt templates, one per generation stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptId {
    Summary,
    Entities,
    Quiz,
    RelatedTopics,
}

impl PromptId {
    pub const ALL: [PromptId; 4] = [
        PromptId::Summary,
        PromptId::Entities,
        PromptId::Quiz,
        PromptId::RelatedTopics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptId::Summary => "summary",
            PromptId::Entities => "entities",
            PromptId::Quiz => "quiz",
            PromptId::RelatedTopics => "related_topics",
        }
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Placeholder values substituted into a template. Ordered so rendering and
/// logging are stable.
pub type PromptVariables = BTreeMap<String, String>;

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("model transport error: {0}")]
    Transport(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("prompt template error: {0}")]
    Template(String),
}

/// The language-model capability the generation stages are written against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(
        &self,
        prompt_id: PromptId,
        variables: &PromptVariables,
        timeout: Duration,
    ) -> Result<String, ModelError>;
}
