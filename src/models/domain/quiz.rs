use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::quiz_question::Question;

pub const MAX_ENTITIES_PER_CATEGORY: usize = 10;
pub const MIN_QUESTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 10;
pub const DEFAULT_QUESTIONS: usize = 8;

/// The generated quiz aggregate for one article. Immutable once persisted.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizBundle {
    #[serde(default)]
    pub id: String,
    pub normalized_url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub entities: KeyEntities,
    pub questions: Vec<Question>,
    pub related_topics: Vec<RelatedTopic>,
    #[serde(default)]
    pub warnings: Vec<QualityWarning>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyEntities {
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
}

impl KeyEntities {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.organizations.is_empty() && self.locations.is_empty()
    }

    pub fn categories(&self) -> [(&'static str, &Vec<String>); 3] {
        [
            ("people", &self.people),
            ("organizations", &self.organizations),
            ("locations", &self.locations),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RelatedTopic {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RelatedTopic {
    pub fn named(name: &str) -> Self {
        RelatedTopic {
            id: String::new(),
            name: name.to_string(),
            url: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Summary,
    Entities,
    Quiz,
    RelatedTopics,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Summary => "summary",
            GenerationStage::Entities => "entities",
            GenerationStage::Quiz => "quiz",
            GenerationStage::RelatedTopics => "related_topics",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Non-fatal findings attached to a bundle so callers can judge its quality.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityWarning {
    DegradedStage {
        stage: GenerationStage,
        reason: String,
    },
    QuestionDropped {
        index: usize,
        reason: String,
    },
    DuplicateRemoved {
        removed_index: usize,
        kept_index: usize,
        similarity: f64,
    },
    WeakGrounding {
        question_index: usize,
        score: f64,
    },
}
