use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{KeyEntities, QualityWarning, Question, QuizBundle, RelatedTopic};

/// Wire shape of a bundle. Field names are a stable contract.
#[derive(Debug, Clone, Serialize)]
pub struct QuizBundleResponse {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub sections: Vec<String>,
    pub key_entities: KeyEntities,
    pub quiz: Vec<QuestionResponse>,
    pub related_topics: Vec<RelatedTopicResponse>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<QualityWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    pub difficulty: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_reference: Option<String>,
}

/// A bare topic name, or `{topic_name, url}` when a link is known.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RelatedTopicResponse {
    Name(String),
    Linked { topic_name: String, url: String },
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        QuestionResponse {
            answer: q.correct_answer.to_string(),
            difficulty: q.difficulty.to_string(),
            question: q.text,
            options: q.options.to_vec(),
            explanation: q.explanation,
            section_reference: q.section_reference,
        }
    }
}

impl From<RelatedTopic> for RelatedTopicResponse {
    fn from(topic: RelatedTopic) -> Self {
        match topic.url {
            Some(url) => RelatedTopicResponse::Linked {
                topic_name: topic.name,
                url,
            },
            None => RelatedTopicResponse::Name(topic.name),
        }
    }
}

impl From<QuizBundle> for QuizBundleResponse {
    fn from(bundle: QuizBundle) -> Self {
        QuizBundleResponse {
            id: bundle.id,
            url: bundle.normalized_url,
            title: bundle.title,
            summary: bundle.summary,
            sections: bundle.sections,
            key_entities: bundle.entities,
            quiz: bundle.questions.into_iter().map(Into::into).collect(),
            related_topics: bundle.related_topics.into_iter().map(Into::into).collect(),
            created_at: bundle.created_at,
            warnings: bundle.warnings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizListItem {
    pub id: String,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub question_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<QuizBundle> for QuizListItem {
    fn from(bundle: QuizBundle) -> Self {
        QuizListItem {
            question_count: bundle.questions.len(),
            id: bundle.id,
            url: bundle.normalized_url,
            title: bundle.title,
            summary: bundle.summary,
            created_at: bundle.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizHistoryResponse {
    pub quizzes: Vec<QuizListItem>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl QuizHistoryResponse {
    pub fn new(bundles: Vec<QuizBundle>, total: u64, page: u64, limit: u64) -> Self {
        QuizHistoryResponse {
            quizzes: bundles.into_iter().map(Into::into).collect(),
            total,
            page,
            limit,
            total_pages: if limit == 0 { 0 } else { total.div_ceil(limit) },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
