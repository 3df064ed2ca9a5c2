use std::collections::HashSet;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    errors::GenerationError,
    models::domain::{GenerationStage, KeyEntities, RelatedTopic},
    services::{
        llm::PromptId,
        stages::{output_schema, parse_json_object, variables, StageRunner},
    },
};

pub const MAX_RELATED_TOPICS: usize = 8;
pub const ENTITIES_PER_CATEGORY_IN_PROMPT: usize = 5;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TopicsPayload {
    pub related_topics: Vec<TopicPayload>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TopicPayload {
    Name(String),
    Detailed {
        topic_name: String,
        #[serde(default)]
        url: Option<String>,
    },
}

/// Suggests follow-up reading. `entities` may be empty when the entity
/// stage degraded.
pub async fn suggest_topics(
    runner: &StageRunner,
    title: &str,
    content: &str,
    summary: &str,
    entities: &KeyEntities,
) -> Result<Vec<RelatedTopic>, GenerationError> {
    let vars = variables(&[
        ("title", title.to_string()),
        ("content", content.to_string()),
        ("summary", summary.to_string()),
        ("entities", format_entities(entities)),
        ("output_schema", output_schema::<TopicsPayload>()),
    ]);

    runner
        .run(
            GenerationStage::RelatedTopics,
            PromptId::RelatedTopics,
            &vars,
            parse_topics,
        )
        .await
}

pub fn format_entities(entities: &KeyEntities) -> String {
    entities
        .categories()
        .iter()
        .map(|(name, values)| {
            let shown: Vec<&str> = values
                .iter()
                .take(ENTITIES_PER_CATEGORY_IN_PROMPT)
                .map(String::as_str)
                .collect();
            let label = format!("{}{}", name[..1].to_uppercase(), &name[1..]);
            if shown.is_empty() {
                format!("{}: none", label)
            } else {
                format!("{}: {}", label, shown.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_topics(raw: &str, _is_final: bool) -> Result<Vec<RelatedTopic>, String> {
    let value = parse_json_object(raw)?;
    let payload: TopicsPayload =
        serde_json::from_value(value).map_err(|e| format!("related topics payload: {}", e))?;

    let mut seen = HashSet::new();
    let topics = payload
        .related_topics
        .into_iter()
        .map(|topic| match topic {
            TopicPayload::Name(name) => (name, None),
            TopicPayload::Detailed { topic_name, url } => (topic_name, url),
        })
        .map(|(name, url)| (name.trim().to_string(), url))
        .filter(|(name, _)| !name.is_empty())
        .filter(|(name, _)| seen.insert(name.to_lowercase()))
        .take(MAX_RELATED_TOPICS)
        .map(|(name, url)| RelatedTopic {
            id: String::new(),
            name,
            url: url
                .map(|u| u.trim().to_string())
                .filter(|u| u.starts_with("http://") || u.starts_with("https://")),
        })
        .collect();

    Ok(topics)
}
