use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    errors::GenerationError,
    models::domain::{quiz::MAX_ENTITIES_PER_CATEGORY, GenerationStage, KeyEntities},
    services::{
        llm::PromptId,
        stages::{dedupe_names, output_schema, parse_json_object, variables, StageRunner},
    },
};

/// Reply shape for the entities prompt. All three categories are required.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct EntitiesPayload {
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
}

pub async fn extract_entities(
    runner: &StageRunner,
    title: &str,
    content: &str,
) -> Result<KeyEntities, GenerationError> {
    let vars = variables(&[
        ("title", title.to_string()),
        ("content", content.to_string()),
        ("output_schema", output_schema::<EntitiesPayload>()),
    ]);

    runner
        .run(GenerationStage::Entities, PromptId::Entities, &vars, parse_entities)
        .await
}

fn parse_entities(raw: &str, _is_final: bool) -> Result<KeyEntities, String> {
    let value = parse_json_object(raw)?;
    let payload: EntitiesPayload =
        serde_json::from_value(value).map_err(|e| format!("entities payload: {}", e))?;

    Ok(KeyEntities {
        people: dedupe_names(payload.people, MAX_ENTITIES_PER_CATEGORY),
        organizations: dedupe_names(payload.organizations, MAX_ENTITIES_PER_CATEGORY),
        locations: dedupe_names(payload.locations, MAX_ENTITIES_PER_CATEGORY),
    })
}
