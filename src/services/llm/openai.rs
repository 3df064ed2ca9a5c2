use std::time::Duration;

use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::Config,
    services::llm::{LanguageModel, ModelError, PromptId, PromptTemplates, PromptVariables},
};

/// Chat-completions backed [`LanguageModel`]. Every call asks for a JSON
/// object response; parsing is left to the stage that made the call.
pub struct OpenAiLanguageModel {
    client: Client<OpenAIConfig>,
    templates: PromptTemplates,
    model: String,
    temperature: f32,
}

impl OpenAiLanguageModel {
    pub fn new(config: &Config, templates: PromptTemplates) -> Self {
        let mut openai_config =
            OpenAIConfig::new().with_api_key(config.openai_api_key.expose_secret());
        if let Some(base) = &config.openai_api_base {
            openai_config = openai_config.with_api_base(base);
        }

        Self {
            client: Client::with_config(openai_config),
            templates,
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiLanguageModel {
    async fn generate(
        &self,
        prompt_id: PromptId,
        variables: &PromptVariables,
        timeout: Duration,
    ) -> Result<String, ModelError> {
        let prompt = self.templates.render(prompt_id, variables)?;
        let body = self.request_body(&prompt);

        log::debug!(
            "Calling {} for the {} prompt ({} chars)",
            self.model,
            prompt_id,
            prompt.len()
        );

        let response: Value = tokio::time::timeout(timeout, self.client.chat().create_byot(body))
            .await
            .map_err(|_| ModelError::Timeout(timeout))?
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        extract_content(&response)
    }
}

fn extract_content(response: &Value) -> Result<String, ModelError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or(ModelError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_reads_first_choice() {
        let response = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  {\"summary\": \"x\"}  " } }
            ]
        });

        assert_eq!(
            extract_content(&response).expect("content should be present"),
            "{\"summary\": \"x\"}"
        );
    }

    #[test]
    fn test_extract_content_rejects_empty_or_missing() {
        let empty = json!({ "choices": [ { "message": { "content": "   " } } ] });
        assert!(matches!(extract_content(&empty), Err(ModelError::EmptyResponse)));

        let missing = json!({ "choices": [] });
        assert!(matches!(extract_content(&missing), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn test_request_body_asks_for_json_object() {
        let model = OpenAiLanguageModel::new(&Config::test_config(), PromptTemplates::builtin());
        let body = model.request_body("hello");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["content"], "hello");
    }
}
