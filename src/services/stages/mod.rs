//! Language-model backed generation stages. Each stage renders its named
//! template, parses the reply against a declared schema and retries through
//! a shared [`StageRunner`].

pub mod entity_extractor;
pub mod quiz_generator;
pub mod summarizer;
pub mod topic_suggester;

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use schemars::{JsonSchema, Schema};
use serde_json::Value;

use crate::{
    errors::GenerationError,
    models::domain::GenerationStage,
    services::{
        llm::{LanguageModel, PromptId, PromptVariables},
        retry::{retry_with_backoff, RetryPolicy},
    },
};

pub use entity_extractor::extract_entities;
pub use quiz_generator::{generate_quiz, QuizDraft};
pub use summarizer::summarize;
pub use topic_suggester::suggest_topics;

#[derive(Debug)]
struct AttemptFailure {
    stage: GenerationStage,
    reason: String,
    raw_output: Option<String>,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage: {}", self.stage, self.reason)
    }
}

/// Drives one model-backed stage: a bounded call per attempt, a parse step,
/// and backoff between attempts. Timeouts and transport errors are retried
/// exactly like malformed output.
pub struct StageRunner {
    model: Arc<dyn LanguageModel>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl StageRunner {
    pub fn new(model: Arc<dyn LanguageModel>, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            model,
            policy,
            attempt_timeout,
        }
    }

    /// `parse` receives the raw reply and whether this is the last attempt,
    /// so a stage can switch from strict checking to best-effort repair.
    pub async fn run<T, P>(
        &self,
        stage: GenerationStage,
        prompt_id: PromptId,
        variables: &PromptVariables,
        parse: P,
    ) -> Result<T, GenerationError>
    where
        P: Fn(&str, bool) -> Result<T, String>,
    {
        log::info!("Running {} stage", stage);

        let last_raw: Mutex<Option<String>> = Mutex::new(None);

        let result = retry_with_backoff(self.policy, |attempt| {
            let is_final = self.policy.is_final(attempt);
            let parse = &parse;
            let last_raw = &last_raw;
            async move {
                let call = self.model.generate(prompt_id, variables, self.attempt_timeout);
                let raw = match tokio::time::timeout(self.attempt_timeout, call).await {
                    Ok(Ok(raw)) => raw,
                    Ok(Err(e)) => {
                        return Err(AttemptFailure {
                            stage,
                            reason: e.to_string(),
                            raw_output: None,
                        })
                    }
                    Err(_) => {
                        return Err(AttemptFailure {
                            stage,
                            reason: format!(
                                "model call timed out after {:?}",
                                self.attempt_timeout
                            ),
                            raw_output: None,
                        })
                    }
                };

                parse(&raw, is_final).map_err(|reason| {
                    if let Ok(mut last) = last_raw.lock() {
                        *last = Some(raw.clone());
                    }
                    AttemptFailure {
                        stage,
                        reason,
                        raw_output: Some(raw),
                    }
                })
            }
        })
        .await;

        match result {
            Ok(value) => {
                log::info!("{} stage completed", stage);
                Ok(value)
            }
            Err(failure) => {
                log::warn!(
                    "{} stage failed after {} attempts: {}",
                    stage,
                    self.policy.max_attempts,
                    failure.reason
                );
                let earlier_raw = last_raw.into_inner().ok().flatten();
                Err(GenerationError {
                    stage,
                    reason: failure.reason,
                    last_raw_output: failure.raw_output.or(earlier_raw),
                })
            }
        }
    }
}

pub fn variables(pairs: &[(&str, String)]) -> PromptVariables {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Pretty JSON Schema for a stage payload, substituted as `{output_schema}`.
pub fn output_schema<T: JsonSchema>() -> String {
    let schema: Schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Parses a model reply as a JSON object, tolerating a fenced ```json block
/// or prose around the outermost braces.
pub fn parse_json_object(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();

    if let Some(value) = parse_object(trimmed) {
        return Ok(value);
    }

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + "```json".len()..];
        let end = body.find("```").unwrap_or(body.len());
        if let Some(value) = parse_object(body[..end].trim()) {
            return Ok(value);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(value) = parse_object(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err("response is not a valid JSON object".to_string())
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Trims, drops blanks and removes case-insensitive repeats, keeping the
/// first spelling seen.
pub fn dedupe_names<I, S>(names: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.to_lowercase()))
        .take(cap)
        .collect()
}
