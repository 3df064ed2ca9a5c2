use std::{collections::HashMap, fs, path::Path};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    constants::prompts::{ENTITIES_PROMPT, QUIZ_PROMPT, RELATED_TOPICS_PROMPT, SUMMARY_PROMPT},
    errors::{AppError, AppResult},
    services::llm::{ModelError, PromptId, PromptVariables},
};

// Only lowercase identifiers count as placeholders, so JSON examples such as
// {"answer": "B"} pass through untouched.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("PLACEHOLDER is a valid regex pattern"));

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    templates: HashMap<PromptId, String>,
}

impl PromptTemplates {
    pub fn builtin() -> Self {
        let templates = PromptId::ALL
            .iter()
            .map(|id| (*id, builtin_template(*id).to_string()))
            .collect();
        Self { templates }
    }

    /// Built-in templates, each replaced by `<dir>/<name>.txt` when present.
    pub fn load(dir: Option<&str>) -> AppResult<Self> {
        let mut templates = Self::builtin();
        let Some(dir) = dir else {
            return Ok(templates);
        };

        for id in PromptId::ALL {
            let path = Path::new(dir).join(format!("{}.txt", id.as_str()));
            if !path.exists() {
                continue;
            }
            let body = fs::read_to_string(&path).map_err(|e| {
                AppError::InternalError(format!(
                    "Failed to read prompt template {}: {}",
                    path.display(),
                    e
                ))
            })?;
            log::info!("Loaded {} prompt override from {}", id, path.display());
            templates.templates.insert(id, body);
        }

        Ok(templates)
    }

    pub fn with_template(mut self, id: PromptId, body: &str) -> Self {
        self.templates.insert(id, body.to_string());
        self
    }

    pub fn render(&self, id: PromptId, variables: &PromptVariables) -> Result<String, ModelError> {
        let template = self
            .templates
            .get(&id)
            .ok_or_else(|| ModelError::Template(format!("no template named '{}'", id)))?;

        let mut missing = Vec::new();
        let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match variables.get(name) {
                Some(value) => value.clone(),
                None => {
                    missing.push(name.to_string());
                    caps[0].to_string()
                }
            }
        });

        if !missing.is_empty() {
            return Err(ModelError::Template(format!(
                "template '{}' has no value for {}",
                id,
                missing.join(", ")
            )));
        }

        Ok(rendered.into_owned())
    }
}

fn builtin_template(id: PromptId) -> &'static str {
    match id {
        PromptId::Summary => SUMMARY_PROMPT,
        PromptId::Entities => ENTITIES_PROMPT,
        PromptId::Quiz => QUIZ_PROMPT,
        PromptId::RelatedTopics => RELATED_TOPICS_PROMPT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> PromptVariables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_and_keeps_json_braces() {
        let templates = PromptTemplates::builtin()
            .with_template(PromptId::Summary, "T={title} {\"summary\": \"x\"} C={content}");

        let out = templates
            .render(PromptId::Summary, &vars(&[("title", "Rust"), ("content", "body")]))
            .expect("template should render");

        assert_eq!(out, "T=Rust {\"summary\": \"x\"} C=body");
    }

    #[test]
    fn test_render_reports_missing_variables() {
        let templates = PromptTemplates::builtin().with_template(PromptId::Quiz, "{title} {num_questions}");

        let err = templates
            .render(PromptId::Quiz, &vars(&[("title", "Rust")]))
            .expect_err("missing variable should fail");

        assert!(matches!(err, ModelError::Template(msg) if msg.contains("num_questions")));
    }

    #[test]
    fn test_builtin_templates_render_with_stage_variables() {
        let templates = PromptTemplates::builtin();
        let common = [
            ("title", "T"),
            ("content", "C"),
            ("output_schema", "{}"),
            ("num_questions", "5"),
            ("summary", "S"),
            ("entities", "E"),
        ];

        for id in PromptId::ALL {
            assert!(templates.render(id, &vars(&common)).is_ok(), "{} failed", id);
        }
    }

    #[test]
    fn test_load_without_directory_uses_builtins() {
        let templates = PromptTemplates::load(None).expect("builtins should load");
        let out = templates
            .render(
                PromptId::Summary,
                &vars(&[("title", "T"), ("content", "C"), ("output_schema", "{}")]),
            )
            .expect("summary should render");
        assert!(out.contains("Article title: T"));
    }

    #[test]
    fn test_load_reads_overrides_from_directory() {
        let dir = std::env::temp_dir().join(format!("quizforge-prompts-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        fs::write(dir.join("summary.txt"), "Custom {title}").expect("override should be written");

        let templates =
            PromptTemplates::load(dir.to_str()).expect("templates should load from directory");
        let out = templates
            .render(PromptId::Summary, &vars(&[("title", "X")]))
            .expect("override should render");

        assert_eq!(out, "Custom X");
        let _ = fs::remove_dir_all(&dir);
    }
}
