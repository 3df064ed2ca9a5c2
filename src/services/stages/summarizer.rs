use schemars::JsonSchema;
use serde::Deserialize;

use crate::{
    errors::GenerationError,
    models::domain::GenerationStage,
    services::{
        llm::PromptId,
        stages::{output_schema, parse_json_object, variables, StageRunner},
    },
};

pub const MIN_SUMMARY_SENTENCES: usize = 2;
pub const MAX_SUMMARY_SENTENCES: usize = 4;

/// Reply shape for the summary prompt.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SummaryPayload {
    /// Two to four plain sentences.
    pub summary: String,
}

pub async fn summarize(
    runner: &StageRunner,
    title: &str,
    content: &str,
) -> Result<String, GenerationError> {
    let vars = variables(&[
        ("title", title.to_string()),
        ("content", content.to_string()),
        ("output_schema", output_schema::<SummaryPayload>()),
    ]);

    runner
        .run(GenerationStage::Summary, PromptId::Summary, &vars, parse_summary)
        .await
}

/// A summary longer than allowed is cut to its leading sentences on the
/// final attempt; a too-short one is never accepted.
fn parse_summary(raw: &str, is_final: bool) -> Result<String, String> {
    let value = parse_json_object(raw)?;
    let payload: SummaryPayload =
        serde_json::from_value(value).map_err(|e| format!("summary payload: {}", e))?;

    let summary = payload.summary.split_whitespace().collect::<Vec<_>>().join(" ");
    if summary.is_empty() {
        return Err("summary is empty".to_string());
    }

    let sentences = split_sentences(&summary);
    match sentences.len() {
        n if n < MIN_SUMMARY_SENTENCES => Err(format!(
            "summary has {} sentence(s), expected {} to {}",
            n, MIN_SUMMARY_SENTENCES, MAX_SUMMARY_SENTENCES
        )),
        n if n > MAX_SUMMARY_SENTENCES && !is_final => Err(format!(
            "summary has {} sentences, expected {} to {}",
            n, MIN_SUMMARY_SENTENCES, MAX_SUMMARY_SENTENCES
        )),
        n if n > MAX_SUMMARY_SENTENCES => Ok(sentences[..MAX_SUMMARY_SENTENCES].join(" ")),
        _ => Ok(summary),
    }
}

/// Splits on `.`, `!` or `?` followed by whitespace and a capital letter or
/// digit, which keeps decimals and most abbreviations intact.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let next = chars.get(i + 1).map(|&(_, c)| c);
        let after = chars.get(i + 2).map(|&(_, c)| c);
        let boundary = matches!(next, Some(n) if n.is_whitespace())
            && matches!(after, Some(a) if a.is_uppercase() || a.is_ascii_digit());

        if boundary {
            let end = pos + c.len_utf8();
            sentences.push(text[start..end].trim());
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
