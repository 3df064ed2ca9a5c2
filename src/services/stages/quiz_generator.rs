use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    errors::GenerationError,
    models::domain::{
        quiz_question::OPTION_COUNT, AnswerLetter, Difficulty, GenerationStage, Question,
    },
    services::{
        llm::PromptId,
        stages::{output_schema, parse_json_object, variables, StageRunner},
    },
};

/// Reply shape for the quiz prompt, used for the schema shown to the model.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QuizPayload {
    pub quiz: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QuestionPayload {
    pub question: String,
    /// Exactly four distinct options.
    pub options: Vec<String>,
    /// Letter of the correct option.
    pub answer: AnswerLetter,
    pub difficulty: Difficulty,
    pub explanation: String,
    #[serde(default)]
    pub section_reference: Option<String>,
}

/// Questions returned by the quiz stage plus anything repair had to drop.
/// `positions[i]` is where `questions[i]` sat in the model's reply; dropped
/// entries are keyed the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizDraft {
    pub questions: Vec<Question>,
    pub positions: Vec<usize>,
    pub dropped: Vec<(usize, String)>,
}

pub async fn generate_quiz(
    runner: &StageRunner,
    title: &str,
    content: &str,
    num_questions: usize,
) -> Result<QuizDraft, GenerationError> {
    let vars = variables(&[
        ("title", title.to_string()),
        ("content", content.to_string()),
        ("num_questions", num_questions.to_string()),
        ("output_schema", output_schema::<QuizPayload>()),
    ]);

    runner
        .run(GenerationStage::Quiz, PromptId::Quiz, &vars, |raw, is_final| {
            parse_quiz(raw, num_questions, is_final)
        })
        .await
}

/// Strict on early attempts: the first `num_questions` items must all be
/// valid. On the final attempt invalid items are dropped and later items in
/// the reply fill their places, as long as one question survives.
pub fn parse_quiz(raw: &str, num_questions: usize, is_final: bool) -> Result<QuizDraft, String> {
    let value = parse_json_object(raw)?;
    let items = value
        .get("quiz")
        .and_then(Value::as_array)
        .ok_or_else(|| "response has no 'quiz' array".to_string())?;

    let mut questions = Vec::new();
    let mut positions = Vec::new();
    let mut dropped = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if questions.len() == num_questions {
            break;
        }
        match parse_question(item) {
            Ok(question) => {
                questions.push(question);
                positions.push(index);
            }
            Err(reason) if !is_final => return Err(format!("question {}: {}", index + 1, reason)),
            Err(reason) => {
                log::warn!("Dropping quiz question {}: {}", index + 1, reason);
                dropped.push((index, reason));
            }
        }
    }

    if questions.is_empty() {
        return Err("no valid questions".to_string());
    }

    if !is_final && questions.len() < num_questions {
        return Err(format!(
            "expected {} questions, got {}",
            num_questions,
            questions.len()
        ));
    }

    Ok(QuizDraft {
        questions,
        positions,
        dropped,
    })
}

fn parse_question(item: &Value) -> Result<Question, String> {
    let text = string_field(item, "question")?;
    let explanation = item
        .get("explanation")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let options: Vec<String> = item
        .get("options")
        .and_then(Value::as_array)
        .ok_or_else(|| "missing options".to_string())?
        .iter()
        .map(|o| {
            o.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| "options must be strings".to_string())
        })
        .collect::<Result<_, _>>()?;

    let options: [String; OPTION_COUNT] = options
        .try_into()
        .map_err(|opts: Vec<String>| format!("expected {} options, got {}", OPTION_COUNT, opts.len()))?;

    let answer = string_field(item, "answer")?;
    let correct_answer = AnswerLetter::parse(&answer)
        .ok_or_else(|| format!("answer '{}' is not one of A, B, C, D", answer))?;

    let difficulty = string_field(item, "difficulty")?;
    let difficulty = Difficulty::parse(&difficulty)
        .ok_or_else(|| format!("difficulty '{}' is not easy, medium or hard", difficulty))?;

    let section_reference = item
        .get("section_reference")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let question = Question {
        id: String::new(),
        text,
        options,
        correct_answer,
        difficulty,
        explanation,
        section_reference,
    };
    question.check_structure()?;

    Ok(question)
}

fn string_field(item: &Value, field: &str) -> Result<String, String> {
    item.get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| format!("missing '{}'", field))
}
