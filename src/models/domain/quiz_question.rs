use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    #[serde(default)]
    pub id: String,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: AnswerLetter,
    pub difficulty: Difficulty,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_reference: Option<String>,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer.index()]
    }

    /// Checks the per-question invariants: non-empty text, four distinct
    /// non-empty options and an answer that lands on one of them.
    pub fn check_structure(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is empty".to_string());
        }

        for (i, option) in self.options.iter().enumerate() {
            if option.trim().is_empty() {
                return Err(format!("option {} is empty", AnswerLetter::ALL[i]));
            }
        }

        for i in 0..OPTION_COUNT {
            for j in (i + 1)..OPTION_COUNT {
                if normalize_option(&self.options[i]) == normalize_option(&self.options[j]) {
                    return Err(format!(
                        "options {} and {} are identical",
                        AnswerLetter::ALL[i],
                        AnswerLetter::ALL[j]
                    ));
                }
            }
        }

        if self.correct_option().trim().is_empty() {
            return Err("correct answer does not resolve to an option".to_string());
        }

        Ok(())
    }
}

fn normalize_option(option: &str) -> String {
    option.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; OPTION_COUNT] =
        [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C, AnswerLetter::D];

    pub fn index(self) -> usize {
        match self {
            AnswerLetter::A => 0,
            AnswerLetter::B => 1,
            AnswerLetter::C => 2,
            AnswerLetter::D => 3,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A" => Some(AnswerLetter::A),
            "B" => Some(AnswerLetter::B),
            "C" => Some(AnswerLetter::C),
            "D" => Some(AnswerLetter::D),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        };
        write!(f, "{}", letter)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}
