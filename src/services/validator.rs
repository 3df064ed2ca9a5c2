use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        quiz::{MAX_ENTITIES_PER_CATEGORY, MAX_QUESTIONS},
        QualityWarning, Question, QuizBundle,
    },
};

pub const GROUNDING_THRESHOLD: f64 = 0.5;
pub const DUPLICATE_THRESHOLD: f64 = 0.8;
const MIN_SALIENT_TERM_LEN: usize = 4;

static WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("WORDS is a valid regex pattern"));

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "among", "because", "been", "before",
    "being", "below", "between", "both", "cannot", "could", "described", "does", "doing", "down",
    "during", "each", "from", "further", "have", "having", "here", "into", "itself", "just",
    "more", "most", "only", "other", "over", "same", "should", "some", "such", "than", "that",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "under",
    "until", "very", "were", "what", "when", "where", "which", "while", "whom", "with", "would",
    "your", "according", "article", "following", "true", "false", "none",
];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    WORDS.find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Lowercased content words of the question text and its correct option.
pub fn salient_terms(question: &Question) -> Vec<String> {
    let mut seen = HashSet::new();
    words(&question.text)
        .chain(words(question.correct_option()))
        .filter(|w| w.chars().count() >= MIN_SALIENT_TERM_LEN)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Fraction of salient terms found in `source_words`. A question with no
/// salient terms has nothing to contradict and scores 1.0.
pub fn grounding_score(question: &Question, source_words: &HashSet<String>) -> f64 {
    let terms = salient_terms(question);
    if terms.is_empty() {
        return 1.0;
    }
    let found = terms.iter().filter(|t| source_words.contains(*t)).count();
    found as f64 / terms.len() as f64
}

/// Jaccard similarity of the lowercased word sets of two question texts.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: HashSet<String> = words(a).collect();
    let b: HashSet<String> = words(b).collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(&b).count();
    let total = a.union(&b).count();
    shared as f64 / total as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suppression {
    pub kept: Vec<Question>,
    /// Input index of each entry in `kept`.
    pub kept_indices: Vec<usize>,
    pub warnings: Vec<QualityWarning>,
}

/// Walks questions in order and keeps each one unless it is at least
/// [`DUPLICATE_THRESHOLD`] similar to a question already kept, so of any
/// near-duplicate group the lowest index survives. Running it again on the
/// kept set changes nothing.
pub fn suppress_duplicates(questions: Vec<Question>) -> Suppression {
    let mut kept: Vec<(usize, Question)> = Vec::new();
    let mut warnings = Vec::new();

    for (index, question) in questions.into_iter().enumerate() {
        let duplicate_of = kept
            .iter()
            .map(|(kept_index, kept)| (*kept_index, similarity(&kept.text, &question.text)))
            .find(|(_, score)| *score >= DUPLICATE_THRESHOLD);

        match duplicate_of {
            Some((kept_index, score)) => {
                log::warn!(
                    "Removing question {} as a near-duplicate of question {} (similarity {:.2})",
                    index,
                    kept_index,
                    score
                );
                warnings.push(QualityWarning::DuplicateRemoved {
                    removed_index: index,
                    kept_index,
                    similarity: score,
                });
            }
            None => kept.push((index, question)),
        }
    }

    let (kept_indices, kept): (Vec<usize>, Vec<Question>) = kept.into_iter().unzip();
    Suppression {
        kept,
        kept_indices,
        warnings,
    }
}

/// Flags questions whose salient terms are mostly absent from the source.
pub fn grounding_warnings(questions: &[Question], source_text: &str) -> Vec<QualityWarning> {
    let source_words: HashSet<String> = words(source_text).collect();

    questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let score = grounding_score(question, &source_words);
            if score < GROUNDING_THRESHOLD {
                log::warn!("Question {} is weakly grounded (score {:.2})", index, score);
                Some(QualityWarning::WeakGrounding {
                    question_index: index,
                    score,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Final structural check before persistence. Any failure here is fatal.
pub fn recheck_bundle(bundle: &QuizBundle) -> AppResult<()> {
    let fail = |msg: String| Err(AppError::ValidationError(msg));

    if bundle.normalized_url.trim().is_empty() {
        return fail("bundle has no source URL".to_string());
    }
    if bundle.title.trim().is_empty() {
        return fail("bundle has no title".to_string());
    }
    if bundle.summary.trim().is_empty() {
        return fail("bundle has no summary".to_string());
    }
    if bundle.questions.is_empty() {
        return fail("bundle has no questions".to_string());
    }
    if bundle.questions.len() > MAX_QUESTIONS {
        return fail(format!(
            "bundle has {} questions, at most {} allowed",
            bundle.questions.len(),
            MAX_QUESTIONS
        ));
    }
    for (index, question) in bundle.questions.iter().enumerate() {
        if let Err(reason) = question.check_structure() {
            return fail(format!("question {}: {}", index + 1, reason));
        }
    }
    for (category, names) in bundle.entities.categories() {
        if names.len() > MAX_ENTITIES_PER_CATEGORY {
            return fail(format!("too many {} entities", category));
        }
    }
    if bundle.related_topics.iter().any(|t| t.name.trim().is_empty()) {
        return fail("related topic with empty name".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{AnswerLetter, Difficulty, KeyEntities},
        test_utils::fixtures,
    };
    use chrono::Utc;

    fn question(text: &str, options: [&str; 4]) -> Question {
        Question {
            id: String::new(),
            text: text.to_string(),
            options: options.map(str::to_string),
            correct_answer: AnswerLetter::A,
            difficulty: Difficulty::Medium,
            explanation: String::new(),
            section_reference: None,
        }
    }

    fn bundle(questions: Vec<Question>) -> QuizBundle {
        QuizBundle {
            id: String::new(),
            normalized_url: "https://example.com/a".to_string(),
            title: "Rivers".to_string(),
            summary: "One. Two.".to_string(),
            sections: vec!["Introduction".to_string()],
            entities: KeyEntities::default(),
            questions,
            related_topics: vec![],
            warnings: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_salient_terms_skip_short_and_stop_words() {
        let q = question(
            "Which river flows through Vienna?",
            ["Danube", "Rhine", "Elbe", "Oder"],
        );
        assert_eq!(salient_terms(&q), vec!["river", "flows", "vienna", "danube"]);
    }

    #[test]
    fn test_grounded_question_scores_high() {
        let source: HashSet<String> = words("The Danube river flows through Vienna and Budapest.")
            .collect();
        let q = question(
            "Which river flows through Vienna?",
            ["Danube", "Rhine", "Elbe", "Oder"],
        );
        assert_eq!(grounding_score(&q, &source), 1.0);
    }

    #[test]
    fn test_ungrounded_question_is_flagged_not_removed() {
        let questions = vec![
            question("Which river flows through Vienna?", ["Danube", "Rhine", "Elbe", "Oder"]),
            question(
                "Which quantum chromodynamics experiment measured gluons?",
                ["PETRA", "LHC", "SLAC", "CERN"],
            ),
        ];

        let warnings =
            grounding_warnings(&questions, "The Danube river flows through Vienna.");

        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            QualityWarning::WeakGrounding { question_index: 1, .. }
        ));
    }

    #[test]
    fn test_similarity_is_jaccard_over_words() {
        assert_eq!(similarity("a b c d", "a b c d"), 1.0);
        assert_eq!(similarity("a b", "c d"), 0.0);
        assert!((similarity("a b c", "a b d") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_suppression_drops_later_near_duplicate() {
        let questions = vec![
            question("What year did the bridge open to traffic?", ["1890", "1901", "1923", "1945"]),
            question("Which river is the longest?", ["Danube", "Rhine", "Elbe", "Oder"]),
            question("What year did the bridge open to traffic", ["1890", "1901", "1923", "1945"]),
        ];

        let result = suppress_duplicates(questions);

        assert_eq!(result.kept.len(), 2);
        assert_eq!(result.kept[1].text, "Which river is the longest?");
        assert_eq!(result.kept_indices, vec![0, 1]);
        assert_eq!(
            result.warnings,
            vec![QualityWarning::DuplicateRemoved {
                removed_index: 2,
                kept_index: 0,
                similarity: 1.0
            }]
        );
    }

    #[test]
    fn test_suppression_is_idempotent() {
        let mut questions: Vec<Question> = (0..6).map(fixtures::question).collect();
        questions.push(fixtures::question(2));
        questions.push(fixtures::question(4));

        let once = suppress_duplicates(questions);
        let twice = suppress_duplicates(once.kept.clone());

        assert_eq!(once.kept.len(), 6);
        assert_eq!(twice.kept, once.kept);
        assert!(twice.warnings.is_empty());
    }

    #[test]
    fn test_three_way_duplicate_keeps_lowest_index() {
        let questions = vec![
            question("When was the old stone bridge built?", ["1", "2", "3", "4"]),
            question("When was the old stone bridge built", ["5", "6", "7", "8"]),
            question("when was the old stone bridge built?", ["9", "10", "11", "12"]),
        ];

        let result = suppress_duplicates(questions);
        assert_eq!(result.kept.len(), 1);
        assert_eq!(result.kept[0].options[0], "1");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_recheck_rejects_empty_and_malformed_bundles() {
        assert!(matches!(
            recheck_bundle(&bundle(vec![])),
            Err(AppError::ValidationError(_))
        ));

        let bad = question("Q?", ["same", "Same", "x", "y"]);
        assert!(recheck_bundle(&bundle(vec![bad])).is_err());

        assert!(recheck_bundle(&bundle(vec![fixtures::question(0)])).is_ok());
    }
}
