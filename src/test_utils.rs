use crate::models::domain::{
    article::ArticleSection, AnswerLetter, Article, Difficulty, Question,
};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    const WORDS_PER_PARAGRAPH: usize = 50;
    const PARAGRAPHS_PER_SECTION: usize = 3;

    /// Every word is at least four letters so grounding checks can find them.
    pub const VOCABULARY: &[&str] = &[
        "river", "delta", "valley", "mountain", "glacier", "harbor", "forest", "meadow",
        "canyon", "plateau", "estuary", "lagoon", "summit", "tributary", "current",
        "sediment", "erosion", "basin", "wetland", "channel", "matches", "bridge", "village",
        "merchant", "festival", "harvest", "granite", "limestone", "quarry", "orchard",
        "vineyard", "monastery", "castle", "fortress", "market", "trader", "voyage",
        "compass", "lantern", "archive",
    ];

    /// Paragraph `index` with exactly `words` whitespace-separated words.
    pub fn paragraph_text(index: usize, words: usize) -> String {
        (0..words)
            .map(|j| {
                let word = VOCABULARY[(index * 7 + j) % VOCABULARY.len()];
                let word = if j % 10 == 0 { capitalize(word) } else { word.to_string() };
                if j % 10 == 9 || j + 1 == words {
                    format!("{}.", word)
                } else {
                    word
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn capitalize(word: &str) -> String {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn paragraphs(words: usize) -> Vec<String> {
        let mut remaining = words;
        let mut out = Vec::new();
        while remaining > 0 {
            let take = remaining.min(WORDS_PER_PARAGRAPH);
            out.push(paragraph_text(out.len(), take));
            remaining -= take;
        }
        out
    }

    /// A generic article page with exactly `words` words of body text,
    /// wrapped in the usual navigation and footer noise.
    pub fn article_html(title: &str, words: usize) -> String {
        let mut html = format!(
            "<html><head><title>{title} | Example News</title><style>p {{ color: red; }}</style></head><body>\
             <nav><p>Home About Contact Subscribe</p></nav><article><h1>{title}</h1>"
        );

        for (i, paragraph) in paragraphs(words).iter().enumerate() {
            if i > 0 && i % PARAGRAPHS_PER_SECTION == 0 {
                html.push_str(&format!("<h2>Part {}</h2>", i / PARAGRAPHS_PER_SECTION));
            }
            html.push_str(&format!("<p>{}</p>", paragraph));
        }

        html.push_str("</article><footer><p>All rights reserved.</p></footer></body></html>");
        html
    }

    /// The [`Article`] that [`article_html`] extracts to.
    pub fn sample_article(words: usize) -> Article {
        let sections = paragraphs(words)
            .chunks(PARAGRAPHS_PER_SECTION)
            .enumerate()
            .map(|(i, chunk)| {
                let heading = if i == 0 {
                    "Introduction".to_string()
                } else {
                    format!("Part {}", i)
                };
                ArticleSection::new(&heading, chunk)
            })
            .collect();

        Article::new("https://example.com/articles/rivers", "Rivers and Trade", sections)
    }

    pub fn question(index: usize) -> Question {
        let pick = |offset: usize| VOCABULARY[(index * 5 + offset) % VOCABULARY.len()];
        Question {
            id: String::new(),
            text: format!("Which {} matches the {}?", pick(0), pick(1)),
            options: [
                pick(2).to_string(),
                pick(3).to_string(),
                pick(4).to_string(),
                pick(11).to_string(),
            ],
            correct_answer: AnswerLetter::ALL[index % 4],
            difficulty: [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard][index % 3],
            explanation: format!("The {} is described alongside the {}.", pick(0), pick(1)),
            section_reference: Some("Introduction".to_string()),
        }
    }

    pub fn summary_json() -> String {
        r#"{"summary": "Rivers shaped early trade routes. Merchants followed the current to distant markets. Villages grew where bridges crossed the water."}"#.to_string()
    }

    pub fn entities_json() -> String {
        r#"{"people": ["Marco Polo", " Marco Polo ", "Ibn Battuta"], "organizations": ["Hanseatic League"], "locations": ["Danube", "Rhine", ""]}"#.to_string()
    }

    pub fn quiz_json(count: usize) -> String {
        let questions: Vec<serde_json::Value> = (0..count).map(question_json).collect();
        serde_json::json!({ "quiz": questions }).to_string()
    }

    pub fn question_json(index: usize) -> serde_json::Value {
        let q = question(index);
        serde_json::json!({
            "question": q.text,
            "options": q.options,
            "answer": q.correct_answer.to_string(),
            "difficulty": q.difficulty.to_string(),
            "explanation": q.explanation,
            "section_reference": q.section_reference,
        })
    }

    pub fn topics_json() -> String {
        r#"{"related_topics": ["River trade", {"topic_name": "Hanseatic League", "url": "https://en.wikipedia.org/wiki/Hanseatic_League"}, "river trade", "Silk Road"]}"#.to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::article::count_words;

    #[test]
    fn test_paragraph_text_has_exact_word_count() {
        assert_eq!(count_words(&paragraph_text(3, 50)), 50);
        assert_eq!(count_words(&paragraph_text(0, 7)), 7);
    }

    #[test]
    fn test_sample_article_word_count() {
        let article = sample_article(2000);
        assert_eq!(article.word_count, 2000);
        assert_eq!(article.sections[0].heading, "Introduction");
    }

    #[test]
    fn test_fixture_questions_are_structurally_valid() {
        for i in 0..10 {
            assert!(question(i).check_structure().is_ok(), "question {} invalid", i);
        }
    }
}
