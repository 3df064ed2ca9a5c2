use serde::{Deserialize, Serialize};

pub const INTRODUCTION_HEADING: &str = "Introduction";

/// Paragraphs inside a section are separated by a blank line.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSection {
    pub heading: String,
    pub content: String,
}

impl ArticleSection {
    pub fn new(heading: &str, paragraphs: &[String]) -> Self {
        ArticleSection {
            heading: heading.to_string(),
            content: paragraphs.join(PARAGRAPH_SEPARATOR),
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Cleaned article text. Built once by the extractor and never mutated
/// for the rest of a generation run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub full_text: String,
    pub sections: Vec<ArticleSection>,
    pub word_count: usize,
}

impl Article {
    pub fn new(url: &str, title: &str, sections: Vec<ArticleSection>) -> Self {
        let full_text = sections
            .iter()
            .flat_map(|s| s.paragraphs())
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR);
        let word_count = count_words(&full_text);

        Article {
            url: url.to_string(),
            title: title.to_string(),
            full_text,
            sections,
            word_count,
        }
    }

    pub fn section_headings(&self) -> Vec<String> {
        self.sections
            .iter()
            .map(|s| s.heading.clone())
            .filter(|h| !h.trim().is_empty())
            .collect()
    }
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_joins_paragraphs_and_counts_words() {
        let sections = vec![
            ArticleSection::new(
                INTRODUCTION_HEADING,
                &["One two three.".to_string(), "Four five.".to_string()],
            ),
            ArticleSection::new("History", &["Six seven eight nine.".to_string()]),
        ];

        let article = Article::new("https://example.com/a", "Numbers", sections);

        assert_eq!(article.word_count, 9);
        assert_eq!(
            article.full_text,
            "One two three.\n\nFour five.\n\nSix seven eight nine."
        );
        assert_eq!(article.section_headings(), vec!["Introduction", "History"]);
    }

    #[test]
    fn section_paragraphs_skip_blank_entries() {
        let section = ArticleSection {
            heading: "Odd".to_string(),
            content: "First\n\n\n\n  \n\nSecond".to_string(),
        };

        let paragraphs: Vec<&str> = section.paragraphs().collect();
        assert_eq!(paragraphs, vec!["First", "Second"]);
    }
}
