use serde::Deserialize;
use validator::Validate;

use crate::models::domain::quiz::{DEFAULT_QUESTIONS, MAX_QUESTIONS, MIN_QUESTIONS};

pub const DEFAULT_HISTORY_LIMIT: u64 = 20;
pub const MAX_HISTORY_LIMIT: u64 = 100;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(length(min = 1, max = 2048, message = "url must be 1 to 2048 characters"))]
    pub url: String,

    #[validate(range(min = 5, max = 10, message = "num_questions must be between 5 and 10"))]
    pub num_questions: Option<usize>,
}

impl GenerateQuizRequest {
    pub fn num_questions(&self) -> usize {
        self.num_questions
            .unwrap_or(DEFAULT_QUESTIONS)
            .clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HistoryParams {
    #[validate(range(min = 1, max = 1_000_000, message = "page must be between 1 and 1000000"))]
    pub page: Option<u64>,

    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,

    #[validate(length(max = 200))]
    pub search: Option<String>,
}

impl HistoryParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }

    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults_to_eight_questions() {
        let request: GenerateQuizRequest =
            serde_json::from_str(r#"{"url": "https://example.com/a"}"#).expect("request parses");

        assert!(request.validate().is_ok());
        assert_eq!(request.num_questions(), 8);
    }

    #[test]
    fn test_generate_request_rejects_out_of_range_counts() {
        for count in [0, 4, 11] {
            let request = GenerateQuizRequest {
                url: "https://example.com/a".to_string(),
                num_questions: Some(count),
            };
            assert!(request.validate().is_err(), "{} should be rejected", count);
        }
    }

    #[test]
    fn test_generate_request_rejects_empty_url() {
        let request = GenerateQuizRequest {
            url: String::new(),
            num_questions: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_history_params_defaults() {
        let params = HistoryParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert_eq!(params.search(), None);

        let params = HistoryParams {
            search: Some("  rust ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search().as_deref(), Some("rust"));
    }

    #[test]
    fn test_history_params_validation() {
        let params = HistoryParams {
            page: Some(0),
            limit: Some(500),
            search: None,
        };
        assert!(params.validate().is_err());

        let huge_page = HistoryParams {
            page: Some(u64::MAX),
            ..Default::default()
        };
        assert!(huge_page.validate().is_err());
    }
}
