pub mod article;
pub mod quiz;
pub mod quiz_question;

pub use article::{Article, ArticleSection};
pub use quiz::{GenerationStage, KeyEntities, QualityWarning, QuizBundle, RelatedTopic};
pub use quiz_question::{AnswerLetter, Difficulty, Question};
