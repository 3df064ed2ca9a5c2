pub mod extractor;
pub mod llm;
pub mod normalizer;
pub mod persistence;
pub mod quiz_service;
pub mod retry;
pub mod stages;
pub mod url_resolver;
pub mod validator;
