pub mod memory;
pub mod quiz_bundle_repository;

pub use memory::MemoryQuizBundleRepository;
pub use quiz_bundle_repository::{MongoQuizBundleRepository, QuizBundleRepository};

#[cfg(test)]
pub use quiz_bundle_repository::MockQuizBundleRepository;
