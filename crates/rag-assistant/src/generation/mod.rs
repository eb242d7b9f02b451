//! Answer generation: prompt assembly and the question-answering pipeline

pub mod answer;
pub mod prompt;

pub use answer::{Answer, AnsweringPipeline, DATABASE_NOT_FOUND};
pub use prompt::PromptBuilder;
