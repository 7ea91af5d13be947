// Adapters layer: concrete implementations for external systems (LLM, CV files, project history)

pub mod cv_source;
pub mod llm;
pub mod project_source;

pub use cv_source::{combine_cv_text, load_cv_records};
pub use llm::OpenAiBackend;
pub use project_source::load_project_history;
