pub mod documents;
pub mod etl;
pub mod matching;
pub mod pipeline;
pub mod prompts;
pub mod reconcile;
pub mod technologies;

pub use crate::domain::model::{MatchedEmployee, ReconciledDocument, TransformResult};
pub use crate::domain::ports::{ConfigProvider, LlmBackend, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use matching::extract_matched_employees;
pub use reconcile::{post_process_response, reconcile};
