use crate::domain::model::{StaffingResponses, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where the run's artifacts are written, relative to the output root.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn output_path(&self) -> &str;
    fn cv_json_dir(&self) -> &str;
    fn projects_file(&self) -> Option<&str>;
    fn project_file(&self) -> Option<&str>;
    fn project_text(&self) -> Option<&str>;
    fn matching_response_file(&self) -> Option<&str>;
    fn analysis_response_file(&self) -> Option<&str>;
    fn min_match_percentage(&self) -> u8;
    fn min_similarity(&self) -> u8;

    /// Both LLM responses are replayed from files, so no live call is made.
    fn is_replay(&self) -> bool {
        self.matching_response_file().is_some() && self.analysis_response_file().is_some()
    }
}

/// Black-box `generate(prompt, system_prompt, model) -> text`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, prompt: &str, system_prompt: &str, model: Option<&str>)
        -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<StaffingResponses>;
    async fn transform(&self, responses: StaffingResponses) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
