pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StaffingError};
use crate::utils::validation::{
    validate_file_extensions, validate_path, validate_range, validate_url,
};

#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_CV_JSON_DIR: &str = "./CV_json";
pub const DEFAULT_MIN_MATCH_PERCENTAGE: u8 = 70;
pub const DEFAULT_MIN_SIMILARITY: u8 = 60;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "staffing-etl")]
#[command(about = "Match employee CVs to a project and staff matching past projects")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_CV_JSON_DIR)]
    pub cv_json_dir: String,

    /// CSV export of the past project spreadsheet
    #[arg(long)]
    pub projects_file: Option<String>,

    #[arg(long, conflicts_with = "project_text")]
    pub project_file: Option<String>,

    #[arg(long)]
    pub project_text: Option<String>,

    /// Replay a saved CV matching response instead of calling the LLM
    #[arg(long)]
    pub matching_response: Option<String>,

    /// Replay a saved past-project analysis instead of calling the LLM
    #[arg(long)]
    pub analysis_response: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MIN_MATCH_PERCENTAGE)]
    pub min_match_percentage: u8,

    #[arg(long, default_value_t = DEFAULT_MIN_SIMILARITY)]
    pub min_similarity: u8,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn cv_json_dir(&self) -> &str {
        &self.cv_json_dir
    }

    fn projects_file(&self) -> Option<&str> {
        self.projects_file.as_deref()
    }

    fn project_file(&self) -> Option<&str> {
        self.project_file.as_deref()
    }

    fn project_text(&self) -> Option<&str> {
        self.project_text.as_deref()
    }

    fn matching_response_file(&self) -> Option<&str> {
        self.matching_response.as_deref()
    }

    fn analysis_response_file(&self) -> Option<&str> {
        self.analysis_response.as_deref()
    }

    fn min_match_percentage(&self) -> u8 {
        self.min_match_percentage
    }

    fn min_similarity(&self) -> u8 {
        self.min_similarity
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_staffing_config(self)?;
        tracing::info!("✅ CLI configuration validation passed");
        Ok(())
    }
}

/// Whether a run with this configuration has to reach the LLM.
pub fn needs_live_call<C: ConfigProvider>(config: &C) -> bool {
    config.matching_response_file().is_none()
        || (config.analysis_response_file().is_none() && config.projects_file().is_some())
}

/// Checks shared by every configuration source.
pub fn validate_staffing_config<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_path("output_path", config.output_path())?;
    validate_range("min_match_percentage", config.min_match_percentage(), 0, 100)?;
    validate_range("min_similarity", config.min_similarity(), 0, 100)?;
    validate_range("timeout_seconds", config.request_timeout_seconds(), 1, 3600)?;

    if let Some(projects_file) = config.projects_file() {
        validate_file_extensions("projects_file", &[projects_file], &["csv"])?;
    }

    if needs_live_call(config) {
        validate_url("api_endpoint", config.api_endpoint())?;
        if config.api_key().is_none() {
            return Err(StaffingError::MissingConfigError {
                field: "api_key".to_string(),
            });
        }
        if config.project_text().is_none() && config.project_file().is_none() {
            return Err(StaffingError::MissingConfigError {
                field: "project_text or project_file".to_string(),
            });
        }
        validate_path("cv_json_dir", config.cv_json_dir())?;
    }

    Ok(())
}
