use super::{
    validate_staffing_config, DEFAULT_API_ENDPOINT, DEFAULT_CV_JSON_DIR, DEFAULT_MIN_MATCH_PERCENTAGE,
    DEFAULT_MIN_SIMILARITY, DEFAULT_MODEL, DEFAULT_OUTPUT_PATH, DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StaffingError};
use crate::utils::validation::Validate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static ENV_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputsConfig {
    pub project_file: Option<String>,
    pub project_text: Option<String>,
    pub cv_json_dir: Option<String>,
    pub projects_file: Option<String>,
    pub matching_response_file: Option<String>,
    pub analysis_response_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default = "default_min_match_percentage")]
    pub min_match_percentage: u8,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_min_match_percentage() -> u8 {
    DEFAULT_MIN_MATCH_PERCENTAGE
}

fn default_min_similarity() -> u8 {
    DEFAULT_MIN_SIMILARITY
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            timeout_seconds: None,
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_match_percentage: DEFAULT_MIN_MATCH_PERCENTAGE,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StaffingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENAI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .is_some_and(|format| format == "json")
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_staffing_config(self)?;

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_ref()) {
            if !LOG_FORMATS.contains(&format.as_str()) {
                return Err(StaffingError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.clone(),
                    reason: format!("Valid formats: {}", LOG_FORMATS.join(", ")),
                });
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.llm.endpoint
    }

    /// An unresolved `${VAR}` counts as no key at all.
    fn api_key(&self) -> Option<&str> {
        self.llm
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !ENV_PLACEHOLDER.is_match(key))
    }

    fn model(&self) -> &str {
        &self.llm.model
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.llm.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn cv_json_dir(&self) -> &str {
        self.inputs.cv_json_dir.as_deref().unwrap_or(DEFAULT_CV_JSON_DIR)
    }

    fn projects_file(&self) -> Option<&str> {
        self.inputs.projects_file.as_deref()
    }

    fn project_file(&self) -> Option<&str> {
        self.inputs.project_file.as_deref()
    }

    fn project_text(&self) -> Option<&str> {
        self.inputs.project_text.as_deref()
    }

    fn matching_response_file(&self) -> Option<&str> {
        self.inputs.matching_response_file.as_deref()
    }

    fn analysis_response_file(&self) -> Option<&str> {
        self.inputs.analysis_response_file.as_deref()
    }

    fn min_match_percentage(&self) -> u8 {
        self.matching.min_match_percentage
    }

    fn min_similarity(&self) -> u8 {
        self.matching.min_similarity
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "weekly-staffing"
description = "Staff the Freelancer Map shortlist"
version = "1.0.0"

[llm]
api_key = "sk-test"
model = "gpt-4o"
timeout_seconds = 60

[inputs]
project_file = "project.txt"
cv_json_dir = "./cvs"
projects_file = "history.csv"

[matching]
min_match_percentage = 80

[load]
output_path = "./out"

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "weekly-staffing");
        assert_eq!(config.api_endpoint(), DEFAULT_API_ENDPOINT);
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.request_timeout_seconds(), 60);
        assert_eq!(config.cv_json_dir(), "./cvs");
        assert_eq!(config.min_match_percentage(), 80);
        assert_eq!(config.min_similarity(), 60);
        assert!(config.monitoring_enabled());
        assert!(config.json_logging());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[pipeline]\nname = \"min\"\n").unwrap();

        assert_eq!(config.output_path(), DEFAULT_OUTPUT_PATH);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.request_timeout_seconds(), 120);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("STAFFING_TEST_KEY", "sk-from-env");

        let config = TomlConfig::from_toml_str(
            "[pipeline]\nname = \"env\"\n\n[llm]\napi_key = \"${STAFFING_TEST_KEY}\"\n",
        )
        .unwrap();
        assert_eq!(config.api_key(), Some("sk-from-env"));

        std::env::remove_var("STAFFING_TEST_KEY");
    }

    #[test]
    fn test_unresolved_key_counts_as_missing() {
        let config = TomlConfig::from_toml_str(
            "[pipeline]\nname = \"env\"\n\n[llm]\napi_key = \"${STAFFING_SURELY_UNSET_VAR}\"\n\n[inputs]\nproject_text = \"Java\"\n",
        )
        .unwrap();

        assert_eq!(config.api_key(), None);
        assert!(matches!(
            config.validate(),
            Err(StaffingError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_replay_config_validates_without_key() {
        let config = TomlConfig::from_toml_str(
            "[pipeline]\nname = \"replay\"\n\n[inputs]\nmatching_response_file = \"m.txt\"\nanalysis_response_file = \"a.md\"\n",
        )
        .unwrap();

        assert!(config.is_replay());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_format() {
        let config = TomlConfig::from_toml_str(
            "[pipeline]\nname = \"x\"\n\n[inputs]\nmatching_response_file = \"m.txt\"\nanalysis_response_file = \"a.md\"\n\n[monitoring]\nenabled = false\nlog_format = \"xml\"\n",
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[pipeline]\nname = \"file-test\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
