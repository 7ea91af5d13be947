use crate::adapters::{combine_cv_text, load_cv_records, load_project_history};
use crate::core::documents::{customized_cv_documents, employee_documents, extract_analysis_json};
use crate::core::matching::extract_matched_employees;
use crate::core::prompts;
use crate::core::reconcile::reconcile;
use crate::core::technologies::extract_technologies;
use crate::domain::model::{
    CustomizedCvStatus, ProjectHistoryEntry, StaffingResponses, TransformResult,
};
use crate::domain::ports::{ConfigProvider, LlmBackend, Pipeline, Storage};
use crate::utils::error::{Result, StaffingError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_FILE: &str = "staffing_bundle.zip";
pub const MATCHING_FILE: &str = "cv_matching_results.txt";
pub const MATCHED_CSV_FILE: &str = "matched_employees.csv";
pub const ANALYSIS_FILE: &str = "past_project_analysis.md";
pub const MANIFEST_FILE: &str = "manifest.json";

pub struct StaffingPipeline<S: Storage, C: ConfigProvider, L: LlmBackend> {
    storage: S,
    config: C,
    llm: L,
}

impl<S: Storage, C: ConfigProvider, L: LlmBackend> StaffingPipeline<S, C, L> {
    pub fn new(storage: S, config: C, llm: L) -> Self {
        Self {
            storage,
            config,
            llm,
        }
    }

    async fn project_description(&self) -> Result<String> {
        if let Some(text) = self.config.project_text() {
            return Ok(text.to_string());
        }
        match self.config.project_file() {
            Some(path) => Ok(tokio::fs::read_to_string(path).await?),
            None => Ok(String::new()),
        }
    }

    async fn project_history(&self) -> Result<Vec<ProjectHistoryEntry>> {
        match self.config.projects_file() {
            Some(path) => load_project_history(path),
            None => Ok(Vec::new()),
        }
    }

    async fn matching_response(
        &self,
        project: &str,
        history: &[ProjectHistoryEntry],
    ) -> Result<String> {
        if let Some(path) = self.config.matching_response_file() {
            tracing::info!("📂 Replaying CV matching response from {}", path);
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        let cvs = load_cv_records(self.config.cv_json_dir())?;
        if cvs.is_empty() {
            return Err(StaffingError::ProcessingError {
                message: format!("No CV records found in {}", self.config.cv_json_dir()),
            });
        }

        tracing::info!("🤖 Requesting CV matching for {} CVs", cvs.len());
        let system = prompts::cv_matching_system_prompt(self.config.min_match_percentage());
        let prompt = prompts::cv_matching_user_prompt(project, &combine_cv_text(&cvs), history);
        self.llm.generate(&prompt, &system, None).await
    }

    async fn analysis_response(
        &self,
        project: &str,
        matching_response: &str,
        history: &[ProjectHistoryEntry],
    ) -> Result<Option<String>> {
        if let Some(path) = self.config.analysis_response_file() {
            tracing::info!("📂 Replaying past-project analysis from {}", path);
            return Ok(Some(tokio::fs::read_to_string(path).await?));
        }

        if history.is_empty() {
            tracing::warn!("⚠️ No past project data, skipping past-project analysis");
            return Ok(None);
        }

        let matched = extract_matched_employees(matching_response);
        let technologies = extract_technologies(project);
        tracing::info!(
            "🤖 Requesting past-project analysis ({} projects, {} matched employees)",
            history.len(),
            matched.len()
        );

        let system = prompts::project_matching_system_prompt(self.config.min_similarity());
        let prompt = prompts::past_projects_user_prompt(project, &technologies, &matched, history);
        self.llm.generate(&prompt, &system, None).await.map(Some)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, L: LlmBackend> Pipeline for StaffingPipeline<S, C, L> {
    async fn extract(&self) -> Result<StaffingResponses> {
        if self.config.is_replay() {
            tracing::info!("📂 Replay run, no LLM calls will be made");
        }

        let project_description = self.project_description().await?;
        let history = self.project_history().await?;

        let matching_response = self
            .matching_response(&project_description, &history)
            .await?;
        let analysis_response = self
            .analysis_response(&project_description, &matching_response, &history)
            .await?;

        Ok(StaffingResponses {
            project_description,
            matching_response,
            analysis_response,
        })
    }

    async fn transform(&self, responses: StaffingResponses) -> Result<TransformResult> {
        let matched_employees = extract_matched_employees(&responses.matching_response);
        tracing::info!("👥 Found {} matched employees", matched_employees.len());

        let reconciled = match responses.analysis_response.as_deref() {
            Some(analysis) => {
                if matched_employees.is_empty() {
                    tracing::warn!("⚠️ No matched employees, analysis only uses its own summary");
                }
                let doc = reconcile(analysis, &matched_employees);
                if doc.is_unchanged() {
                    tracing::warn!("⚠️ Analysis left unchanged: {:?}", doc.outcome);
                }
                Some(doc)
            }
            None => None,
        };

        let (customized_cvs, customized_cv_status) =
            customized_cv_documents(&responses.matching_response);
        match customized_cv_status {
            CustomizedCvStatus::Extracted => {
                tracing::info!("📄 Extracted {} customized CVs", customized_cvs.len())
            }
            CustomizedCvStatus::NoneQualified => {
                tracing::info!("ℹ️ No employee reached the customized CV threshold")
            }
            CustomizedCvStatus::Missing => {
                tracing::warn!("⚠️ No customized CV could be extracted from the matching response")
            }
        }

        let employee_documents = reconciled
            .as_ref()
            .and_then(|doc| {
                doc.json
                    .clone()
                    .or_else(|| extract_analysis_json(&doc.text))
            })
            .map(|analysis| employee_documents(&analysis))
            .unwrap_or_default();

        Ok(TransformResult {
            matching_response: responses.matching_response,
            matched_employees,
            reconciled,
            employee_documents,
            customized_cvs,
            customized_cv_status,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), BUNDLE_FILE);

        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        files.push((
            MATCHING_FILE.to_string(),
            result.matching_response.clone().into_bytes(),
        ));
        files.push((
            MATCHED_CSV_FILE.to_string(),
            matched_employees_csv(&result)?,
        ));
        if let Some(doc) = &result.reconciled {
            files.push((ANALYSIS_FILE.to_string(), doc.text.clone().into_bytes()));
        }
        for document in result.employee_documents.iter().chain(&result.customized_cvs) {
            files.push((
                document.file_name.clone(),
                serde_json::to_vec_pretty(&document.content)?,
            ));
        }
        files.push((
            MANIFEST_FILE.to_string(),
            serde_json::to_vec_pretty(&manifest(&result))?,
        ));

        for (name, data) in &files {
            self.storage.write_file(name, data).await?;
        }

        tracing::debug!("Creating ZIP file with {} files", files.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(BUNDLE_FILE, &zip_data).await?;

        Ok(output_path)
    }
}

fn matched_employees_csv(result: &TransformResult) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if result.matched_employees.is_empty() {
        writer.write_record(["name", "match_percentage", "skills"])?;
    }
    for employee in &result.matched_employees {
        writer.serialize(employee)?;
    }
    writer
        .into_inner()
        .map_err(|e| StaffingError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })
}

fn manifest(result: &TransformResult) -> serde_json::Value {
    let reconciled = result.reconciled.as_ref();
    serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "matched_employees": result.matched_employees.len(),
        "analysis": reconciled.map(|doc| serde_json::json!({
            "outcome": doc.outcome,
            "detected_projects": doc.detected_projects.len(),
            "assignments": doc.plan.as_ref().map(|plan| plan.assignments.clone()),
            "unresolved_placeholders": doc.unresolved_placeholders,
        })),
        "employee_documents": result
            .employee_documents
            .iter()
            .map(|document| document.file_name.clone())
            .collect::<Vec<_>>(),
        "customized_cvs": {
            "status": result.customized_cv_status,
            "files": result
                .customized_cvs
                .iter()
                .map(|document| document.file_name.clone())
                .collect::<Vec<_>>(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReconcileOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const MATCHING: &str = "CLASSIFICATION: Feasible\n\nSUITABLE EMPLOYEES:\n- Jane Doe - 88% - Java, Spring, 8+ Jahre\n- Max Roth - 72% - PHP, Laravel, 3+ Jahre\n\n### CUSTOMIZED CV FOR Jane Doe\n\n```json\n{\"name\": \"Jane Doe\", \"contact\": {\"email\": \"jane@example.com\"}}\n```\n";

    const ANALYSIS: &str = r#"MATCHING PAST PROJECTS:

### Project 1 - Banking Backend : [Employee 1 Name from Matched CVs]
**Technologies Used**: Kotlin, Oracle

### Project 3 - Online Shop : [Different Employee Name from Matched CVs]
**Technologies Used**: PHP, Laravel

```json
{
  "projects": [
    {"project_number": 1, "technologies_used": ["Java"], "enhanced_technologies": ["Spring Boot"]},
    {"project_number": 3, "technologies_used": ["PHP"], "enhanced_technologies": []}
  ],
  "employees": [
    {"name": "Jane Doe", "projects": [{"project_number": 1}]},
    {"name": "Max Roth", "projects": [{"project_number": 3}]}
  ],
  "summary": {"enhanced_projects_count": 0}
}
```"#;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    /// Answers by system prompt: matching first, past projects second.
    struct MockLlm {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockLlm {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for MockLlm {
        async fn generate(
            &self,
            prompt: &str,
            system_prompt: &str,
            _model: Option<&str>,
        ) -> Result<String> {
            self.calls.lock().await.push(prompt.to_string());
            if system_prompt.contains("project matching expert") {
                Ok(ANALYSIS.to_string())
            } else {
                Ok(MATCHING.to_string())
            }
        }
    }

    struct MockConfig {
        cv_json_dir: String,
        projects_file: Option<String>,
        matching_response_file: Option<String>,
        analysis_response_file: Option<String>,
    }

    impl MockConfig {
        fn new(cv_json_dir: String) -> Self {
            Self {
                cv_json_dir,
                projects_file: None,
                matching_response_file: None,
                analysis_response_file: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            "http://localhost/v1/chat/completions"
        }
        fn api_key(&self) -> Option<&str> {
            None
        }
        fn model(&self) -> &str {
            "gpt-4o-mini"
        }
        fn request_timeout_seconds(&self) -> u64 {
            5
        }
        fn output_path(&self) -> &str {
            "test_output"
        }
        fn cv_json_dir(&self) -> &str {
            &self.cv_json_dir
        }
        fn projects_file(&self) -> Option<&str> {
            self.projects_file.as_deref()
        }
        fn project_file(&self) -> Option<&str> {
            None
        }
        fn project_text(&self) -> Option<&str> {
            Some("We need a Java Spring Boot backend and a Laravel shop.")
        }
        fn matching_response_file(&self) -> Option<&str> {
            self.matching_response_file.as_deref()
        }
        fn analysis_response_file(&self) -> Option<&str> {
            self.analysis_response_file.as_deref()
        }
        fn min_match_percentage(&self) -> u8 {
            70
        }
        fn min_similarity(&self) -> u8 {
            60
        }
    }

    fn fixtures() -> tempfile::TempDir {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("cvs")).unwrap();
        std::fs::write(
            dir.path().join("cvs/jane.json"),
            r#"{"name": "Jane Doe", "sections": {"skills": "Java"}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("projects.csv"),
            "Projekte\nBanking Backend\n\"Eingesetzte Technologien: Java, Spring Boot\"\nOnline Shop\n",
        )
        .unwrap();
        dir
    }

    fn config_for(dir: &tempfile::TempDir) -> MockConfig {
        let mut config = MockConfig::new(dir.path().join("cvs").to_string_lossy().to_string());
        config.projects_file = Some(dir.path().join("projects.csv").to_string_lossy().to_string());
        config
    }

    #[tokio::test]
    async fn test_extract_calls_llm_twice_with_matched_block() {
        let dir = fixtures();
        let llm = MockLlm::new();
        let calls = llm.calls.clone();
        let pipeline = StaffingPipeline::new(MockStorage::new(), config_for(&dir), llm);

        let responses = pipeline.extract().await.unwrap();

        assert_eq!(responses.matching_response, MATCHING);
        assert_eq!(responses.analysis_response.as_deref(), Some(ANALYSIS));
        let calls = calls.lock().await;
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("===== CV: Jane Doe ====="));
        assert!(calls[0].contains("Excel Data:"));
        assert!(calls[1].contains("MATCHED EMPLOYEES:\n- Jane Doe - 88% - Java, Spring, 8+ Jahre"));
        assert!(calls[1].contains("Extracted Technologies: Java, Spring, Spring Boot, Laravel"));
        assert!(calls[1].contains("### Project 1:\nBanking Backend\nEingesetzte Technologien"));
    }

    #[tokio::test]
    async fn test_no_history_skips_analysis() {
        let dir = fixtures();
        let config = MockConfig::new(dir.path().join("cvs").to_string_lossy().to_string());
        let pipeline = StaffingPipeline::new(MockStorage::new(), config, MockLlm::new());

        let responses = pipeline.extract().await.unwrap();

        assert!(responses.analysis_response.is_none());
    }

    #[tokio::test]
    async fn test_missing_cvs_is_processing_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = MockConfig::new(dir.path().join("missing").to_string_lossy().to_string());
        let pipeline = StaffingPipeline::new(MockStorage::new(), config, MockLlm::new());

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, StaffingError::ProcessingError { .. }));
    }

    #[tokio::test]
    async fn test_transform_reconciles_and_splits_documents() {
        let dir = fixtures();
        let pipeline = StaffingPipeline::new(MockStorage::new(), config_for(&dir), MockLlm::new());

        let result = pipeline
            .transform(StaffingResponses {
                project_description: String::new(),
                matching_response: MATCHING.to_string(),
                analysis_response: Some(ANALYSIS.to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.matched_employees.len(), 2);
        let doc = result.reconciled.unwrap();
        assert_eq!(doc.outcome, ReconcileOutcome::StructuredJson);
        assert!(doc.text.contains("### Project 1 - Banking Backend : Jane Doe"));
        assert!(doc.text.contains("### Project 3 - Online Shop : Max Roth"));
        assert_eq!(result.employee_documents.len(), 2);
        assert_eq!(
            result.employee_documents[0].file_name,
            "employee_projects/Jane_Doe.json"
        );
        assert_eq!(result.customized_cv_status, CustomizedCvStatus::Extracted);
        assert_eq!(result.customized_cvs.len(), 1);
        assert_eq!(
            result.customized_cvs[0].content["contact"]["email"],
            "jane@example.com"
        );
    }

    #[tokio::test]
    async fn test_load_writes_bundle() {
        let dir = fixtures();
        let storage = MockStorage::new();
        let pipeline = StaffingPipeline::new(storage.clone(), config_for(&dir), MockLlm::new());
        let responses = pipeline.extract().await.unwrap();
        let result = pipeline.transform(responses).await.unwrap();

        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, "test_output/staffing_bundle.zip");
        let csv = storage.get_file(MATCHED_CSV_FILE).await.unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert!(csv.starts_with("name,match_percentage,skills\n"));
        assert!(csv.contains("Jane Doe,88,\"Java, Spring, 8+ Jahre\""));
        assert!(storage.get_file("employee_projects/Max_Roth.json").await.is_some());
        assert!(storage.get_file("customized_cvs/Jane_Doe.json").await.is_some());

        let zip_data = storage.get_file(BUNDLE_FILE).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for expected in [MATCHING_FILE, MATCHED_CSV_FILE, ANALYSIS_FILE, MANIFEST_FILE] {
            assert!(names.contains(&expected), "missing {}", expected);
        }

        let manifest: serde_json::Value =
            serde_json::from_slice(&storage.get_file(MANIFEST_FILE).await.unwrap()).unwrap();
        assert_eq!(manifest["matched_employees"], 2);
        assert_eq!(manifest["analysis"]["outcome"]["kind"], "structured_json");
        assert_eq!(manifest["customized_cvs"]["status"], "extracted");
        assert_eq!(
            manifest["customized_cvs"]["files"],
            serde_json::json!(["customized_cvs/Jane_Doe.json"])
        );
    }
}
