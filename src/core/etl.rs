use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::{Phase, SystemMonitor};

pub struct StaffingEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> StaffingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting staffing run");

        let responses = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted matching response ({} chars), analysis: {}",
            responses.matching_response.len(),
            if responses.analysis_response.is_some() {
                "yes"
            } else {
                "no"
            }
        );
        let responses_received = 1 + usize::from(responses.analysis_response.is_some());
        self.monitor.record(Phase::Extract, responses_received);

        let result = self.pipeline.transform(responses).await?;
        tracing::info!(
            "🔄 Transformed: {} matched employees, {} employee documents, {} customized CVs",
            result.matched_employees.len(),
            result.employee_documents.len(),
            result.customized_cvs.len()
        );
        self.monitor.record(Phase::Transform, result.matched_employees.len());

        let documents = result.employee_documents.len() + result.customized_cvs.len();
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Loaded data to: {}", output_path);
        self.monitor.record(Phase::Load, documents);

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
