use serde::{Deserialize, Serialize};

/// One `Name - NN% - skills` entry recovered from a CV-matching response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedEmployee {
    pub name: String,
    pub match_percentage: u8,
    pub skills: String,
}

/// Which heuristic picked up a project header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionTier {
    /// `Project ` together with a ` : ` separator
    StrictHeader,
    /// any casing of `project` with ` : ` or ` - `
    ProjectSeparator,
    /// technology keyword on a non-trivial line
    KeywordFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedProject {
    pub line_index: usize,
    pub project_number: Option<u32>,
    pub tier: DetectionTier,
}

/// Projects per employee plus the flattened per-project assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentPlan {
    /// roster order, one entry per employee
    pub distribution: Vec<(String, usize)>,
    /// one employee per detected project, in line order
    pub assignments: Vec<String>,
}

impl AssignmentPlan {
    pub fn count_for(&self, name: &str) -> usize {
        self.distribution
            .iter()
            .find(|(employee, _)| employee == name)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyResponse,
    EmptyRoster,
    NoProjectsDetected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReconcileOutcome {
    /// Nothing to reconcile, input returned as-is.
    Unchanged { reason: SkipReason },
    /// Headers rewritten, no fenced JSON block present.
    HeadersOnly,
    /// JSON parsed with a top-level `projects` list and was patched field by field.
    StructuredJson,
    /// JSON parsed in another shape; placeholders were filled textually.
    PlaceholderFill,
    /// JSON failed to parse; best-effort textual repair only.
    TextRepair { parse_error: String },
}

/// Final state of one reconciliation call.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledDocument {
    pub text: String,
    pub json: Option<serde_json::Value>,
    pub detected_projects: Vec<DetectedProject>,
    pub plan: Option<AssignmentPlan>,
    pub outcome: ReconcileOutcome,
    pub unresolved_placeholders: Vec<String>,
}

impl ReconciledDocument {
    pub fn unchanged(text: &str, reason: SkipReason) -> Self {
        Self {
            text: text.to_string(),
            json: None,
            detected_projects: Vec::new(),
            plan: None,
            outcome: ReconcileOutcome::Unchanged { reason },
            unresolved_placeholders: Vec::new(),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self.outcome, ReconcileOutcome::Unchanged { .. })
    }
}

/// A past project from the history spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectHistoryEntry {
    pub name: String,
    pub technologies_text: String,
    pub technologies: Vec<String>,
}

/// A pre-parsed CV as produced by the CV-to-JSON conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvRecord {
    pub name: String,
    #[serde(default)]
    pub sections: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

/// Raw LLM output gathered by the extract phase.
#[derive(Debug, Clone, Default)]
pub struct StaffingResponses {
    pub project_description: String,
    pub matching_response: String,
    pub analysis_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeDocument {
    pub name: String,
    pub file_name: String,
    pub content: serde_json::Value,
}

/// What a matching response held in place of customized CVs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizedCvStatus {
    Extracted,
    /// The model said nobody reached the CV threshold.
    NoneQualified,
    #[default]
    Missing,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub matching_response: String,
    pub matched_employees: Vec<MatchedEmployee>,
    pub reconciled: Option<ReconciledDocument>,
    pub employee_documents: Vec<EmployeeDocument>,
    pub customized_cvs: Vec<EmployeeDocument>,
    pub customized_cv_status: CustomizedCvStatus,
}
