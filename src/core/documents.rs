use crate::domain::model::{CustomizedCvStatus, EmployeeDocument};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const EMPLOYEE_DOCUMENT_DIR: &str = "employee_projects";
pub const CUSTOMIZED_CV_DIR: &str = "customized_cvs";

/// A bare object only counts as a CV with a name and one of these.
const CV_DETAIL_KEYS: [&str; 3] = ["contact", "education", "work_experience"];

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\s*(.*?)```").expect("valid regex"));
static CUSTOMIZED_CV_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)CUSTOMIZED CV FOR ([^\n"]+?)\s*```json\s*(.*?)\s*```"#).expect("valid regex")
});
static PROJECT_CV_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)CUSTOMIZED CV FOR PROJECT.*?```json\s*(.*?)\s*```").expect("valid regex")
});
static BARE_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
static NO_QUALIFIED_EMPLOYEES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"No employees meet the required \d+% skills match for customized CV generation\.")
        .expect("valid regex")
});
static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Parse the first fenced JSON block of an analysis.
pub fn extract_analysis_json(text: &str) -> Option<Value> {
    let caps = FENCED_JSON.captures(text)?;
    match serde_json::from_str(caps[1].trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("⚠️ Analysis JSON could not be parsed: {}", e);
            None
        }
    }
}

/// One document per named entry of `employees[]`.
pub fn employee_documents(analysis: &Value) -> Vec<EmployeeDocument> {
    let Some(employees) = analysis.get("employees").and_then(Value::as_array) else {
        return Vec::new();
    };

    employees
        .iter()
        .filter_map(|employee| {
            let name = employee.get("name")?.as_str()?.to_string();
            Some(EmployeeDocument {
                file_name: format!("{}/{}.json", EMPLOYEE_DOCUMENT_DIR, safe_file_name(&name)),
                name,
                content: employee.clone(),
            })
        })
        .collect()
}

/// Customized CV objects from a CV-matching response.
///
/// Tried in order, the first tier that yields anything wins:
/// `CUSTOMIZED CV FOR <NAME>` sections (the `###` form included), the first
/// fenced JSON block, a `CUSTOMIZED CV FOR PROJECT` section, then a bare
/// object that carries a name plus contact, education or work experience.
pub fn extract_customized_cvs(text: &str) -> Vec<Value> {
    let sections = named_cv_sections(text);
    if !sections.is_empty() {
        tracing::debug!("Found {} customized CV sections", sections.len());
        return sections;
    }

    if let Some(value) = FENCED_JSON
        .captures(text)
        .and_then(|caps| parse_cv(caps[1].trim(), "first JSON block"))
    {
        return into_cv_list(value);
    }

    if let Some(value) = PROJECT_CV_SECTION
        .captures(text)
        .and_then(|caps| parse_cv(&caps[1], "project CV section"))
    {
        return into_cv_list(value);
    }

    BARE_OBJECT
        .find(text)
        .and_then(|found| serde_json::from_str::<Value>(found.as_str()).ok())
        .filter(looks_like_cv)
        .map(|cv| vec![cv])
        .unwrap_or_default()
}

/// The model's sentence for "nobody reached the CV threshold".
pub fn reports_no_qualified_employees(text: &str) -> bool {
    NO_QUALIFIED_EMPLOYEES.is_match(text)
}

/// Customized CVs of a matching response as `customized_cvs/<name>.json`.
pub fn customized_cv_documents(
    matching_response: &str,
) -> (Vec<EmployeeDocument>, CustomizedCvStatus) {
    let cvs = extract_customized_cvs(matching_response);
    if cvs.is_empty() {
        let status = if reports_no_qualified_employees(matching_response) {
            CustomizedCvStatus::NoneQualified
        } else {
            CustomizedCvStatus::Missing
        };
        return (Vec::new(), status);
    }

    let mut documents: Vec<EmployeeDocument> = Vec::with_capacity(cvs.len());
    for (i, cv) in cvs.into_iter().enumerate() {
        let name = cv
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let mut stem = safe_file_name(&name);
        if stem.is_empty() {
            stem = format!("customized_cv_{}", i + 1);
        }
        let mut file_name = format!("{}/{}.json", CUSTOMIZED_CV_DIR, stem);
        if documents.iter().any(|doc| doc.file_name == file_name) {
            file_name = format!("{}/{}_{}.json", CUSTOMIZED_CV_DIR, stem, i + 1);
        }
        documents.push(EmployeeDocument {
            name,
            file_name,
            content: cv,
        });
    }

    (documents, CustomizedCvStatus::Extracted)
}

fn named_cv_sections(text: &str) -> Vec<Value> {
    CUSTOMIZED_CV_SECTION
        .captures_iter(text)
        .filter_map(|caps| {
            let header_name = caps[1].trim();
            let mut cv = parse_cv(&caps[2], header_name)?;
            let has_name = cv
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty());
            if !has_name {
                if let Some(fields) = cv.as_object_mut() {
                    fields.insert("name".to_string(), Value::String(header_name.to_string()));
                }
            }
            Some(cv)
        })
        .collect()
}

fn parse_cv(json: &str, context: &str) -> Option<Value> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("⚠️ Customized CV ({}) is not valid JSON: {}", context, e);
            None
        }
    }
}

fn into_cv_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().filter(Value::is_object).collect(),
        other => vec![other],
    }
}

fn looks_like_cv(value: &Value) -> bool {
    value.get("name").is_some() && CV_DETAIL_KEYS.iter().any(|key| value.get(key).is_some())
}

pub fn safe_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS
        .replace_all(name, "")
        .trim()
        .replace(' ', "_")
}
