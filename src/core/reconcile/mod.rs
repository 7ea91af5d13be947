//! Align a past-project analysis with the employees that were actually matched.
//!
//! The pass never fails: every malformed input degrades to a partial textual
//! repair, and anything left unresolved is reported on the returned document.

pub mod assignment;
pub mod details;
pub mod detection;
pub mod headers;
pub mod json_block;
pub mod placeholders;
pub mod roster;

use crate::domain::model::{
    AssignmentPlan, MatchedEmployee, ReconcileOutcome, ReconciledDocument, SkipReason,
};
use details::collect_project_details;
use detection::detect_projects;
use headers::rewrite_headers;
use json_block::{strip_line_comments, JsonBlock};
use placeholders::{unresolved_placeholders, PlaceholderFill};
use roster::{ExperienceLevels, Roster};
use serde_json::Value;

/// Reconcile `response` against `matched` and return only the final text.
pub fn post_process_response(response: &str, matched: &[MatchedEmployee]) -> String {
    reconcile(response, matched).text
}

pub fn reconcile(response: &str, matched: &[MatchedEmployee]) -> ReconciledDocument {
    if response.trim().is_empty() {
        return ReconciledDocument::unchanged(response, SkipReason::EmptyResponse);
    }

    let roster = Roster::resolve(response, matched);
    if roster.is_empty() {
        tracing::warn!("⚠️ No employees to assign, leaving response unchanged");
        return ReconciledDocument::unchanged(response, SkipReason::EmptyRoster);
    }
    tracing::debug!(
        "Roster ({:?}): {}",
        roster.source(),
        roster.names().join(", ")
    );

    let experience = ExperienceLevels::from_matched(matched);
    for name in roster.names() {
        tracing::debug!("  {} - {} years", name, experience.years(name));
    }

    let lines: Vec<&str> = response.split('\n').collect();
    let excluded = JsonBlock::locate(response).map(|block| block.line_range(response));
    let detected = detect_projects(&lines, excluded);
    if detected.is_empty() {
        tracing::warn!("⚠️ No project headers detected, leaving response unchanged");
        return ReconciledDocument::unchanged(response, SkipReason::NoProjectsDetected);
    }

    let plan = AssignmentPlan::build(&roster, &experience, detected.len());
    tracing::info!(
        "📋 Assigning {} projects to {} employees",
        detected.len(),
        roster.len()
    );
    for (name, count) in &plan.distribution {
        tracing::debug!("  {}: {} projects", name, count);
    }

    let rewritten = rewrite_headers(&lines, &detected, &plan.assignments);
    let text = rewritten.join("\n");

    let Some(block) = JsonBlock::locate(&text) else {
        return ReconciledDocument {
            text,
            json: None,
            detected_projects: detected,
            plan: Some(plan),
            outcome: ReconcileOutcome::HeadersOnly,
            unresolved_placeholders: Vec::new(),
        };
    };

    let raw = block.content(&text);
    let (content, json, outcome) = match serde_json::from_str::<Value>(raw) {
        Ok(mut value) if has_project_list(&value) => {
            patch_projects(&mut value, &plan.assignments);
            match serde_json::to_string_pretty(&value) {
                Ok(content) => (content, Some(value), ReconcileOutcome::StructuredJson),
                Err(e) => {
                    tracing::warn!("⚠️ Could not re-serialize patched JSON: {}", e);
                    (raw.to_string(), Some(value), ReconcileOutcome::StructuredJson)
                }
            }
        }
        Ok(_) => {
            let content = fill_template(raw, &roster, &rewritten);
            let json = serde_json::from_str(&content).ok();
            (content, json, ReconcileOutcome::PlaceholderFill)
        }
        Err(e) => {
            tracing::warn!("⚠️ Embedded JSON is malformed ({}), repairing as text", e);
            let content = fill_template(raw, &roster, &rewritten);
            let json = serde_json::from_str(&content).ok();
            let outcome = ReconcileOutcome::TextRepair {
                parse_error: e.to_string(),
            };
            (content, json, outcome)
        }
    };

    let unresolved = unresolved_placeholders(&content);
    if !unresolved.is_empty() {
        tracing::warn!(
            "⚠️ {} placeholders left unresolved: {}",
            unresolved.len(),
            unresolved.join(", ")
        );
    }
    tracing::info!("✅ Reconciled analysis ({:?})", outcome);

    ReconciledDocument {
        text: block.splice(&text, &content),
        json,
        detected_projects: detected,
        plan: Some(plan),
        outcome,
        unresolved_placeholders: unresolved,
    }
}

fn has_project_list(value: &Value) -> bool {
    value.get("projects").is_some_and(Value::is_array)
}

fn patch_projects(value: &mut Value, assignments: &[String]) {
    let mut enhanced_count = 0;

    if let Some(projects) = value.get_mut("projects").and_then(Value::as_array_mut) {
        for (index, project) in projects.iter_mut().enumerate() {
            let Some(project) = project.as_object_mut() else {
                continue;
            };

            if let Some(employee) = assignments.get(index) {
                project.insert(
                    "assigned_employee".to_string(),
                    Value::String(employee.clone()),
                );
            }

            let enhanced: Vec<Value> = project
                .get("enhanced_technologies")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if enhanced.is_empty() {
                continue;
            }
            enhanced_count += 1;

            let used = project
                .entry("technologies_used")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(used) = used.as_array_mut() {
                for technology in enhanced {
                    if !used.contains(&technology) {
                        used.push(technology);
                    }
                }
            }
        }
    }

    if let Some(summary) = value.get_mut("summary").and_then(Value::as_object_mut) {
        summary.insert(
            "enhanced_projects_count".to_string(),
            Value::from(enhanced_count),
        );
    }
}

fn fill_template(raw: &str, roster: &Roster, lines: &[String]) -> String {
    let details = collect_project_details(lines);
    tracing::debug!("Collected details for {} projects", details.len());
    let filled = PlaceholderFill::new(roster.names(), &details).fill(raw);
    strip_line_comments(&filled.text)
}
