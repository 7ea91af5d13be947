//! Recovers `(name, percentage, skills)` tuples from a CV-matching response.
//!
//! The model is asked to answer with lines shaped like
//! `- Christian Tu - 40% - ASP.NET, SharePoint, ...`. Skills may wrap onto
//! following lines; the entry ends at the next entry line, a `BARRIERS:`
//! marker, a blank line or the end of the text.

use crate::domain::model::MatchedEmployee;
use once_cell::sync::Lazy;
use regex::Regex;

static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-?\s*([\w\s'.-]+?)\s*-\s*(\d{1,3})%\s*-\s*(.*)$").expect("valid regex")
});

const BARRIERS_MARKER: &str = "BARRIERS:";

struct EntryStart {
    name: String,
    match_percentage: u8,
    skills: String,
}

fn parse_entry_line(line: &str) -> Option<EntryStart> {
    let caps = ENTRY_LINE.captures(line)?;

    let percentage: u8 = caps[2].parse().ok()?;
    if percentage > 100 {
        return None;
    }

    // 名稱前殘留的 '-' 再剝一次
    let name = caps[1].trim();
    let name = name.strip_prefix('-').unwrap_or(name).trim();
    if name.is_empty() {
        return None;
    }

    Some(EntryStart {
        name: name.to_string(),
        match_percentage: percentage,
        skills: caps[3].trim_end().to_string(),
    })
}

/// Extract every matched employee, in the order they appear in `matching_text`.
///
/// Text without any entry yields an empty list.
pub fn extract_matched_employees(matching_text: &str) -> Vec<MatchedEmployee> {
    let mut employees = Vec::new();
    let mut current: Option<EntryStart> = None;

    for line in matching_text.lines() {
        if let Some(entry) = parse_entry_line(line) {
            if let Some(done) = current.replace(entry) {
                employees.push(finish(done));
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(BARRIERS_MARKER) {
            if let Some(done) = current.take() {
                employees.push(finish(done));
            }
            continue;
        }

        if let Some(entry) = current.as_mut() {
            if !entry.skills.is_empty() {
                entry.skills.push('\n');
            }
            entry.skills.push_str(line.trim_end());
        }
    }

    if let Some(done) = current.take() {
        employees.push(finish(done));
    }

    tracing::debug!("Extracted {} matched employees", employees.len());
    employees
}

fn finish(entry: EntryStart) -> MatchedEmployee {
    MatchedEmployee {
        name: entry.name,
        match_percentage: entry.match_percentage,
        skills: entry.skills.trim().to_string(),
    }
}
