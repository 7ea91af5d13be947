//! Bracket-placeholder substitution for template-shaped JSON.
//!
//! All tokens are resolved in one left-to-right pass. Indexed employee tokens
//! (`[Employee 2 Name]`) map to roster positions, generic ones
//! (`[Employee Name]`) rotate through the roster, and per-project field
//! tokens take the k-th project for their k-th occurrence. Anything that
//! cannot be resolved is left in place and reported.

use super::details::ProjectDetails;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

static TEMPLATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<indexed>\[Employee (?P<index>\d+) Name(?: from Matched CVs)?\])",
        r"|(?P<generic>\[(?:Different )?Employee Name(?: from Matched CVs)?\])",
        r"|(?P<bare>\bEmployee (?P<bare_index>\d+)\b)",
        r#"|(?P<number>"project_number":\s*\[#\])"#,
        r#"|(?P<name>"project_name":\s*"\[Project Name\]")"#,
        r#"|(?P<similarity>"similarity":\s*\[Original Similarity %\])"#,
        r#"|(?P<used>"technologies_used":\s*\["Tech1",\s*"Tech2",\s*\.\.\.\])"#,
        r#"|(?P<matching>"matching_technologies":\s*\["Tech1",\s*"Tech2",\s*\.\.\.\])"#,
        r#"|(?P<enhanced>"enhanced_technologies":\s*\["Additional Tech1",\s*"Additional Tech2",\s*\.\.\.\])"#,
        r#"|(?P<enhanced_similarity>"enhanced_similarity":\s*\[Enhanced Similarity %\])"#,
        r#"|(?P<description>"description":\s*"\[Brief description of the project\]")"#,
        r#"|(?P<matching_count>"matching_projects_count":\s*\[number\])"#,
        r#"|(?P<enhanced_count>"enhanced_projects_count":\s*\[number\])"#,
        r#"|(?P<versatile>"most_versatile_employees":\s*\["Employee1",\s*"Employee2",\s*\.\.\.\])"#,
    ))
    .expect("valid regex")
});

static LEFTOVER_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:#|number|similarity%|[A-Z][A-Za-z0-9 %#]*)\]").expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ProjectField {
    Number,
    Name,
    Similarity,
    TechnologiesUsed,
    MatchingTechnologies,
    EnhancedTechnologies,
    EnhancedSimilarity,
    Description,
}

impl ProjectField {
    const GROUPS: [(&'static str, ProjectField); 8] = [
        ("number", ProjectField::Number),
        ("name", ProjectField::Name),
        ("similarity", ProjectField::Similarity),
        ("used", ProjectField::TechnologiesUsed),
        ("matching", ProjectField::MatchingTechnologies),
        ("enhanced", ProjectField::EnhancedTechnologies),
        ("enhanced_similarity", ProjectField::EnhancedSimilarity),
        ("description", ProjectField::Description),
    ];

    fn render(self, project: &ProjectDetails) -> String {
        match self {
            ProjectField::Number => format!("\"project_number\": {}", project.number),
            ProjectField::Name => format!(
                "\"project_name\": {}",
                Value::String(project.name.clone())
            ),
            ProjectField::Similarity => format!("\"similarity\": {}", project.similarity),
            ProjectField::TechnologiesUsed => format!(
                "\"technologies_used\": {}",
                string_array(&project.technologies_used)
            ),
            ProjectField::MatchingTechnologies => format!(
                "\"matching_technologies\": {}",
                string_array(&project.matching_technologies)
            ),
            ProjectField::EnhancedTechnologies => "\"enhanced_technologies\": []".to_string(),
            ProjectField::EnhancedSimilarity => {
                format!("\"enhanced_similarity\": {}", project.enhanced_similarity)
            }
            ProjectField::Description => format!(
                "\"description\": {}",
                Value::String(project.description.clone())
            ),
        }
    }
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Result of one fill pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledTemplate {
    pub text: String,
    pub unresolved: Vec<String>,
}

pub struct PlaceholderFill<'a> {
    roster: &'a [String],
    projects: &'a [ProjectDetails],
}

impl<'a> PlaceholderFill<'a> {
    pub fn new(roster: &'a [String], projects: &'a [ProjectDetails]) -> Self {
        Self { roster, projects }
    }

    pub fn fill(&self, template: &str) -> FilledTemplate {
        let mut generic_cursor = 0usize;
        let mut field_cursors: Vec<(ProjectField, usize)> = Vec::new();

        let text = TEMPLATE_TOKEN
            .replace_all(template, |caps: &Captures| {
                let original = caps[0].to_string();

                if let Some(index) = caps.name("index").or_else(|| caps.name("bare_index")) {
                    return index
                        .as_str()
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| self.roster.get(i))
                        .cloned()
                        .unwrap_or(original);
                }

                if caps.name("generic").is_some() {
                    if self.roster.is_empty() {
                        return original;
                    }
                    let name = self.roster[generic_cursor % self.roster.len()].clone();
                    generic_cursor += 1;
                    return name;
                }

                if caps.name("matching_count").is_some() {
                    return format!("\"matching_projects_count\": {}", self.projects.len());
                }
                if caps.name("enhanced_count").is_some() {
                    return "\"enhanced_projects_count\": 0".to_string();
                }
                if caps.name("versatile").is_some() {
                    let names: Vec<String> = self.roster.to_vec();
                    return format!("\"most_versatile_employees\": {}", string_array(&names));
                }

                for (group, field) in ProjectField::GROUPS {
                    if caps.name(group).is_none() {
                        continue;
                    }
                    let occurrence = match field_cursors.iter_mut().find(|(f, _)| *f == field) {
                        Some((_, seen)) => {
                            *seen += 1;
                            *seen - 1
                        }
                        None => {
                            field_cursors.push((field, 1));
                            0
                        }
                    };
                    return match self.projects.get(occurrence) {
                        Some(project) => field.render(project),
                        None => original,
                    };
                }

                original
            })
            .into_owned();

        let unresolved = unresolved_placeholders(&text);
        FilledTemplate { text, unresolved }
    }
}

/// Bracket tokens still present after filling.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for token in LEFTOVER_TOKEN.find_iter(text) {
        let token = token.as_str().to_string();
        if !found.contains(&token) {
            found.push(token);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<String> {
        vec!["Jane Doe".to_string(), "Max Roth".to_string()]
    }

    fn project(number: u32, name: &str) -> ProjectDetails {
        ProjectDetails {
            number,
            name: name.to_string(),
            similarity: 90,
            technologies_used: vec!["Java".to_string(), "Spring".to_string()],
            matching_technologies: Vec::new(),
            enhanced_similarity: 90,
            description: format!("{} description", name),
        }
    }

    #[test]
    fn test_indexed_and_generic_employee_tokens() {
        let roster = roster();
        let filler = PlaceholderFill::new(&roster, &[]);

        let filled = filler.fill(
            r#"["[Employee 2 Name]", "[Employee 1 Name from Matched CVs]", "[Employee Name]", "[Different Employee Name]", "[Employee Name]"]"#,
        );

        assert_eq!(
            filled.text,
            r#"["Max Roth", "Jane Doe", "Jane Doe", "Max Roth", "Jane Doe"]"#
        );
        assert!(filled.unresolved.is_empty());
    }

    #[test]
    fn test_index_beyond_roster_is_reported() {
        let roster = roster();
        let filled = PlaceholderFill::new(&roster, &[]).fill(r#"{"name": "[Employee 3 Name]"}"#);

        assert_eq!(filled.text, r#"{"name": "[Employee 3 Name]"}"#);
        assert_eq!(filled.unresolved, vec!["[Employee 3 Name]"]);
    }

    #[test]
    fn test_project_fields_follow_occurrence_order() {
        let roster = roster();
        let projects = vec![project(4, "Shop \"Neo\""), project(7, "Portal")];
        let template = r#"{"projects": [
  {"project_number": [#], "project_name": "[Project Name]", "technologies_used": ["Tech1", "Tech2", ...]},
  {"project_number": [#], "project_name": "[Project Name]", "enhanced_technologies": ["Additional Tech1", "Additional Tech2", ...]},
  {"project_number": [#]}
]}"#;

        let filled = PlaceholderFill::new(&roster, &projects).fill(template);

        assert!(filled.text.contains(r#""project_number": 4, "project_name": "Shop \"Neo\"", "technologies_used": ["Java","Spring"]"#));
        assert!(filled.text.contains(r#""project_number": 7, "project_name": "Portal", "enhanced_technologies": []"#));
        assert_eq!(filled.unresolved, vec!["[#]"]);
    }

    #[test]
    fn test_summary_tokens() {
        let roster = roster();
        let projects = vec![project(1, "A")];
        let filled = PlaceholderFill::new(&roster, &projects).fill(
            r#"{"matching_projects_count": [number], "enhanced_projects_count": [number], "most_versatile_employees": ["Employee1", "Employee2", ...]}"#,
        );

        assert_eq!(
            filled.text,
            r#"{"matching_projects_count": 1, "enhanced_projects_count": 0, "most_versatile_employees": ["Jane Doe","Max Roth"]}"#
        );
    }

    #[test]
    fn test_empty_roster_leaves_generic_tokens() {
        let filled = PlaceholderFill::new(&[], &[]).fill("[Employee Name]");
        assert_eq!(filled.text, "[Employee Name]");
        assert_eq!(filled.unresolved, vec!["[Employee Name]"]);
    }
}
