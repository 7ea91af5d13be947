use once_cell::sync::Lazy;
use regex::Regex;

/// Similarity the text report does not state; assumed for filled-in JSON.
pub const ASSUMED_SIMILARITY: u32 = 90;

static SECTION_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"### Project (\d+)").expect("valid regex"));
static NAMED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Project (\d+) - (.+?)(?:\s+:|$)").expect("valid regex"));

/// Per-project metadata re-read from the markdown part of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    pub number: u32,
    pub name: String,
    pub similarity: u32,
    pub technologies_used: Vec<String>,
    pub matching_technologies: Vec<String>,
    pub enhanced_similarity: u32,
    pub description: String,
}

impl ProjectDetails {
    fn new(number: u32, name: String) -> Self {
        Self {
            number,
            name,
            similarity: ASSUMED_SIMILARITY,
            technologies_used: Vec::new(),
            matching_technologies: Vec::new(),
            enhanced_similarity: ASSUMED_SIMILARITY,
            description: String::new(),
        }
    }
}

/// Walk `### Project N - Name` sections and the detail lines below each one.
///
/// A repeated project number replaces the earlier entry in place.
pub fn collect_project_details<S: AsRef<str>>(lines: &[S]) -> Vec<ProjectDetails> {
    let mut projects: Vec<ProjectDetails> = Vec::new();
    let mut current: Option<usize> = None;

    for line in lines {
        let line = line.as_ref();

        if let Some(caps) = SECTION_HEADER.captures(line) {
            let Ok(number) = caps[1].parse::<u32>() else {
                current = None;
                continue;
            };
            let name = NAMED_HEADER
                .captures(line)
                .map(|named| named[2].trim().to_string())
                .unwrap_or_default();

            let details = ProjectDetails::new(number, name);
            current = match projects.iter().position(|p| p.number == number) {
                Some(existing) => {
                    projects[existing] = details;
                    Some(existing)
                }
                None => {
                    projects.push(details);
                    Some(projects.len() - 1)
                }
            };
            continue;
        }

        let Some(index) = current else {
            continue;
        };

        // **Technologies Used**: ... 也要認得
        let plain = line.replace('*', "");
        let plain = plain.trim().trim_start_matches('-').trim();

        if let Some(value) = value_after(plain, "Technologies Used:") {
            projects[index].technologies_used = split_list(value);
        } else if let Some(value) = value_after(plain, "Matching Technologies:") {
            projects[index].matching_technologies = split_list(value);
        } else if let Some(value) = value_after(plain, "Project Description:") {
            projects[index].description = value.trim().to_string();
        }
    }

    projects
}

fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.find(label).map(|at| &line[at + label.len()..])
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
