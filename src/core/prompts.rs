//! Prompt texts for the two LLM calls of a staffing run.

use crate::domain::model::{MatchedEmployee, ProjectHistoryEntry};

const CV_MATCHING_TEMPLATE: &str = r####"You are the head of a software company evaluating project postings against the CVs of your employees.

PROJECT CLASSIFICATION CRITERIA:
- FEASIBLE: a single employee can handle the project with at least {min}% skills match.
- ALMOST FEASIBLE: the project needs several employees, or one employee matching between {almost}% and {min}%.
- NOT FEASIBLE: nobody reaches {almost}%, or a new specialist would have to be hired.

Consider direct skill matches as well as transferable skills. A developer with 5+ years in a technology is an expert, 2-5 years is proficient, 1-2 years is intermediate. Mention total experience as "N+ Jahre" in the key skills.

Your response MUST follow this structure:

CLASSIFICATION: [Feasible / Almost Feasible / Not Feasible]

SUITABLE EMPLOYEES:
- [Employee Name] - [Skills Match %] - [Key matching skills]
- [If applicable, list other suitable employees]

[If not feasible] BARRIERS:
- [Specific skills or experience gaps]
- [Potential solutions, if any]

If no employee reaches {min}%, include the sentence "No employees meet the required {min}% skills match for customized CV generation." and do not write any customized CV.
When project history is provided, pick the most relevant reference projects for each suitable employee.

CUSTOMIZED CVS:
For EVERY employee with at least {min}% skills match, write a customized CV:
- 90% match or more: keep their existing skills, only restructure them.
- Between {min}% and 90%: add 1-2 realistic skills the project needs, placed naturally in the technical skills.
- Take reference projects from the project history when it is provided.

Each CV uses exactly this layout, one blank line between CVs:

### CUSTOMIZED CV FOR [EMPLOYEE NAME]

```json
{
    "name": "Employee Full Name",
    "contact": {"phone": "Phone", "email": "Email", "address": "City, Country"},
    "education": {"degree": "Highest Degree", "institution": "Institution", "years": "Start - End"},
    "soft_skills": ["Effective Communication", "Problem Solving", "Team Work"],
    "languages": ["Languages spoken"],
    "work_experience": [
        {
            "company": "Company Name",
            "role": "Job Title",
            "location": "City, Country",
            "years": "Start Year - End Year/Present",
            "responsibilities": ["Responsibility relevant to the project"]
        }
    ],
    "technical_skills": {"Skill Category": "Proficiency in this category"}
}
```

The "### CUSTOMIZED CV FOR" header, the ```json line right after it and the closing ``` are required for every CV, and the JSON must be valid.
"####;

const PROJECT_MATCHING_TEMPLATE: &str = r#"You are a project matching expert. Match the new project description against the company's past projects and assign each matching past project to a different employee.

YOUR TASK:
1. Use the key technologies of the new project (provided in the input)
2. Compare them with the technologies of every past project
3. Return only projects with {min}% or higher similarity
4. For projects between {min}% and 89%, add complementary technologies that bring them to 90%+
5. Assign DIFFERENT employees to each project, using ONLY the names listed under "MATCHED EMPLOYEES:"

OUTPUT FORMAT:

NEW PROJECT TECHNOLOGIES:
- [List key technologies identified in the project description]

MATCHING PAST PROJECTS:

### Project [#] - [Project Name] : [Employee 1 Name from Matched CVs]
**Technologies Used**: [All technologies of this project, including additions]
**Project Description**: [Brief description of the project]

### Project [#] - [Project Name] : [Different Employee Name from Matched CVs]
**Technologies Used**: [All technologies of this project, including additions]
**Project Description**: [Brief description of the project]

SUMMARY:
- Found [number] matching projects with {min}%+ similarity
- Best match: Project [#] with [similarity%] similarity
- Main technology overlaps: [list key overlapping technologies]
- Most versatile employees: [list all employees from the matched employees list]
- Enhanced [number] projects to reach 90%+ similarity

JSON OUTPUT:
```json
{
  "employees": [
    {
      "name": "[Employee 1 Name]",
      "projects": [
        {
          "project_number": [#],
          "project_name": "[Project Name]",
          "similarity": [Original Similarity %],
          "technologies_used": ["Tech1", "Tech2", ...],  // original plus enhanced
          "matching_technologies": [],
          "enhanced_technologies": ["Additional Tech1", "Additional Tech2", ...],
          "enhanced_similarity": [Enhanced Similarity %],
          "description": "[Brief description of the project]"
        }
      ]
    }
  ],
  "summary": {
    "matching_projects_count": [number],
    "enhanced_projects_count": [number],
    "best_match": {
      "project_number": [#],
      "similarity": [similarity%]
    },
    "main_technology_overlaps": ["Tech1", "Tech2", ...],
    "most_versatile_employees": ["Employee1", "Employee2", ...]
  }
}
```

RULES:
1. Keep project names, numbers and technologies exactly as they appear in the past project data
2. Never assign the same employee to more than one project unless there are more projects than employees
3. Do not put similarity percentages in the project title lines
4. The JSON must be valid and properly escaped
"#;

pub fn cv_matching_system_prompt(min_match_percentage: u8) -> String {
    CV_MATCHING_TEMPLATE
        .replace("{min}", &min_match_percentage.to_string())
        .replace(
            "{almost}",
            &min_match_percentage.saturating_sub(20).to_string(),
        )
}

pub fn cv_matching_user_prompt(
    project_description: &str,
    cv_text: &str,
    history: &[ProjectHistoryEntry],
) -> String {
    let mut prompt = format!(
        "Project Description:\n\n{}\n\nCV Data:\n\n{}",
        project_description, cv_text
    );
    if !history.is_empty() {
        prompt.push_str("\n\nExcel Data:\n");
        prompt.push_str(&history_listing(history));
    }
    prompt
}

pub fn project_matching_system_prompt(min_similarity: u8) -> String {
    PROJECT_MATCHING_TEMPLATE.replace("{min}", &min_similarity.to_string())
}

pub fn past_projects_user_prompt(
    project_description: &str,
    technologies: &[&str],
    matched: &[MatchedEmployee],
    history: &[ProjectHistoryEntry],
) -> String {
    let mut matched_block = String::new();
    if !matched.is_empty() {
        matched_block.push_str("\n\nMATCHED EMPLOYEES:\n");
        for employee in matched {
            matched_block.push_str(&format!(
                "- {} - {}% - {}\n",
                employee.name, employee.match_percentage, employee.skills
            ));
        }
    }

    format!(
        "Project Description:\n\n{}\n\nExtracted Technologies: {}\n{}\nPast Projects Data:\n\n{}",
        project_description,
        technologies.join(", "),
        matched_block,
        history_listing(history)
    )
}

/// `### Project N:` sections, numbered in spreadsheet order from 1.
fn history_listing(history: &[ProjectHistoryEntry]) -> String {
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut text = entry.name.clone();
            if !entry.technologies_text.is_empty() {
                text.push('\n');
                text.push_str(&entry.technologies_text);
            }
            format!("### Project {}:\n{}\n\n", i + 1, text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ProjectHistoryEntry> {
        vec![
            ProjectHistoryEntry {
                name: "Webshop".to_string(),
                technologies_text: "Eingesetzte Technologien: PHP, Laravel".to_string(),
                technologies: vec!["PHP".to_string(), "Laravel".to_string()],
            },
            ProjectHistoryEntry {
                name: "Intranet".to_string(),
                technologies_text: String::new(),
                technologies: Vec::new(),
            },
        ]
    }

    #[test]
    fn test_thresholds_substituted() {
        let prompt = cv_matching_system_prompt(70);
        assert!(prompt.contains("at least 70% skills match"));
        assert!(prompt.contains("between 50% and 70%"));
        assert!(!prompt.contains("{min}"));
        assert!(prompt.contains("### CUSTOMIZED CV FOR [EMPLOYEE NAME]"));
        assert!(prompt.contains(
            "No employees meet the required 70% skills match for customized CV generation."
        ));
        assert!(crate::core::documents::reports_no_qualified_employees(&prompt));

        let prompt = project_matching_system_prompt(60);
        assert!(prompt.contains("60% or higher similarity"));
        assert!(prompt.contains("\"project_number\": [#]"));
    }

    #[test]
    fn test_low_threshold_does_not_underflow() {
        assert!(cv_matching_system_prompt(10).contains("between 0% and 10%"));
    }

    #[test]
    fn test_past_projects_prompt_layout() {
        let matched = vec![MatchedEmployee {
            name: "Jane Doe".to_string(),
            match_percentage: 82,
            skills: "Java, Spring".to_string(),
        }];

        let prompt = past_projects_user_prompt("Build a shop", &["PHP", "Laravel"], &matched, &history());

        assert_eq!(
            prompt,
            "Project Description:\n\nBuild a shop\n\nExtracted Technologies: PHP, Laravel\n\n\nMATCHED EMPLOYEES:\n- Jane Doe - 82% - Java, Spring\n\nPast Projects Data:\n\n### Project 1:\nWebshop\nEingesetzte Technologien: PHP, Laravel\n\n### Project 2:\nIntranet\n\n"
        );
    }

    #[test]
    fn test_cv_prompt_history_optional() {
        let without = cv_matching_user_prompt("P", "CVs", &[]);
        assert_eq!(without, "Project Description:\n\nP\n\nCV Data:\n\nCVs");

        let with = cv_matching_user_prompt("P", "CVs", &history());
        assert!(with.contains("\n\nExcel Data:\n### Project 1:\nWebshop"));
    }
}
