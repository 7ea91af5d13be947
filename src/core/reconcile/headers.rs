use crate::domain::model::DetectedProject;
use once_cell::sync::Lazy;
use regex::Regex;

const EMPLOYEE_SEPARATOR: &str = " : ";

static HEADER_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(### Project \d+ - .+?) (?:-|:)").expect("valid regex"));

/// Put `employee` after the ` : ` separator of a project header line.
///
/// A header that already carries a separator has its employee replaced, so
/// rewriting twice gives the same line. A CRLF line keeps its `\r` at the end.
pub fn rewrite_header(line: &str, employee: &str) -> String {
    let (line, line_end) = match line.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (line, ""),
    };

    let project = if let Some((project, _)) = line.split_once(EMPLOYEE_SEPARATOR) {
        project
    } else if let Some(caps) = HEADER_SHAPE.captures(line) {
        caps.get(1).map_or(line, |header| header.as_str())
    } else {
        line
    };

    format!("{}{}{}{}", project, EMPLOYEE_SEPARATOR, employee, line_end)
}

/// Produce a new line list with every detected header rewritten.
pub fn rewrite_headers(
    lines: &[&str],
    detected: &[DetectedProject],
    assignments: &[String],
) -> Vec<String> {
    let mut rewritten: Vec<String> = lines.iter().map(|line| line.to_string()).collect();

    for (project, employee) in detected.iter().zip(assignments) {
        let index = project.line_index;
        rewritten[index] = rewrite_header(lines[index], employee);
    }

    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_existing_employee() {
        assert_eq!(
            rewrite_header("### Project 1 - Shop : [Employee 1 Name]", "Jane Doe"),
            "### Project 1 - Shop : Jane Doe"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = rewrite_header("### Project 2 - Portal", "Max Roth");
        let twice = rewrite_header(&once, "Max Roth");
        assert_eq!(once, "### Project 2 - Portal : Max Roth");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_header_shape_drops_trailing_similarity() {
        assert_eq!(
            rewrite_header("### Project 3 - CRM Relaunch - 85% similarity", "Jane Doe"),
            "### Project 3 - CRM Relaunch : Jane Doe"
        );
    }

    #[test]
    fn test_crlf_line_keeps_carriage_return_last() {
        let once = rewrite_header("### Project 1 - A\r", "Jane Doe");
        assert_eq!(once, "### Project 1 - A : Jane Doe\r");
        assert_eq!(rewrite_header(&once, "Jane Doe"), once);

        assert_eq!(
            rewrite_header("### Project 3 - CRM - 85% similarity\r", "Max Roth"),
            "### Project 3 - CRM : Max Roth\r"
        );
    }

    #[test]
    fn test_plain_line_gets_suffix() {
        assert_eq!(
            rewrite_header("Java Web Application", "Jane Doe"),
            "Java Web Application : Jane Doe"
        );
    }
}
