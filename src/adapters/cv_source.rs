use crate::domain::model::CvRecord;
use crate::utils::error::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read every `*.json` CV in `dir`, in file name order.
///
/// Unparseable files are skipped with a warning; a missing directory gives no CVs.
pub fn load_cv_records<P: AsRef<Path>>(dir: P) -> Result<Vec<CvRecord>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        tracing::warn!("⚠️ CV directory not found: {}", dir.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str::<CvRecord>(&content) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!("⚠️ Skipping CV {}: {}", path.display(), e),
        }
    }

    tracing::info!("📄 Loaded {} CVs from {}", records.len(), dir.display());
    Ok(records)
}

/// Render CVs as one prompt text block.
pub fn combine_cv_text(records: &[CvRecord]) -> String {
    let mut text = String::new();

    for cv in records {
        text.push_str(&format!("===== CV: {} =====\n\n", cv.name));

        for (section, content) in &cv.sections {
            let content = match content {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text.push_str(&format!("--- {} ---\n{}\n\n", section.to_uppercase(), content));
        }

        if !cv.emails.is_empty() {
            text.push_str(&format!("--- CONTACT ---\nEmail: {}\n", cv.emails.join(", ")));
        }
        if !cv.phones.is_empty() {
            text.push_str(&format!("Phone: {}\n", cv.phones.join(", ")));
        }

        text.push_str("\n\n");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_sorted_and_skip_broken() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("b_max.json"),
            r#"{"name": "Max Roth", "sections": {"skills": "PHP"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("a_jane.json"),
            r#"{"name": "Jane Doe", "emails": ["jane@example.com"]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = load_cv_records(dir.path()).unwrap();

        let names: Vec<&str> = records.iter().map(|cv| cv.name.as_str()).collect();
        assert_eq!(names, vec!["Jane Doe", "Max Roth"]);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let records = load_cv_records(dir.path().join("nope")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_combined_text_layout() {
        let mut sections = serde_json::Map::new();
        sections.insert("skills".to_string(), Value::String("Java, 8+ Jahre".to_string()));
        let cv = CvRecord {
            name: "Jane Doe".to_string(),
            sections,
            emails: vec!["jane@example.com".to_string()],
            phones: vec!["+43 1 234".to_string()],
        };

        assert_eq!(
            combine_cv_text(&[cv]),
            "===== CV: Jane Doe =====\n\n--- SKILLS ---\nJava, 8+ Jahre\n\n--- CONTACT ---\nEmail: jane@example.com\nPhone: +43 1 234\n\n\n"
        );
    }
}
