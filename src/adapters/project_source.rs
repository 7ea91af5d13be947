use crate::core::technologies::extract_technologies;
use crate::domain::model::ProjectHistoryEntry;
use crate::utils::error::Result;
use std::path::Path;

const PROJECT_COLUMNS: [&str; 2] = ["Projekte", "Projects"];
const TECHNOLOGY_ROW_PREFIX: &str = "Eingesetzte Technologien:";

/// Read past projects from a CSV export of the project spreadsheet.
///
/// A technology row belongs to the project row directly above it.
pub fn load_project_history<P: AsRef<Path>>(csv_path: P) -> Result<Vec<ProjectHistoryEntry>> {
    let path = csv_path.as_ref();
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    let Some(column) = headers
        .iter()
        .position(|header| PROJECT_COLUMNS.contains(&header.trim()))
    else {
        tracing::warn!("⚠️ No 'Projekte' column found in {}", path.display());
        return Ok(Vec::new());
    };

    let mut cells: Vec<String> = Vec::new();
    for record in reader.records() {
        let record = record?;
        cells.push(record.get(column).unwrap_or_default().trim().to_string());
    }

    let mut projects = Vec::new();
    for (index, cell) in cells.iter().enumerate() {
        if cell.is_empty() || cell.starts_with(TECHNOLOGY_ROW_PREFIX) {
            continue;
        }

        let technologies_text = cells
            .get(index + 1)
            .filter(|next| next.starts_with(TECHNOLOGY_ROW_PREFIX))
            .cloned()
            .unwrap_or_default();

        let technologies = extract_technologies(&format!("{} {}", cell, technologies_text))
            .into_iter()
            .map(str::to_string)
            .collect();

        projects.push(ProjectHistoryEntry {
            name: cell.clone(),
            technologies_text,
            technologies,
        });
    }

    tracing::info!("📚 Loaded {} past projects from {}", projects.len(), path.display());
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_technology_rows_attach_to_project_above() {
        let file = csv_file(
            "Nr,Projekte\n\
             1,Online Shop Relaunch\n\
             ,\"Eingesetzte Technologien: PHP, Laravel, MySQL\"\n\
             2,Intranet Portal\n\
             3,Banking Backend\n\
             ,\"Eingesetzte Technologien: Java, Spring Boot\"\n",
        );

        let history = load_project_history(file.path()).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].name, "Online Shop Relaunch");
        assert!(history[0].technologies_text.contains("Laravel"));
        assert!(history[0].technologies.contains(&"PHP".to_string()));
        assert!(history[1].technologies_text.is_empty());
        assert!(history[2].technologies.contains(&"Spring Boot".to_string()));
    }

    #[test]
    fn test_missing_column_is_empty() {
        let file = csv_file("Name,Year\nShop,2020\n");
        assert!(load_project_history(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_project_history("/definitely/not/here.csv").is_err());
    }
}
