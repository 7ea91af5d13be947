use crate::domain::model::{DetectedProject, DetectionTier};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

/// Looser tiers are only tried while fewer candidates than this were found.
pub const MIN_PROJECT_CANDIDATES: usize = 4;

const FALLBACK_KEYWORDS: [&str; 6] = [
    "Java",
    "Spring",
    "Web",
    "Application",
    "Software",
    "Development",
];

static PROJECT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Project\s+(\d+)").expect("valid regex"));

impl DetectionTier {
    pub const ORDER: [DetectionTier; 3] = [
        DetectionTier::StrictHeader,
        DetectionTier::ProjectSeparator,
        DetectionTier::KeywordFallback,
    ];

    pub fn matches(self, line: &str) -> bool {
        match self {
            DetectionTier::StrictHeader => line.contains("Project ") && line.contains(" : "),
            DetectionTier::ProjectSeparator => {
                line.to_lowercase().contains("project")
                    && (line.contains(" : ") || line.contains(" - "))
            }
            DetectionTier::KeywordFallback => {
                line.trim().chars().count() > 10
                    && FALLBACK_KEYWORDS.iter().any(|keyword| line.contains(keyword))
            }
        }
    }

    /// The keyword tier stops mid-scan as soon as enough candidates exist.
    fn stops_at_threshold(self) -> bool {
        matches!(self, DetectionTier::KeywordFallback)
    }
}

pub fn project_number(line: &str) -> Option<u32> {
    PROJECT_NUMBER
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

/// Find project header lines, trying each tier in order.
///
/// Lines in `excluded` (the fenced JSON block) are never candidates. The
/// result is in line order whatever tier found each line, so a keyword hit
/// that turns strict once it carries ` : Name` keeps its slot on a rerun.
pub fn detect_projects(lines: &[&str], excluded: Option<Range<usize>>) -> Vec<DetectedProject> {
    let mut detected: Vec<DetectedProject> = Vec::new();
    let mut taken: HashSet<usize> = HashSet::new();

    for tier in DetectionTier::ORDER {
        if tier != DetectionTier::StrictHeader && detected.len() >= MIN_PROJECT_CANDIDATES {
            break;
        }

        let before = detected.len();
        for (index, line) in lines.iter().enumerate() {
            if taken.contains(&index) || excluded.as_ref().is_some_and(|r| r.contains(&index)) {
                continue;
            }
            if !tier.matches(line) {
                continue;
            }

            taken.insert(index);
            detected.push(DetectedProject {
                line_index: index,
                project_number: project_number(line),
                tier,
            });

            if tier.stops_at_threshold() && detected.len() >= MIN_PROJECT_CANDIDATES {
                break;
            }
        }

        tracing::debug!(
            "Detection tier {:?} found {} candidates",
            tier,
            detected.len() - before
        );
    }

    detected.sort_by_key(|project| project.line_index);
    detected
}
