use crate::domain::model::MatchedEmployee;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

const VERSATILE_MARKER: &str = "Most versatile employees:";

/// Years assumed when a skill text carries no `N+ Jahre` figure.
pub const DEFAULT_EXPERIENCE_YEARS: u32 = 4;

static YEARS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\+\s*Jahre").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSource {
    VersatileSummary,
    MatchedEmployees,
}

/// Employees that projects get distributed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
    source: RosterSource,
}

impl Roster {
    /// The `Most versatile employees:` summary line wins entirely when present;
    /// otherwise the matched employees are used.
    pub fn resolve(response: &str, matched: &[MatchedEmployee]) -> Self {
        if let Some(names) = versatile_summary(response) {
            if !names.is_empty() {
                return Self::from_names(names, RosterSource::VersatileSummary);
            }
        }

        Self::from_names(
            matched.iter().map(|employee| employee.name.clone()),
            RosterSource::MatchedEmployees,
        )
    }

    fn from_names(names: impl IntoIterator<Item = String>, source: RosterSource) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        Self {
            names: unique,
            source,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn source(&self) -> RosterSource {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

fn versatile_summary(response: &str) -> Option<Vec<String>> {
    let line = response.lines().find(|line| line.contains(VERSATILE_MARKER))?;
    let (_, list) = line.split_once(VERSATILE_MARKER)?;

    Some(
        list.split(',')
            .map(|name| name.trim_matches(|c: char| c.is_whitespace() || c == '*'))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// `name -> years`, used only as a sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperienceLevels(HashMap<String, u32>);

impl ExperienceLevels {
    pub fn from_matched(matched: &[MatchedEmployee]) -> Self {
        let levels = matched
            .iter()
            .map(|employee| {
                let years = YEARS_PATTERN
                    .captures(&employee.skills)
                    .and_then(|caps| caps[1].parse().ok())
                    .unwrap_or(DEFAULT_EXPERIENCE_YEARS);
                (employee.name.clone(), years)
            })
            .collect();
        Self(levels)
    }

    /// Names that never appeared among the matched employees rank last.
    pub fn years(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }
}
