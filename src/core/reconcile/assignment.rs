use super::roster::{ExperienceLevels, Roster};
use crate::domain::model::AssignmentPlan;
use std::cmp::Reverse;

impl AssignmentPlan {
    /// Distribute `project_count` projects over the roster.
    ///
    /// Everyone starts with one project. Surplus projects go round-robin in
    /// descending experience; a deficit is taken back from the least
    /// experienced first. Ties keep roster order.
    pub fn build(roster: &Roster, experience: &ExperienceLevels, project_count: usize) -> Self {
        let names = roster.names();
        if names.is_empty() {
            return Self {
                distribution: Vec::new(),
                assignments: Vec::new(),
            };
        }

        let mut most_experienced: Vec<usize> = (0..names.len()).collect();
        most_experienced.sort_by_key(|&i| Reverse(experience.years(&names[i])));

        let mut counts = vec![1usize; names.len()];

        let mut remaining = project_count.saturating_sub(names.len());
        let mut cursor = 0;
        while remaining > 0 {
            counts[most_experienced[cursor]] += 1;
            remaining -= 1;
            cursor = (cursor + 1) % most_experienced.len();
        }

        let mut total: usize = counts.iter().sum();
        if total > project_count {
            let mut least_experienced: Vec<usize> = (0..names.len()).collect();
            least_experienced.sort_by_key(|&i| experience.years(&names[i]));

            for i in least_experienced {
                if total <= project_count {
                    break;
                }
                if counts[i] > 0 {
                    counts[i] -= 1;
                    total -= 1;
                }
            }
        }

        let mut assignments: Vec<String> = names
            .iter()
            .zip(&counts)
            .flat_map(|(name, &count)| std::iter::repeat(name.clone()).take(count))
            .collect();

        // 理論上不會發生，保險起見循環補齊
        while assignments.len() < project_count {
            let next = names[assignments.len() % names.len()].clone();
            assignments.push(next);
        }
        assignments.truncate(project_count);

        Self {
            distribution: names.iter().cloned().zip(counts).collect(),
            assignments,
        }
    }
}
