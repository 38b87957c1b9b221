//! Per-author aggregation over a branch's commits.

use std::collections::{HashMap, HashSet};

use crate::platform::{Committer, CommitterStats, RemoteCommit};

/// Group `commits` by exact author name and sum each group.
///
/// Groups appear in the order their author first appears in `commits`.
pub fn committer_stats(commits: &[RemoteCommit]) -> Vec<CommitterStats> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<CommitterStats> = Vec::new();

    for commit in commits {
        let slot = *index.entry(commit.author()).or_insert_with(|| {
            stats.push(CommitterStats {
                committer: commit.author().to_string(),
                ..Default::default()
            });
            stats.len() - 1
        });
        let entry = &mut stats[slot];
        entry.number_of_commits += 1;
        entry.number_of_additions += commit.additions();
        entry.number_of_deletions += commit.deletions();
    }

    stats
}

/// Distinct author names in first-appearance order.
pub fn distinct_committers(commits: &[RemoteCommit]) -> Vec<Committer> {
    let mut seen = HashSet::new();
    commits
        .iter()
        .filter(|c| seen.insert(c.author()))
        .map(|c| Committer {
            name: c.author().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn commit(id: &str, author: &str, additions: u64, deletions: u64) -> RemoteCommit {
        RemoteCommit::new(
            id,
            format!("commit {id}"),
            author,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            vec![],
            additions,
            deletions,
        )
    }

    #[test]
    fn stats_group_by_author_in_first_appearance_order() {
        let commits = vec![
            commit("1", "A", 3, 1),
            commit("2", "A", 2, 0),
            commit("3", "B", 5, 2),
        ];

        let stats = committer_stats(&commits);

        assert_eq!(
            stats,
            vec![
                CommitterStats {
                    committer: "A".to_string(),
                    number_of_commits: 2,
                    number_of_additions: 5,
                    number_of_deletions: 1,
                },
                CommitterStats {
                    committer: "B".to_string(),
                    number_of_commits: 1,
                    number_of_additions: 5,
                    number_of_deletions: 2,
                },
            ]
        );
    }

    #[test]
    fn stats_match_author_names_exactly() {
        let commits = vec![
            commit("1", "dev", 1, 0),
            commit("2", "Dev", 1, 0),
            commit("3", "dev", 1, 0),
        ];

        let stats = committer_stats(&commits);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].committer, "dev");
        assert_eq!(stats[0].number_of_commits, 2);
        assert_eq!(stats[1].committer, "Dev");
    }

    #[test]
    fn stats_of_no_commits_is_empty() {
        assert!(committer_stats(&[]).is_empty());
    }

    #[test]
    fn committers_are_distinct_in_order() {
        let commits = vec![
            commit("1", "B", 0, 0),
            commit("2", "A", 0, 0),
            commit("3", "B", 0, 0),
        ];

        let names: Vec<String> = distinct_committers(&commits)
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["B", "A"]);
    }
}
