//! Partition summaries by project-manager email.

use std::collections::HashMap;

use crate::pipeline::types::{ManagerGroup, QuoteSummary};

/// Result of grouping: one group per distinct email, plus quotes nobody owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    /// Groups in the order their email was first seen.
    pub groups: Vec<ManagerGroup>,
    /// Quote numbers excluded for lack of a manager email.
    pub unassigned: Vec<String>,
}

/// Group summaries by exact (case-sensitive) manager email.
///
/// Order inside each group follows input order. Summaries without an email
/// are left out of every group and logged.
pub fn group_by_manager(summaries: Vec<QuoteSummary>) -> Grouping {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouping = Grouping::default();

    for summary in summaries {
        let Some(email) = summary.manager_email().map(str::to_string) else {
            tracing::warn!(
                quote_id = summary.quote_id,
                "Quote {} has no project manager email",
                summary.quote_number
            );
            grouping.unassigned.push(summary.quote_number);
            continue;
        };

        match index.get(&email) {
            Some(&i) => grouping.groups[i].push(summary),
            None => {
                index.insert(email.clone(), grouping.groups.len());
                grouping.groups.push(ManagerGroup::new(email, summary));
            }
        }
    }

    grouping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::fixtures::summary;

    #[test]
    fn groups_by_exact_email_in_first_seen_order() {
        let grouping = group_by_manager(vec![
            summary(1, "b@example.com"),
            summary(2, "a@example.com"),
            summary(3, "b@example.com"),
        ]);

        assert_eq!(grouping.groups.len(), 2);
        assert_eq!(grouping.groups[0].email(), "b@example.com");
        assert_eq!(grouping.groups[1].email(), "a@example.com");
        let ids: Vec<i64> = grouping.groups[0].quotes().iter().map(|q| q.quote_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(grouping.unassigned.is_empty());
    }

    #[test]
    fn every_member_matches_group_key() {
        let grouping = group_by_manager(vec![
            summary(1, "pm@example.com"),
            summary(2, "other@example.com"),
            summary(3, "pm@example.com"),
            summary(4, "other@example.com"),
        ]);
        for group in &grouping.groups {
            assert!(!group.is_empty());
            assert!(group.quotes().iter().all(|q| q.project_manager_email == group.email()));
        }
    }

    #[test]
    fn email_match_is_case_sensitive() {
        let grouping = group_by_manager(vec![
            summary(1, "PM@example.com"),
            summary(2, "pm@example.com"),
        ]);
        assert_eq!(grouping.groups.len(), 2);
    }

    #[test]
    fn missing_email_is_excluded() {
        let grouping = group_by_manager(vec![
            summary(1, ""),
            summary(2, "pm@example.com"),
            summary(3, "  "),
        ]);
        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].len(), 1);
        assert_eq!(grouping.unassigned, vec!["Q-1".to_string(), "Q-3".to_string()]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert_eq!(group_by_manager(Vec::new()), Grouping::default());
    }
}
