//! Summary metrics over an annotated organization tree.

use crate::domain::entities::Node;
use crate::domain::status::Status;

/// Label for members without a team (the board around the director).
pub const UNASSIGNED_TEAM: &str = "Directorate";

/// Counts and totals across a whole organization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsMetrics {
    pub total_members: usize,
    pub success: usize,
    pub warning: usize,
    pub danger: usize,
    pub operators: usize,
    pub operators_on_target: usize,
    /// Sum of targets over operators carrying both figures
    pub total_target: f64,
    /// Sum of achieved values over operators carrying both figures
    pub total_achieved: f64,
    /// Calculated nodes with subordinates
    pub managers: usize,
    pub managers_at_full: usize,
}

impl ResultsMetrics {
    pub fn from_tree(tree: &Node, operator_threshold: i32) -> Self {
        let mut metrics = Self::default();
        for node in tree.iter() {
            metrics.total_members += 1;
            match node.status() {
                Status::Success => metrics.success += 1,
                Status::Warning => metrics.warning += 1,
                Status::Danger => metrics.danger += 1,
            }
            match node {
                Node::Leaf(leaf) => {
                    metrics.operators += 1;
                    if leaf.performance >= operator_threshold {
                        metrics.operators_on_target += 1;
                    }
                    if let (Some(target), Some(achieved)) = (leaf.target, leaf.achieved) {
                        metrics.total_target += target;
                        metrics.total_achieved += achieved;
                    }
                }
                Node::Internal(internal) if !internal.children.is_empty() => {
                    metrics.managers += 1;
                    if internal.performance == 100 {
                        metrics.managers_at_full += 1;
                    }
                }
                Node::Internal(_) => {}
            }
        }
        metrics
    }

    /// Share of operators on target, in percent.
    pub fn operator_success_rate(&self) -> f64 {
        percentage(self.operators_on_target, self.operators)
    }

    /// Share of managers scored 100, in percent.
    pub fn manager_success_rate(&self) -> f64 {
        percentage(self.managers_at_full, self.managers)
    }
}

/// Headcount of one team below the root.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamShare {
    pub team: String,
    pub count: usize,
    pub percentage: f64,
}

/// Headcount per team for everyone below the root, in first-seen order.
pub fn team_distribution(tree: &Node) -> Vec<TeamShare> {
    let mut shares: Vec<TeamShare> = Vec::new();
    let mut total = 0;

    for node in tree.children().iter().flat_map(Node::iter) {
        let team = node.member().team.as_deref().unwrap_or(UNASSIGNED_TEAM);
        match shares.iter_mut().find(|s| s.team == team) {
            Some(share) => share.count += 1,
            None => shares.push(TeamShare {
                team: team.to_string(),
                count: 1,
                percentage: 0.0,
            }),
        }
        total += 1;
    }

    for share in &mut shares {
        share.percentage = percentage(share.count, total);
    }
    shares
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_zero_denominator_when_computing_percentage_then_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(ResultsMetrics::default().manager_success_rate(), 0.0);
    }
}
