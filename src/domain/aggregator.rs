//! Bottom-up performance aggregation over the organization tree.
//!
//! Operators carry measured performance. Every calculated node with
//! subordinates is scored from the share of operators below it that reach
//! [`AggregationPolicy::operator_threshold`]:
//!
//! - share `>=` the node's target percentage (default 80): 100
//! - otherwise: 0 under [`Scoring::Binary`], `round(share / target * 100)`
//!   under [`Scoring::Proportional`]
//!
//! A calculated node with subordinates but no operators below it averages
//! its direct subordinates instead. Calculated nodes without subordinates
//! and operators keep their values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::entities::{round_half_up, Internal, Leaf, Node};
use crate::domain::status::SUCCESS_THRESHOLD;

/// Default success-rate target for calculated nodes, in percent.
pub const DEFAULT_TARGET_PERCENTAGE: f64 = 80.0;

/// How a calculated node that misses its target is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scoring {
    /// All or nothing: 100 on target, 0 otherwise
    #[default]
    Binary,
    /// Partial credit below target
    Proportional,
}

impl FromStr for Scoring {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(Scoring::Binary),
            "proportional" => Ok(Scoring::Proportional),
            other => Err(format!("unknown scoring '{}' (expected binary or proportional)", other)),
        }
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::Binary => f.write_str("binary"),
            Scoring::Proportional => f.write_str("proportional"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationPolicy {
    /// Operator performance counted as "on target"
    pub operator_threshold: i32,
    /// Used when a node has no (or a zero) target percentage
    pub default_target_percentage: f64,
    pub scoring: Scoring,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            operator_threshold: SUCCESS_THRESHOLD,
            default_target_percentage: DEFAULT_TARGET_PERCENTAGE,
            scoring: Scoring::Binary,
        }
    }
}

/// Recalculates calculated nodes bottom-up.
///
/// Stateless apart from its policy; the input tree is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceAggregator {
    policy: AggregationPolicy,
}

impl PerformanceAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AggregationPolicy {
        &self.policy
    }

    /// Return a new tree with every calculated node rescored, children first.
    #[instrument(level = "debug", skip_all, fields(root = %tree.id()))]
    pub fn recalculate(&self, tree: &Node) -> Node {
        self.rebuild(tree)
    }

    fn rebuild(&self, node: &Node) -> Node {
        match node {
            Node::Leaf(leaf) => Node::Leaf(leaf.clone()),
            Node::Internal(internal) => {
                let mut rebuilt = Internal {
                    member: internal.member.clone(),
                    performance: internal.performance,
                    target_percentage: internal.target_percentage,
                    children: internal.children.iter().map(|c| self.rebuild(c)).collect(),
                };
                rebuilt.performance = self.manager_performance(&rebuilt);
                trace!(id = %rebuilt.member.id, performance = rebuilt.performance, "rescored");
                Node::Internal(rebuilt)
            }
        }
    }

    /// Score one calculated node from its children as they are.
    ///
    /// Children are not rescored first; use [`Self::recalculate`] for a whole tree.
    pub fn manager_performance(&self, node: &Internal) -> i32 {
        if node.children.is_empty() {
            return node.performance;
        }

        let operators: Vec<&Leaf> = node.children.iter().flat_map(Node::operators).collect();
        if operators.is_empty() {
            return average_performance(&node.children);
        }

        let success_rate = self.success_rate(&operators);
        let target = node.effective_target_percentage(self.policy.default_target_percentage);
        if success_rate >= target {
            return 100;
        }
        match self.policy.scoring {
            Scoring::Binary => 0,
            Scoring::Proportional => round_half_up(success_rate / target * 100.0),
        }
    }

    /// Percentage of `operators` at or above the operator threshold.
    pub fn success_rate(&self, operators: &[&Leaf]) -> f64 {
        if operators.is_empty() {
            return 0.0;
        }
        let on_target = operators
            .iter()
            .filter(|op| op.performance >= self.policy.operator_threshold)
            .count();
        on_target as f64 / operators.len() as f64 * 100.0
    }
}

/// Recalculate with the default (binary) policy.
pub fn recalculate(tree: &Node) -> Node {
    PerformanceAggregator::default().recalculate(tree)
}

fn average_performance(children: &[Node]) -> i32 {
    let total: i64 = children.iter().map(|c| i64::from(c.performance())).sum();
    round_half_up(total as f64 / children.len() as f64)
}
