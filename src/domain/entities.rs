//! Domain entities: organization members and the hierarchy tree

use serde::{Deserialize, Serialize};

use crate::domain::status::{status_from_performance, Status};

/// Descriptive data of an organization member, opaque to aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub position: String,
    pub team: Option<String>,
}

impl Member {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: impl Into<String>,
        team: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: position.into(),
            team: team.map(str::to_string),
        }
    }
}

/// Operator: performance is measured directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub member: Member,
    pub performance: i32,
    /// Quota for the period
    pub target: Option<f64>,
    /// Actual figure for the period
    pub achieved: Option<f64>,
}

impl Leaf {
    pub fn new(member: Member, performance: i32) -> Self {
        Self {
            member,
            performance,
            target: None,
            achieved: None,
        }
    }

    /// Leaf whose performance is `round(achieved / target * 100)`.
    ///
    /// A non-positive target yields performance 0.
    pub fn from_quota(member: Member, target: f64, achieved: f64) -> Self {
        Self {
            member,
            performance: quota_performance(target, achieved),
            target: Some(target),
            achieved: Some(achieved),
        }
    }

    pub fn status(&self) -> Status {
        status_from_performance(self.performance)
    }
}

/// Manager: performance is derived from subordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Internal {
    pub member: Member,
    pub performance: i32,
    /// Success-rate threshold subordinate operators must clear (default 80)
    pub target_percentage: Option<f64>,
    pub children: Vec<Node>,
}

impl Internal {
    pub fn new(member: Member, children: Vec<Node>) -> Self {
        Self {
            member,
            performance: 0,
            target_percentage: None,
            children,
        }
    }

    pub fn with_target_percentage(mut self, target_percentage: f64) -> Self {
        self.target_percentage = Some(target_percentage);
        self
    }

    pub fn with_performance(mut self, performance: i32) -> Self {
        self.performance = performance;
        self
    }

    /// Configured target percentage, or `default` when unset or zero.
    pub fn effective_target_percentage(&self, default: f64) -> f64 {
        self.target_percentage
            .filter(|p| *p != 0.0 && !p.is_nan())
            .unwrap_or(default)
    }

    pub fn status(&self) -> Status {
        status_from_performance(self.performance)
    }
}

/// Node of the organization tree.
///
/// A leaf cannot own children; an internal node may have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRepr", into = "NodeRepr")]
pub enum Node {
    Leaf(Leaf),
    Internal(Internal),
}

impl Node {
    pub fn member(&self) -> &Member {
        match self {
            Node::Leaf(leaf) => &leaf.member,
            Node::Internal(internal) => &internal.member,
        }
    }

    pub fn id(&self) -> &str {
        &self.member().id
    }

    pub fn name(&self) -> &str {
        &self.member().name
    }

    pub fn performance(&self) -> i32 {
        match self {
            Node::Leaf(leaf) => leaf.performance,
            Node::Internal(internal) => internal.performance,
        }
    }

    pub fn status(&self) -> Status {
        status_from_performance(self.performance())
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::Internal(internal) => &internal.children,
        }
    }

    /// True for nodes whose performance is derived from subordinates.
    pub fn is_calculated(&self) -> bool {
        matches!(self, Node::Internal(_))
    }

    /// Operators below (or at) this node, in child order.
    ///
    /// An internal node without children contributes none.
    pub fn operators(&self) -> Vec<&Leaf> {
        let mut operators = Vec::new();
        self.collect_operators(&mut operators);
        operators
    }

    fn collect_operators<'a>(&'a self, operators: &mut Vec<&'a Leaf>) {
        match self {
            Node::Leaf(leaf) => operators.push(leaf),
            Node::Internal(internal) => {
                for child in &internal.children {
                    child.collect_operators(operators);
                }
            }
        }
    }

    /// Pre-order traversal, children left to right.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Node::depth)
            .max()
            .unwrap_or(0)
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.iter().find(|node| node.id() == id)
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Reverse push keeps left-to-right order
        for child in current.children().iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}

/// Flat member record as delivered by the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub id: String,
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<String>,
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub performance: i32,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "is_calculated")]
    pub is_calculated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "target_percentage")]
    pub target_percentage: Option<f64>,
}

impl FlatRecord {
    pub fn new(id: &str, parent_id: Option<&str>, name: &str, position: &str, performance: i32) -> Self {
        Self {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            name: name.to_string(),
            position: position.to_string(),
            performance,
            team: None,
            target: None,
            achieved: None,
            is_calculated: None,
            target_percentage: None,
        }
    }

    pub fn member(&self) -> Member {
        Member {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position.clone(),
            team: self.team.clone(),
        }
    }
}

/// Wire shape of a node: one record type with optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRepr {
    id: String,
    name: String,
    position: String,
    #[serde(default)]
    performance: Option<i32>,
    /// Ignored on input
    #[serde(default)]
    status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    achieved: Option<f64>,
    #[serde(default)]
    is_calculated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_percentage: Option<f64>,
    #[serde(default)]
    children: Vec<Node>,
}

impl From<NodeRepr> for Node {
    fn from(repr: NodeRepr) -> Self {
        let member = Member {
            id: repr.id,
            name: repr.name,
            position: repr.position,
            team: repr.team,
        };
        if repr.is_calculated || !repr.children.is_empty() {
            Node::Internal(Internal {
                member,
                performance: repr.performance.unwrap_or(0),
                target_percentage: repr.target_percentage,
                children: repr.children,
            })
        } else {
            let performance = match (repr.performance, repr.target, repr.achieved) {
                (Some(performance), _, _) => performance,
                (None, Some(target), Some(achieved)) => quota_performance(target, achieved),
                _ => 0,
            };
            Node::Leaf(Leaf {
                member,
                performance,
                target: repr.target,
                achieved: repr.achieved,
            })
        }
    }
}

impl From<Node> for NodeRepr {
    fn from(node: Node) -> Self {
        let status = Some(node.status());
        match node {
            Node::Leaf(leaf) => NodeRepr {
                id: leaf.member.id,
                name: leaf.member.name,
                position: leaf.member.position,
                performance: Some(leaf.performance),
                status,
                team: leaf.member.team,
                target: leaf.target,
                achieved: leaf.achieved,
                is_calculated: false,
                target_percentage: None,
                children: Vec::new(),
            },
            Node::Internal(internal) => NodeRepr {
                id: internal.member.id,
                name: internal.member.name,
                position: internal.member.position,
                performance: Some(internal.performance),
                status,
                team: internal.member.team,
                target: None,
                achieved: None,
                is_calculated: true,
                target_percentage: internal.target_percentage,
                children: internal.children,
            },
        }
    }
}

/// Round half up, as dashboards display percentages.
pub(crate) fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

fn quota_performance(target: f64, achieved: f64) -> i32 {
    if target <= 0.0 {
        return 0;
    }
    round_half_up(achieved / target * 100.0)
}
