use termtree::Tree;
use tracing::instrument;

use crate::domain::Node;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One line per member: `name (position) performance% status`, followed by
/// the team and the figures behind the score when present.
pub fn node_label(node: &Node) -> String {
    let member = node.member();
    let mut label = format!(
        "{} ({}) {}% {}",
        member.name,
        member.position,
        node.performance(),
        node.status()
    );
    if let Some(team) = &member.team {
        label.push_str(&format!(" [{}]", team));
    }
    match node {
        Node::Leaf(leaf) => {
            if let (Some(target), Some(achieved)) = (leaf.target, leaf.achieved) {
                label.push_str(&format!(" {}/{}", achieved, target));
            }
        }
        Node::Internal(internal) => {
            if let Some(target) = internal.target_percentage {
                label.push_str(&format!(" target {}%", target));
            }
        }
    }
    label
}

impl TreeNodeConvert for Node {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(node_label(self)).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Internal, Leaf, Member};

    #[test]
    fn given_tree_when_rendering_then_lists_members_with_status() {
        let tree = Node::Internal(
            Internal::new(
                Member::new("1", "Ana", "Supervisor", None),
                vec![Node::Leaf(Leaf::new(Member::new("2", "Bia", "Operador", None), 72))],
            )
            .with_performance(100),
        );

        let rendered = tree.to_tree_string().to_string();

        assert!(rendered.starts_with("Ana (Supervisor) 100% success\n"));
        assert!(rendered.contains("Bia (Operador) 72% warning"));
    }

    #[test]
    fn given_team_and_figures_when_labelling_then_appended() {
        let operator = Node::Leaf(Leaf::from_quota(
            Member::new("2", "Bia", "Operador", Some("Vendas")),
            100.0,
            92.0,
        ));
        let manager = Node::Internal(
            Internal::new(
                Member::new("1", "Ana", "Supervisor", Some("Vendas")),
                vec![operator.clone()],
            )
            .with_target_percentage(75.0)
            .with_performance(100),
        );

        assert_eq!(node_label(&operator), "Bia (Operador) 92% success [Vendas] 92/100");
        assert_eq!(
            node_label(&manager),
            "Ana (Supervisor) 100% success [Vendas] target 75%"
        );
    }
}
