//! Built-in sample organization, used when no source yields a tree.

use crate::domain::entities::{Internal, Leaf, Member, Node};

const CORPORATE: Option<&str> = Some("Corporativo");
const OPERATIONS: Option<&str> = Some("Operações");

fn manager(
    id: &str,
    name: &str,
    position: &str,
    team: Option<&str>,
    performance: i32,
    children: Vec<Node>,
) -> Node {
    Node::Internal(
        Internal::new(Member::new(id, name, position, team), children)
            .with_target_percentage(80.0)
            .with_performance(performance),
    )
}

fn operator(id: &str, name: &str, team: Option<&str>, achieved: f64) -> Node {
    Node::Leaf(Leaf::from_quota(
        Member::new(id, name, "Operador", team),
        100.0,
        achieved,
    ))
}

/// One chain per manager: coordinator → supervisor → two operators.
fn branch(
    team: Option<&str>,
    manager_node: (&str, &str, &str, i32),
    coordinator: (&str, &str, i32),
    supervisor: (&str, &str, i32),
    operators: [(&str, &str, f64); 2],
) -> Node {
    let [first, second] = operators;
    manager(
        manager_node.0,
        manager_node.1,
        manager_node.2,
        team,
        manager_node.3,
        vec![manager(
            coordinator.0,
            coordinator.1,
            "Coordenador",
            team,
            coordinator.2,
            vec![manager(
                supervisor.0,
                supervisor.1,
                "Supervisor",
                team,
                supervisor.2,
                vec![
                    operator(first.0, first.1, team, first.2),
                    operator(second.0, second.1, team, second.2),
                ],
            )],
        )],
    )
}

/// Director with four managers, 21 members in total.
///
/// Stored manager figures are stale on purpose; recalculate before display.
pub fn sample_organization() -> Node {
    manager(
        "1",
        "Ricardo Queiroz De Souza",
        "Diretor",
        None,
        87,
        vec![
            branch(
                CORPORATE,
                ("2", "Amanda Diniz", "Gerente Corporativo", 90),
                ("6", "Carlos Mendes", 85),
                ("10", "Juliana Silva", 82),
                [("15", "Pedro Alves", 78.0), ("16", "Mariana Costa", 92.0)],
            ),
            branch(
                CORPORATE,
                ("3", "Eliana Cristina", "Gerente Corporativo", 84),
                ("7", "Fernanda Lopes", 79),
                ("11", "Roberto Dias", 75),
                [("17", "Ana Beatriz", 68.0), ("18", "Lucas Ferreira", 72.0)],
            ),
            branch(
                OPERATIONS,
                ("4", "Rafael Garcia", "Gerente Operações", 94),
                ("8", "Tatiana Melo", 91),
                ("12", "Gustavo Santos", 88),
                [("19", "Camila Rocha", 86.0), ("20", "Diego Oliveira", 90.0)],
            ),
            branch(
                OPERATIONS,
                ("5", "Rogério Ruiz", "Gerente Operações", 62),
                ("9", "Marcelo Souza", 58),
                ("13", "Patrícia Lima", 55),
                [("21", "Fábio Martins", 50.0), ("22", "Vanessa Cardoso", 60.0)],
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_sample_when_counting_then_has_expected_shape() {
        let org = sample_organization();

        assert_eq!(org.iter().count(), 21);
        assert_eq!(org.children().len(), 4);
        assert_eq!(org.depth(), 5);
        assert_eq!(org.operators().len(), 8);
        assert!(org.find("16").is_some_and(|n| n.performance() == 92));
    }
}
