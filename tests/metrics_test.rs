//! Tests for result metrics and team distribution over the sample organization

use orgperf::domain::metrics::UNASSIGNED_TEAM;
use orgperf::domain::{
    recalculate, sample_organization, team_distribution, FlatRecord, HierarchyBuilder,
    ResultsMetrics,
};

#[test]
fn given_recalculated_sample_when_measuring_then_counts_operators_and_managers() {
    // Arrange
    let tree = recalculate(&sample_organization());

    // Act
    let m = ResultsMetrics::from_tree(&tree, 80);

    // Assert
    assert_eq!(m.total_members, 21);
    assert_eq!(m.operators, 8);
    assert_eq!(m.operators_on_target, 3);
    assert_eq!(m.operator_success_rate(), 37.5);
    assert_eq!(m.managers, 13);
    assert_eq!(m.managers_at_full, 3);
    assert_eq!(m.success + m.warning + m.danger, 21);
    assert_eq!(m.total_target, 800.0);
    assert_eq!(m.total_achieved, 596.0);
}

#[test]
fn given_recalculated_sample_when_listing_teams_then_directorate_excluded() {
    let tree = recalculate(&sample_organization());

    let shares = team_distribution(&tree);

    let teams: Vec<(&str, usize)> = shares.iter().map(|s| (s.team.as_str(), s.count)).collect();
    assert_eq!(teams, vec![("Corporativo", 10), ("Operações", 10)]);
    assert!(shares.iter().all(|s| s.percentage == 50.0));
}

#[test]
fn given_members_without_team_when_listing_teams_then_grouped_as_unassigned() {
    let mut tagged = FlatRecord::new("3", Some("1"), "C", "Operador", 90);
    tagged.team = Some("Vendas".to_string());
    let records = vec![
        FlatRecord::new("1", None, "A", "Diretor", 0),
        FlatRecord::new("2", Some("1"), "B", "Operador", 90),
        tagged,
        FlatRecord::new("4", Some("1"), "D", "Operador", 70),
    ];
    let tree = HierarchyBuilder::new().build(&records).unwrap();

    let shares = team_distribution(&tree);

    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].team, UNASSIGNED_TEAM);
    assert_eq!(shares[0].count, 2);
    assert_eq!(shares[1].team, "Vendas");
    assert_eq!(shares[1].count, 1);
}

#[test]
fn given_single_member_when_measuring_then_rates_are_zero() {
    let tree = HierarchyBuilder::new()
        .build(&[FlatRecord::new("1", None, "A", "Diretor", 0)])
        .unwrap();

    let m = ResultsMetrics::from_tree(&tree, 80);

    assert_eq!(m.total_members, 1);
    assert_eq!(m.operators, 1);
    assert_eq!(m.managers, 0);
    assert_eq!(m.manager_success_rate(), 0.0);
    assert!(team_distribution(&tree).is_empty());
}
