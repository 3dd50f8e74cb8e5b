//! League table: recomputation, conservation and ordering.

use league_core::{
    division::{Division, Fixture},
    engine::LeagueEngine,
    standings::{self, total_points, POINTS_FOR_DRAW, POINTS_FOR_WIN},
    team::Team,
};

fn played(home: &str, away: &str, h: u32, a: u32) -> Fixture {
    let mut f = Fixture::new(home.into(), away.into());
    f.played = true;
    f.score = Some((h, a));
    f
}

fn played_division(seed: u64, rounds: usize) -> Division {
    let mut engine = LeagueEngine::build_test(seed);
    for _ in 0..rounds {
        engine.play_next_round("A").expect("round");
    }
    engine.division("A").expect("A").clone()
}

#[test]
fn recomputation_is_idempotent() {
    let mut division = played_division(3, 5);
    let first = division.table.clone();
    standings::refresh(&mut division);
    standings::refresh(&mut division);
    assert_eq!(first, division.table, "refreshing an unchanged division must not move the table");
    assert_eq!(standings::compute_table(&division), division.table);
}

#[test]
fn points_are_conserved() {
    let division = played_division(5, 9);
    let (mut decisive, mut draws) = (0, 0);
    for (h, a) in division.fixtures.iter().flatten().filter_map(Fixture::result) {
        if h == a { draws += 1 } else { decisive += 1 }
    }
    assert_eq!(
        total_points(&division.table),
        POINTS_FOR_WIN * decisive + 2 * POINTS_FOR_DRAW * draws,
        "{decisive} decisive results and {draws} draws"
    );
}

#[test]
fn every_member_has_a_row_before_any_game() {
    let teams = vec![
        Team::new("t-001".into(), "One".into(), 70.0),
        Team::new("t-002".into(), "Two".into(), 70.0),
        Team::new("t-003".into(), "Three".into(), 70.0),
    ];
    let division = Division::new("X".into(), "Division X".into(), teams);
    let table = standings::compute_table(&division);
    assert_eq!(table.len(), 3);
    assert!(table.iter().all(|r| r.played == 0 && r.points == 0));
}

#[test]
fn goals_accumulate_symmetrically() {
    let teams = vec![
        Team::new("t-001".into(), "One".into(), 70.0),
        Team::new("t-002".into(), "Two".into(), 70.0),
    ];
    let mut division = Division::new("X".into(), "Division X".into(), teams);
    division.fixtures = vec![vec![played("t-001", "t-002", 3, 1)], vec![played("t-002", "t-001", 2, 2)]];
    standings::refresh(&mut division);

    let one = &division.table[0];
    let two = &division.table[1];
    assert_eq!(one.team_id, "t-001");
    assert_eq!((one.won, one.drawn, one.lost, one.points), (1, 1, 0, 4));
    assert_eq!((one.goals_for, one.goals_against, one.goal_diff), (5, 3, 2));
    assert_eq!((two.goals_for, two.goals_against, two.goal_diff), (3, 5, -2));
}

#[test]
fn full_ties_fall_back_to_team_id() {
    let teams = vec![
        Team::new("t-002".into(), "Second".into(), 70.0),
        Team::new("t-001".into(), "First".into(), 70.0),
    ];
    let mut division = Division::new("X".into(), "Division X".into(), teams);
    division.fixtures = vec![vec![played("t-002", "t-001", 1, 1)]];
    standings::refresh(&mut division);
    let order: Vec<&str> = division.table.iter().map(|r| r.team_id.as_str()).collect();
    assert_eq!(order, ["t-001", "t-002"]);
}

#[test]
fn table_is_sorted_by_ranking_criteria() {
    let division = played_division(9, 18);
    for pair in division.table.windows(2) {
        assert_ne!(
            standings::rank_order(&pair[0], &pair[1]),
            std::cmp::Ordering::Greater,
            "{} ranked above {} out of order",
            pair[0].team_id,
            pair[1].team_id
        );
    }
}
