//! Season lifecycle: draining, champions, promotion/relegation, reset.

use league_core::{
    command::LeagueCommand,
    config::{ConfigPatch, LeagueSetup, PROMOTION_SLOTS},
    division::DivisionPhase,
    engine::LeagueEngine,
    event::SimEvent,
    season::promotion_slots,
    types::TeamId,
};
use std::collections::HashSet;

fn three_divisions(seed: u64) -> LeagueEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    LeagueEngine::build(&LeagueSetup::default_setup(), seed)
}

fn ids_of(engine: &LeagueEngine, code: &str) -> HashSet<TeamId> {
    engine.division(code).expect("division").team_ids().into_iter().collect()
}

#[test]
fn play_all_rounds_completes_the_division() {
    let mut engine = three_divisions(1);
    engine.play_all_rounds("B").expect("play B");
    let b = engine.division("B").expect("B");
    assert_eq!(b.round, 18);
    assert_eq!(b.phase(), DivisionPhase::Complete);
    assert_eq!(b.played_count(), 90, "every fixture must be played");

    let again = engine.play_next_round("B").expect("no-op");
    assert!(again.is_empty(), "a complete division has nothing to play");
}

#[test]
fn promotion_preserves_sizes_and_swaps_four_each_way() {
    let mut engine = three_divisions(2);
    let before: Vec<HashSet<TeamId>> = ["A", "B", "C"].iter().map(|c| ids_of(&engine, c)).collect();

    let events = engine.close_season();
    let summary = engine.snapshot().history.last().expect("summary").clone();

    for code in ["A", "B", "C"] {
        assert_eq!(engine.division(code).expect("division").teams.len(), 10, "division {code} size changed");
    }
    assert_eq!(summary.movements.len(), 16, "two boundaries × four teams × two directions");
    assert_eq!(events.iter().filter(|e| matches!(e, SimEvent::TeamMoved { .. })).count(), 16);

    let table_ids = |i: usize| -> Vec<TeamId> {
        summary.divisions[i].table.iter().map(|r| r.team_id.clone()).collect()
    };
    let (a, b, c) = (table_ids(0), table_ids(1), table_ids(2));
    let (new_a, new_b, new_c) = (ids_of(&engine, "A"), ids_of(&engine, "B"), ids_of(&engine, "C"));

    assert!(a[6..].iter().all(|id| new_b.contains(id)), "A's bottom four go down to B");
    assert!(b[..4].iter().all(|id| new_a.contains(id)), "B's top four go up to A");
    assert!(b[6..].iter().all(|id| new_c.contains(id)), "B's bottom four go down to C");
    assert!(c[..4].iter().all(|id| new_b.contains(id)), "C's top four go up to B");
    assert!(b[4..6].iter().all(|id| new_b.contains(id)), "B's middle stays put");

    let all_before: HashSet<&TeamId> = before.iter().flatten().collect();
    let all_after: HashSet<TeamId> = new_a.iter().chain(&new_b).chain(&new_c).cloned().collect();
    assert_eq!(all_before.len(), all_after.len(), "no team may be lost or duplicated");
}

#[test]
fn successive_closes_advance_one_season_each_and_reset() {
    let mut engine = three_divisions(3);
    assert_eq!(engine.season(), 1);

    for expected in [2, 3] {
        engine.apply(&LeagueCommand::CloseSeason).expect("close");
        assert_eq!(engine.season(), expected);
        for division in &engine.snapshot().divisions {
            assert!(division.fixtures.is_empty(), "division {} kept fixtures", division.code);
            assert_eq!(division.round, 0);
            assert!(division.table.is_empty());
        }
    }
    let seasons: Vec<u32> = engine.snapshot().history.iter().map(|s| s.season).collect();
    assert_eq!(seasons, [1, 2], "history is kept oldest first");
}

#[test]
fn close_resets_per_season_state() {
    let mut engine = three_divisions(4);
    engine.close_season();

    assert!(engine.snapshot().scorers.has_season(2), "new season's leaderboard is open");
    for team in engine.snapshot().divisions.iter().flat_map(|d| &d.teams) {
        assert!(team.season_multiplier.is_some(), "{} has no multiplier for the new season", team.id);
        assert!(
            team.players.iter().all(|p| p.injured_until == 0 && p.suspended_until == 0),
            "{} still carries injuries or suspensions",
            team.id
        );
    }
}

#[test]
fn champion_is_table_leader_and_gets_a_title() {
    let mut engine = three_divisions(5);
    engine.close_season();
    let summary = &engine.snapshot().history[0];
    for division in &summary.divisions {
        let champion = division.champion_id.as_deref().expect("champion");
        assert!(!division.decided_by_playoff);
        assert_eq!(champion, division.table[0].team_id);
        let team = engine.team(champion).expect("champion still in the league");
        assert_eq!(team.titles_in(&division.code), 1);
    }
}

#[test]
fn playoffs_pick_a_champion_from_the_top_four() {
    let mut engine = three_divisions(6);
    engine.apply(&LeagueCommand::SetConfig(ConfigPatch { playoffs: Some(true), ..ConfigPatch::default() }))
        .expect("config");
    let events = engine.close_season();

    let summary = &engine.snapshot().history[0];
    for division in &summary.divisions {
        assert!(division.decided_by_playoff, "division {} skipped its playoff", division.code);
        let champion = division.champion_id.as_deref().expect("champion");
        let top_four: Vec<&str> = division.table[..4].iter().map(|r| r.team_id.as_str()).collect();
        assert!(top_four.contains(&champion), "{champion} was not in the top four of {}", division.code);
    }
    assert_eq!(events.iter().filter(|e| matches!(e, SimEvent::PlayoffDecided { .. })).count(), 3);
}

#[test]
fn close_reseeds_the_cup_for_the_new_season() {
    let mut engine = three_divisions(7);
    assert!(!engine.cup_unlocked());
    engine.close_season();
    assert!(engine.cup_unlocked());
    let cup = engine.cup();
    assert_eq!(cup.season_of, 2);
    assert_eq!(cup.alive.len(), 16, "30 candidates cut to 16");
    assert!(cup.champion.is_none());
}

#[test]
fn small_divisions_trade_fewer_teams() {
    assert_eq!(promotion_slots(10, 10), PROMOTION_SLOTS);
    assert_eq!(promotion_slots(10, 5), 2);
    assert_eq!(promotion_slots(1, 10), 0);
}
