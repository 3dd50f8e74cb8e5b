//! Knockout cup: lock, seeding, rounds, champion.

use league_core::{
    command::LeagueCommand,
    engine::LeagueEngine,
    error::SimError,
    event::SimEvent,
};

fn unlocked(seed: u64) -> LeagueEngine {
    let mut engine = LeagueEngine::build_test(seed);
    engine.apply(&LeagueCommand::CloseSeason).expect("close first season");
    engine
}

#[test]
fn cup_is_locked_before_the_first_close() {
    let mut engine = LeagueEngine::build_test(1);
    let before = engine.to_json().expect("json");

    let seed = engine.apply(&LeagueCommand::SeedCup { per_division: 8 });
    assert!(matches!(seed, Err(SimError::CupLocked)), "seeding must be rejected: {seed:?}");
    let round = engine.apply(&LeagueCommand::PlayCupRound);
    assert!(matches!(round, Err(SimError::CupLocked)));
    let all = engine.apply(&LeagueCommand::PlayCupAll);
    assert!(matches!(all, Err(SimError::CupLocked)));

    assert_eq!(before, engine.to_json().expect("json"), "rejected cup commands must not mutate state");
}

#[test]
fn seeded_field_is_a_power_of_two() {
    let mut engine = unlocked(2);
    for (per_division, expected) in [(16, 16), (10, 16), (3, 4), (1, 2)] {
        engine.seed_cup(per_division).expect("seed");
        let alive = engine.cup().alive.len();
        assert_eq!(alive, expected, "per_division {per_division}");
        assert!(alive.is_power_of_two());
        assert!(alive <= per_division * 2);
    }
}

#[test]
fn seeding_with_no_intake_is_rejected() {
    let mut engine = unlocked(3);
    let err = engine.seed_cup(0).unwrap_err();
    assert!(matches!(err, SimError::NotEnoughCupTeams { found: 0 }));
}

#[test]
fn full_cup_crowns_exactly_one_champion() {
    let mut engine = unlocked(4);
    let titles_before: u32 = engine.snapshot().divisions.iter().flat_map(|d| &d.teams).map(|t| t.cup_titles).sum();

    let events = engine.apply(&LeagueCommand::PlayCupAll).expect("cup");
    let cup = engine.cup();
    let champion = cup.champion.clone().expect("champion");

    assert_eq!(cup.alive, vec![champion.clone()]);
    assert_eq!(cup.rounds.len(), 4, "16 → 8 → 4 → 2 → 1");
    assert_eq!(events.iter().filter(|e| matches!(e, SimEvent::CupWon { .. })).count(), 1);
    assert_eq!(engine.team(&champion).expect("team").cup_titles, 1);

    let titles_after: u32 = engine.snapshot().divisions.iter().flat_map(|d| &d.teams).map(|t| t.cup_titles).sum();
    assert_eq!(titles_after, titles_before + 1);

    let more = engine.play_cup_round().expect("finished cup");
    assert!(more.is_empty(), "a decided cup has nothing left to play");
}

#[test]
fn every_tie_has_a_consistent_winner() {
    let mut engine = unlocked(5);
    engine.play_cup_all().expect("cup");
    for tie in engine.cup().rounds.iter().flatten() {
        assert!(tie.winner == tie.home || tie.winner == tie.away);
        let (h, a) = tie.score;
        if tie.tiebreak {
            assert_eq!(h, a, "only level ties go to the tie-break");
        } else if tie.winner == tie.home {
            assert!(h > a);
        } else {
            assert!(a > h);
        }
    }
}

#[test]
fn each_round_halves_the_field() {
    let mut engine = unlocked(6);
    let mut remaining = engine.cup().alive.len();
    while !engine.cup().is_idle() {
        let events = engine.play_cup_round().expect("round");
        let reported = events.iter().find_map(|e| match e {
            SimEvent::CupRoundPlayed { remaining, .. } => Some(*remaining),
            _ => None,
        });
        remaining /= 2;
        assert_eq!(reported, Some(remaining));
    }
}

#[test]
fn removed_team_is_withdrawn_from_the_cup() {
    let mut engine = unlocked(7);
    let leaving = engine.cup().alive[0].clone();
    engine.apply(&LeagueCommand::RemoveTeam { team_id: leaving.clone() }).expect("remove");
    assert!(!engine.cup().alive.contains(&leaving));
}

#[test]
fn cup_absences_stay_within_the_league_calendar() {
    let mut engine = unlocked(21);
    engine.play_next_round_all();
    engine.play_next_round_all();
    engine.play_cup_all().expect("cup");
    for division in &engine.snapshot().divisions {
        let horizon = division.round + 6;
        for player in division.teams.iter().flat_map(|t| &t.players) {
            assert!(
                player.injured_until <= horizon && player.suspended_until <= horizon,
                "{} out until {}/{} with division {} at round {}",
                player.id, player.injured_until, player.suspended_until, division.code, division.round
            );
        }
    }
}
