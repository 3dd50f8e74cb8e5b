//! Match model behaviour over many simulated games.

use league_core::{
    config::SimConfig,
    division::CardKind,
    match_engine::{
        carry_absences, decide_draw, simulate, MatchContext, Side, Venue, MAJOR_INJURY_ROUNDS,
        MINOR_INJURY_ROUNDS, OFF_CALENDAR_ROUND,
    },
    rng::SimRng,
    roster::STARTING_ELEVEN,
    scorers::ScoringLeaderboard,
    team::Team,
};
use std::collections::HashMap;

fn pair(home_rating: f64, away_rating: f64) -> (Team, Team) {
    (
        Team::new("t-001".into(), "Home".into(), home_rating),
        Team::new("t-002".into(), "Away".into(), away_rating),
    )
}

struct Tally {
    home_goals: u32,
    away_goals: u32,
    home_wins: u32,
    away_wins: u32,
}

fn play_many(home: &mut Team, away: &mut Team, venue: Venue, games: u32, seed: u64) -> Tally {
    let config = SimConfig::default();
    let mut rng = SimRng::new(seed);
    let mut board = ScoringLeaderboard::default();
    let mut tally = Tally { home_goals: 0, away_goals: 0, home_wins: 0, away_wins: 0 };
    for _ in 0..games {
        let ctx = MatchContext { config: &config, round: 0, venue, season: 1 };
        let out = simulate(home, away, &ctx, &mut board, &mut rng);
        tally.home_goals += out.home_goals;
        tally.away_goals += out.away_goals;
        match out.winner() {
            Some(Side::Home) => tally.home_wins += 1,
            Some(Side::Away) => tally.away_wins += 1,
            None => {}
        }
        home.heal();
        away.heal();
    }
    tally
}

#[test]
fn average_total_goals_tracks_the_configured_mean() {
    let (mut home, mut away) = pair(75.0, 75.0);
    let games = 4000;
    let t = play_many(&mut home, &mut away, Venue::Neutral, games, 1);
    let mean = f64::from(t.home_goals + t.away_goals) / f64::from(games);
    assert!((mean - 2.7).abs() < 0.2, "mean total goals {mean:.3}");
}

#[test]
fn home_side_scores_more_at_home() {
    let (mut home, mut away) = pair(75.0, 75.0);
    let t = play_many(&mut home, &mut away, Venue::Home, 3000, 2);
    assert!(t.home_goals > t.away_goals, "home {} vs away {}", t.home_goals, t.away_goals);
    assert!(t.home_wins > t.away_wins);
}

#[test]
fn stronger_side_wins_more_often() {
    let (mut home, mut away) = pair(60.0, 90.0);
    let t = play_many(&mut home, &mut away, Venue::Neutral, 2000, 3);
    assert!(t.away_wins > t.home_wins, "90-rated side won {} vs {}", t.away_wins, t.home_wins);
}

#[test]
fn goals_match_scorers_and_leaderboard() {
    let (mut home, mut away) = pair(80.0, 70.0);
    let config = SimConfig::default();
    let mut rng = SimRng::new(4);
    let mut board = ScoringLeaderboard::default();
    let mut total = 0;
    for round in 0..30 {
        let ctx = MatchContext { config: &config, round, venue: Venue::Home, season: 1 };
        let out = simulate(&mut home, &mut away, &ctx, &mut board, &mut rng);
        assert_eq!(out.detail.scorers.len() as u32, out.home_goals + out.away_goals);
        let home_scorers = out.detail.scorers.iter().filter(|g| g.team_id == "t-001").count() as u32;
        assert_eq!(home_scorers, out.home_goals, "home goals credited to home players");
        total += out.home_goals + out.away_goals;
    }
    assert_eq!(board.total_goals(1), total);
    let player_goals: u32 = home.players.iter().chain(&away.players).map(|p| p.goals).sum();
    assert_eq!(player_goals, total);
}

#[test]
fn appearances_count_the_starting_eleven() {
    let (mut home, mut away) = pair(75.0, 75.0);
    play_many(&mut home, &mut away, Venue::Neutral, 1, 5);
    let appearances: u32 = home.players.iter().map(|p| p.appearances).sum();
    assert_eq!(appearances, STARTING_ELEVEN as u32);
}

#[test]
fn suspensions_follow_every_third_yellow() {
    let (mut home, mut away) = pair(75.0, 75.0);
    let config = SimConfig::default();
    let mut rng = SimRng::new(6);
    let mut board = ScoringLeaderboard::default();
    let mut bans: HashMap<String, u32> = HashMap::new();
    for _ in 0..200 {
        let ctx = MatchContext { config: &config, round: 0, venue: Venue::Home, season: 1 };
        let out = simulate(&mut home, &mut away, &ctx, &mut board, &mut rng);
        for card in out.detail.cards.iter().filter(|c| c.kind == CardKind::Suspension) {
            *bans.entry(card.player_id.clone()).or_default() += 1;
            let team = if card.team_id == home.id { &home } else { &away };
            let player = team.player(&card.player_id).expect("carded player");
            assert_eq!(player.suspended_until, 2, "a ban from round 0 covers round 1");
        }
        home.heal();
        away.heal();
    }
    for player in home.players.iter().chain(&away.players) {
        let banned = bans.get(&player.id).copied().unwrap_or(0);
        assert_eq!(banned, player.yellow_cards / 3, "{} banned {banned} times on {} yellows", player.id, player.yellow_cards);
    }
}

#[test]
fn injuries_keep_players_out_for_the_drawn_rounds() {
    let (mut home, mut away) = pair(75.0, 75.0);
    let config = SimConfig::default();
    let mut rng = SimRng::new(7);
    let mut board = ScoringLeaderboard::default();
    let mut tally = [0u32; 7];
    for _ in 0..400 {
        let ctx = MatchContext { config: &config, round: 5, venue: Venue::Home, season: 1 };
        let out = simulate(&mut home, &mut away, &ctx, &mut board, &mut rng);
        for injury in &out.detail.injuries {
            assert!((1..=6).contains(&injury.rounds_out));
            let team = if injury.team_id == home.id { &home } else { &away };
            let player = team.player(&injury.player_id).expect("injured player");
            assert_eq!(player.injured_until, 5 + injury.rounds_out + 1);
            assert!(!player.is_available(5 + injury.rounds_out));
            assert!(player.is_available(5 + injury.rounds_out + 1));
            tally[injury.rounds_out as usize] += 1;
        }
        home.heal();
        away.heal();
    }
    let minor: u32 = tally[MINOR_INJURY_ROUNDS.0 as usize..=MINOR_INJURY_ROUNDS.1 as usize].iter().sum();
    let major: u32 = tally[MAJOR_INJURY_ROUNDS.0 as usize..=MAJOR_INJURY_ROUNDS.1 as usize].iter().sum();
    assert_eq!(tally[0], 0, "an injury always costs at least one round");
    assert!(tally[1] > 0 && tally[2] > 0, "both minor lengths occur: {tally:?}");
    assert!(major > 0, "major injuries occur: {tally:?}");
    // 2% minor against 0.6% major per appearance.
    assert!(minor > 2 * major, "minor {minor} vs major {major}: {tally:?}");
}

#[test]
fn off_calendar_absences_count_from_the_next_league_round() {
    let (mut home, mut away) = pair(75.0, 75.0);
    let config = SimConfig::default();
    let mut rng = SimRng::new(11);
    let mut board = ScoringLeaderboard::default();
    let next_round = 4;
    let (mut bans, mut injuries) = (0, 0);
    for _ in 0..300 {
        let ctx = MatchContext { config: &config, round: OFF_CALENDAR_ROUND, venue: Venue::Neutral, season: 1 };
        let out = simulate(&mut home, &mut away, &ctx, &mut board, &mut rng);
        for team in [&home, &away] {
            assert!(
                team.players.iter().all(|p| p.injured_until == 0 && p.suspended_until == 0),
                "off-calendar matches leave availability to the caller"
            );
        }
        carry_absences(&mut home, &out.detail, next_round);
        carry_absences(&mut away, &out.detail, next_round);

        for card in out.detail.cards.iter().filter(|c| c.kind != CardKind::Yellow) {
            let team = if card.team_id == home.id { &home } else { &away };
            let player = team.player(&card.player_id).expect("carded player");
            assert_eq!(player.suspended_until, next_round + 1, "banned for the next league round only");
            bans += 1;
        }
        for injury in &out.detail.injuries {
            let team = if injury.team_id == home.id { &home } else { &away };
            let player = team.player(&injury.player_id).expect("injured player");
            assert_eq!(player.injured_until, next_round + injury.rounds_out);
            injuries += 1;
        }
        home.heal();
        away.heal();
    }
    assert!(bans > 0 && injuries > 0, "bans {bans}, injuries {injuries}");
}

#[test]
fn tie_break_favours_the_much_stronger_side() {
    let (strong, weak) = pair(90.0, 60.0);
    let mut rng = SimRng::new(8);
    assert!((0..100).all(|_| decide_draw(&strong, &weak, &mut rng) == Side::Home));
}
