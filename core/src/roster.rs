//! Squad generation, availability and team selection.

use crate::{
    name_generator::SquadNamer,
    rng::SimRng,
    team::{Player, Position, Team},
    types::Round,
};

/// Positions of a freshly generated squad, in squad-number order.
pub const ROSTER_TEMPLATE: [Position; 18] = [
    Position::Goalkeeper,
    Position::Defender,
    Position::Defender,
    Position::Defender,
    Position::Defender,
    Position::Midfielder,
    Position::Midfielder,
    Position::Midfielder,
    Position::Midfielder,
    Position::Forward,
    Position::Forward,
    Position::Forward,
    Position::Midfielder,
    Position::Defender,
    Position::Midfielder,
    Position::Defender,
    Position::Forward,
    Position::Midfielder,
];

/// A squad smaller than this is regenerated from the template.
pub const MIN_ROSTER: usize = 14;
pub const STARTING_ELEVEN: usize = 11;
pub const OUTFIELD_STARTERS: usize = STARTING_ELEVEN - 1;

/// Chance that an unavailable player is pressed back into service when
/// the side cannot otherwise field eleven.
pub const RECALL_PROBABILITY: f64 = 0.75;

pub const PLAYER_RATING_MIN: f64 = 40.0;
pub const PLAYER_RATING_MAX: f64 = 99.0;

/// Generate the team's squad on first use. Returns true when a squad was
/// generated; an established squad is never touched.
pub fn ensure_roster(team: &mut Team, rng: &mut SimRng) -> bool {
    if team.players.len() >= MIN_ROSTER {
        return false;
    }
    let mut namer = SquadNamer::default();
    team.players = ROSTER_TEMPLATE
        .iter()
        .enumerate()
        .map(|(i, &position)| {
            let raw = team.rating + rng.normal(0.0, position.rating_spread());
            let overall = round1(raw).clamp(PLAYER_RATING_MIN, PLAYER_RATING_MAX);
            Player::new(
                format!("{}-p{:02}", team.id, i + 1),
                namer.next_name(rng),
                position,
                overall,
            )
        })
        .collect();
    log::debug!("generated {}-player squad for {}", team.players.len(), team.name);
    true
}

/// Indices of the players available for `round`.
pub fn available_players(team: &Team, round: Round) -> Vec<usize> {
    team.players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_available(round))
        .map(|(i, _)| i)
        .collect()
}

/// Pick the starting eleven for `round` as indices into `team.players`.
///
/// At most one goalkeeper (the first available in squad order) plus the
/// ten best-rated outfielders. When fewer than eleven are available,
/// unavailable players are recalled in squad order, each with
/// RECALL_PROBABILITY, until eleven are pooled or the squad runs out.
pub fn select_starting_eleven(team: &Team, round: Round, rng: &mut SimRng) -> Vec<usize> {
    let mut pool = available_players(team, round);
    if pool.len() < STARTING_ELEVEN {
        for i in 0..team.players.len() {
            if pool.len() >= STARTING_ELEVEN {
                break;
            }
            if !team.players[i].is_available(round) && rng.chance(RECALL_PROBABILITY) {
                pool.push(i);
            }
        }
    }

    let goalkeeper = pool
        .iter()
        .copied()
        .find(|&i| team.players[i].position == Position::Goalkeeper);

    let mut outfield: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&i| team.players[i].position != Position::Goalkeeper)
        .collect();
    outfield.sort_by(|&a, &b| team.players[b].overall.total_cmp(&team.players[a].overall));
    outfield.truncate(OUTFIELD_STARTERS);

    goalkeeper.into_iter().chain(outfield).collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
