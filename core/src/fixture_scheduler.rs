//! Double round-robin schedule generation by the circle method.
//!
//! The first slot stays fixed while the others rotate one step per round.
//! In the first half of the rounds the left column plays at home, in the
//! second half the venues flip, so every ordered pair meets exactly once.

use crate::{division::Fixture, types::TeamId};

/// Build `2 × (n − 1)` rounds for `n` teams (n rounded up to even with a
/// bye slot whose matches are dropped). Fewer than two teams yields no
/// rounds at all.
pub fn build_double_round_robin(team_ids: &[TeamId]) -> Vec<Vec<Fixture>> {
    if team_ids.len() < 2 {
        return Vec::new();
    }

    let mut slots: Vec<Option<&TeamId>> = team_ids.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None); // bye
    }

    let half = slots.len() / 2;
    let rounds = (slots.len() - 1) * 2;
    let mut left: Vec<Option<&TeamId>> = slots[..half].to_vec();
    let mut right: Vec<Option<&TeamId>> = slots[half..].iter().rev().copied().collect();

    let mut schedule = Vec::with_capacity(rounds);
    for r in 0..rounds {
        let first_leg = r < rounds / 2;
        let legs = left
            .iter()
            .zip(right.iter())
            .filter_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) if first_leg => Some(Fixture::new((*a).clone(), (*b).clone())),
                (Some(a), Some(b)) => Some(Fixture::new((*b).clone(), (*a).clone())),
                _ => None,
            })
            .collect();
        schedule.push(legs);
        rotate(&mut left, &mut right);
    }
    schedule
}

/// One circle-method step: keep left[0] fixed and move every other slot
/// one place around the circle.
fn rotate<T: Copy>(left: &mut Vec<T>, right: &mut Vec<T>) {
    let half = left.len();
    let mut ring: Vec<T> = left[1..].iter().chain(right.iter().rev()).copied().collect();
    ring.rotate_right(1);
    left.truncate(1);
    left.extend_from_slice(&ring[..half - 1]);
    right.clear();
    right.extend(ring[half - 1..].iter().rev().copied());
}
