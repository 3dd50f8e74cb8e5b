//! Player names for generated squads.

use crate::rng::SimRng;
use std::collections::HashSet;

pub const FIRST_NAMES: &[&str] = &[
    "Andre", "Bruno", "Caio", "Davi", "Diego", "Eduardo", "Felipe", "Gabriel",
    "Gustavo", "Henrique", "Igor", "Joao", "Lucas", "Marcos", "Mateus", "Nicolas",
    "Otavio", "Pedro", "Rafael", "Renato", "Rodrigo", "Samuel", "Thiago", "Vitor",
    "Alex", "Ben", "Carlos", "Daniel", "Emil", "Fabio", "Hugo", "Ivan",
    "Jonas", "Kevin", "Leon", "Luis", "Mario", "Milan", "Noah", "Oscar",
    "Paulo", "Ruben", "Sergio", "Tomas", "Victor", "Yuri", "Zeca", "Luca",
];

pub const LAST_NAMES: &[&str] = &[
    "Silva", "Santos", "Oliveira", "Souza", "Rodrigues", "Ferreira", "Alves",
    "Pereira", "Lima", "Gomes", "Costa", "Ribeiro", "Martins", "Carvalho",
    "Almeida", "Lopes", "Soares", "Fernandes", "Vieira", "Barbosa", "Rocha",
    "Dias", "Nunes", "Mendes", "Moreira", "Cardoso", "Teixeira", "Correia",
    "Garcia", "Martinez", "Lopez", "Hernandez", "Torres", "Ramos", "Castro",
    "Muller", "Schmidt", "Rossi", "Bianchi", "Novak", "Kovac", "Jensen",
    "Dubois", "Moreau", "Smith", "Walker", "Murphy", "Kelly",
];

/// Extra draws allowed before a repeated name is accepted.
const MAX_REDRAWS: usize = 8;

/// "First Last", two draws from the stream.
pub fn full_name(rng: &mut SimRng) -> String {
    let first = FIRST_NAMES[rng.pick_index(FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.pick_index(LAST_NAMES.len())];
    format!("{first} {last}")
}

/// Names one squad, redrawing names already handed out to it.
#[derive(Debug, Default)]
pub struct SquadNamer {
    taken: HashSet<String>,
}

impl SquadNamer {
    pub fn next_name(&mut self, rng: &mut SimRng) -> String {
        let mut name = full_name(rng);
        for _ in 0..MAX_REDRAWS {
            if !self.taken.contains(&name) {
                break;
            }
            name = full_name(rng);
        }
        self.taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_seed() {
        let a = full_name(&mut SimRng::new(12345));
        let b = full_name(&mut SimRng::new(12345));
        assert_eq!(a, b);
        assert_eq!(a.split_whitespace().count(), 2, "{a}");
    }

    #[test]
    fn a_squad_rarely_repeats_a_name() {
        let mut rng = SimRng::new(7);
        let mut namer = SquadNamer::default();
        let names: Vec<String> = (0..18).map(|_| namer.next_name(&mut rng)).collect();
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "duplicates in {names:?}");
    }
}
