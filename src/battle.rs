//! Deterministic battle heuristics over two resolved Pokémon.
//!
//! Nothing here performs I/O. Missing stats read as 0, and a 0 stat is a
//! legal input: a 0 defense makes the attacker's damage infinite, 0/0 is
//! floored to the minimum damage of 1.

use crate::pokemon::Pokemon;
use crate::resource::capitalize;
use crate::type_chart::TypeChart;
use serde::Serialize;

/// Nominal ceiling of the six base stats (6 x 255).
const MAX_TOTAL_BASE_STATS: f64 = 1530.0;
const SPEED_REFERENCE: f64 = 200.0;
const TYPE_ADVANTAGE_NORMALIZER: f64 = 5.0;
const HP_SCALE: f64 = 10.0;
const DAMAGE_SCALE: f64 = 10.0;
const MAX_ROUNDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction<'a> {
    pub winner: Option<&'a Pokemon>,
    pub loser: Option<&'a Pokemon>,
    pub draw: bool,
    pub explanation: String,
}

/// Composite 0..=100 strength heuristic. `None` scores 0.
pub fn calculate_battle_readiness_score(pokemon: Option<&Pokemon>) -> u8 {
    let Some(pokemon) = pokemon else {
        return 0;
    };
    let chart = TypeChart::standard();

    let base_stats_score = f64::from(pokemon.total_base_stats()) / MAX_TOTAL_BASE_STATS * 100.0;
    let speed_bonus = f64::from(pokemon.stat("speed")) / SPEED_REFERENCE * 100.0;

    let types = pokemon.type_names();
    let type_advantage_score = if types.is_empty() {
        0.0
    } else {
        let advantages: usize = types
            .iter()
            .map(|t| chart.super_effective_count(t))
            .sum();
        advantages as f64 / (types.len() as f64 * TYPE_ADVANTAGE_NORMALIZER) * 100.0
    };

    let legendary_bonus = if pokemon.is_legendary_or_mythical() {
        100.0
    } else {
        0.0
    };

    let score = base_stats_score * 0.4
        + type_advantage_score * 0.3
        + speed_bonus * 0.2
        + legendary_bonus * 0.1;

    score.round().clamp(0.0, 100.0) as u8
}

/// Best multiplier any single attacking type achieves against the full
/// defending type list. Never below 1.
pub fn calculate_type_multiplier(attacker_types: &[&str], defender_types: &[&str]) -> f64 {
    let chart = TypeChart::standard();
    attacker_types
        .iter()
        .map(|attacker| {
            defender_types
                .iter()
                .map(|defender| chart.multiplier(attacker, defender))
                .product::<f64>()
        })
        .fold(1.0, f64::max)
}

struct Combatant<'a> {
    pokemon: &'a Pokemon,
    hp: f64,
    speed: u32,
    damage: f64,
    multiplier: f64,
}

impl<'a> Combatant<'a> {
    fn new(pokemon: &'a Pokemon, opponent: &Pokemon) -> Self {
        let multiplier =
            calculate_type_multiplier(&pokemon.type_names(), &opponent.type_names());
        let ratio = f64::from(pokemon.stat("attack")) / f64::from(opponent.stat("defense"));
        Self {
            pokemon,
            hp: f64::from(pokemon.stat("hp")) * HP_SCALE,
            speed: pokemon.stat("speed"),
            damage: (ratio * DAMAGE_SCALE * multiplier).max(1.0),
            multiplier,
        }
    }

    fn fainted(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Simulates up to ten exchanges and names the side with more HP left.
///
/// `p1` moves first on a speed tie; a remaining-HP tie goes to `p2`.
pub fn predict_winner<'a>(p1: &'a Pokemon, p2: &'a Pokemon) -> Prediction<'a> {
    let mut one = Combatant::new(p1, p2);
    let mut two = Combatant::new(p2, p1);
    let one_first = one.speed >= two.speed;

    for _ in 0..MAX_ROUNDS {
        let (first, second) = if one_first {
            (&mut one, &mut two)
        } else {
            (&mut two, &mut one)
        };
        second.hp -= first.damage;
        if second.fainted() {
            break;
        }
        first.hp -= second.damage;
        if first.fainted() {
            break;
        }
    }

    tracing::debug!(
        "Battle {} vs {}: remaining hp {:.1} / {:.1}",
        p1.name,
        p2.name,
        one.hp,
        two.hp
    );

    if one.fainted() && two.fainted() {
        return Prediction {
            winner: None,
            loser: None,
            draw: true,
            explanation: "The battle resulted in a draw after a fierce exchange!".to_string(),
        };
    }

    let (winner, loser) = if one.hp > two.hp {
        (&one, &two)
    } else {
        (&two, &one)
    };

    let mut explanation = format!(
        "{} has a decisive advantage.",
        capitalize(&winner.pokemon.name)
    );
    if winner.speed > loser.speed {
        explanation.push_str(" Its higher speed allows it to strike first.");
    }
    if winner.multiplier > loser.multiplier {
        explanation.push_str(&format!(
            " Its typing is super-effective against {}.",
            capitalize(&loser.pokemon.name)
        ));
    }

    Prediction {
        winner: Some(winner.pokemon),
        loser: Some(loser.pokemon),
        draw: false,
        explanation,
    }
}
