use std::collections::HashMap;
use std::sync::LazyLock;

// Rows are attacking types, columns are defending types. Absent pairs are
// neutral.
const CHART: &[(&str, &[(&str, f64)])] = &[
    ("normal", &[("rock", 0.5), ("ghost", 0.0), ("steel", 0.5)]),
    (
        "fire",
        &[
            ("fire", 0.5),
            ("water", 0.5),
            ("grass", 2.0),
            ("ice", 2.0),
            ("bug", 2.0),
            ("rock", 0.5),
            ("dragon", 0.5),
            ("steel", 2.0),
        ],
    ),
    (
        "water",
        &[
            ("fire", 2.0),
            ("water", 0.5),
            ("grass", 0.5),
            ("ground", 2.0),
            ("rock", 2.0),
            ("dragon", 0.5),
        ],
    ),
    (
        "electric",
        &[
            ("water", 2.0),
            ("electric", 0.5),
            ("grass", 0.5),
            ("ground", 0.0),
            ("flying", 2.0),
            ("dragon", 0.5),
        ],
    ),
    (
        "grass",
        &[
            ("fire", 0.5),
            ("water", 2.0),
            ("grass", 0.5),
            ("poison", 0.5),
            ("ground", 2.0),
            ("flying", 0.5),
            ("bug", 0.5),
            ("rock", 2.0),
            ("dragon", 0.5),
            ("steel", 0.5),
        ],
    ),
    (
        "ice",
        &[
            ("fire", 0.5),
            ("water", 0.5),
            ("grass", 2.0),
            ("ice", 0.5),
            ("ground", 2.0),
            ("flying", 2.0),
            ("dragon", 2.0),
            ("steel", 0.5),
        ],
    ),
    (
        "fighting",
        &[
            ("normal", 2.0),
            ("ice", 2.0),
            ("poison", 0.5),
            ("flying", 0.5),
            ("psychic", 0.5),
            ("bug", 0.5),
            ("rock", 2.0),
            ("ghost", 0.0),
            ("dark", 2.0),
            ("steel", 2.0),
            ("fairy", 0.5),
        ],
    ),
    (
        "poison",
        &[
            ("grass", 2.0),
            ("poison", 0.5),
            ("ground", 0.5),
            ("rock", 0.5),
            ("ghost", 0.5),
            ("steel", 0.0),
            ("fairy", 2.0),
        ],
    ),
    (
        "ground",
        &[
            ("fire", 2.0),
            ("electric", 2.0),
            ("grass", 0.5),
            ("poison", 2.0),
            ("flying", 0.0),
            ("bug", 0.5),
            ("rock", 2.0),
            ("steel", 2.0),
        ],
    ),
    (
        "flying",
        &[
            ("electric", 0.5),
            ("grass", 2.0),
            ("fighting", 2.0),
            ("bug", 2.0),
            ("rock", 0.5),
            ("steel", 0.5),
        ],
    ),
    (
        "psychic",
        &[
            ("fighting", 2.0),
            ("poison", 2.0),
            ("psychic", 0.5),
            ("dark", 0.0),
            ("steel", 0.5),
        ],
    ),
    (
        "bug",
        &[
            ("fire", 0.5),
            ("grass", 2.0),
            ("fighting", 0.5),
            ("poison", 0.5),
            ("flying", 0.5),
            ("psychic", 2.0),
            ("ghost", 0.5),
            ("dark", 2.0),
            ("steel", 0.5),
            ("fairy", 0.5),
        ],
    ),
    (
        "rock",
        &[
            ("fire", 2.0),
            ("ice", 2.0),
            ("fighting", 0.5),
            ("ground", 0.5),
            ("flying", 2.0),
            ("bug", 2.0),
            ("steel", 0.5),
        ],
    ),
    (
        "ghost",
        &[("normal", 0.0), ("psychic", 2.0), ("ghost", 2.0), ("dark", 0.5)],
    ),
    ("dragon", &[("dragon", 2.0), ("steel", 0.5), ("fairy", 0.0)]),
    (
        "dark",
        &[
            ("fighting", 0.5),
            ("psychic", 2.0),
            ("ghost", 2.0),
            ("dark", 0.5),
            ("fairy", 0.5),
        ],
    ),
    (
        "steel",
        &[
            ("fire", 0.5),
            ("water", 0.5),
            ("electric", 0.5),
            ("ice", 2.0),
            ("rock", 2.0),
            ("steel", 0.5),
            ("fairy", 2.0),
        ],
    ),
    (
        "fairy",
        &[
            ("fire", 0.5),
            ("fighting", 2.0),
            ("poison", 0.5),
            ("dragon", 2.0),
            ("dark", 2.0),
            ("steel", 0.5),
        ],
    ),
];

static STANDARD: LazyLock<TypeChart> = LazyLock::new(TypeChart::from_static);

/// Read-only attacking-type x defending-type damage multiplier table.
#[derive(Debug, Clone)]
pub struct TypeChart {
    order: Vec<&'static str>,
    rows: HashMap<&'static str, HashMap<&'static str, f64>>,
}

/// Attacking types grouped by how much damage they deal to a defender.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefensiveMatchups {
    pub quadruple: Vec<&'static str>,
    pub double: Vec<&'static str>,
    pub half: Vec<&'static str>,
    pub quarter: Vec<&'static str>,
    pub immune: Vec<&'static str>,
}

impl TypeChart {
    /// The 18-type chart, built on first use.
    pub fn standard() -> &'static TypeChart {
        &STANDARD
    }

    fn from_static() -> Self {
        let order = CHART.iter().map(|(attacker, _)| *attacker).collect();
        let rows = CHART
            .iter()
            .map(|(attacker, row)| (*attacker, row.iter().copied().collect()))
            .collect();
        Self { order, rows }
    }

    /// Every type name in chart order.
    pub fn type_names(&self) -> &[&'static str] {
        &self.order
    }

    /// The explicit table entry, `None` when the pair is neutral.
    pub fn effectiveness(&self, attacker: &str, defender: &str) -> Option<f64> {
        self.rows.get(attacker)?.get(defender).copied()
    }

    pub fn multiplier(&self, attacker: &str, defender: &str) -> f64 {
        self.effectiveness(attacker, defender).unwrap_or(1.0)
    }

    /// How many defending types `attacker` hits for exactly double damage.
    pub fn super_effective_count(&self, attacker: &str) -> usize {
        self.rows
            .get(attacker)
            .map(|row| row.values().filter(|&&m| m == 2.0).count())
            .unwrap_or(0)
    }

    /// Groups every attacking type by its combined multiplier against
    /// `defender_types`.
    pub fn matchups_against(&self, defender_types: &[&str]) -> DefensiveMatchups {
        let mut matchups = DefensiveMatchups::default();
        for &attacker in &self.order {
            let total: f64 = defender_types
                .iter()
                .map(|defender| self.multiplier(attacker, defender))
                .product();
            let bucket = if total == 0.0 {
                &mut matchups.immune
            } else if total >= 4.0 {
                &mut matchups.quadruple
            } else if total >= 2.0 {
                &mut matchups.double
            } else if total <= 0.25 {
                &mut matchups.quarter
            } else if total <= 0.5 {
                &mut matchups.half
            } else {
                continue;
            };
            bucket.push(attacker);
        }
        matchups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_pairs_are_neutral() {
        let chart = TypeChart::standard();
        assert_eq!(chart.effectiveness("normal", "normal"), None);
        assert_eq!(chart.multiplier("normal", "normal"), 1.0);
        assert_eq!(chart.multiplier("shadow", "fire"), 1.0);
        assert_eq!(chart.multiplier("fire", "grass"), 2.0);
        assert_eq!(chart.multiplier("ghost", "normal"), 0.0);
    }

    #[test]
    fn test_super_effective_count() {
        let chart = TypeChart::standard();
        assert_eq!(chart.super_effective_count("fire"), 4);
        assert_eq!(chart.super_effective_count("flying"), 3);
        assert_eq!(chart.super_effective_count("normal"), 0);
        assert_eq!(chart.type_names().len(), 18);
    }

    #[test]
    fn test_matchups_against_dual_type() {
        let matchups = TypeChart::standard().matchups_against(&["grass", "poison"]);
        assert!(matchups.double.contains(&"fire"));
        assert!(matchups.double.contains(&"psychic"));
        assert!(matchups.quarter.contains(&"grass"));
        assert!(matchups.immune.is_empty());

        let ghost = TypeChart::standard().matchups_against(&["ghost"]);
        assert_eq!(ghost.immune, vec!["normal", "fighting"]);
    }
}
