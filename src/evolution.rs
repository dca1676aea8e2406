use crate::pokemon::{ChainLink, EvolutionChain, EvolutionDetail};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageMember {
    pub name: String,
    pub id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evolution {
    pub name: String,
    pub id: Option<u32>,
    pub condition: String,
}

/// One step of a chain: a species and everything it can evolve into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionStage {
    pub from: StageMember,
    pub to: Vec<Evolution>,
}

/// Flattens a chain into stages. Branches are listed side by side; only the
/// first branch is followed further down.
pub fn evolution_stages(chain: &EvolutionChain) -> Vec<EvolutionStage> {
    let mut stages = Vec::new();
    let mut link: &ChainLink = &chain.chain;

    while let Some(next) = link.evolves_to.first() {
        stages.push(EvolutionStage {
            from: StageMember {
                name: link.species.name.clone(),
                id: link.species.id(),
            },
            to: link
                .evolves_to
                .iter()
                .map(|target| Evolution {
                    name: target.species.name.clone(),
                    id: target.species.id(),
                    condition: describe_condition(target.evolution_details.first()),
                })
                .collect(),
        });
        link = next;
    }

    stages
}

fn humanize(slug: &str) -> String {
    slug.replace('-', " ")
}

/// Short description such as "level up at level 16" or "use item using
/// thunder stone".
pub fn describe_condition(detail: Option<&EvolutionDetail>) -> String {
    let Some(detail) = detail else {
        return "Unknown method".to_string();
    };

    let trigger = detail
        .trigger
        .as_ref()
        .map(|t| humanize(&t.name))
        .unwrap_or_default();

    let condition = if let Some(level) = detail.min_level.filter(|&l| l > 0) {
        format!("at level {level}")
    } else if let Some(item) = &detail.item {
        format!("using {}", humanize(&item.name))
    } else if let Some(item) = &detail.held_item {
        format!("while holding {}", humanize(&item.name))
    } else if detail.min_happiness.is_some_and(|h| h > 0) {
        "with high happiness".to_string()
    } else if let Some(known) = &detail.known_move {
        format!("while knowing {}", humanize(&known.name))
    } else if let Some(location) = &detail.location {
        format!("at {}", humanize(&location.name))
    } else if !detail.time_of_day.is_empty() {
        format!("during the {}", detail.time_of_day)
    } else {
        String::new()
    };

    format!("{trigger} {condition}").trim().to_string()
}
