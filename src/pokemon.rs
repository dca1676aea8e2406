// pokemon.rs
// Pokémon, species, type and evolution chain payloads.

use crate::resource::{ApiResource, Localized, NamedApiResource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    /// Merged in from the species resource.
    #[serde(default)]
    pub is_legendary: Option<bool>,
    #[serde(default)]
    pub is_mythical: Option<bool>,
    #[serde(default)]
    pub flavor_text: Option<String>,
}

impl Pokemon {
    /// Base value of the named stat, 0 when the stat is missing.
    pub fn stat(&self, name: &str) -> u32 {
        self.stats
            .iter()
            .find(|s| s.stat.name == name)
            .map(|s| s.base_stat)
            .unwrap_or(0)
    }

    pub fn total_base_stats(&self) -> u32 {
        self.stats.iter().map(|s| s.base_stat).sum()
    }

    /// Type names in slot order.
    pub fn type_names(&self) -> Vec<&str> {
        let mut types: Vec<&PokemonType> = self.types.iter().collect();
        types.sort_by_key(|t| t.slot);
        types.into_iter().map(|t| t.r#type.name.as_str()).collect()
    }

    pub fn is_legendary_or_mythical(&self) -> bool {
        self.is_legendary.unwrap_or(false) || self.is_mythical.unwrap_or(false)
    }

    pub fn with_species(mut self, species: &PokemonSpecies) -> Self {
        self.is_legendary = Some(species.is_legendary);
        self.is_mythical = Some(species.is_mythical);
        self.flavor_text = species.english_flavor_text();
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonAbility {
    #[serde(default)]
    pub is_hidden: bool,
    pub slot: u32,
    pub ability: NamedApiResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedApiResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonType {
    pub slot: u32,
    pub r#type: NamedApiResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PokemonSpecies {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    pub evolution_chain: Option<ApiResource>,
}

impl PokemonSpecies {
    pub fn english_flavor_text(&self) -> Option<String> {
        crate::resource::english(&self.flavor_text_entries)
            .map(|entry| crate::resource::clean_text(&entry.flavor_text))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedApiResource,
    pub version: Option<NamedApiResource>,
}

impl Localized for FlavorTextEntry {
    fn language(&self) -> &str {
        &self.language.name
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TypeDetails {
    pub name: String,
    pub damage_relations: DamageRelations,
    #[serde(default)]
    pub pokemon: Vec<TypePokemon>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct DamageRelations {
    pub double_damage_from: Vec<NamedApiResource>,
    pub double_damage_to: Vec<NamedApiResource>,
    pub half_damage_from: Vec<NamedApiResource>,
    pub half_damage_to: Vec<NamedApiResource>,
    pub no_damage_from: Vec<NamedApiResource>,
    pub no_damage_to: Vec<NamedApiResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TypePokemon {
    pub pokemon: NamedApiResource,
    pub slot: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EvolutionChain {
    pub id: u32,
    pub chain: ChainLink,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChainLink {
    #[serde(default)]
    pub is_baby: bool,
    pub species: NamedApiResource,
    #[serde(default)]
    pub evolution_details: Vec<EvolutionDetail>,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct EvolutionDetail {
    pub trigger: Option<NamedApiResource>,
    pub item: Option<NamedApiResource>,
    pub held_item: Option<NamedApiResource>,
    pub known_move: Option<NamedApiResource>,
    pub known_move_type: Option<NamedApiResource>,
    pub location: Option<NamedApiResource>,
    pub trade_species: Option<NamedApiResource>,
    pub min_level: Option<u32>,
    pub min_happiness: Option<u32>,
    pub min_beauty: Option<u32>,
    pub min_affection: Option<u32>,
    pub needs_overworld_rain: bool,
    pub time_of_day: String,
    pub turn_upside_down: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: &str = r#"{
        "id": 25, "name": "pikachu", "height": 4, "weight": 60,
        "stats": [
            {"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}},
            {"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": ""}}
        ],
        "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
        "abilities": [{"is_hidden": true, "slot": 3, "ability": {"name": "lightning-rod", "url": ""}}],
        "sprites": {"front_default": "ignored"}
    }"#;

    #[test]
    fn test_pokemon_deserializes_and_reads_stats() {
        let pokemon: Pokemon = serde_json::from_str(PIKACHU).unwrap();
        assert_eq!(pokemon.stat("speed"), 90);
        assert_eq!(pokemon.stat("attack"), 0);
        assert_eq!(pokemon.total_base_stats(), 125);
        assert_eq!(pokemon.type_names(), vec!["electric"]);
        assert_eq!(pokemon.is_legendary, None);
        assert!(!pokemon.is_legendary_or_mythical());
    }

    #[test]
    fn test_type_names_follow_slot_order() {
        let mut pokemon = Pokemon::default();
        pokemon.types = vec![
            PokemonType {
                slot: 2,
                r#type: NamedApiResource::new("flying", ""),
            },
            PokemonType {
                slot: 1,
                r#type: NamedApiResource::new("fire", ""),
            },
        ];
        assert_eq!(pokemon.type_names(), vec!["fire", "flying"]);
    }

    #[test]
    fn test_species_merge() {
        let species: PokemonSpecies = serde_json::from_str(
            r#"{
                "id": 150, "name": "mewtwo", "is_legendary": true, "is_mythical": false,
                "flavor_text_entries": [
                    {"flavor_text": "Ein Pokémon", "language": {"name": "de", "url": ""}},
                    {"flavor_text": "It was created by\na scientist.", "language": {"name": "en", "url": ""}}
                ],
                "evolution_chain": {"url": "https://pokeapi.co/api/v2/evolution-chain/77/"}
            }"#,
        )
        .unwrap();

        let pokemon = Pokemon {
            id: 150,
            name: "mewtwo".into(),
            ..Pokemon::default()
        }
        .with_species(&species);

        assert!(pokemon.is_legendary_or_mythical());
        assert_eq!(
            pokemon.flavor_text.as_deref(),
            Some("It was created by a scientist.")
        );
    }
}
