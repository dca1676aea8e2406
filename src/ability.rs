use crate::resource::{Localized, NamedApiResource, VerboseEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ability {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub is_main_series: bool,
    pub generation: Option<NamedApiResource>,
    #[serde(default)]
    pub effect_entries: Vec<VerboseEffect>,
    #[serde(default)]
    pub flavor_text_entries: Vec<AbilityFlavorText>,
    #[serde(default)]
    pub pokemon: Vec<AbilityPokemon>,
}

impl Ability {
    pub fn effect(&self) -> Option<&str> {
        crate::resource::english(&self.effect_entries).map(|e| e.effect.as_str())
    }

    pub fn flavor_text(&self) -> Option<String> {
        crate::resource::english(&self.flavor_text_entries)
            .map(|entry| crate::resource::clean_text(&entry.flavor_text))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AbilityFlavorText {
    pub flavor_text: String,
    pub language: NamedApiResource,
    pub version_group: Option<NamedApiResource>,
}

impl Localized for AbilityFlavorText {
    fn language(&self) -> &str {
        &self.language.name
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AbilityPokemon {
    #[serde(default)]
    pub is_hidden: bool,
    pub slot: u32,
    pub pokemon: NamedApiResource,
}
