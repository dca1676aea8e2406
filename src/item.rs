use crate::resource::{NamedApiResource, VerboseEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Item {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub cost: u32,
    pub category: Option<NamedApiResource>,
    #[serde(default)]
    pub attributes: Vec<NamedApiResource>,
    #[serde(default)]
    pub effect_entries: Vec<VerboseEffect>,
    pub fling_power: Option<u32>,
    pub fling_effect: Option<NamedApiResource>,
}

impl Item {
    pub fn short_effect(&self) -> Option<&str> {
        crate::resource::english(&self.effect_entries).map(|e| e.short_effect.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItemCategory {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub items: Vec<NamedApiResource>,
}
