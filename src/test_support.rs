// In-memory doubles shared by unit tests.

use crate::error::TransportError;
use crate::pokemon::{Pokemon, PokemonStat, PokemonType};
use crate::resource::NamedApiResource;
use crate::transport::Transport;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

const STAT_NAMES: [&str; 6] = [
    "hp",
    "attack",
    "defense",
    "special-attack",
    "special-defense",
    "speed",
];

/// Routes URLs to canned responses and records every request. A route with
/// several queued responses pops them in order and repeats the last one.
/// Unrouted URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn respond(&self, url: &str, payload: Value) {
        self.respond_sequence(url, vec![Ok(payload)]);
    }

    pub fn fail(&self, url: &str, err: TransportError) {
        self.respond_sequence(url, vec![Err(err)]);
    }

    pub fn respond_sequence(&self, url: &str, responses: Vec<Result<Value, TransportError>>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Err(TransportError::Status(404))),
            None => Err(TransportError::Status(404)),
        }
    }
}

/// A creature with stats in `hp, attack, defense, special-attack,
/// special-defense, speed` order.
pub fn creature(name: &str, types: &[&str], stats: [u32; 6]) -> Pokemon {
    Pokemon {
        id: 1,
        name: name.to_string(),
        stats: STAT_NAMES
            .iter()
            .zip(stats)
            .map(|(stat, base_stat)| PokemonStat {
                base_stat,
                effort: 0,
                stat: NamedApiResource::new(*stat, ""),
            })
            .collect(),
        types: types
            .iter()
            .enumerate()
            .map(|(i, t)| PokemonType {
                slot: i as u32 + 1,
                r#type: NamedApiResource::new(*t, ""),
            })
            .collect(),
        is_legendary: Some(false),
        is_mythical: Some(false),
        ..Pokemon::default()
    }
}

pub fn pokemon_json(id: u32, name: &str, types: &[&str], stats: [u32; 6]) -> Value {
    let mut pokemon = creature(name, types, stats);
    pokemon.id = id;
    pokemon.is_legendary = None;
    pokemon.is_mythical = None;
    serde_json::to_value(pokemon).unwrap()
}

pub fn species_json(id: u32, name: &str, legendary: bool, mythical: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "is_legendary": legendary,
        "is_mythical": mythical,
        "flavor_text_entries": [],
        "evolution_chain": null
    })
}

/// List entries named `<prefix>-<n>` with canonical URLs.
pub fn named_entries(base: &str, resource: &str, prefix: &str, range: std::ops::Range<u32>) -> Vec<Value> {
    range
        .map(|n| json!({"name": format!("{prefix}-{n}"), "url": format!("{base}/{resource}/{n}/")}))
        .collect()
}
