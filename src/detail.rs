//! Single-entity selections: detail views and the two comparison slots.
//!
//! Every slot tracks its own request generation so a slow response for an
//! earlier selection can never overwrite a later one.

use crate::ability::Ability;
use crate::battle::{Prediction, predict_winner};
use crate::client::PokeApiClient;
use crate::error::ApiError;
use crate::item::Item;
use crate::pokemon::{EvolutionChain, Pokemon, TypeDetails};
use std::future::Future;

/// What happens to the current selection around a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailPolicy {
    pub clear_before_fetch: bool,
    pub clear_on_error: bool,
}

impl DetailPolicy {
    /// Keep showing the old selection while loading, drop it on failure.
    pub const KEEP_UNTIL_ERROR: DetailPolicy = DetailPolicy {
        clear_before_fetch: false,
        clear_on_error: true,
    };
    /// Keep showing the old selection through loading and failure.
    pub const KEEP_ON_ERROR: DetailPolicy = DetailPolicy {
        clear_before_fetch: false,
        clear_on_error: false,
    };
    /// Blank the selection as soon as a new one is requested.
    pub const CLEAR_BEFORE_FETCH: DetailPolicy = DetailPolicy {
        clear_before_fetch: true,
        clear_on_error: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    generation: u64,
    policy: DetailPolicy,
}

#[derive(Debug, Clone)]
pub struct DetailSlot<T> {
    selected: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for DetailSlot<T> {
    fn default() -> Self {
        Self {
            selected: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

impl<T> DetailSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Drops the selection and invalidates any request in flight.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.loading = false;
    }

    pub fn begin(&mut self, policy: DetailPolicy) -> DetailTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        if policy.clear_before_fetch {
            self.selected = None;
        }
        DetailTicket {
            generation: self.generation,
            policy,
        }
    }

    /// Applies a completed request unless a newer one superseded it.
    pub fn finish(&mut self, ticket: DetailTicket, result: Result<T, ApiError>) -> bool {
        if ticket.generation != self.generation {
            tracing::warn!(
                "Discarding stale detail response (generation {}, latest {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(value) => self.selected = Some(value),
            Err(e) => {
                if ticket.policy.clear_on_error {
                    self.selected = None;
                }
                self.error = Some(e.to_string());
            }
        }
        true
    }

    pub async fn load<F>(&mut self, policy: DetailPolicy, request: F)
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let ticket = self.begin(policy);
        let result = request.await;
        self.finish(ticket, result);
    }
}

impl DetailSlot<Pokemon> {
    pub async fn load_pokemon(&mut self, client: &PokeApiClient, name: &str) {
        self.load(DetailPolicy::KEEP_UNTIL_ERROR, client.pokemon(name))
            .await;
    }
}

impl DetailSlot<Item> {
    pub async fn load_item(&mut self, client: &PokeApiClient, name: &str) {
        self.load(DetailPolicy::CLEAR_BEFORE_FETCH, client.item(name))
            .await;
    }
}

impl DetailSlot<Ability> {
    pub async fn load_ability(&mut self, client: &PokeApiClient, name: &str) {
        self.load(DetailPolicy::CLEAR_BEFORE_FETCH, client.ability(name))
            .await;
    }
}

impl DetailSlot<TypeDetails> {
    /// An empty name clears the selection without a request.
    pub async fn load_type(&mut self, client: &PokeApiClient, name: &str) {
        if name.is_empty() {
            self.clear();
            return;
        }
        self.load(DetailPolicy::KEEP_ON_ERROR, client.type_details(name))
            .await;
    }
}

impl DetailSlot<EvolutionChain> {
    pub async fn load_evolution_chain(&mut self, client: &PokeApiClient, name: &str) {
        self.load(DetailPolicy::CLEAR_BEFORE_FETCH, client.evolution_chain_for(name))
            .await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonSlot {
    First,
    Second,
}

/// Two independently loaded Pokémon and one shared error line.
#[derive(Debug, Default)]
pub struct Comparison {
    first: DetailSlot<Pokemon>,
    second: DetailSlot<Pokemon>,
    error: Option<String>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: ComparisonSlot) -> &DetailSlot<Pokemon> {
        match slot {
            ComparisonSlot::First => &self.first,
            ComparisonSlot::Second => &self.second,
        }
    }

    fn slot_mut(&mut self, slot: ComparisonSlot) -> &mut DetailSlot<Pokemon> {
        match slot {
            ComparisonSlot::First => &mut self.first,
            ComparisonSlot::Second => &mut self.second,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_slot(&mut self, slot: ComparisonSlot) {
        self.slot_mut(slot).clear();
    }

    pub fn begin(&mut self, slot: ComparisonSlot) -> DetailTicket {
        self.error = None;
        self.slot_mut(slot).begin(DetailPolicy::KEEP_UNTIL_ERROR)
    }

    pub fn finish(
        &mut self,
        slot: ComparisonSlot,
        ticket: DetailTicket,
        result: Result<Pokemon, ApiError>,
    ) -> bool {
        let failure = result.as_ref().err().map(ToString::to_string);
        let applied = self.slot_mut(slot).finish(ticket, result);
        if applied && failure.is_some() {
            self.error = failure;
        }
        applied
    }

    /// Loads `name` into `slot`. An empty name just empties the slot.
    pub async fn set_pokemon(&mut self, client: &PokeApiClient, name: &str, slot: ComparisonSlot) {
        if name.is_empty() {
            self.clear_slot(slot);
            return;
        }
        let ticket = self.begin(slot);
        let result = client.pokemon(name).await;
        self.finish(slot, ticket, result);
    }

    /// Predicted outcome once both slots hold a Pokémon.
    pub fn prediction(&self) -> Option<Prediction<'_>> {
        match (self.first.selected(), self.second.selected()) {
            (Some(first), Some(second)) => Some(predict_winner(first, second)),
            _ => None,
        }
    }
}
