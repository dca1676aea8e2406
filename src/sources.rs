// List sources for each browsable resource.

use crate::client::PokeApiClient;
use crate::config::ListConfig;
use crate::error::{ApiError, ResourceKind};
use crate::item::Item;
use crate::list::{ListBatch, ListController, ListQuery, ListSource, PagingPolicy};
use crate::resource::{ListResponse, NamedApiResource};
use async_trait::async_trait;
use futures_util::future::join_all;
use std::sync::Arc;

/// Ids at or above this are alternate forms, which the API serves unreliably.
const FIRST_ALTERNATE_FORM_ID: u32 = 10_000;

pub type PokemonList = ListController<PokemonSource>;
pub type AbilityList = ListController<AbilitySource>;
pub type ItemList = ListController<ItemSource>;

pub fn pokemon_list(client: Arc<PokeApiClient>, config: &ListConfig) -> PokemonList {
    ListController::new(
        PokemonSource {
            client,
            batch_size: config.pokemon_batch_size,
        },
        config.page_size,
    )
}

pub fn ability_list(client: Arc<PokeApiClient>, config: &ListConfig) -> AbilityList {
    ListController::new(
        AbilitySource {
            client,
            batch_size: config.search_batch_size,
        },
        config.page_size,
    )
}

pub fn item_list(client: Arc<PokeApiClient>, config: &ListConfig) -> ItemList {
    ListController::new(ItemSource { client }, config.page_size)
}

fn page_of(query: &ListQuery, kind: ResourceKind) -> Result<(usize, usize), ApiError> {
    match query {
        ListQuery::Page { limit, offset } => Ok((*limit, *offset)),
        ListQuery::Category(name) => Err(ApiError::Unexpected(format!(
            "{kind} lists cannot be scoped to category '{name}'"
        ))),
    }
}

fn into_batch(response: ListResponse<NamedApiResource>) -> ListBatch<NamedApiResource> {
    ListBatch {
        total_count: response.count,
        entries: response.results,
    }
}

pub struct PokemonSource {
    client: Arc<PokeApiClient>,
    batch_size: usize,
}

#[async_trait]
impl ListSource for PokemonSource {
    type Entry = NamedApiResource;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Pokemon
    }

    fn policy(&self) -> PagingPolicy {
        PagingPolicy::SearchSensitive {
            batch_size: self.batch_size,
        }
    }

    async fn fetch(&self, query: &ListQuery) -> Result<ListBatch<Self::Entry>, ApiError> {
        let (limit, offset) = page_of(query, self.kind())?;
        let mut batch = into_batch(self.client.pokemon_list(limit, offset).await?);
        batch
            .entries
            .retain(|entry| entry.id().is_none_or(|id| id < FIRST_ALTERNATE_FORM_ID));

        // Alternate forms are listed after every default form, one per
        // species, so the species count is the number of pageable entries.
        match self.client.species_count().await {
            Ok(species) => batch.total_count = batch.total_count.min(species),
            Err(e) => tracing::warn!("Keeping upstream Pokémon count, species count unavailable: {}", e),
        }
        Ok(batch)
    }
}

pub struct AbilitySource {
    client: Arc<PokeApiClient>,
    batch_size: usize,
}

#[async_trait]
impl ListSource for AbilitySource {
    type Entry = NamedApiResource;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Ability
    }

    fn policy(&self) -> PagingPolicy {
        PagingPolicy::SearchSensitive {
            batch_size: self.batch_size,
        }
    }

    async fn fetch(&self, query: &ListQuery) -> Result<ListBatch<Self::Entry>, ApiError> {
        let (limit, offset) = page_of(query, self.kind())?;
        Ok(into_batch(self.client.ability_list(limit, offset).await?))
    }
}

/// Items are listed fully resolved so they can be sorted by cost.
pub struct ItemSource {
    client: Arc<PokeApiClient>,
}

impl ItemSource {
    /// Every item category, for choosing a scope.
    pub async fn categories(&self) -> Result<Vec<NamedApiResource>, ApiError> {
        Ok(self.client.item_categories().await?.results)
    }

    /// Resolves every listed item concurrently. Items that fail are dropped;
    /// the batch only fails when none of a non-empty listing resolved.
    async fn resolve(&self, listed: Vec<NamedApiResource>) -> Result<Vec<Item>, ApiError> {
        let requested = listed.len();
        let results = join_all(
            listed
                .iter()
                .map(|entry| self.client.item_by_url(&entry.url)),
        )
        .await;

        let mut items = Vec::with_capacity(requested);
        for (entry, result) in listed.iter().zip(results) {
            match result {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!("Dropping item {} from list: {}", entry.name, e),
            }
        }

        if requested > 0 && items.is_empty() {
            return Err(ApiError::EmptyBatch {
                kind: ResourceKind::Item,
                requested,
            });
        }
        Ok(items)
    }
}

#[async_trait]
impl ListSource for ItemSource {
    type Entry = Item;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Item
    }

    fn policy(&self) -> PagingPolicy {
        PagingPolicy::CategoryScoped
    }

    async fn fetch(&self, query: &ListQuery) -> Result<ListBatch<Self::Entry>, ApiError> {
        let (listed, total_count) = match query {
            ListQuery::Page { limit, offset } => {
                let response = self.client.item_list(*limit, *offset).await?;
                (response.results, response.count)
            }
            ListQuery::Category(name) => {
                let category = self.client.item_category(name).await?;
                let count = category.items.len();
                (category.items, count)
            }
        };

        Ok(ListBatch {
            entries: self.resolve(listed).await?,
            total_count,
        })
    }
}
