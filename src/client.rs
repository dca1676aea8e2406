use crate::cache::{CacheTrait, build_cache};
use crate::config::{ApiConfig, Config};
use crate::error::{ApiError, ResourceKind, TransportError};
use crate::item::{Item, ItemCategory};
use crate::pokemon::{EvolutionChain, Pokemon, PokemonSpecies, TypeDetails};
use crate::resource::{ListResponse, NamedApiResource};
use crate::transport::{HttpTransport, Transport};
use crate::ability::Ability;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Exponential backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): initial, 2x, 4x, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff(),
        }
    }
}

/// Cache-first, retrying reader for the PokéAPI.
pub struct PokeApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheTrait<Value>>,
    retry: RetryPolicy,
}

impl PokeApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheTrait<Value>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            cache,
            retry,
        }
    }

    /// Wires the HTTP transport and the configured cache.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.api.timeout())?;
        Ok(Self::new(
            config.api.base_url(),
            Arc::new(transport),
            build_cache(&config.cache),
            RetryPolicy::from(&config.api),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<dyn CacheTrait<Value>> {
        &self.cache
    }

    /// Returns the raw payload for `url`, from the cache when fresh.
    pub async fn fetch_json(&self, kind: ResourceKind, url: &str) -> Result<Value, ApiError> {
        if let Some(cached) = self.cache.get(url) {
            return Ok(cached);
        }

        let mut attempt = 0;
        loop {
            match self.transport.get_json(url).await {
                Ok(payload) => {
                    if let Err(e) = self.cache.insert(url.to_string(), payload.clone()) {
                        tracing::warn!("Failed to cache response for {}: {}", url, e);
                    }
                    return Ok(payload);
                }
                Err(err) => {
                    let err = ApiError::from_transport(kind, url, err);
                    if err.is_transient() && attempt < self.retry.max_retries {
                        attempt += 1;
                        let delay = self.retry.delay(attempt);
                        tracing::warn!(
                            "Transient failure fetching {} ({}), retry {}/{} in {:?}",
                            url,
                            err,
                            attempt,
                            self.retry.max_retries,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    tracing::error!("Failed to fetch {}: {:?}", url, err);
                    return Err(err);
                }
            }
        }
    }

    pub async fn fetch<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        url: &str,
    ) -> Result<T, ApiError> {
        let payload = self.fetch_json(kind, url).await?;
        serde_json::from_value(payload).map_err(|e| {
            tracing::error!("Failed to parse {} payload from {}: {}", kind, url, e);
            // An undecodable body must not be served again from the cache.
            self.cache.remove(url);
            ApiError::Unexpected(format!("JSON parsing failed: {}", e))
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn list_url(&self, resource: &str, limit: usize, offset: usize) -> String {
        format!(
            "{}/{}?limit={}&offset={}",
            self.base_url, resource, limit, offset
        )
    }

    pub async fn pokemon_list(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ListResponse<NamedApiResource>, ApiError> {
        let url = self.list_url("pokemon", limit, offset);
        self.fetch(ResourceKind::Pokemon, &url).await
    }

    /// A Pokémon with its species flags and flavor text merged in.
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let url = self.url(&format!("pokemon/{}", name.to_lowercase()));
        self.pokemon_by_url(&url).await
    }

    pub async fn pokemon_by_url(&self, url: &str) -> Result<Pokemon, ApiError> {
        let pokemon: Pokemon = self.fetch(ResourceKind::Pokemon, url).await?;
        let species = self.species(&pokemon.id.to_string()).await?;
        tracing::debug!("Resolved Pokémon {} (ID: {})", pokemon.name, pokemon.id);
        Ok(pokemon.with_species(&species))
    }

    /// Number of species, which is also the number of default Pokémon forms.
    pub async fn species_count(&self) -> Result<usize, ApiError> {
        let url = self.list_url("pokemon-species", 1, 0);
        let response: ListResponse<NamedApiResource> =
            self.fetch(ResourceKind::Species, &url).await?;
        Ok(response.count)
    }

    pub async fn species(&self, name_or_id: &str) -> Result<PokemonSpecies, ApiError> {
        let url = self.url(&format!("pokemon-species/{}", name_or_id.to_lowercase()));
        self.fetch(ResourceKind::Species, &url).await
    }

    pub async fn item_list(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ListResponse<NamedApiResource>, ApiError> {
        let url = self.list_url("item", limit, offset);
        self.fetch(ResourceKind::Item, &url).await
    }

    pub async fn item(&self, name: &str) -> Result<Item, ApiError> {
        let url = self.url(&format!("item/{}", name.to_lowercase()));
        self.item_by_url(&url).await
    }

    pub async fn item_by_url(&self, url: &str) -> Result<Item, ApiError> {
        self.fetch(ResourceKind::Item, url).await
    }

    pub async fn item_categories(&self) -> Result<ListResponse<NamedApiResource>, ApiError> {
        let url = self.list_url("item-category", 100, 0);
        self.fetch(ResourceKind::ItemCategory, &url).await
    }

    pub async fn item_category(&self, name: &str) -> Result<ItemCategory, ApiError> {
        let url = self.url(&format!("item-category/{}", name.to_lowercase()));
        self.fetch(ResourceKind::ItemCategory, &url).await
    }

    pub async fn ability_list(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<ListResponse<NamedApiResource>, ApiError> {
        let url = self.list_url("ability", limit, offset);
        self.fetch(ResourceKind::Ability, &url).await
    }

    pub async fn ability(&self, name: &str) -> Result<Ability, ApiError> {
        let url = self.url(&format!("ability/{}", name.to_lowercase()));
        self.fetch(ResourceKind::Ability, &url).await
    }

    pub async fn types(&self) -> Result<Vec<NamedApiResource>, ApiError> {
        let url = self.url("type");
        let response: ListResponse<NamedApiResource> =
            self.fetch(ResourceKind::Type, &url).await?;
        Ok(response.results)
    }

    pub async fn type_details(&self, name: &str) -> Result<TypeDetails, ApiError> {
        let url = self.url(&format!("type/{}", name.to_lowercase()));
        self.fetch(ResourceKind::Type, &url).await
    }

    /// Looks up the species of `name` and follows its evolution chain link.
    pub async fn evolution_chain_for(&self, name: &str) -> Result<EvolutionChain, ApiError> {
        let species = self.species(name).await?;
        let Some(chain) = species.evolution_chain else {
            return Err(ApiError::NotFound {
                kind: ResourceKind::EvolutionChain,
                name: species.name,
            });
        };
        self.fetch(ResourceKind::EvolutionChain, &chain.url).await
    }
}
