use std::fmt;

/// The upstream resource a request was aimed at, used to name it in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pokemon,
    Species,
    Item,
    ItemCategory,
    Ability,
    Type,
    EvolutionChain,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Pokemon => "Pokémon",
            ResourceKind::Species => "Species",
            ResourceKind::Item => "Item",
            ResourceKind::ItemCategory => "Item category",
            ResourceKind::Ability => "Ability",
            ResourceKind::Type => "Type",
            ResourceKind::EvolutionChain => "Evolution chain",
        };
        f.write_str(label)
    }
}

/// Low-level failure reported by a [`crate::Transport`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("network failure: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Failures worth retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransientError {
    #[error("The API is rate limiting requests. Please try again shortly.")]
    RateLimited,
    #[error("An API error occurred (Status: {status}). Please try again.")]
    Server { status: u16 },
    #[error("A network error occurred. Please check your connection.")]
    Network(String),
}

/// Errors surfaced by [`crate::PokeApiClient`] and stored by controllers as
/// display strings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("{kind} '{name}' could not be found.")]
    NotFound { kind: ResourceKind, name: String },
    #[error(transparent)]
    Transient(#[from] TransientError),
    #[error("An unexpected error occurred. Please try again.")]
    Unexpected(String),
    #[error("None of the {requested} requested {kind} entries could be loaded.")]
    EmptyBatch { kind: ResourceKind, requested: usize },
}

impl ApiError {
    /// Classifies a transport failure for the request at `url`.
    pub fn from_transport(kind: ResourceKind, url: &str, err: TransportError) -> Self {
        match err {
            TransportError::Status(404) => ApiError::NotFound {
                kind,
                name: last_path_segment(url).to_string(),
            },
            TransportError::Status(429) => ApiError::Transient(TransientError::RateLimited),
            TransportError::Status(status) if status >= 500 => {
                ApiError::Transient(TransientError::Server { status })
            }
            TransportError::Network(detail) => ApiError::Transient(TransientError::Network(detail)),
            TransportError::Status(status) => ApiError::Unexpected(format!("HTTP status {status}")),
            TransportError::Decode(detail) => ApiError::Unexpected(detail),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

fn last_path_segment(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_resource() {
        let err = ApiError::from_transport(
            ResourceKind::Pokemon,
            "https://pokeapi.co/api/v2/pokemon/missingno",
            TransportError::Status(404),
        );
        assert_eq!(err.to_string(), "Pokémon 'missingno' could not be found.");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_not_found_ignores_query_and_trailing_slash() {
        let err = ApiError::from_transport(
            ResourceKind::Item,
            "https://pokeapi.co/api/v2/item/master-ball/?x=1",
            TransportError::Status(404),
        );
        assert_eq!(err.to_string(), "Item 'master-ball' could not be found.");
    }

    #[test]
    fn test_transient_classification() {
        let url = "https://pokeapi.co/api/v2/ability/levitate";
        let kind = ResourceKind::Ability;
        assert!(ApiError::from_transport(kind, url, TransportError::Status(429)).is_transient());
        assert!(ApiError::from_transport(kind, url, TransportError::Status(503)).is_transient());
        assert!(
            ApiError::from_transport(kind, url, TransportError::Network("reset".into()))
                .is_transient()
        );
        assert!(!ApiError::from_transport(kind, url, TransportError::Status(400)).is_transient());
        assert!(
            !ApiError::from_transport(kind, url, TransportError::Decode("eof".into()))
                .is_transient()
        );
    }

    #[test]
    fn test_messages() {
        let server = ApiError::Transient(TransientError::Server { status: 502 });
        assert_eq!(
            server.to_string(),
            "An API error occurred (Status: 502). Please try again."
        );
        let unexpected = ApiError::Unexpected("HTTP status 418".into());
        assert_eq!(
            unexpected.to_string(),
            "An unexpected error occurred. Please try again."
        );
    }
}
