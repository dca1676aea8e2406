// Shapes shared by every PokéAPI resource.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct NamedApiResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedApiResource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Numeric id taken from the trailing path segment of the canonical URL,
    /// e.g. `.../pokemon/25/` -> 25.
    pub fn id(&self) -> Option<u32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

/// Envelope returned by every list endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub count: usize,
    #[serde(default)]
    pub results: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiResource {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VerboseEffect {
    pub effect: String,
    #[serde(default)]
    pub short_effect: String,
    pub language: NamedApiResource,
}

/// Anything carrying a language tag.
pub trait Localized {
    fn language(&self) -> &str;
}

impl Localized for VerboseEffect {
    fn language(&self) -> &str {
        &self.language.name
    }
}

/// First English entry of a localized list.
pub fn english<T: Localized>(entries: &[T]) -> Option<&T> {
    entries.iter().find(|entry| entry.language() == "en")
}

/// Flavor text from the API embeds hard line breaks and form feeds.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first character, leaving the rest as-is.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_url() {
        let entry = NamedApiResource::new("pikachu", "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(entry.id(), Some(25));
        assert_eq!(NamedApiResource::new("x", "").id(), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("Spits fire that\nis hot enough to\u{c}melt boulders."),
            "Spits fire that is hot enough to melt boulders."
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("charizard"), "Charizard");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_list_response_deserializes() {
        let raw = r#"{"count": 1302, "next": null, "results": [{"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"}]}"#;
        let response: ListResponse<NamedApiResource> = serde_json::from_str(raw).unwrap();
        assert_eq!(response.count, 1302);
        assert_eq!(response.results[0].id(), Some(1));
    }
}
