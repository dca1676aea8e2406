pub mod ability;
pub mod battle;
pub mod cache;
pub mod client;
pub mod config;
pub mod detail;
pub mod error;
pub mod evolution;
pub mod item;
pub mod list;
pub mod pokemon;
pub mod resource;
pub mod selection;
pub mod sources;
pub mod transport;
pub mod type_chart;

#[cfg(test)]
pub(crate) mod test_support;

pub use ability::*;
pub use battle::*;
pub use cache::*;
pub use client::*;
pub use config::*;
pub use detail::*;
pub use error::*;
pub use evolution::*;
pub use item::*;
pub use list::*;
pub use pokemon::*;
pub use resource::*;
pub use selection::*;
pub use sources::*;
pub use transport::*;
pub use type_chart::*;
