// Adapters layer: concrete implementations for external systems (Wikidata endpoints, disk cache).

pub mod cache;
pub mod entity;
pub mod http;
pub mod search;
pub mod sparql;

use crate::core::{BorderFetcher, ConfigProvider, CountryResolver};
use crate::domain::model::{BorderSource, ResolverKind};
use std::sync::Arc;

pub use cache::ResponseCache;
pub use entity::EntityBorderFetcher;
pub use http::WikidataClient;
pub use search::SearchResolver;
pub use sparql::{SparqlBorderFetcher, SparqlEndpoint, SparqlResolver};

/// Picks the resolver strategy named by the configuration.
pub fn build_resolver<C: ConfigProvider>(
    config: &C,
    client: &WikidataClient,
) -> Arc<dyn CountryResolver> {
    match config.resolver_kind() {
        ResolverKind::Search => Arc::new(SearchResolver::new(
            client.clone(),
            config.search_endpoint(),
            config.language(),
        )),
        ResolverKind::Sparql => Arc::new(SparqlResolver::new(SparqlEndpoint::new(
            client.clone(),
            config.sparql_endpoint(),
            config.language(),
        ))),
    }
}

/// Picks the border strategy named by the configuration.
pub fn build_border_fetcher<C: ConfigProvider>(
    config: &C,
    client: &WikidataClient,
) -> Arc<dyn BorderFetcher> {
    match config.border_source() {
        BorderSource::Entity => Arc::new(EntityBorderFetcher::new(
            client.clone(),
            config.entity_endpoint(),
            config.language(),
        )),
        BorderSource::Sparql => Arc::new(SparqlBorderFetcher::new(SparqlEndpoint::new(
            client.clone(),
            config.sparql_endpoint(),
            config.language(),
        ))),
    }
}
