use crate::adapters::http::{CacheKey, WikidataClient};
use crate::core::CountryResolver;
use crate::domain::model::{is_entity_id, EntityMatch};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
    label: String,
    #[serde(default)]
    description: Option<String>,
}

/// Keyword search through `wbsearchentities`; the first hit wins.
pub struct SearchResolver {
    client: WikidataClient,
    endpoint: String,
    language: String,
}

impl SearchResolver {
    pub fn new(client: WikidataClient, endpoint: &str, language: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl CountryResolver for SearchResolver {
    async fn resolve(&self, name: &str) -> Result<Option<EntityMatch>> {
        self.client
            .get_json(
                &self.endpoint,
                &[
                    ("action", "wbsearchentities"),
                    ("search", name),
                    ("language", self.language.as_str()),
                    ("format", "json"),
                ],
                CacheKey::new("search", format!("{}:{}", self.language, name)),
                |body| parse_search_response(&self.endpoint, body),
            )
            .await
    }
}

fn parse_search_response(endpoint: &str, body: serde_json::Value) -> Result<Option<EntityMatch>> {
    // MediaWiki 以 200 回傳 API 錯誤
    if let Some(error) = body.get("error") {
        return Err(EtlError::malformed(
            endpoint,
            format!("API error: {}", error),
        ));
    }

    let response: SearchResponse = serde_json::from_value(body)
        .map_err(|e| EtlError::malformed(endpoint, format!("unexpected search payload: {}", e)))?;

    let Some(hit) = response.search.into_iter().next() else {
        return Ok(None);
    };

    if !is_entity_id(&hit.id) {
        return Err(EtlError::malformed(
            endpoint,
            format!("search hit has invalid id '{}'", hit.id),
        ));
    }

    Ok(Some(EntityMatch {
        id: hit.id,
        label: hit.label,
        description: hit.description,
    }))
}
