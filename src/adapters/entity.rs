use crate::adapters::http::{CacheKey, WikidataClient};
use crate::core::BorderFetcher;
use crate::domain::model::{is_entity_id, EntityInfo, Neighbor, INSTANCE_OF, SHARES_BORDER_WITH};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Item document as served by the Wikibase REST API.
#[derive(Debug, Deserialize)]
struct EntityDocument {
    id: String,
    #[serde(default)]
    labels: HashMap<String, String>,
    statements: HashMap<String, Vec<Statement>>,
}

#[derive(Debug, Deserialize)]
struct Statement {
    value: StatementValue,
}

#[derive(Debug, Deserialize)]
struct StatementValue {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<serde_json::Value>,
}

impl EntityDocument {
    /// Item ids held by `property`; `somevalue` / `novalue` statements are skipped.
    fn item_values(&self, property: &str) -> Vec<String> {
        self.statements
            .get(property)
            .map(|statements| {
                statements
                    .iter()
                    .filter(|s| s.value.kind == "value")
                    .filter_map(|s| s.value.content.as_ref()?.as_str())
                    .filter(|id| is_entity_id(id))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Border relation read from entity documents.
///
/// Raw P47 targets are returned unclassified, so the caller runs a fill-in
/// pass through [`BorderFetcher::describe`]. Documents are memoized for the
/// lifetime of the fetcher; each entity is requested at most once.
pub struct EntityBorderFetcher {
    client: WikidataClient,
    endpoint: String,
    language: String,
    documents: Mutex<HashMap<String, Arc<EntityDocument>>>,
}

impl EntityBorderFetcher {
    pub fn new(client: WikidataClient, endpoint: &str, language: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            language: language.to_string(),
            documents: Mutex::new(HashMap::new()),
        }
    }

    async fn document(&self, id: &str) -> Result<Arc<EntityDocument>> {
        if let Some(doc) = self.documents.lock().await.get(id) {
            return Ok(Arc::clone(doc));
        }

        if !is_entity_id(id) {
            return Err(EtlError::ValidationError {
                message: format!("'{}' is not an item id", id),
            });
        }

        let url = format!("{}/{}", self.endpoint, id);
        let doc: EntityDocument = self
            .client
            .get_json(&url, &[], CacheKey::new("entity", id), |body| {
                serde_json::from_value(body).map_err(|e| {
                    EtlError::malformed(&url, format!("unexpected entity document: {}", e))
                })
            })
            .await?;

        if doc.id != id {
            tracing::debug!("{} redirects to {}", id, doc.id);
        }

        let doc = Arc::new(doc);
        self.documents
            .lock()
            .await
            .insert(id.to_string(), Arc::clone(&doc));
        Ok(doc)
    }
}

#[async_trait]
impl BorderFetcher for EntityBorderFetcher {
    async fn neighbors(&self, id: &str) -> Result<Vec<Neighbor>> {
        let doc = self.document(id).await?;
        Ok(doc
            .item_values(SHARES_BORDER_WITH)
            .into_iter()
            .map(|id| Neighbor { id, label: None })
            .collect())
    }

    async fn describe(&self, id: &str) -> Result<EntityInfo> {
        let doc = self.document(id).await?;
        Ok(EntityInfo {
            id: id.to_string(),
            label: doc.labels.get(&self.language).cloned(),
            instance_of: doc.item_values(INSTANCE_OF),
        })
    }

    fn needs_fill_in(&self) -> bool {
        true
    }
}
