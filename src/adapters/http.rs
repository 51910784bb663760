use crate::adapters::cache::ResponseCache;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Where a response is memoized when a cache directory is configured.
#[derive(Debug, Clone)]
pub struct CacheKey {
    pub namespace: &'static str,
    pub key: String,
}

impl CacheKey {
    pub fn new(namespace: &'static str, key: impl Into<String>) -> Self {
        Self {
            namespace,
            key: key.into(),
        }
    }
}

/// Shared HTTP client for every Wikidata endpoint.
///
/// Non-2xx responses become errors, bodies are parsed as JSON. When a
/// [`ResponseCache`] is attached, responses are read from and written to it.
#[derive(Clone)]
pub struct WikidataClient {
    client: Client,
    cache: Option<Arc<ResponseCache>>,
}

impl WikidataClient {
    pub fn new(
        user_agent: &str,
        timeout_seconds: Option<u64>,
        cache: Option<ResponseCache>,
    ) -> Result<Self> {
        let mut builder = Client::builder().user_agent(user_agent.to_string());
        if let Some(timeout) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            cache: cache.map(Arc::new),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let cache = config.cache_dir().map(ResponseCache::new);
        if let Some(cache) = &cache {
            tracing::info!("🗄️  Response cache enabled at {}", cache.dir());
        }
        Self::new(config.user_agent(), config.request_timeout_seconds(), cache)
    }

    /// GET `url` with query parameters and hand the body to `parse`.
    pub async fn get_json<T, P>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        cache_key: CacheKey,
        parse: P,
    ) -> Result<T>
    where
        P: Fn(serde_json::Value) -> Result<T>,
    {
        if let Some(hit) = self.cached(&cache_key, &parse).await {
            return Ok(hit);
        }

        tracing::debug!("GET {} {:?}", url, params);
        let response = self
            .client
            .get(url)
            .query(params)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = serde_json::from_str(&response.text().await?)?;
        self.accept(&cache_key, body, &parse).await
    }

    /// POST a SPARQL query as `application/sparql-query` and hand the body to `parse`.
    pub async fn sparql<T, P>(
        &self,
        endpoint: &str,
        query: &str,
        cache_key: CacheKey,
        parse: P,
    ) -> Result<T>
    where
        P: Fn(serde_json::Value) -> Result<T>,
    {
        if let Some(hit) = self.cached(&cache_key, &parse).await {
            return Ok(hit);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/sparql-results+json"),
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/sparql-query"),
        );

        tracing::debug!("POST {} ({} bytes of SPARQL)", endpoint, query.len());
        let response = self
            .client
            .post(endpoint)
            .headers(headers)
            .body(query.to_string())
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = serde_json::from_str(&response.text().await?)?;
        self.accept(&cache_key, body, &parse).await
    }

    /// A cached body that `parse` rejects counts as a miss.
    async fn cached<T, P>(&self, cache_key: &CacheKey, parse: &P) -> Option<T>
    where
        P: Fn(serde_json::Value) -> Result<T>,
    {
        let body = self.cache_lookup(cache_key).await?;
        match parse(body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Discarding cached {}/{}: {}",
                    cache_key.namespace,
                    cache_key.key,
                    e
                );
                None
            }
        }
    }

    /// Only bodies accepted by `parse` are written to the cache.
    async fn accept<T, P>(&self, cache_key: &CacheKey, body: serde_json::Value, parse: &P) -> Result<T>
    where
        P: Fn(serde_json::Value) -> Result<T>,
    {
        let parsed = parse(body.clone())?;
        self.cache_store(cache_key, &body).await;
        Ok(parsed)
    }

    async fn cache_lookup(&self, cache_key: &CacheKey) -> Option<serde_json::Value> {
        let cache = self.cache.as_ref()?;
        cache.get(cache_key.namespace, &cache_key.key).await
    }

    async fn cache_store(&self, cache_key: &CacheKey, body: &serde_json::Value) {
        if let Some(cache) = &self.cache {
            // 快取寫入失敗不影響本次結果
            if let Err(e) = cache.put(cache_key.namespace, &cache_key.key, body).await {
                tracing::warn!(
                    "Failed to cache {}/{}: {}",
                    cache_key.namespace,
                    cache_key.key,
                    e
                );
            }
        }
    }
}
