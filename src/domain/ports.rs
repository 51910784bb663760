use crate::domain::model::{
    BorderPolicy, BorderSource, CountryQuery, EntityInfo, EntityMatch, FailurePolicy, JoinMode,
    Neighbor, OutputFormat, ResolverKind, TransformResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn name_column(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_stem(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];

    fn language(&self) -> &str;
    fn search_endpoint(&self) -> &str;
    fn entity_endpoint(&self) -> &str;
    fn sparql_endpoint(&self) -> &str;
    fn user_agent(&self) -> &str;
    fn request_timeout_seconds(&self) -> Option<u64>;
    fn cache_dir(&self) -> Option<&str>;

    fn resolver_kind(&self) -> ResolverKind;
    fn border_source(&self) -> BorderSource;
    fn join_mode(&self) -> JoinMode;
    fn border_policy(&self) -> BorderPolicy;
    fn failure_policy(&self) -> FailurePolicy;
    fn concurrent_requests(&self) -> usize;
}

/// Maps a country name to at most one knowledge-base entity.
#[async_trait]
pub trait CountryResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<Option<EntityMatch>>;
}

/// Reads the "shares border with" relation of an entity.
#[async_trait]
pub trait BorderFetcher: Send + Sync {
    /// Targets of the border relation of `id`.
    async fn neighbors(&self, id: &str) -> Result<Vec<Neighbor>>;

    /// Label and classes of `id`, used by the fill-in pass and to check input
    /// countries before the symmetric policy adds reverse edges.
    async fn describe(&self, id: &str) -> Result<EntityInfo>;

    /// Whether `neighbors` returns raw targets that still need classifying.
    fn needs_fill_in(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CountryQuery>>;
    async fn transform(&self, data: Vec<CountryQuery>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
