use crate::adapters::{build_border_fetcher, build_resolver, WikidataClient};
use crate::core::borders::collect_borders;
use crate::core::export::render_table;
use crate::core::join::join_borders;
use crate::core::loader::{delimiter_for, parse_country_names};
use crate::core::resolve::resolve_countries;
use crate::core::{
    BorderFetcher, ConfigProvider, CountryQuery, CountryResolver, Pipeline, Storage,
    TransformResult,
};
use crate::domain::model::{RenderedOutput, RunSummary};
use crate::utils::error::Result;
use std::sync::Arc;

pub const SUMMARY_FILE: &str = "summary.json";

/// Country list -> resolved countries -> border edges -> bordering pairs.
pub struct BorderPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    resolver: Arc<dyn CountryResolver>,
    fetcher: Arc<dyn BorderFetcher>,
}

impl<S: Storage, C: ConfigProvider> BorderPipeline<S, C> {
    /// Wires the resolver and border strategies named by `config`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let client = WikidataClient::from_config(&config)?;
        let resolver = build_resolver(&config, &client);
        let fetcher = build_border_fetcher(&config, &client);
        Ok(Self::with_components(storage, config, resolver, fetcher))
    }

    pub fn with_components(
        storage: S,
        config: C,
        resolver: Arc<dyn CountryResolver>,
        fetcher: Arc<dyn BorderFetcher>,
    ) -> Self {
        Self {
            storage,
            config,
            resolver,
            fetcher,
        }
    }

    fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.config.output_stem(), extension)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BorderPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<CountryQuery>> {
        let path = self.config.input_path();
        tracing::info!("📂 Reading country names from {}", path);

        let data = tokio::fs::read(path).await?;
        let queries =
            parse_country_names(&data, self.config.name_column(), delimiter_for(path))?;

        tracing::info!(
            "📋 Loaded {} distinct names from column '{}'",
            queries.len(),
            self.config.name_column()
        );
        Ok(queries)
    }

    async fn transform(&self, data: Vec<CountryQuery>) -> Result<TransformResult> {
        let total_names = data.len();
        let concurrency = self.config.concurrent_requests();
        let failure_policy = self.config.failure_policy();

        let resolution = resolve_countries(
            Arc::clone(&self.resolver),
            data,
            concurrency,
            failure_policy,
        )
        .await?;

        let borders = collect_borders(
            Arc::clone(&self.fetcher),
            &resolution.resolved,
            concurrency,
            failure_policy,
            self.config.border_policy(),
        )
        .await?;

        let rows = join_borders(
            &resolution.resolved,
            &borders.edges,
            &borders.labels,
            self.config.join_mode(),
        );

        let mut failures = resolution.failures.clone();
        failures.extend(borders.failures);

        let summary = RunSummary {
            resolver: self.config.resolver_kind().to_string(),
            border_source: self.config.border_source().to_string(),
            total_names,
            resolved: resolution.resolved_count(),
            unresolved: resolution.unresolved_names(),
            failures,
            edges: borders.edges.len(),
            rows: rows.len(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::info!(
            "🔗 Joined {} rows ({} of {} names resolved, {} failures)",
            summary.rows,
            summary.resolved,
            summary.total_names,
            summary.failures.len()
        );

        let outputs = self
            .config
            .output_formats()
            .iter()
            .map(|&format| {
                Ok(RenderedOutput {
                    format,
                    content: render_table(&rows, format)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TransformResult {
            rows,
            summary,
            outputs,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut written = Vec::new();

        for output in &result.outputs {
            let name = self.file_name(output.format.extension());
            tracing::debug!("Writing {} ({} bytes)", name, output.content.len());
            self.storage
                .write_file(&name, output.content.as_bytes())
                .await?;
            written.push(name);
        }

        let summary = serde_json::to_string_pretty(&result.summary)?;
        self.storage
            .write_file(SUMMARY_FILE, summary.as_bytes())
            .await?;

        let primary = written
            .first()
            .cloned()
            .unwrap_or_else(|| SUMMARY_FILE.to_string());
        let output_path = format!("{}/{}", self.config.output_path(), primary);

        tracing::info!("💾 Saved {} and {}", written.join(", "), SUMMARY_FILE);
        Ok(output_path)
    }
}
