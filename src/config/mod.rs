pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{
    BorderPolicy, BorderSource, FailurePolicy, JoinMode, OutputFormat, ResolverKind,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";
pub const DEFAULT_ENTITY_ENDPOINT: &str =
    "https://www.wikidata.org/w/rest.php/wikibase/v1/entities/items";
pub const DEFAULT_SPARQL_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "country-borders/",
    env!("CARGO_PKG_VERSION"),
    " (bordering countries ETL)"
);
pub const DEFAULT_OUTPUT_STEM: &str = "bordering_countries";
pub const MAX_CONCURRENT_REQUESTS: usize = 32;

/// Checks shared by every configuration front end.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validation::validate_input_file("input.path", config.input_path())?;
    validation::validate_non_blank("input.column", config.name_column())?;
    validation::validate_path("load.output_path", config.output_path())?;
    validation::validate_non_blank("load.output_stem", config.output_stem())?;

    if config.output_formats().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: "load.output_formats".to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    validation::validate_language_code("source.language", config.language())?;
    validation::validate_non_blank("source.user_agent", config.user_agent())?;

    match config.resolver_kind() {
        ResolverKind::Search => {
            validation::validate_url("source.search_endpoint", config.search_endpoint())?
        }
        ResolverKind::Sparql => {
            validation::validate_url("source.sparql_endpoint", config.sparql_endpoint())?
        }
    }
    match config.border_source() {
        BorderSource::Entity => {
            validation::validate_url("source.entity_endpoint", config.entity_endpoint())?
        }
        BorderSource::Sparql => {
            validation::validate_url("source.sparql_endpoint", config.sparql_endpoint())?
        }
    }

    if let Some(timeout) = config.request_timeout_seconds() {
        validation::validate_range("source.timeout_seconds", timeout, 1, 600)?;
    }
    if let Some(dir) = config.cache_dir() {
        validation::validate_path("cache.dir", dir)?;
    }

    validation::validate_range(
        "resolve.concurrent_requests",
        config.concurrent_requests(),
        1,
        MAX_CONCURRENT_REQUESTS,
    )?;

    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, clap::Parser)]
#[command(name = "country-borders")]
#[command(about = "Resolve countries on Wikidata and export their bordering countries")]
pub struct CliConfig {
    /// Delimited file with one country name per row
    #[arg(short, long, default_value = "countries.csv")]
    pub input: String,

    /// Column holding the country names
    #[arg(long, default_value = "name")]
    pub column: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// File name (without extension) of the exported tables
    #[arg(long, default_value = DEFAULT_OUTPUT_STEM)]
    pub output_stem: String,

    #[arg(long = "format", value_enum, value_delimiter = ',', default_value = "csv")]
    pub formats: Vec<OutputFormat>,

    #[arg(long, value_enum, default_value_t = ResolverKind::Search)]
    pub resolver: ResolverKind,

    #[arg(long, value_enum, default_value_t = BorderSource::Entity)]
    pub borders: BorderSource,

    #[arg(long, value_enum, default_value_t = JoinMode::Left)]
    pub join: JoinMode,

    #[arg(long, value_enum, default_value_t = BorderPolicy::Raw)]
    pub border_policy: BorderPolicy,

    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_lookup_failure: FailurePolicy,

    #[arg(long, default_value = "en")]
    pub language: String,

    #[arg(long, default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub search_endpoint: String,

    #[arg(long, default_value = DEFAULT_ENTITY_ENDPOINT)]
    pub entity_endpoint: String,

    #[arg(long, default_value = DEFAULT_SPARQL_ENDPOINT)]
    pub sparql_endpoint: String,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Directory for memoized knowledge-base responses
    #[arg(long)]
    pub cache_dir: Option<String>,

    #[arg(long, default_value = "1")]
    pub concurrent_requests: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn name_column(&self) -> &str {
        &self.column
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_stem(&self) -> &str {
        &self.output_stem
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn search_endpoint(&self) -> &str {
        &self.search_endpoint
    }

    fn entity_endpoint(&self) -> &str {
        &self.entity_endpoint
    }

    fn sparql_endpoint(&self) -> &str {
        &self.sparql_endpoint
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn cache_dir(&self) -> Option<&str> {
        self.cache_dir.as_deref()
    }

    fn resolver_kind(&self) -> ResolverKind {
        self.resolver
    }

    fn border_source(&self) -> BorderSource {
        self.borders
    }

    fn join_mode(&self) -> JoinMode {
        self.join
    }

    fn border_policy(&self) -> BorderPolicy {
        self.border_policy
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.on_lookup_failure
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
