use crate::config::{
    validate_provider, DEFAULT_ENTITY_ENDPOINT, DEFAULT_OUTPUT_STEM, DEFAULT_SEARCH_ENDPOINT,
    DEFAULT_SPARQL_ENDPOINT, DEFAULT_USER_AGENT,
};
use crate::core::ConfigProvider;
use crate::domain::model::{
    BorderPolicy, BorderSource, FailurePolicy, JoinMode, OutputFormat, ResolverKind,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_FORMATS: &[OutputFormat] = &[OutputFormat::Csv];
const DEFAULT_CACHE_DIR: &str = ".cache/wikidata";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub borders: BordersConfig,
    pub load: LoadConfig,
    pub cache: Option<CacheConfig>,
    pub error_handling: Option<ErrorHandlingConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
    pub column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub language: Option<String>,
    pub search_endpoint: Option<String>,
    pub entity_endpoint: Option<String>,
    pub sparql_endpoint: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveConfig {
    pub strategy: Option<ResolverKind>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BordersConfig {
    pub source: Option<BorderSource>,
    pub policy: Option<BorderPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Option<Vec<OutputFormat>>,
    pub output_stem: Option<String>,
    pub join: Option<JoinMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_lookup_failure: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${WIKIDATA_CACHE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_required_field("input.path", &self.input.path)?;
        validate_provider(self)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.input.path.as_deref().unwrap_or_default()
    }

    fn name_column(&self) -> &str {
        self.input.column.as_deref().unwrap_or("name")
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_stem(&self) -> &str {
        self.load.output_stem.as_deref().unwrap_or(DEFAULT_OUTPUT_STEM)
    }

    fn output_formats(&self) -> &[OutputFormat] {
        self.load.output_formats.as_deref().unwrap_or(DEFAULT_FORMATS)
    }

    fn language(&self) -> &str {
        self.source.language.as_deref().unwrap_or("en")
    }

    fn search_endpoint(&self) -> &str {
        self.source
            .search_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SEARCH_ENDPOINT)
    }

    fn entity_endpoint(&self) -> &str {
        self.source
            .entity_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENTITY_ENDPOINT)
    }

    fn sparql_endpoint(&self) -> &str {
        self.source
            .sparql_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SPARQL_ENDPOINT)
    }

    fn user_agent(&self) -> &str {
        self.source.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn cache_dir(&self) -> Option<&str> {
        self.cache
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR))
    }

    fn resolver_kind(&self) -> ResolverKind {
        self.resolve.strategy.unwrap_or_default()
    }

    fn border_source(&self) -> BorderSource {
        self.borders.source.unwrap_or_default()
    }

    fn join_mode(&self) -> JoinMode {
        self.load.join.unwrap_or_default()
    }

    fn border_policy(&self) -> BorderPolicy {
        self.borders.policy.unwrap_or_default()
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.error_handling
            .as_ref()
            .and_then(|eh| eh.on_lookup_failure)
            .unwrap_or_default()
    }

    fn concurrent_requests(&self) -> usize {
        self.resolve.concurrent_requests.unwrap_or(1)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
