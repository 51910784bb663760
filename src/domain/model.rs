use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Wikidata class "sovereign state".
pub const SOVEREIGN_STATE: &str = "Q3624078";
/// Wikidata class "country".
pub const COUNTRY: &str = "Q6256";
/// Wikidata class "historical country".
pub const HISTORICAL_COUNTRY: &str = "Q3024240";
/// "shares border with"
pub const SHARES_BORDER_WITH: &str = "P47";
/// "instance of"
pub const INSTANCE_OF: &str = "P31";

/// Returns true for item ids such as `Q228`.
pub fn is_entity_id(value: &str) -> bool {
    static ENTITY_ID: OnceLock<Regex> = OnceLock::new();
    ENTITY_ID
        .get_or_init(|| Regex::new(r"^Q[1-9][0-9]*$").expect("static regex"))
        .is_match(value)
}

/// A country name as it appears in the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryQuery {
    pub name: String,
}

impl CountryQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// First hit returned by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
}

/// Outcome of resolving one input name. `canonical_id == None` means "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCountry {
    pub query_name: String,
    pub canonical_id: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl ResolvedCountry {
    pub fn found(query_name: impl Into<String>, hit: EntityMatch) -> Self {
        Self {
            query_name: query_name.into(),
            canonical_id: Some(hit.id),
            label: Some(hit.label),
            description: hit.description,
        }
    }

    pub fn not_found(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            canonical_id: None,
            label: None,
            description: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderEdge {
    pub source_id: String,
    pub target_id: String,
}

impl BorderEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }
}

/// Raw target of a border relation, optionally already labelled by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub id: String,
    pub label: Option<String>,
}

/// Type and label of an entity, used to classify border targets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityInfo {
    pub id: String,
    pub label: Option<String>,
    pub instance_of: Vec<String>,
}

impl EntityInfo {
    /// Country or sovereign state, and not a historical country.
    pub fn is_sovereign_state(&self) -> bool {
        let has = |class: &str| self.instance_of.iter().any(|c| c == class);
        (has(COUNTRY) || has(SOVEREIGN_STATE)) && !has(HISTORICAL_COUNTRY)
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderingPair {
    pub name: String,
    pub code: String,
    pub bordering_name: Option<String>,
    pub bordering_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFailure {
    pub key: String,
    pub stage: String,
    pub message: String,
}

/// Diagnostics for one run, written as `summary.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub resolver: String,
    pub border_source: String,
    pub total_names: usize,
    pub resolved: usize,
    pub unresolved: Vec<String>,
    pub failures: Vec<LookupFailure>,
    pub edges: usize,
    pub rows: usize,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct RenderedOutput {
    pub format: OutputFormat,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<BorderingPair>,
    pub summary: RunSummary,
    pub outputs: Vec<RenderedOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// wbsearchentities keyword search
    #[default]
    Search,
    /// SPARQL label lookup restricted to sovereign states
    Sparql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BorderSource {
    /// Entity documents plus a fill-in pass for unknown neighbours
    #[default]
    Entity,
    /// SPARQL query on P47
    Sparql,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum JoinMode {
    /// Keep rows whose neighbour name is unknown
    #[default]
    Left,
    /// Only fully named pairs
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BorderPolicy {
    /// Edges exactly as fetched
    #[default]
    Raw,
    /// Drop repeated (source, target) pairs
    Dedup,
    /// Add reverse edges between input countries, then dedup
    Symmetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failed lookup aborts the run
    #[default]
    Abort,
    /// Record the failure and continue
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Csv => b',',
            OutputFormat::Tsv => b'\t',
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        }
    }
}

macro_rules! display_as_serde_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = serde_json::to_value(self)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                f.write_str(&name)
            }
        })*
    };
}

display_as_serde_name!(ResolverKind, BorderSource, JoinMode, BorderPolicy, FailurePolicy, OutputFormat);
