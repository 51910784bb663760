pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::{etl::EtlEngine, pipeline::BorderPipeline};
pub use domain::model::{BorderEdge, BorderingPair, CountryQuery, ResolvedCountry, RunSummary};
pub use utils::error::{EtlError, Result};
