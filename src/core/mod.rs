pub mod borders;
pub mod etl;
pub mod export;
pub mod fanout;
pub mod join;
pub mod loader;
pub mod pipeline;
pub mod resolve;

pub use crate::domain::model::{
    BorderEdge, BorderingPair, CountryQuery, ResolvedCountry, RunSummary, TransformResult,
};
pub use crate::domain::ports::{
    BorderFetcher, ConfigProvider, CountryResolver, Pipeline, Storage,
};
pub use crate::utils::error::Result;
