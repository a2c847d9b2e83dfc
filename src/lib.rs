pub mod auth;
pub mod config;
pub mod detail;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod search;
pub mod sheets;
#[cfg(test)]
mod testing;

pub use config::{ExperienceLevel, ScrapeConfig};
pub use error::{AuthError, DetailError, Error, SearchPageError, WriteError};
pub use models::{DerivedFields, ListingDetail, OutputRow, QueryStats, SearchQuery};
pub use pipeline::{RunSummary, ScrapePipeline};

pub type Result<T, E = Error> = std::result::Result<T, E>;
