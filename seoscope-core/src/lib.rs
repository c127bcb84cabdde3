pub mod classify;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod flight;
pub mod model;
pub mod resolve;
pub mod scorer;

pub use config::AppConfig;
pub use data::{Database, DomainRecord, MetricsStore, SqliteStore};
pub use domain::normalize;
pub use error::{ConfigError, MetricsError, ScoreError, StoreError};
pub use model::MetricsReport;
pub use resolve::Resolver;
pub use scorer::{AuthorityScorer, OpenPageRankClient, SyntheticScorer};
