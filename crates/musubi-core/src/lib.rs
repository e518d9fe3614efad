pub mod config;
pub mod error;
pub mod matcher;
pub mod metric;
pub mod models;
pub mod normalize;
pub mod series_name;
pub mod subject;

pub use config::Config;
pub use error::MusubiError;
pub use matcher::{Match, Matcher, MatcherOptions};
pub use metric::{MetricSequence, SimilarityMetric};
pub use series_name::{SeriesNameResolver, SeriesOptions};
pub use subject::{IdentifierCache, Subject};
