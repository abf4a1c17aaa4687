//! Domain layer: organization tree and performance aggregation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregator;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod fixture;
pub mod metrics;
pub mod status;

pub use aggregator::{recalculate, AggregationPolicy, PerformanceAggregator, Scoring};
pub use builder::{HierarchyBuilder, MAX_DEPTH};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use fixture::sample_organization;
pub use metrics::{team_distribution, ResultsMetrics, TeamShare};
pub use status::{status_from_performance, Status};
