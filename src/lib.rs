pub mod aggregator;
pub mod analysis;
pub mod api;
pub mod chains;
pub mod config;
pub mod denom;
pub mod discovery;
pub mod error;
pub mod lcd;
pub mod metrics;
pub mod missions;
pub mod render;
pub mod rewards;
pub mod series;
pub mod telemetry;
pub mod types;
