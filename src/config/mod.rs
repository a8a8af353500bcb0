pub mod schema;

pub use schema::{ObservabilityConfig, StateConfig};
