pub mod analytics;
pub mod quantity_policy;

pub use analytics::{CollectionStats, DistilleryCount};
pub use quantity_policy::QuantityPolicy;
