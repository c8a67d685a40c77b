pub mod normalizer;
pub mod stats;
pub mod store;

pub use normalizer::EventNormalizer;
pub use stats::{count_by_type, ActivityStats, StatsAggregator};
pub use store::ActivityStore;
