mod aggregator;
mod failure;

pub use aggregator::{AggregationRun, Collected, PiAggregator, PlanetAssembly};
pub use failure::{FailedItem, ItemFailure};
