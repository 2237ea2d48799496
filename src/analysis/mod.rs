//! Algorithms layered on top of the graph's queries.
pub mod neighborhood;
pub mod topology;

pub use neighborhood::TensorNeighborhood;
