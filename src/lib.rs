//! Dependency graph engine for tensor/op computation descriptions.
//!
//! A [`Problem`] is loaded from JSON (`store`), indexed once into an immutable
//! [`Graph`] (`graph`), and then queried: adjacency, boundary tensors,
//! neighborhood summaries and a deterministic topological order (`analysis`).
//! `display` renders the graph as Graphviz DOT.

pub mod analysis;
pub mod display;
pub mod graph;
pub mod store;

#[cfg(test)]
mod fixtures;

pub use analysis::TensorNeighborhood;
pub use graph::{Graph, GraphError};
pub use store::{load_problem, parse_problem, LoadError, Op, OpId, Problem, Tensor, TensorId, TensorRole};
