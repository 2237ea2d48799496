//! The problem record consumed by the graph engine, and the JSON loader that
//! produces it.
pub mod loader;
pub mod types;

pub use loader::{load_problem, parse_problem, LoadError};
pub use types::{Op, OpId, Problem, Tensor, TensorId, TensorList, TensorRole};
