//! The dependency graph engine and its storage.
pub mod dag;
pub mod error;
pub mod storage;

// Re-export key types for convenient access
pub use dag::Graph;
pub use error::GraphError;
pub use storage::Adjacency;
