//! Defines the error types for the graph engine.
use crate::store::{OpId, TensorId, TensorRole};
use thiserror::Error;

/// Every failure the engine can report. Variants carry the offending indices
/// so callers can inspect them without parsing the message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An op lists a tensor index past the end of the tensor table.
    #[error("{role} of {op} references invalid tensor id {} (tensor count {tensor_count})", .tensor.0)]
    InvalidTensorReference { op: OpId, role: TensorRole, tensor: TensorId, tensor_count: usize },

    #[error("{tensor} has multiple producers: {first} and {second}")]
    MultipleProducers { tensor: TensorId, first: OpId, second: OpId },

    #[error("tensor id out of range: {} (tensor count {tensor_count})", .tensor.0)]
    TensorOutOfRange { tensor: TensorId, tensor_count: usize },

    #[error("op id out of range: {} (op count {op_count})", .op.0)]
    OpOutOfRange { op: OpId, op_count: usize },

    #[error("adjacency table too large: {entries} entries exceed u32 offsets")]
    AdjacencyOverflow { entries: usize },

    /// `cycle` holds the sorted members of one strongly connected component;
    /// `unordered` counts every op the ordering could not place.
    #[error("op graph is not a DAG: cycle through {}; {unordered} ops unordered", join_ops(.cycle))]
    Cycle { cycle: Vec<OpId>, unordered: usize },
}

fn join_ops(ops: &[OpId]) -> String {
    ops.iter().map(OpId::to_string).collect::<Vec<_>>().join(", ")
}
