//! Per-tensor neighborhood summaries, composed from the graph's queries.

use crate::graph::{Graph, GraphError};
use crate::store::{OpId, TensorId};
use serde::Serialize;
use std::fmt;

/// A tensor's producer, consumers and boundary flags. Plain derived data;
/// the graph never caches these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorNeighborhood {
    pub tensor: TensorId,
    pub producer: Option<OpId>,
    pub consumers: Vec<OpId>,
    pub is_graph_input: bool,
    pub is_graph_output: bool,
}

impl fmt::Display for TensorNeighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: producer=", self.tensor)?;
        match self.producer {
            Some(op) => write!(f, "{op}")?,
            None => f.write_str("none")?,
        }
        f.write_str(" consumers=[")?;
        for (i, op) in self.consumers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{op}")?;
        }
        f.write_str("]")?;
        if self.is_graph_input {
            f.write_str(" input")?;
        }
        if self.is_graph_output {
            f.write_str(" output")?;
        }
        Ok(())
    }
}

impl Graph<'_> {
    pub fn describe_tensor(&self, id: TensorId) -> Result<TensorNeighborhood, GraphError> {
        let producer = self.producer(id)?;
        let consumers = self.consumers(id)?.to_vec();
        Ok(TensorNeighborhood {
            tensor: id,
            producer,
            is_graph_input: producer.is_none(),
            is_graph_output: consumers.is_empty(),
            consumers,
        })
    }

    /// Summaries for every tensor, in ascending tensor order.
    pub fn describe_all_tensors(&self) -> Result<Vec<TensorNeighborhood>, GraphError> {
        self.tensor_ids().map(|t| self.describe_tensor(t)).collect()
    }
}
