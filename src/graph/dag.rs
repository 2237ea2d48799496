//! dag.rs
//! The dependency graph engine: producer/consumer indexing over a borrowed
//! [`Problem`], plus bounds-checked adjacency queries.

use super::error::GraphError;
use super::storage::Adjacency;
use crate::analysis::topology;
use crate::store::{Op, OpId, Problem, Tensor, TensorId, TensorRole};

/// Immutable, query-only view of a problem's dependency structure.
///
/// All adjacency rows are sorted by ascending index and duplicate free, so
/// every derived output (orderings, DOT text, summaries) is a deterministic
/// function of the problem.
#[derive(Debug, Clone)]
pub struct Graph<'p> {
    problem: &'p Problem,

    // Tensor side
    producers: Vec<Option<OpId>>,
    consumers: Adjacency<OpId>,

    // Op side
    predecessors: Adjacency<OpId>,
    successors: Adjacency<OpId>,

    graph_inputs: Vec<TensorId>,
    graph_outputs: Vec<TensorId>,
}

impl<'p> Graph<'p> {
    /// Indexes `problem`, validating tensor references and the
    /// single-producer rule. Cycles are not checked here; see
    /// [`Graph::topological_order`].
    pub fn new(problem: &'p Problem) -> Result<Self, GraphError> {
        let tensor_count = problem.tensor_count();
        let op_count = problem.op_count();

        let mut producers: Vec<Option<OpId>> = vec![None; tensor_count];
        let mut consumer_rows: Vec<Vec<OpId>> = vec![Vec::new(); tensor_count];

        // 1. Producer slots and consumer lists, ops in index order
        for (idx, op) in problem.ops.iter().enumerate() {
            let op_id = OpId::new(idx);

            for &tensor in &op.inputs {
                check_reference(problem, op_id, TensorRole::Input, tensor)?;
                consumer_rows[tensor.index()].push(op_id);
            }

            for &tensor in &op.outputs {
                check_reference(problem, op_id, TensorRole::Output, tensor)?;
                let slot = &mut producers[tensor.index()];
                match *slot {
                    Some(first) if first != op_id => {
                        return Err(GraphError::MultipleProducers { tensor, first, second: op_id });
                    }
                    _ => *slot = Some(op_id),
                }
            }
        }
        let consumers = Adjacency::from_rows(consumer_rows)?;

        // 2. Predecessors: producers of each input, minus the op itself
        let predecessor_rows: Vec<Vec<OpId>> = problem
            .ops
            .iter()
            .enumerate()
            .map(|(idx, op)| {
                let op_id = OpId::new(idx);
                op.inputs
                    .iter()
                    .filter_map(|t| producers[t.index()])
                    .filter(|&p| p != op_id)
                    .collect()
            })
            .collect();
        let predecessors = Adjacency::from_rows(predecessor_rows)?;

        // 3. Successors are the inverse relation
        let successors = predecessors.transpose(op_count, OpId::new, |op: OpId| op.index())?;

        // 4. Boundary classification
        let graph_inputs: Vec<TensorId> = (0..tensor_count)
            .filter(|&t| producers[t].is_none())
            .map(TensorId::new)
            .collect();
        let graph_outputs: Vec<TensorId> = (0..tensor_count)
            .filter(|&t| consumers.row_len(t) == 0)
            .map(TensorId::new)
            .collect();

        let graph = Self {
            problem,
            producers,
            consumers,
            predecessors,
            successors,
            graph_inputs,
            graph_outputs,
        };
        log::debug!(
            "built graph: {} tensors, {} ops, {} dependency edges",
            tensor_count,
            op_count,
            graph.num_dependency_edges()
        );
        Ok(graph)
    }

    pub fn problem(&self) -> &'p Problem { self.problem }

    pub fn num_tensors(&self) -> usize { self.problem.tensor_count() }
    pub fn num_ops(&self) -> usize { self.problem.op_count() }

    /// Number of distinct op -> op dependencies.
    pub fn num_dependency_edges(&self) -> usize { self.successors.edge_count() }

    pub fn tensor_ids(&self) -> impl Iterator<Item = TensorId> { (0..self.num_tensors()).map(TensorId::new) }
    pub fn op_ids(&self) -> impl Iterator<Item = OpId> { (0..self.num_ops()).map(OpId::new) }

    // --- Accessors ---

    pub fn tensor(&self, id: TensorId) -> Result<&'p Tensor, GraphError> {
        self.check_tensor(id)?;
        Ok(&self.problem.tensors[id.index()])
    }

    pub fn op(&self, id: OpId) -> Result<&'p Op, GraphError> {
        self.check_op(id)?;
        Ok(&self.problem.ops[id.index()])
    }

    pub fn has_producer(&self, id: TensorId) -> Result<bool, GraphError> {
        Ok(self.producer(id)?.is_some())
    }

    /// The op writing `id`, or `None` for a graph input.
    pub fn producer(&self, id: TensorId) -> Result<Option<OpId>, GraphError> {
        self.check_tensor(id)?;
        Ok(self.producers[id.index()])
    }

    /// Ops reading `id`, ascending.
    pub fn consumers(&self, id: TensorId) -> Result<&[OpId], GraphError> {
        self.check_tensor(id)?;
        Ok(self.consumers.row(id.index()))
    }

    pub fn is_graph_input(&self, id: TensorId) -> Result<bool, GraphError> {
        Ok(!self.has_producer(id)?)
    }

    pub fn is_graph_output(&self, id: TensorId) -> Result<bool, GraphError> {
        Ok(self.consumers(id)?.is_empty())
    }

    pub fn graph_inputs(&self) -> &[TensorId] { &self.graph_inputs }
    pub fn graph_outputs(&self) -> &[TensorId] { &self.graph_outputs }

    pub fn predecessors(&self, id: OpId) -> Result<&[OpId], GraphError> {
        self.check_op(id)?;
        Ok(self.predecessors.row(id.index()))
    }

    pub fn successors(&self, id: OpId) -> Result<&[OpId], GraphError> {
        self.check_op(id)?;
        Ok(self.successors.row(id.index()))
    }

    /// Kahn's algorithm with a FIFO queue seeded in ascending op order.
    /// This is the only place a dependency cycle is reported.
    pub fn topological_order(&self) -> Result<Vec<OpId>, GraphError> {
        topology::sort(self)
    }

    fn check_tensor(&self, id: TensorId) -> Result<(), GraphError> {
        if id.index() >= self.num_tensors() {
            return Err(GraphError::TensorOutOfRange { tensor: id, tensor_count: self.num_tensors() });
        }
        Ok(())
    }

    fn check_op(&self, id: OpId) -> Result<(), GraphError> {
        if id.index() >= self.num_ops() {
            return Err(GraphError::OpOutOfRange { op: id, op_count: self.num_ops() });
        }
        Ok(())
    }
}

fn check_reference(problem: &Problem, op: OpId, role: TensorRole, tensor: TensorId) -> Result<(), GraphError> {
    if tensor.index() >= problem.tensor_count() {
        return Err(GraphError::InvalidTensorReference {
            op,
            role,
            tensor,
            tensor_count: problem.tensor_count(),
        });
    }
    Ok(())
}
