use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Dense index of a tensor within a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TensorId(pub u32);

impl TensorId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor[{}]", self.0)
    }
}

/// Dense index of an op within a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct OpId(pub u32);

impl OpId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op[{}]", self.0)
    }
}

/// Which tensor list of an op an index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorRole {
    Input,
    Output,
}

impl TensorRole {
    /// Field name in the problem file.
    pub fn as_str(&self) -> &'static str {
        match self {
            TensorRole::Input => "inputs",
            TensorRole::Output => "outputs",
        }
    }
}

impl fmt::Display for TensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most ops read and write a handful of tensors; keep those inline.
pub type TensorList = SmallVec<[TensorId; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor {
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Op {
    /// Free-form label, e.g. "MatMul" or "Pointwise".
    pub op_type: String,
    pub inputs: TensorList,
    pub outputs: TensorList,
    /// Opaque to the graph engine.
    pub base_cost: i64,
}

/// The immutable input record. The graph engine borrows it and never
/// touches the memory parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub tensors: Vec<Tensor>,
    pub ops: Vec<Op>,
    pub fast_memory_capacity: i64,
    pub slow_memory_bandwidth: i64,
    /// (width, height)
    pub native_granularity: (i64, i64),
}

impl Problem {
    pub fn tensor_count(&self) -> usize { self.tensors.len() }
    pub fn op_count(&self) -> usize { self.ops.len() }
}
