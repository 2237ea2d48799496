//! loader.rs
//! Reads the parallel-array JSON problem format into a [`Problem`].

use super::types::{Op, Problem, Tensor, TensorId, TensorList, TensorRole};
use serde::Deserialize;
use serde_json::Number;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("malformed problem JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("widths and heights must have identical length ({widths} vs {heights})")]
    TensorShapeMismatch { widths: usize, heights: usize },
    #[error("op_types, inputs, outputs and base_costs must have identical length ({op_types}, {inputs}, {outputs}, {base_costs})")]
    OpArrayMismatch { op_types: usize, inputs: usize, outputs: usize, base_costs: usize },
    #[error("native_granularity must have exactly 2 entries, got {len}")]
    Granularity { len: usize },
    #[error("negative index {value} in {field}[{op}]")]
    NegativeIndex { field: TensorRole, op: usize, value: i64 },
    #[error("{field}[{op}] references invalid tensor id {tensor} (tensor count {tensor_count})")]
    InvalidTensorReference { field: TensorRole, op: usize, tensor: i64, tensor_count: usize },
    #[error("expected integer in {field}, got {value}")]
    NotInteger { field: &'static str, value: f64 },
    #[error("integer out of range in {field}: {value}")]
    IntegerOutOfRange { field: &'static str, value: Number },
    #[error("too many {what}: {count}")]
    Capacity { what: &'static str, count: usize },
}

/// Wire shape of the problem file. Extra fields are ignored. Numbers are
/// kept raw so that whole-valued floats such as `128.0` still load.
#[derive(Debug, Deserialize)]
struct RawProblem {
    widths: Vec<Number>,
    heights: Vec<Number>,
    op_types: Vec<String>,
    inputs: Vec<Vec<Number>>,
    outputs: Vec<Vec<Number>>,
    base_costs: Vec<Number>,
    fast_memory_capacity: Number,
    slow_memory_bandwidth: Number,
    native_granularity: Vec<Number>,
}

pub fn load_problem(path: impl AsRef<Path>) -> Result<Problem, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let problem = parse_problem(&text)?;
    log::info!(
        "loaded {}: {} tensors, {} ops",
        path.display(),
        problem.tensor_count(),
        problem.op_count()
    );
    Ok(problem)
}

pub fn parse_problem(text: &str) -> Result<Problem, LoadError> {
    let raw: RawProblem = serde_json::from_str(text)?;
    raw.into_problem()
}

impl RawProblem {
    fn into_problem(self) -> Result<Problem, LoadError> {
        if self.widths.len() != self.heights.len() {
            return Err(LoadError::TensorShapeMismatch {
                widths: self.widths.len(),
                heights: self.heights.len(),
            });
        }
        let op_count = self.op_types.len();
        if self.inputs.len() != op_count
            || self.outputs.len() != op_count
            || self.base_costs.len() != op_count
        {
            return Err(LoadError::OpArrayMismatch {
                op_types: op_count,
                inputs: self.inputs.len(),
                outputs: self.outputs.len(),
                base_costs: self.base_costs.len(),
            });
        }
        let native_granularity = match &self.native_granularity[..] {
            [w, h] => (to_int(w, "native_granularity")?, to_int(h, "native_granularity")?),
            _ => return Err(LoadError::Granularity { len: self.native_granularity.len() }),
        };

        let tensor_count = self.widths.len();
        // Ids are stored as u32.
        if tensor_count > u32::MAX as usize {
            return Err(LoadError::Capacity { what: "tensors", count: tensor_count });
        }
        if op_count > u32::MAX as usize {
            return Err(LoadError::Capacity { what: "ops", count: op_count });
        }

        let inputs = index_rows(self.inputs, TensorRole::Input, tensor_count)?;
        let outputs = index_rows(self.outputs, TensorRole::Output, tensor_count)?;

        let widths = to_ints(&self.widths, "widths")?;
        let heights = to_ints(&self.heights, "heights")?;
        let base_costs = to_ints(&self.base_costs, "base_costs")?;

        let tensors = widths
            .into_iter()
            .zip(heights)
            .map(|(width, height)| Tensor { width, height })
            .collect();

        let ops = self
            .op_types
            .into_iter()
            .zip(inputs)
            .zip(outputs)
            .zip(base_costs)
            .map(|(((op_type, inputs), outputs), base_cost)| Op {
                op_type,
                inputs,
                outputs,
                base_cost,
            })
            .collect();

        Ok(Problem {
            tensors,
            ops,
            fast_memory_capacity: to_int(&self.fast_memory_capacity, "fast_memory_capacity")?,
            slow_memory_bandwidth: to_int(&self.slow_memory_bandwidth, "slow_memory_bandwidth")?,
            native_granularity,
        })
    }
}

/// Accepts any JSON number with a whole value inside `i64`.
fn to_int(n: &Number, field: &'static str) -> Result<i64, LoadError> {
    if let Some(value) = n.as_i64() {
        return Ok(value);
    }
    let out_of_range = || LoadError::IntegerOutOfRange { field, value: n.clone() };
    // u64 past i64::MAX
    if n.is_u64() {
        return Err(out_of_range());
    }
    let value = n.as_f64().ok_or_else(out_of_range)?;
    if value.fract() != 0.0 {
        return Err(LoadError::NotInteger { field, value });
    }
    // -2^63 is exact in f64; 2^63 is the first value past i64::MAX.
    if value < i64::MIN as f64 || value >= 9_223_372_036_854_775_808.0 {
        return Err(out_of_range());
    }
    Ok(value as i64)
}

fn to_ints(values: &[Number], field: &'static str) -> Result<Vec<i64>, LoadError> {
    values.iter().map(|n| to_int(n, field)).collect()
}

fn index_rows(
    rows: Vec<Vec<Number>>,
    field: TensorRole,
    tensor_count: usize,
) -> Result<Vec<TensorList>, LoadError> {
    rows.into_iter()
        .enumerate()
        .map(|(op, row)| {
            row.iter()
                .map(|n| {
                    let value = to_int(n, field.as_str())?;
                    if value < 0 {
                        return Err(LoadError::NegativeIndex { field, op, value });
                    }
                    if value as u64 >= tensor_count as u64 {
                        return Err(LoadError::InvalidTensorReference {
                            field,
                            op,
                            tensor: value,
                            tensor_count,
                        });
                    }
                    Ok(TensorId::new(value as usize))
                })
                .collect::<Result<TensorList, LoadError>>()
        })
        .collect()
}
