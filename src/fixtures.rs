//! Small problem builders shared by the unit tests.
use crate::store::{Op, Problem, Tensor, TensorId};

/// Builds a problem with `tensors` 128x128 tensors and one op per
/// `(inputs, outputs)` pair. Ops are typed "Op{i}" and cost `i + 1`.
pub fn problem(tensors: usize, ops: &[(&[u32], &[u32])]) -> Problem {
    Problem {
        tensors: vec![Tensor { width: 128, height: 128 }; tensors],
        ops: ops
            .iter()
            .enumerate()
            .map(|(i, (inputs, outputs))| Op {
                op_type: format!("Op{i}"),
                inputs: inputs.iter().map(|&t| TensorId(t)).collect(),
                outputs: outputs.iter().map(|&t| TensorId(t)).collect(),
                base_cost: i as i64 + 1,
            })
            .collect(),
        fast_memory_capacity: 35000,
        slow_memory_bandwidth: 20,
        native_granularity: (128, 128),
    }
}

/// T0 -> Op0 -> T1 -> Op1 -> T2
pub fn chain() -> Problem {
    problem(3, &[(&[0], &[1]), (&[1], &[2])])
}

/// T0 -> Op0 -> {T1, T2}; T1 -> Op1 -> T3; T2 -> Op2 -> T4; {T3, T4} -> Op3 -> T5
pub fn diamond() -> Problem {
    problem(
        6,
        &[(&[0], &[1, 2]), (&[1], &[3]), (&[2], &[4]), (&[3, 4], &[5])],
    )
}

/// Op0 consumes T1 (made by Op1), Op1 consumes T0 (made by Op0).
pub fn two_cycle() -> Problem {
    problem(2, &[(&[1], &[0]), (&[0], &[1])])
}
