use crate::graph::{Graph, GraphError};
use crate::store::OpId;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::VecDeque;

/// Performs a topological sort using Kahn's Algorithm.
///
/// Returns every op exactly once, each after all of its predecessors. The
/// result is a pure function of the graph: the ready queue is FIFO, seeded
/// with zero in-degree ops in ascending order, and successors are visited in
/// ascending order, so an op is enqueued exactly once, when its last
/// predecessor is emitted.
pub fn sort(graph: &Graph<'_>) -> Result<Vec<OpId>, GraphError> {
    let count = graph.num_ops();
    let mut in_degree = Vec::with_capacity(count);
    let mut queue = VecDeque::with_capacity(count);
    let mut order = Vec::with_capacity(count);

    // 1. Initialize In-Degrees O(N)
    for op in graph.op_ids() {
        let degree = graph.predecessors(op)?.len();
        in_degree.push(degree);
        if degree == 0 {
            queue.push_back(op);
        }
    }

    // 2. Process Queue
    while let Some(op) = queue.pop_front() {
        order.push(op);

        for &succ in graph.successors(op)? {
            let degree = &mut in_degree[succ.index()];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(succ);
            }
        }
    }

    if order.len() != count {
        let err = diagnose_cycle(graph, &in_degree, count - order.len())?;
        log::warn!("{err}");
        return Err(err);
    }

    Ok(order)
}

/// Narrows the ops Kahn's algorithm could not place down to one strongly
/// connected component, so the error names ops that are actually on a cycle
/// rather than merely downstream of one.
fn diagnose_cycle(graph: &Graph<'_>, in_degree: &[usize], unordered: usize) -> Result<GraphError, GraphError> {
    let stuck: Vec<OpId> = graph.op_ids().filter(|op| in_degree[op.index()] > 0).collect();

    let mut sub = DiGraph::<OpId, ()>::with_capacity(stuck.len(), stuck.len());
    let mut node_of: Vec<Option<NodeIndex>> = vec![None; graph.num_ops()];
    for &op in &stuck {
        node_of[op.index()] = Some(sub.add_node(op));
    }
    for &op in &stuck {
        for &succ in graph.successors(op)? {
            if let (Some(from), Some(to)) = (node_of[op.index()], node_of[succ.index()]) {
                sub.add_edge(from, to, ());
            }
        }
    }

    // Every stuck op still has a stuck predecessor and self edges are never
    // stored, so at least one component has two or more members.
    let mut cycle = tarjan_scc(&sub)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| scc.into_iter().map(|n| sub[n]).collect::<Vec<OpId>>())
        .min_by_key(|ops| ops.iter().min().copied())
        .unwrap_or_default();
    cycle.sort_unstable();

    Ok(GraphError::Cycle { cycle, unordered })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{chain, diamond, problem, two_cycle};
    use crate::store::Problem;
    use rstest::rstest;

    fn ids(order: &[OpId]) -> Vec<u32> { order.iter().map(|op| op.0).collect() }

    #[test]
    fn test_chain_order() {
        let p = chain();
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&sort(&g).unwrap()), vec![0, 1]);
    }

    #[test]
    fn test_diamond_order() {
        let p = diamond();
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&g.topological_order().unwrap()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_problem() {
        let p = problem(0, &[]);
        let g = Graph::new(&p).unwrap();
        assert!(sort(&g).unwrap().is_empty());
    }

    #[test]
    fn test_ready_queue_is_fifo_not_smallest_first() {
        // Op0 -> T1 -> Op3, Op1 -> T2 -> Op2. Both roots are seeded first;
        // Op3 is freed before Op2, so it is emitted before Op2.
        let p = problem(3, &[(&[], &[1]), (&[], &[2]), (&[2], &[]), (&[1], &[])]);
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&sort(&g).unwrap()), vec![0, 1, 3, 2]);
    }

    #[test]
    fn test_later_root_precedes_freed_successor() {
        // Op0 -> Op1, Op2 independent: seed [0, 2], Op1 joins behind Op2.
        let p = problem(4, &[(&[0], &[1]), (&[1], &[2]), (&[3], &[])]);
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&sort(&g).unwrap()), vec![0, 2, 1]);
    }

    #[test]
    fn test_join_is_emitted_once_after_last_predecessor() {
        // Op3 reads outputs of Op0, Op1 and Op2.
        let p = problem(4, &[(&[], &[0]), (&[], &[1]), (&[], &[2]), (&[2, 0, 1], &[3])]);
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&sort(&g).unwrap()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_two_op_cycle_fails_without_partial_order() {
        let p = two_cycle();
        let g = Graph::new(&p).unwrap();
        let err = sort(&g).unwrap_err();
        assert_eq!(err, GraphError::Cycle { cycle: vec![OpId(0), OpId(1)], unordered: 2 });
        assert!(err.to_string().contains("not a DAG"), "Msg: {}", err);
    }

    #[test]
    fn test_cycle_reports_members_not_downstream_ops() {
        // Op1 <-> Op2 cycle; Op0 orders fine, Op3 hangs off the cycle.
        let p = problem(5, &[(&[0], &[1]), (&[1, 3], &[2]), (&[2], &[3]), (&[3], &[4])]);
        let g = Graph::new(&p).unwrap();
        match sort(&g).unwrap_err() {
            GraphError::Cycle { cycle, unordered } => {
                assert_eq!(cycle, vec![OpId(1), OpId(2)]);
                assert_eq!(unordered, 3);
            }
            other => panic!("Wrong error type: {other}"),
        }
    }

    #[test]
    fn test_cycle_picks_component_with_lowest_op() {
        // Two disjoint cycles: {Op2, Op3} and {Op0, Op1}.
        let p = problem(4, &[(&[1], &[0]), (&[0], &[1]), (&[3], &[2]), (&[2], &[3])]);
        let g = Graph::new(&p).unwrap();
        match sort(&g).unwrap_err() {
            GraphError::Cycle { cycle, unordered } => {
                assert_eq!(cycle, vec![OpId(0), OpId(1)]);
                assert_eq!(unordered, 4);
            }
            other => panic!("Wrong error type: {other}"),
        }
    }

    #[rstest]
    #[case::chain(chain())]
    #[case::diamond(diamond())]
    #[case::wide(problem(6, &[(&[0], &[1]), (&[0], &[2]), (&[0], &[3]), (&[3, 1], &[4]), (&[2, 4], &[5])]))]
    #[case::reversed(problem(4, &[(&[2], &[3]), (&[1], &[2]), (&[0], &[1])]))]
    #[case::disconnected(problem(4, &[(&[0], &[1]), (&[2], &[3])]))]
    fn test_order_respects_predecessors(#[case] p: Problem) {
        let g = Graph::new(&p).unwrap();
        let order = sort(&g).unwrap();

        assert_eq!(order.len(), g.num_ops());
        let mut position = vec![usize::MAX; g.num_ops()];
        for (i, op) in order.iter().enumerate() {
            assert_eq!(position[op.index()], usize::MAX, "{op} emitted twice");
            position[op.index()] = i;
        }
        for op in g.op_ids() {
            for pred in g.predecessors(op).unwrap() {
                assert!(position[pred.index()] < position[op.index()]);
            }
        }
    }

    #[test]
    fn test_order_is_deterministic() {
        let p = problem(6, &[(&[0], &[1]), (&[0], &[2]), (&[0], &[3]), (&[3, 1], &[4]), (&[2, 4], &[5])]);
        let first = sort(&Graph::new(&p).unwrap()).unwrap();
        let second = sort(&Graph::new(&p).unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(ids(&first), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_reversed_chain_order() {
        let p = problem(4, &[(&[2], &[3]), (&[1], &[2]), (&[0], &[1])]);
        let g = Graph::new(&p).unwrap();
        assert_eq!(ids(&sort(&g).unwrap()), vec![2, 1, 0]);
    }
}
