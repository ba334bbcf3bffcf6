//! Exact min-cost-flow backend.
//!
//! The assignment program's constraint matrix is totally unimodular, so the
//! integral min-cost flow of value `routes` through
//! source → route → slot → sink is an optimal 0/1 solution. Route arcs carry
//! unit capacity, slot arcs carry `slot_capacity`, and the route → slot arcs
//! carry the objective coefficients. Flow is pushed one unit at a time along
//! Bellman-Ford shortest paths in the residual network, which tolerates the
//! negative coefficients produced by the coverage bonus.

use log::debug;

use super::ScheduleBackend;
use crate::{AssignmentProgram, ScheduleError};

/// Relaxations smaller than this are ignored to keep float noise from
/// cycling.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: usize,
    to: usize,
    capacity: usize,
    cost: f64,
}

/// Residual network. Edge `i ^ 1` is the reverse of edge `i`.
#[derive(Debug)]
struct FlowNetwork {
    nodes: usize,
    edges: Vec<Edge>,
}

impl FlowNetwork {
    const fn with_nodes(nodes: usize) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    /// Add an arc and its residual twin, returning the arc's index.
    #[expect(clippy::float_arithmetic, reason = "reverse arcs negate the cost")]
    fn add_edge(&mut self, from: usize, to: usize, capacity: usize, cost: f64) -> usize {
        let idx = self.edges.len();
        self.edges.push(Edge {
            from,
            to,
            capacity,
            cost,
        });
        self.edges.push(Edge {
            from: to,
            to: from,
            capacity: 0,
            cost: -cost,
        });
        idx
    }

    /// Cheapest residual path from `source` to `sink`, as edge indices from
    /// the sink backwards.
    #[expect(
        clippy::float_arithmetic,
        reason = "path lengths accumulate float coefficients"
    )]
    fn shortest_path(&self, source: usize, sink: usize) -> Option<Vec<usize>> {
        let mut dist = vec![f64::INFINITY; self.nodes];
        let mut via: Vec<Option<usize>> = vec![None; self.nodes];
        *dist.get_mut(source)? = 0.0;

        for _ in 0..self.nodes {
            let mut changed = false;
            for (idx, edge) in self.edges.iter().enumerate() {
                if edge.capacity == 0 {
                    continue;
                }
                let Some(&from_dist) = dist.get(edge.from) else {
                    continue;
                };
                if from_dist.is_infinite() {
                    continue;
                }
                let candidate = from_dist + edge.cost;
                if let Some(to_dist) = dist.get_mut(edge.to)
                    && candidate < *to_dist - EPSILON
                {
                    *to_dist = candidate;
                    if let Some(entry) = via.get_mut(edge.to) {
                        *entry = Some(idx);
                    }
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut path = Vec::new();
        let mut node = sink;
        while node != source {
            let idx = (*via.get(node)?)?;
            path.push(idx);
            node = self.edges.get(idx)?.from;
            if path.len() > self.nodes {
                return None;
            }
        }
        Some(path)
    }

    fn push_unit(&mut self, path: &[usize]) {
        for &idx in path {
            if let Some(edge) = self.edges.get_mut(idx) {
                edge.capacity = edge.capacity.saturating_sub(1);
            }
            if let Some(twin) = self.edges.get_mut(idx ^ 1) {
                twin.capacity += 1;
            }
        }
    }

    fn is_saturated(&self, idx: usize) -> bool {
        self.edges.get(idx).is_some_and(|edge| edge.capacity == 0)
    }
}

/// Solves assignment programs exactly by successive shortest paths.
///
/// # Examples
/// ```
/// use minibus_scheduler::{AssignmentProgram, FlowBackend, ScheduleBackend};
///
/// let program = AssignmentProgram::new(2, 1, vec![vec![1.0, 5.0], vec![1.0, 2.0]])
///     .expect("valid program");
/// let assignment = FlowBackend.solve(&program).expect("feasible");
/// assert_eq!(assignment, vec![0, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowBackend;

impl ScheduleBackend for FlowBackend {
    fn name(&self) -> &'static str {
        "min-cost-flow"
    }

    fn solve(&self, program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError> {
        let routes = program.routes();
        let slots = program.slots();
        let source = 0;
        let sink = routes + slots + 1;
        let mut network = FlowNetwork::with_nodes(routes + slots + 2);

        let mut choices = Vec::with_capacity(program.variables());
        for (route, row) in program.rows().enumerate() {
            network.add_edge(source, 1 + route, 1, 0.0);
            for (slot, &cost) in row.iter().enumerate() {
                let idx = network.add_edge(1 + route, 1 + routes + slot, 1, cost);
                choices.push((route, slot, idx));
            }
        }
        for slot in 0..slots {
            network.add_edge(1 + routes + slot, sink, program.slot_capacity(), 0.0);
        }

        for pushed in 0..routes {
            let Some(path) = network.shortest_path(source, sink) else {
                debug!("flow saturated after {pushed} of {routes} routes");
                return Err(ScheduleError::NoSolutionFound);
            };
            network.push_unit(&path);
        }

        let mut assignment: Vec<Option<usize>> = vec![None; routes];
        for (route, slot, idx) in choices {
            if network.is_saturated(idx)
                && let Some(entry) = assignment.get_mut(route)
            {
                *entry = Some(slot);
            }
        }
        assignment
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(ScheduleError::NoSolutionFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn prefers_negative_coefficients() {
        let program = AssignmentProgram::new(3, 1, vec![vec![2.0, -1.0, 0.5], vec![2.0, -3.0, 0.5]])
            .expect("valid program");
        let assignment = FlowBackend.solve(&program).expect("feasible");
        assert_eq!(assignment, vec![2, 1]);
        assert_eq!(program.objective(&assignment), Some(-2.5));
    }

    #[rstest]
    fn reroutes_earlier_choice_when_cheaper_overall() {
        // Route 0 alone prefers slot 0, but route 1 gains far more there.
        let program = AssignmentProgram::new(2, 1, vec![vec![0.0, 1.0], vec![0.0, 10.0]])
            .expect("valid program");
        let assignment = FlowBackend.solve(&program).expect("feasible");
        assert_eq!(assignment, vec![1, 0]);
    }

    #[rstest]
    fn reports_infeasible_when_slots_run_out() {
        let program =
            AssignmentProgram::new(1, 1, vec![vec![0.0], vec![0.0]]).expect("valid program");
        assert_eq!(
            FlowBackend.solve(&program),
            Err(ScheduleError::NoSolutionFound)
        );
    }

    #[rstest]
    fn empty_program_has_empty_assignment() {
        let program = AssignmentProgram::new(4, 1, Vec::new()).expect("valid program");
        assert_eq!(FlowBackend.solve(&program), Ok(Vec::new()));
    }
}
