//! Mixed-integer backend built on `good_lp` with the pure-Rust `microlp`
//! solver.
//!
//! The program is handed over as written: one binary variable per
//! (route, slot) pair, an equality row per route and a capacity row per slot.

use good_lp::solvers::microlp::microlp;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use log::{debug, warn};

use super::ScheduleBackend;
use crate::{AssignmentProgram, ScheduleError};

/// Binary variables read above this value count as chosen.
const CHOSEN: f64 = 0.5;

/// Solves assignment programs with a general MIP solver.
///
/// # Examples
/// ```
/// use minibus_scheduler::{AssignmentProgram, MipBackend, ScheduleBackend};
///
/// let program = AssignmentProgram::new(2, 1, vec![vec![1.0, 5.0], vec![1.0, 2.0]])
///     .expect("valid program");
/// let assignment = MipBackend.solve(&program).expect("feasible");
/// assert_eq!(assignment, vec![0, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MipBackend;

impl ScheduleBackend for MipBackend {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, program: &AssignmentProgram) -> Result<Vec<usize>, ScheduleError> {
        if program.routes() == 0 {
            return Ok(Vec::new());
        }

        let mut vars = ProblemVariables::new();
        let choices: Vec<Vec<Variable>> = program
            .rows()
            .map(|row| row.iter().map(|_| vars.add(variable().binary())).collect())
            .collect();

        let objective: Expression = program
            .rows()
            .zip(&choices)
            .flat_map(|(row, route_vars)| row.iter().zip(route_vars).map(|(&cost, &var)| cost * var))
            .sum();

        let mut model = vars.minimise(objective).using(microlp);
        for route_vars in &choices {
            let assigned: Expression = route_vars.iter().copied().sum();
            model = model.with(constraint!(assigned == 1));
        }
        let capacity = f64::from(u32::try_from(program.slot_capacity()).unwrap_or(u32::MAX));
        for slot in 0..program.slots() {
            let load: Expression = choices
                .iter()
                .filter_map(|route_vars| route_vars.get(slot).copied())
                .sum();
            model = model.with(constraint!(load <= capacity));
        }

        let solution = model.solve().map_err(|err| {
            if matches!(err, ResolutionError::Infeasible) {
                debug!("microlp proved the assignment program infeasible");
            } else {
                warn!("microlp failed: {err}");
            }
            ScheduleError::NoSolutionFound
        })?;

        choices
            .iter()
            .map(|route_vars| {
                route_vars
                    .iter()
                    .position(|&var| solution.value(var) > CHOSEN)
                    .ok_or(ScheduleError::NoSolutionFound)
            })
            .collect()
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
        let assignment = MipBackend.solve(&program).expect("feasible");
        assert_eq!(assignment, vec![2, 1]);
        assert_eq!(program.objective(&assignment), Some(-2.5));
    }

    #[rstest]
    fn respects_slot_capacity() {
        let program = AssignmentProgram::new(2, 2, vec![vec![0.0, 9.0]; 3]).expect("valid program");
        let assignment = MipBackend.solve(&program).expect("feasible");
        assert!(program.is_feasible(&assignment));
        assert_eq!(assignment.iter().filter(|&&slot| slot == 0).count(), 2);
    }

    #[rstest]
    fn reports_infeasible_when_slots_run_out() {
        let program =
            AssignmentProgram::new(1, 1, vec![vec![0.0], vec![0.0]]).expect("valid program");
        assert_eq!(
            MipBackend.solve(&program),
            Err(ScheduleError::NoSolutionFound)
        );
    }

    #[rstest]
    fn empty_program_has_empty_assignment() {
        let program = AssignmentProgram::new(4, 1, Vec::new()).expect("valid program");
        assert_eq!(MipBackend.solve(&program), Ok(Vec::new()));
    }
}
