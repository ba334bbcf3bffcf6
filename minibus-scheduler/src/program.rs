//! Binary assignment program over routes and time slots.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ScheduleError;

/// A 0/1 program with one variable per (route, slot) pair.
///
/// Every route must take exactly one slot and no slot may hold more than
/// `slot_capacity` routes. The objective minimises the sum of the chosen
/// coefficients.
///
/// # Examples
/// ```
/// use minibus_scheduler::AssignmentProgram;
///
/// let program = AssignmentProgram::new(2, 1, vec![vec![1.0, 2.0], vec![3.0, 0.5]])
///     .expect("rectangular and finite");
/// assert_eq!(program.variables(), 4);
/// assert!(program.is_feasible(&[0, 1]));
/// assert!(!program.is_feasible(&[0, 0]));
/// assert_eq!(program.objective(&[0, 1]), Some(1.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssignmentProgram {
    slots: usize,
    slot_capacity: usize,
    coefficients: Vec<Vec<f64>>,
}

impl AssignmentProgram {
    /// Build a program from one coefficient row per route.
    ///
    /// # Errors
    /// Returns [`ScheduleError::NoSolutionFound`] when a row does not have
    /// exactly `slots` finite coefficients.
    pub fn new(
        slots: usize,
        slot_capacity: usize,
        coefficients: Vec<Vec<f64>>,
    ) -> Result<Self, ScheduleError> {
        let well_formed = coefficients
            .iter()
            .all(|row| row.len() == slots && row.iter().all(|value| value.is_finite()));
        if !well_formed {
            return Err(ScheduleError::NoSolutionFound);
        }
        Ok(Self {
            slots,
            slot_capacity,
            coefficients,
        })
    }

    /// Number of routes (equality rows).
    #[must_use]
    pub const fn routes(&self) -> usize {
        self.coefficients.len()
    }

    /// Number of slots (capacity rows).
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.slots
    }

    /// Routes allowed per slot.
    #[must_use]
    pub const fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    /// Number of binary variables.
    #[must_use]
    pub const fn variables(&self) -> usize {
        self.coefficients.len().saturating_mul(self.slots)
    }

    /// Objective coefficient of assigning `route` to `slot`.
    #[must_use]
    pub fn coefficient(&self, route: usize, slot: usize) -> Option<f64> {
        self.coefficients.get(route)?.get(slot).copied()
    }

    /// Coefficient rows in route order.
    #[must_use]
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.coefficients.iter().map(Vec::as_slice)
    }

    /// Whether `assignment` (slot per route) satisfies every constraint.
    #[must_use]
    pub fn is_feasible(&self, assignment: &[usize]) -> bool {
        if assignment.len() != self.routes() {
            return false;
        }
        let mut occupancy = vec![0_usize; self.slots];
        for &slot in assignment {
            match occupancy.get_mut(slot) {
                Some(count) if *count < self.slot_capacity => *count += 1,
                _ => return false,
            }
        }
        true
    }

    /// Objective value of a feasible `assignment`.
    #[must_use]
    pub fn objective(&self, assignment: &[usize]) -> Option<f64> {
        if !self.is_feasible(assignment) {
            return None;
        }
        assignment
            .iter()
            .enumerate()
            .map(|(route, &slot)| self.coefficient(route, slot))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short_row(vec![vec![1.0]])]
    #[case::nan(vec![vec![1.0, f64::NAN]])]
    fn rejects_malformed_rows(#[case] rows: Vec<Vec<f64>>) {
        assert_eq!(
            AssignmentProgram::new(2, 1, rows),
            Err(ScheduleError::NoSolutionFound)
        );
    }

    #[rstest]
    fn feasibility_checks_route_count_and_slot_range() {
        let program = AssignmentProgram::new(2, 2, vec![vec![0.0, 0.0]; 3]).expect("valid");
        assert!(program.is_feasible(&[0, 0, 1]));
        assert!(!program.is_feasible(&[0, 0, 0]));
        assert!(!program.is_feasible(&[0, 1]));
        assert!(!program.is_feasible(&[0, 1, 2]));
    }
}
