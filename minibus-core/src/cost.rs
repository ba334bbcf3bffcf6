//! Multi-objective cost model.
//!
//! A [`CostModel`] turns the aggregate distance, time, load and fleet size
//! of a solution into four cost dimensions (financial, time, environmental
//! and rider satisfaction) and collapses them into one scalarized figure
//! using [`CostWeights`]. Economic constants live in [`EconomicParameters`]
//! and are supplied by the caller; nothing here reads global state.
//!
//! Negative or non-finite inputs are clamped to zero so every reported cost
//! is non-negative.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ConfigError;

/// Tolerance allowed when checking that the weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Errors raised while constructing a [`CostModel`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostModelError {
    /// Weights were negative, non-finite or did not sum to one.
    #[error("cost weights must be non-negative and sum to 1.0, found sum {sum}")]
    InvalidWeights {
        /// Sum of the supplied weights.
        sum: f64,
    },
    /// An economic constant was unusable.
    #[error(transparent)]
    Parameters(#[from] ConfigError),
}

/// Economic constants feeding the cost formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EconomicParameters {
    /// Fuel cost per kilometer.
    pub fuel_cost_per_km: f64,
    /// Driver wage per hour and vehicle.
    pub driver_cost_per_hour: f64,
    /// Maintenance cost per kilometer.
    pub maintenance_cost_per_km: f64,
    /// Passenger value of time per hour.
    pub value_of_time_per_hour: f64,
    /// Kilograms of CO2 emitted per kilometer.
    pub co2_kg_per_km: f64,
    /// Carbon price per kilogram of CO2.
    pub carbon_price_per_kg: f64,
    /// Satisfaction score before penalties, within `0..=1`.
    pub base_satisfaction: f64,
    /// Load factor above which riders feel overcrowded.
    pub load_factor_threshold: f64,
    /// Average route duration in hours above which riders feel delayed.
    pub delay_threshold_hours: f64,
}

impl Default for EconomicParameters {
    fn default() -> Self {
        Self {
            fuel_cost_per_km: 2.5,
            driver_cost_per_hour: 15.0,
            maintenance_cost_per_km: 0.5,
            value_of_time_per_hour: 8.0,
            co2_kg_per_km: 0.27,
            carbon_price_per_kg: 0.05,
            base_satisfaction: 0.9,
            load_factor_threshold: 0.8,
            delay_threshold_hours: 1.5,
        }
    }
}

impl EconomicParameters {
    /// Validate the constants.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a constant is negative or not
    /// finite, a threshold is not positive, or the base satisfaction falls
    /// outside `0..=1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("fuel_cost_per_km", self.fuel_cost_per_km),
            ("driver_cost_per_hour", self.driver_cost_per_hour),
            ("maintenance_cost_per_km", self.maintenance_cost_per_km),
            ("value_of_time_per_hour", self.value_of_time_per_hour),
            ("co2_kg_per_km", self.co2_kg_per_km),
            ("carbon_price_per_kg", self.carbon_price_per_kg),
        ];
        if let Some(&(field, _)) = rates
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::invalid(field, "must be a non-negative finite value"));
        }
        if !(0.0..=1.0).contains(&self.base_satisfaction) {
            return Err(ConfigError::invalid(
                "base_satisfaction",
                "must lie within 0.0..=1.0",
            ));
        }
        for (field, value) in [
            ("load_factor_threshold", self.load_factor_threshold),
            ("delay_threshold_hours", self.delay_threshold_hours),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(field, "must be a positive finite value"));
            }
        }
        Ok(())
    }
}

/// Relative importance of each cost dimension.
///
/// # Examples
/// ```
/// use minibus_core::CostWeights;
///
/// assert!(CostWeights::default().validate().is_ok());
/// let lopsided = CostWeights { financial: 0.9, ..CostWeights::default() };
/// assert!(lopsided.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostWeights {
    /// Weight of the financial cost.
    pub financial: f64,
    /// Weight of the passenger time cost.
    pub time: f64,
    /// Weight of the environmental cost.
    pub environmental: f64,
    /// Weight of the satisfaction cost.
    pub satisfaction: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            financial: 0.25,
            time: 0.30,
            environmental: 0.20,
            satisfaction: 0.25,
        }
    }
}

impl CostWeights {
    /// Validate that every weight is non-negative and they sum to one.
    ///
    /// # Errors
    /// Returns [`CostModelError::InvalidWeights`] otherwise.
    #[expect(
        clippy::float_arithmetic,
        reason = "weights are summed to check normalisation"
    )]
    pub fn validate(&self) -> Result<(), CostModelError> {
        let weights = [
            self.financial,
            self.time,
            self.environmental,
            self.satisfaction,
        ];
        let sum: f64 = weights.iter().sum();
        let usable = weights.iter().all(|weight| weight.is_finite() && *weight >= 0.0);
        if !usable || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CostModelError::InvalidWeights { sum });
        }
        Ok(())
    }
}

/// Aggregate figures a [`CostModel`] evaluates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionMetrics {
    /// Total distance across every route in kilometers.
    pub distance_km: f64,
    /// Total time across every route in hours.
    pub time_hours: f64,
    /// Passengers carried.
    pub passengers: u64,
    /// Vehicles that run a route.
    pub vehicles: usize,
    /// Capacity of one vehicle.
    pub vehicle_capacity: u32,
}

/// Per-dimension costs plus the raw figures they derive from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostVector {
    /// Fuel, driver and maintenance spend.
    pub financial_cost: f64,
    /// Passenger time valued in money plus raw hours.
    pub time_cost: f64,
    /// Carbon price of the emissions.
    pub environmental_cost: f64,
    /// Dissatisfaction scaled to `0..=100`.
    pub satisfaction_cost: f64,
    /// Total distance in kilometers.
    pub distance_km: f64,
    /// Total time in hours.
    pub time_hours: f64,
    /// Emitted CO2 in kilograms.
    pub co2_kg: f64,
    /// Rider satisfaction within `0..=1`.
    pub satisfaction_score: f64,
}

/// A [`CostVector`] together with its weighted sum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CostEvaluation {
    /// Costs per dimension.
    pub vector: CostVector,
    /// Weighted sum of the four cost dimensions.
    pub scalarized_cost: f64,
}

impl CostEvaluation {
    /// Order evaluations from most to least preferred.
    ///
    /// Lower scalarized cost wins; ties fall back to lower financial cost.
    #[must_use]
    pub fn cmp_preference(&self, other: &Self) -> Ordering {
        self.scalarized_cost
            .total_cmp(&other.scalarized_cost)
            .then_with(|| {
                self.vector
                    .financial_cost
                    .total_cmp(&other.vector.financial_cost)
            })
    }
}

/// Evaluates solutions against economic constants and weights.
///
/// # Examples
/// ```
/// use minibus_core::{CostModel, SolutionMetrics};
///
/// let model = CostModel::default();
/// let evaluation = model.evaluate(&SolutionMetrics {
///     distance_km: 20.0,
///     time_hours: 1.0,
///     passengers: 40,
///     vehicles: 1,
///     vehicle_capacity: 60,
/// });
/// // 20 km x (2.5 + 0.5) + 1 h x 15.
/// assert!((evaluation.vector.financial_cost - 75.0).abs() < 1e-9);
/// assert!(evaluation.scalarized_cost > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostModel {
    parameters: EconomicParameters,
    weights: CostWeights,
}

impl CostModel {
    /// Create a cost model after validating its inputs.
    ///
    /// # Errors
    /// Returns [`CostModelError`] when the weights or constants are invalid.
    pub fn new(
        parameters: EconomicParameters,
        weights: CostWeights,
    ) -> Result<Self, CostModelError> {
        parameters.validate()?;
        weights.validate()?;
        Ok(Self {
            parameters,
            weights,
        })
    }

    /// Economic constants in use.
    #[must_use]
    pub const fn parameters(&self) -> &EconomicParameters {
        &self.parameters
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Evaluate aggregate solution metrics.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "cost formulas are floating-point; counts stay far below 2^52"
    )]
    pub fn evaluate(&self, metrics: &SolutionMetrics) -> CostEvaluation {
        let p = &self.parameters;
        let distance_km = non_negative(metrics.distance_km);
        let time_hours = non_negative(metrics.time_hours);
        let passengers = metrics.passengers as f64;
        let vehicles = metrics.vehicles as f64;

        let financial_cost = p.fuel_cost_per_km * distance_km
            + p.driver_cost_per_hour * time_hours * vehicles
            + p.maintenance_cost_per_km * distance_km;

        let time_cost = time_hours + passengers * time_hours * p.value_of_time_per_hour / 100.0;

        let co2_kg = distance_km * p.co2_kg_per_km;
        let environmental_cost = co2_kg * vehicles * p.carbon_price_per_kg;

        let seats = f64::from(metrics.vehicle_capacity) * vehicles;
        let load_factor = if seats > 0.0 { passengers / seats } else { 0.0 };
        let average_route_hours = if vehicles > 0.0 {
            time_hours / vehicles
        } else {
            0.0
        };
        let raw_score = p.base_satisfaction
            - excess_ratio(load_factor, p.load_factor_threshold)
            - excess_ratio(average_route_hours, p.delay_threshold_hours);
        let satisfaction_score = raw_score.clamp(0.0, 1.0);
        let satisfaction_cost = (1.0 - satisfaction_score) * 100.0;

        let vector = CostVector {
            financial_cost: non_negative(financial_cost),
            time_cost: non_negative(time_cost),
            environmental_cost: non_negative(environmental_cost),
            satisfaction_cost,
            distance_km,
            time_hours,
            co2_kg: non_negative(co2_kg),
            satisfaction_score,
        };
        let w = &self.weights;
        let scalarized_cost = w.financial * vector.financial_cost
            + w.time * vector.time_cost
            + w.environmental * vector.environmental_cost
            + w.satisfaction * vector.satisfaction_cost;

        CostEvaluation {
            vector,
            scalarized_cost,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// Relative overshoot of `actual` above `threshold`, never negative.
#[expect(clippy::float_arithmetic, reason = "penalty is a relative difference")]
fn excess_ratio(actual: f64, threshold: f64) -> f64 {
    non_negative((actual - threshold) / threshold)
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "assertions compare floating-point costs"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    #[fixture]
    fn metrics() -> SolutionMetrics {
        SolutionMetrics {
            distance_km: 10.0,
            time_hours: 2.0,
            passengers: 50,
            vehicles: 2,
            vehicle_capacity: 60,
        }
    }

    #[rstest]
    fn computes_each_dimension(metrics: SolutionMetrics) {
        let CostEvaluation { vector, .. } = CostModel::default().evaluate(&metrics);
        // 10 x 2.5 + 15 x 2 x 2 + 10 x 0.5
        assert!(close(vector.financial_cost, 90.0));
        // 2 + 50 x 2 x 8 / 100
        assert!(close(vector.time_cost, 10.0));
        assert!(close(vector.co2_kg, 2.7));
        // 2.7 x 2 x 0.05
        assert!(close(vector.environmental_cost, 0.27));
        // Load factor 50/120 and 1 h per route are both under threshold.
        assert!(close(vector.satisfaction_score, 0.9));
        assert!(close(vector.satisfaction_cost, 10.0));
    }

    #[rstest]
    fn scalarizes_with_weights(metrics: SolutionMetrics) {
        let evaluation = CostModel::default().evaluate(&metrics);
        let expected = 0.25 * 90.0 + 0.30 * 10.0 + 0.20 * 0.27 + 0.25 * 10.0;
        assert!(close(evaluation.scalarized_cost, expected));
    }

    #[rstest]
    fn penalises_overcrowding_and_delay() {
        let evaluation = CostModel::default().evaluate(&SolutionMetrics {
            distance_km: 30.0,
            time_hours: 3.0,
            passengers: 60,
            vehicles: 1,
            vehicle_capacity: 60,
        });
        // Overcrowding (1.0 - 0.8) / 0.8 = 0.25; delay (3 - 1.5) / 1.5 = 1.
        assert!(close(evaluation.vector.satisfaction_score, 0.0));
        assert!(close(evaluation.vector.satisfaction_cost, 100.0));
    }

    #[rstest]
    fn clamps_negative_inputs_to_zero() {
        let evaluation = CostModel::default().evaluate(&SolutionMetrics {
            distance_km: -5.0,
            time_hours: f64::NAN,
            passengers: 0,
            vehicles: 0,
            vehicle_capacity: 60,
        });
        let vector = evaluation.vector;
        assert!(close(vector.financial_cost, 0.0));
        assert!(close(vector.time_cost, 0.0));
        assert!(close(vector.environmental_cost, 0.0));
        assert!(vector.satisfaction_cost >= 0.0);
        assert!((0.0..=1.0).contains(&vector.satisfaction_score));
    }

    #[rstest]
    #[case::too_heavy(CostWeights { financial: 0.5, ..CostWeights::default() })]
    #[case::negative(CostWeights { financial: -0.25, time: 0.8, ..CostWeights::default() })]
    #[case::nan(CostWeights { time: f64::NAN, ..CostWeights::default() })]
    fn rejects_unnormalised_weights(#[case] weights: CostWeights) {
        let err = CostModel::new(EconomicParameters::default(), weights)
            .expect_err("weights should be rejected");
        assert!(matches!(err, CostModelError::InvalidWeights { .. }));
    }

    #[rstest]
    fn accepts_weights_within_tolerance() {
        let weights = CostWeights {
            satisfaction: 0.25 + 5e-7,
            ..CostWeights::default()
        };
        assert!(CostModel::new(EconomicParameters::default(), weights).is_ok());
    }

    #[rstest]
    #[case::negative_fuel(EconomicParameters { fuel_cost_per_km: -1.0, ..EconomicParameters::default() })]
    #[case::zero_threshold(EconomicParameters { delay_threshold_hours: 0.0, ..EconomicParameters::default() })]
    #[case::satisfaction(EconomicParameters { base_satisfaction: 1.5, ..EconomicParameters::default() })]
    fn rejects_invalid_parameters(#[case] parameters: EconomicParameters) {
        let err = CostModel::new(parameters, CostWeights::default())
            .expect_err("parameters should be rejected");
        assert!(matches!(err, CostModelError::Parameters(_)));
    }

    #[rstest]
    fn preference_breaks_ties_on_financial_cost(metrics: SolutionMetrics) {
        let base = CostModel::default().evaluate(&metrics);
        let mut cheaper = base;
        cheaper.vector.financial_cost -= 1.0;
        assert_eq!(cheaper.cmp_preference(&base), Ordering::Less);
        assert_eq!(base.cmp_preference(&base), Ordering::Equal);

        let mut lower = base;
        lower.scalarized_cost -= 1.0;
        lower.vector.financial_cost += 10.0;
        assert_eq!(lower.cmp_preference(&base), Ordering::Less);
    }
}
