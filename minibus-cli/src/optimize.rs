//! Optimize command implementation.

use std::io::Write;
use std::ops::RangeInclusive;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use minibus_core::{
    CostWeights, EconomicParameters, FleetLimits, FleetOptimizer, MatrixSettings,
    OptimizationRequest, OptimizerConfig, RouteSolver,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_REQUEST, CliError, ENV_OPTIMIZE_REQUEST, fs, output};

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan capacitated minibus routes for a JSON-encoded \
                 OptimizationRequest. Economic constants, cost weights, \
                 fleet limits and the search budget can come from flags, \
                 configuration files, or MINIBUS_* environment variables.",
    about = "Plan routes for one optimization request"
)]
#[ortho_config(prefix = "MINIBUS")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file containing an OptimizationRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Passengers one minibus can carry.
    #[arg(long, value_name = "seats")]
    #[serde(default)]
    pub(crate) vehicle_capacity: Option<u32>,
    /// Longest allowed route in minutes.
    #[arg(long, value_name = "minutes")]
    #[serde(default)]
    pub(crate) max_route_time_minutes: Option<u32>,
    /// Longest allowed route in meters.
    #[arg(long, value_name = "meters")]
    #[serde(default)]
    pub(crate) max_route_distance_meters: Option<u32>,
    /// Traffic multiplier applied to straight-line distances.
    #[arg(long, value_name = "factor")]
    #[serde(default)]
    pub(crate) congestion_factor: Option<f64>,
    /// Average vehicle speed used for travel times.
    #[arg(long, value_name = "km/h")]
    #[serde(default)]
    pub(crate) average_speed_kmh: Option<f64>,
    /// Fuel cost per kilometre.
    #[arg(long, value_name = "amount")]
    #[serde(default)]
    pub(crate) fuel_cost_per_km: Option<f64>,
    /// Driver wage per hour.
    #[arg(long, value_name = "amount")]
    #[serde(default)]
    pub(crate) driver_cost_per_hour: Option<f64>,
    /// Carbon price per kilogram of CO2.
    #[arg(long, value_name = "amount")]
    #[serde(default)]
    pub(crate) carbon_price_per_kg: Option<f64>,
    /// Weight of the financial cost.
    #[arg(long, value_name = "weight")]
    #[serde(default)]
    pub(crate) financial_weight: Option<f64>,
    /// Weight of the passenger time cost.
    #[arg(long, value_name = "weight")]
    #[serde(default)]
    pub(crate) time_weight: Option<f64>,
    /// Weight of the environmental cost.
    #[arg(long, value_name = "weight")]
    #[serde(default)]
    pub(crate) environmental_weight: Option<f64>,
    /// Weight of the satisfaction cost.
    #[arg(long, value_name = "weight")]
    #[serde(default)]
    pub(crate) satisfaction_weight: Option<f64>,
    /// Search budget in seconds for requests that name none.
    #[arg(long, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit_seconds: Option<u64>,
    /// Smallest fleet to try when searching fleet sizes.
    #[arg(long, value_name = "vehicles")]
    #[serde(default)]
    pub(crate) fleet_min: Option<usize>,
    /// Largest fleet to try; enables the fleet size search.
    #[arg(long, value_name = "vehicles")]
    #[serde(default)]
    pub(crate) fleet_max: Option<usize>,
    /// Generation cap for the routing metaheuristic.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) max_generations: Option<usize>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptimizeConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Optimizer settings after layering.
    pub(crate) optimizer: OptimizerConfig,
    /// Fleet sizes to compare, if a search was requested.
    pub(crate) fleet_range: Option<RangeInclusive<usize>>,
    /// Generation cap override for the routing solver.
    pub(crate) max_generations: Option<usize>,
}

impl OptimizeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        fs::require_existing(&self.request_path, ARG_REQUEST)
    }
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_OPTIMIZE_REQUEST,
        })?;

        let defaults = OptimizerConfig::default();
        let optimizer = OptimizerConfig {
            matrix: MatrixSettings {
                congestion_factor: args
                    .congestion_factor
                    .unwrap_or(defaults.matrix.congestion_factor),
                average_speed_kmh: args
                    .average_speed_kmh
                    .unwrap_or(defaults.matrix.average_speed_kmh),
                ..defaults.matrix
            },
            limits: FleetLimits {
                vehicle_capacity: args
                    .vehicle_capacity
                    .unwrap_or(defaults.limits.vehicle_capacity),
                max_route_time_minutes: args
                    .max_route_time_minutes
                    .unwrap_or(defaults.limits.max_route_time_minutes),
                max_route_distance_meters: args
                    .max_route_distance_meters
                    .unwrap_or(defaults.limits.max_route_distance_meters),
                ..defaults.limits
            },
            economics: EconomicParameters {
                fuel_cost_per_km: args
                    .fuel_cost_per_km
                    .unwrap_or(defaults.economics.fuel_cost_per_km),
                driver_cost_per_hour: args
                    .driver_cost_per_hour
                    .unwrap_or(defaults.economics.driver_cost_per_hour),
                carbon_price_per_kg: args
                    .carbon_price_per_kg
                    .unwrap_or(defaults.economics.carbon_price_per_kg),
                ..defaults.economics
            },
            weights: CostWeights {
                financial: args.financial_weight.unwrap_or(defaults.weights.financial),
                time: args.time_weight.unwrap_or(defaults.weights.time),
                environmental: args
                    .environmental_weight
                    .unwrap_or(defaults.weights.environmental),
                satisfaction: args
                    .satisfaction_weight
                    .unwrap_or(defaults.weights.satisfaction),
            },
            time_limit: args
                .time_limit_seconds
                .map_or(defaults.time_limit, Duration::from_secs),
        };
        optimizer.validate()?;

        let fleet_range = args
            .fleet_max
            .map(|max| args.fleet_min.unwrap_or(1)..=max);

        Ok(Self {
            request_path,
            optimizer,
            fleet_range,
            max_generations: args.max_generations,
        })
    }
}

/// Builds a routing solver for the current optimize invocation.
pub(crate) trait RouteSolverBuilder {
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteSolver>, CliError>;
}

/// Builds the `vrp-core` solver when the `solver-vrp` feature is enabled.
pub(crate) struct DefaultRouteSolverBuilder;

impl RouteSolverBuilder for DefaultRouteSolverBuilder {
    #[cfg(feature = "solver-vrp")]
    fn build(&self, config: &OptimizeConfig) -> Result<Box<dyn RouteSolver>, CliError> {
        use minibus_solver_vrp::{VrpSolver, VrpSolverConfig};

        let defaults = VrpSolverConfig::default();
        let solver = VrpSolver::with_config(VrpSolverConfig {
            max_generations: config.max_generations.unwrap_or(defaults.max_generations),
        })?;
        Ok(Box::new(solver))
    }

    #[cfg(not(feature = "solver-vrp"))]
    fn build(&self, _config: &OptimizeConfig) -> Result<Box<dyn RouteSolver>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver-vrp",
            action: "optimize",
        })
    }
}

pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn RouteSolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let request: OptimizationRequest = fs::load_json(&config.request_path)?;
    let solver = builder.build(&config)?;
    let optimizer = FleetOptimizer::with_config(solver, config.optimizer)?;
    let solution = match config.fleet_range {
        Some(range) => optimizer.optimize_fleet_size(&request, range)?,
        None => optimizer.optimize(&request)?,
    };
    output::write_json(writer, &solution)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
