//! Schedule command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use minibus_scheduler::{CandidateRoute, FleetScheduler, SchedulerSettings};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_REQUEST, CliError, ENV_SCHEDULE_REQUEST, fs, output};

/// CLI arguments for the `schedule` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Assign every candidate route in a JSON request to exactly \
                 one half-hour departure slot, favouring rush hours while \
                 keeping each slot within the fleet size.",
    about = "Schedule costed routes into departure slots"
)]
#[ortho_config(prefix = "MINIBUS")]
pub(crate) struct ScheduleArgs {
    /// Path to a JSON file containing `{ "routes": [...] }`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Length of the service day in hours.
    #[arg(long, value_name = "hours")]
    #[serde(default)]
    pub(crate) time_horizon_hours: Option<u32>,
    /// Routes allowed to depart in the same slot.
    #[arg(long, value_name = "vehicles")]
    #[serde(default)]
    pub(crate) max_vehicles: Option<usize>,
    /// First departure in minutes after midnight.
    #[arg(long, value_name = "minutes")]
    #[serde(default)]
    pub(crate) service_start_minutes: Option<u32>,
    /// Fractional cost discount for rush-hour departures.
    #[arg(long, value_name = "fraction")]
    #[serde(default)]
    pub(crate) rush_discount: Option<f64>,
    /// Objective credit per passenger served.
    #[arg(long, value_name = "amount")]
    #[serde(default)]
    pub(crate) coverage_bonus: Option<f64>,
    /// Coverage percentage the schedule should reach.
    #[arg(long, value_name = "percent")]
    #[serde(default)]
    pub(crate) min_coverage_percent: Option<f64>,
}

/// Schedule request body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct ScheduleInput {
    pub(crate) routes: Vec<CandidateRoute>,
}

/// Resolved `schedule` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScheduleConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) settings: SchedulerSettings,
}

impl TryFrom<ScheduleArgs> for ScheduleConfig {
    type Error = CliError;

    fn try_from(args: ScheduleArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_SCHEDULE_REQUEST,
        })?;
        let defaults = SchedulerSettings::default();
        let settings = SchedulerSettings {
            time_horizon_hours: args
                .time_horizon_hours
                .unwrap_or(defaults.time_horizon_hours),
            max_vehicles: args.max_vehicles.unwrap_or(defaults.max_vehicles),
            service_start_minutes: args
                .service_start_minutes
                .unwrap_or(defaults.service_start_minutes),
            rush_discount: args.rush_discount.unwrap_or(defaults.rush_discount),
            coverage_bonus: args.coverage_bonus.unwrap_or(defaults.coverage_bonus),
            min_coverage_percent: args
                .min_coverage_percent
                .unwrap_or(defaults.min_coverage_percent),
        };
        Ok(Self {
            request_path,
            settings,
        })
    }
}

pub(crate) fn run_schedule_with(
    args: ScheduleArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ScheduleConfig::try_from(merged)?;
    fs::require_existing(&config.request_path, ARG_REQUEST)?;
    let input: ScheduleInput = fs::load_json(&config.request_path)?;
    let schedule = FleetScheduler::new(config.settings)?.schedule(&input.routes)?;
    output::write_json(writer, &schedule)
}
