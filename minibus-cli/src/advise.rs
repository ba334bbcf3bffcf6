//! Advise command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use minibus_core::{AdvisorSettings, ReoptimizationAdvisor, RouteConditions};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_REQUEST, CliError, ENV_ADVISE_REQUEST, fs, output};

/// CLI arguments for the `advise` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Evaluate live congestion and speed readings for dispatched \
                 routes and recommend whether to maintain, reroute or \
                 reschedule each one.",
    about = "Recommend responses to live route conditions"
)]
#[ortho_config(prefix = "MINIBUS")]
pub(crate) struct AdviseArgs {
    /// Path to a JSON file containing `{ "routes": [...] }`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Congestion factor above which a route is rerouted.
    #[arg(long, value_name = "factor")]
    #[serde(default)]
    pub(crate) congestion_threshold: Option<f64>,
    /// Speed below which a route is rescheduled.
    #[arg(long, value_name = "km/h")]
    #[serde(default)]
    pub(crate) slow_speed_kmh: Option<f64>,
}

/// Advise request body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct AdviseInput {
    pub(crate) routes: Vec<RouteConditions>,
}

pub(crate) fn run_advise_with(args: AdviseArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let request_path = merged.request_path.ok_or(CliError::MissingArgument {
        field: ARG_REQUEST,
        env: ENV_ADVISE_REQUEST,
    })?;
    let defaults = AdvisorSettings::default();
    let settings = AdvisorSettings {
        congestion_threshold: merged
            .congestion_threshold
            .unwrap_or(defaults.congestion_threshold),
        slow_speed_kmh: merged.slow_speed_kmh.unwrap_or(defaults.slow_speed_kmh),
        ..defaults
    };

    fs::require_existing(&request_path, ARG_REQUEST)?;
    let input: AdviseInput = fs::load_json(&request_path)?;
    let report = ReoptimizationAdvisor::new(settings)?.advise(&input.routes)?;
    output::write_json(writer, &report)
}
