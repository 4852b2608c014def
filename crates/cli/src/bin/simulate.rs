use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use persistent_thrust::background::{
    BackgroundUpdate, EngineOutcome, TickContext, VesselBackgroundState,
    process_unloaded_engines, rebuild_engines,
};
use persistent_thrust::common::units::format_thrust;
use persistent_thrust::common::vector::{self, Vector3};
use persistent_thrust::config::{
    SettingsConfig, load_parts, load_resources, load_scenario, load_settings,
};
use persistent_thrust::export::ledger::{self as export_ledger, Record};
use persistent_thrust::export::report::{RunReport, TickSample, write_report};
use persistent_thrust::scenario::{self, Scenario};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Run background thrust ticks for one unloaded vessel.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Background thrust simulator for unloaded vessels"
)]
struct Cli {
    /// Scenario file (YAML or TOML)
    #[arg(long)]
    scenario: PathBuf,

    /// Resource catalog (YAML list, TOML file, or directory of TOML files)
    #[arg(long, default_value = "configs/resources.yaml")]
    resources: PathBuf,

    /// Part catalog (YAML list, TOML file, or directory of TOML files)
    #[arg(long, default_value = "configs/parts.yaml")]
    parts: PathBuf,

    /// Simulation settings (TOML); defaults apply when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 10)]
    ticks: usize,

    /// Tick length in seconds
    #[arg(long, default_value_t = 60.0)]
    step: f64,

    /// Start time (UT seconds); defaults to the scenario's
    #[arg(long)]
    start_ut: Option<f64>,

    /// Per-engine tick ledger CSV (`-` for stdout)
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// JSON run report (`-` for stdout)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log per-engine decisions
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if !(cli.step.is_finite() && cli.step >= 0.0) {
        anyhow::bail!("--step must be a finite, non-negative number of seconds");
    }

    let resources = load_resources(&cli.resources)
        .with_context(|| format!("loading resources from {}", cli.resources.display()))?;
    let parts = load_parts(&cli.parts)
        .with_context(|| format!("loading parts from {}", cli.parts.display()))?;
    let settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SettingsConfig::default(),
    };
    let scenario_config = load_scenario(&cli.scenario)
        .with_context(|| format!("loading scenario from {}", cli.scenario.display()))?;

    let library = scenario::resource_library(&resources, &settings);
    let catalog = scenario::part_catalog(&parts);
    let background = scenario::background_settings(&settings);
    if library.is_empty() || catalog.is_empty() {
        warn!("resource or part definitions are empty; no engine can be registered");
    }
    debug!(
        resources = library.len(),
        parts = catalog.len(),
        "definitions loaded"
    );
    let Scenario {
        universe,
        kinematics,
        mut snapshot,
        maneuver_patch,
        ut,
    } = Scenario::try_from(&scenario_config)?;

    let mut state = VesselBackgroundState::new(snapshot.id.clone(), kinematics);
    state.maneuver_patch = maneuver_patch;
    let active = rebuild_engines(&mut state, &snapshot, &catalog, &library);
    info!(
        vessel = %snapshot.id,
        engines = state.engine_count(),
        active,
        "engine registry ready"
    );

    let mut ledger_writer = match &cli.ledger {
        Some(path) => {
            let mut writer = export_ledger::writer_for_path(path)?;
            export_ledger::write_header(writer.as_mut())?;
            Some(writer)
        }
        None => None,
    };

    let start_ut = cli.start_ut.unwrap_or(ut);
    let initial_resources = snapshot.resources.clone();
    let mut samples = Vec::with_capacity(cli.ticks);
    let mut resource_changes: BTreeMap<String, f64> = BTreeMap::new();
    let mut total_delta_v: Vector3 = vector::ZERO;

    for tick in 0..cli.ticks {
        let tick_ut = start_ut + tick as f64 * cli.step;
        let ctx = TickContext {
            ut: tick_ut,
            elapsed: cli.step,
            library: &library,
            flight: &universe,
            settings: &background,
        };

        let mut resources = snapshot.resources.clone();
        let report = process_unloaded_engines(&mut state, &snapshot, &mut resources, &ctx);
        snapshot.resources = resources;

        for (name, amount) in &report.resource_changes {
            *resource_changes.entry(name.clone()).or_insert(0.0) += amount;
        }
        total_delta_v = vector::add(&total_delta_v, &report.delta_v_vector);

        if let Some(writer) = ledger_writer.as_mut() {
            for outcome in &report.outcomes {
                write_outcome(writer.as_mut(), &snapshot.id, tick_ut, cli.step, outcome)?;
            }
        }

        samples.push(TickSample {
            ut: tick_ut,
            landed: report.landed,
            total_persistent_thrust_kn: report.total_persistent_thrust,
            applied_engines: report.applied_count(),
            delta_v_m_s: report.delta_v(),
            vessel_mass_t: snapshot.dry_mass + library.resource_mass(&snapshot.resources),
        });
    }

    if let Some(mut writer) = ledger_writer {
        writer.flush()?;
    }

    let end_ut = start_ut + cli.ticks as f64 * cli.step;
    let total_delta_v_m_s = vector::norm(&total_delta_v);

    if let Some(path) = &cli.report {
        let report = RunReport {
            vessel_id: &snapshot.id,
            vessel_name: &snapshot.name,
            start_ut,
            end_ut,
            ticks: cli.ticks,
            total_delta_v_m_s,
            initial_resources: &initial_resources,
            final_resources: &snapshot.resources,
            resource_changes: resource_changes.clone(),
            samples: &samples,
        };
        write_report(path, &report)?;
    }

    let stdout_taken = [&cli.ledger, &cli.report]
        .into_iter()
        .flatten()
        .any(|path| path.as_os_str() == "-");
    if !stdout_taken {
        println!(
            "Vessel {} ({}): {} ticks of {:.1} s from UT {:.1}",
            snapshot.name, snapshot.id, cli.ticks, cli.step, start_ut
        );
        println!(
            "  Persistent thrust: {}",
            format_thrust(state.total_persistent_thrust)
        );
        println!("  Total delta-v: {:.3} m/s", total_delta_v_m_s);
        for (name, amount) in &snapshot.resources {
            let change = resource_changes.get(name).copied().unwrap_or(0.0);
            println!("  {name}: {amount:.3} ({change:+.3})");
        }
    }

    Ok(())
}

fn write_outcome(
    writer: &mut dyn Write,
    vessel_id: &str,
    ut: f64,
    elapsed_s: f64,
    outcome: &EngineOutcome,
) -> std::io::Result<()> {
    match &outcome.update {
        BackgroundUpdate::Idle { title, reason } => Record {
            ut,
            elapsed_s,
            vessel_id,
            persistent_part_id: outcome.persistent_part_id,
            title,
            applied: false,
            reason: reason.label(),
            fuel_requirement_met: 0.0,
            thrust_kn: 0.0,
            delta_v_m_s: 0.0,
            propellant_demand: 0.0,
        }
        .write_to(writer),
        BackgroundUpdate::Applied {
            title,
            fuel_requirement_met,
            thrust,
            delta_v,
            propellant_demand,
            ..
        } => Record {
            ut,
            elapsed_s,
            vessel_id,
            persistent_part_id: outcome.persistent_part_id,
            title,
            applied: true,
            reason: "",
            fuel_requirement_met: *fuel_requirement_met,
            thrust_kn: *thrust,
            delta_v_m_s: *delta_v,
            propellant_demand: *propellant_demand,
        }
        .write_to(writer),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
