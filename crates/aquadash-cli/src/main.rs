//! Command-line dashboard for the Aquadash hydroponics system.
//!
//! Talks to the Aquadash backend over HTTP and prints sensor render
//! states, last measurements, and actuator configuration to the terminal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aquadash_core::prefs::PreferenceStore;
use aquadash_core::reconciler::{status_level, SensorReconciler, StatusLevel};
use aquadash_core::Gateway;
use aquadash_types::{actuator_display_name, TimeDelta};

#[derive(Parser)]
#[command(name = "aquadash", version, about = "Aquadash monitoring dashboard")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "AQUADASH_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Device group to address.
    #[arg(long, default_value_t = 0)]
    prototype: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List sensors with thresholds in their effective display units.
    Sensors,
    /// Periodically refresh and print render-state summaries.
    Watch {
        /// Seconds between refreshes.
        #[arg(long, default_value_t = 30)]
        interval: u64,
        /// Query window, `DDd,HH:MM:SS`.
        #[arg(long, default_value = "00d,01:00:00")]
        window: String,
    },
    /// List actuators.
    Actuators,
    /// Enable or disable one actuator.
    Toggle {
        /// Actuator to change.
        id: i64,
        /// Desired state.
        #[arg(long)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let gateway = Gateway::new(&cli.server, cli.prototype)
        .with_context(|| format!("invalid server URL: {}", cli.server))?;
    let prefs = PreferenceStore::open_default();

    match cli.command {
        Command::Sensors => list_sensors(gateway, prefs).await,
        Command::Watch { interval, window } => {
            let window: TimeDelta = window
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid window: {e}"))?;
            watch(gateway, prefs, Duration::from_secs(interval), window).await
        }
        Command::Actuators => list_actuators(gateway).await,
        Command::Toggle { id, enabled } => toggle_actuator(gateway, id, enabled).await,
    }
}

async fn list_sensors(gateway: Gateway, prefs: PreferenceStore) -> anyhow::Result<()> {
    let mut sensors = gateway.sensors().await;
    if sensors.is_empty() {
        println!("No sensors found at {}", gateway.base_url());
        return Ok(());
    }
    prefs.sort_sensors(&mut sensors);

    let gateway = Arc::new(gateway);
    for sensor in sensors {
        let reconciler = SensorReconciler::new(sensor, Arc::clone(&gateway), prefs.clone());
        let sensor = reconciler.sensor();
        let unit = reconciler.effective_unit();
        println!(
            "#{} {:<12} [{}]  thresholds {} / {} / {} / {} ({})",
            sensor.sensor_id,
            sensor.sensor_type.title(),
            sensor.sensor_type,
            sensor.threshold_critically_low,
            sensor.threshold_low,
            sensor.threshold_high,
            sensor.threshold_critically_high,
            unit,
        );
    }
    Ok(())
}

async fn watch(
    gateway: Gateway,
    prefs: PreferenceStore,
    every: Duration,
    window: TimeDelta,
) -> anyhow::Result<()> {
    let gateway = Arc::new(gateway);
    let mut sensors = gateway.sensors().await;
    if sensors.is_empty() {
        bail!("no sensors found at {}", gateway.base_url());
    }
    prefs.sort_sensors(&mut sensors);

    let reconcilers: Vec<_> = sensors
        .into_iter()
        .map(|s| SensorReconciler::with_window(s, Arc::clone(&gateway), prefs.clone(), window))
        .collect();

    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        for reconciler in &reconcilers {
            let Some(state) = reconciler.refresh().await else {
                continue;
            };
            // Classify against the canonical thresholds; conversion is
            // for display only.
            let last = reconciler.last_measurement().await;
            let status = match status_level(reconciler.sensor(), last.map(|m| m.value)) {
                StatusLevel::Neutral => "no data",
                StatusLevel::Success => "ok",
                StatusLevel::Warning => "warning",
                StatusLevel::Critical => "CRITICAL",
            };
            let value = last
                .map(|m| format!("{} {}", reconciler.to_display_value(m.value), state.unit))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<12} {:>14}  {:>8}  ({} points over {})",
                state.title,
                value,
                status,
                state.series.len(),
                reconciler.window(),
            );
        }
        println!();
    }
}

async fn list_actuators(gateway: Gateway) -> anyhow::Result<()> {
    let actuators = gateway.actuators().await;
    if actuators.is_empty() {
        println!("No actuators found at {}", gateway.base_url());
        return Ok(());
    }
    for a in actuators {
        println!(
            "#{} {:<28} {}  condition {} {}  period {}s duration {}s  [{}]",
            a.actuator_id,
            a.actuator_name,
            actuator_display_name(&a.actuator_type),
            a.activation_condition,
            a.condition_value,
            a.activation_period,
            a.activation_duration,
            if a.enabled { "enabled" } else { "disabled" },
        );
    }
    Ok(())
}

async fn toggle_actuator(gateway: Gateway, id: i64, enabled: bool) -> anyhow::Result<()> {
    let mut actuators = gateway.try_actuators().await?;
    let Some(actuator) = actuators.iter_mut().find(|a| a.actuator_id == id) else {
        bail!("no actuator with id {id}");
    };
    actuator.enabled = enabled;

    match gateway.patch_actuators(&actuators).await {
        Ok(()) => {
            println!("Actuator {id} {}", if enabled { "enabled" } else { "disabled" });
            Ok(())
        }
        Err(e) => bail!("failed to update actuator {id}: {e}"),
    }
}
