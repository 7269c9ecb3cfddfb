use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use scenario::{Generator, Scenario, Schedule};
use scoring::{evaluate_cycle, Registry, SensorConfig};
use serde_json::{json, Map};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScenarioArg {
    Safe,
    Warning,
    Maintenance,
    Danger,
    Veto,
}

impl From<ScenarioArg> for Scenario {
    fn from(s: ScenarioArg) -> Self {
        match s {
            ScenarioArg::Safe => Scenario::Safe,
            ScenarioArg::Warning => Scenario::Warning,
            ScenarioArg::Maintenance => Scenario::Maintenance,
            ScenarioArg::Danger => Scenario::Danger,
            ScenarioArg::Veto => Scenario::Veto,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "rrsi-engine",
    version,
    about = "Reactor Risk Severity Index demo publisher"
)]
struct Args {
    /// Fix one scenario for every cycle; without it the demo schedule
    /// cycles through all five
    #[arg(value_enum, long)]
    scenario: Option<ScenarioArg>,

    /// Number of evaluation cycles to emit
    #[arg(long, default_value_t = 60)]
    cycles: u64,

    /// RNG seed for deterministic runs
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Unit identifier stamped on every payload
    #[arg(long, default_value = "REAKTOR-01")]
    reactor_id: String,

    /// JSON sensor catalog (array of {key, limits, weight}) replacing the
    /// built-in one
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(serde::Deserialize)]
struct CatalogEntry {
    key: String,
    limits: [f64; 3],
    weight: f64,
}

fn load_registry(path: Option<&PathBuf>) -> Result<Registry> {
    let Some(path) = path else {
        return Ok(Registry::standard());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&text)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    let entries = entries
        .into_iter()
        .map(|e| SensorConfig {
            key: e.key,
            limits: e.limits,
            weight: e.weight,
        })
        .collect();
    Registry::load(entries).context("validating catalog")
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the JSONL payloads.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let registry = load_registry(args.config.as_ref())?;
    let schedule = Schedule::demo();
    let mut generator = Generator::new(args.seed);

    tracing::info!(
        sensors = registry.all().len(),
        cycles = args.cycles,
        "starting demo publisher"
    );

    for tick in 0..args.cycles {
        let scenario = args
            .scenario
            .map(Scenario::from)
            .unwrap_or_else(|| schedule.scenario_at(tick));
        let readings = generator.generate(scenario);
        let result =
            evaluate_cycle(&registry, &readings).with_context(|| format!("cycle {tick}"))?;

        for err in &result.unknown {
            tracing::warn!(error = %err, "discarded reading");
        }

        // Flat payload, one JSON object per line, in the original wire shape.
        let mut payload = Map::new();
        payload.insert("timestamp".into(), json!(chrono::Utc::now().to_rfc3339()));
        payload.insert("reactor_id".into(), json!(args.reactor_id));
        payload.insert("scenario".into(), json!(scenario.name()));
        payload.insert("event_id".into(), json!(uuid::Uuid::new_v4().to_string()));
        for sensor in &result.sensors {
            payload.insert(sensor.key.clone(), json!(round3(sensor.raw_value)));
            payload.insert(
                format!("{}_status", sensor.key),
                json!(sensor.status.code()),
            );
        }
        let agg = &result.aggregate;
        payload.insert("rrsi_score".into(), json!(agg.final_score));
        payload.insert("system_status_text".into(), json!(agg.system_status_label));
        payload.insert("system_status_code".into(), json!(agg.system_status.code()));

        println!("{}", serde_json::to_string(&payload)?);
    }

    Ok(())
}
