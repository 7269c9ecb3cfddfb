use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The five named operating conditions the generator can reproduce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    Safe,
    Warning,
    Maintenance,
    Danger,
    Veto,
}

impl Scenario {
    /// Wire name stamped on published payloads.
    pub fn name(self) -> &'static str {
        match self {
            Scenario::Safe => "SAFE",
            Scenario::Warning => "WARNING",
            Scenario::Maintenance => "MAINTENANCE",
            Scenario::Danger => "DANGER",
            Scenario::Veto => "VETO",
        }
    }
}

/// All-safe baseline values for the standard catalog.
pub const BASELINE: &[(&str, f64)] = &[
    ("gamma", 0.04),
    ("neutron", 0.04),
    ("noble_gas", 10.0),
    ("alpha_beta", 1.0),
    ("temperature", 24.0),
    ("cool_pressure", 5.0),
    ("diff_pressure", 100.0),
    ("airflow", 98.0),
    ("humidity", 45.0),
    ("co2", 420.0),
    ("toxic_gas", 0.0),
    ("particulate", 15.0),
];

/// Builds one reading set for the named scenario from an injected random
/// source. Each positive baseline value gets a uniform ±2% jitter so the
/// data looks live; the scenario then overrides its subset of keys into the
/// band it is meant to drive. `Veto` pushes exactly one high-weight sensor
/// (neutron) past its danger limit while everything else stays at baseline.
pub fn generate<R: Rng>(
    scenario: Scenario,
    baseline: &[(&str, f64)],
    rng: &mut R,
) -> BTreeMap<String, f64> {
    let mut data = BTreeMap::new();
    for &(key, base) in baseline {
        let jitter = if base > 0.0 {
            rng.gen_range(-base * 0.02..=base * 0.02)
        } else {
            0.0
        };
        data.insert(key.to_string(), base + jitter);
    }

    match scenario {
        Scenario::Safe => {}
        Scenario::Warning => {
            data.insert("gamma".into(), rng.gen_range(5.0..=9.0));
            data.insert("neutron".into(), rng.gen_range(5.0..=9.0));
            data.insert("temperature".into(), rng.gen_range(30.0..=34.0));
            data.insert("airflow".into(), rng.gen_range(82.0..=88.0));
            data.insert("diff_pressure".into(), rng.gen_range(65.0..=75.0));
        }
        Scenario::Maintenance => {
            data.insert("gamma".into(), rng.gen_range(15.0..=22.0));
            data.insert("neutron".into(), rng.gen_range(15.0..=22.0));
            data.insert("diff_pressure".into(), rng.gen_range(42.0..=55.0));
            data.insert("cool_pressure".into(), rng.gen_range(6.1..=6.4));
            data.insert("temperature".into(), rng.gen_range(38.0..=42.0));
        }
        Scenario::Danger => {
            data.insert("gamma".into(), rng.gen_range(30.0..=50.0));
            data.insert("neutron".into(), rng.gen_range(30.0..=50.0));
            data.insert("temperature".into(), rng.gen_range(46.0..=55.0));
            data.insert("airflow".into(), rng.gen_range(30.0..=50.0));
            data.insert("toxic_gas".into(), rng.gen_range(50.0..=80.0));
        }
        Scenario::Veto => {
            data.insert("neutron".into(), 40.0);
        }
    }

    data
}

/// Convenience wrapper owning a seeded source, for deterministic runs.
#[derive(Clone, Debug)]
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self, scenario: Scenario) -> BTreeMap<String, f64> {
        generate(scenario, BASELINE, &mut self.rng)
    }
}

/// Repeating sequence of (window length in ticks, scenario) pairs, driven
/// by an injected tick counter rather than wall-clock time.
#[derive(Clone, Debug)]
pub struct Schedule {
    windows: Vec<(u64, Scenario)>,
    period: u64,
}

impl Schedule {
    pub fn new(windows: Vec<(u64, Scenario)>) -> Self {
        let period = windows.iter().map(|w| w.0).sum();
        assert!(period > 0, "schedule needs at least one non-empty window");
        Self { windows, period }
    }

    /// The demo cycle: 12 ticks per scenario, all five in severity order,
    /// one minute per full loop.
    pub fn demo() -> Self {
        Self::new(vec![
            (12, Scenario::Safe),
            (12, Scenario::Warning),
            (12, Scenario::Maintenance),
            (12, Scenario::Danger),
            (12, Scenario::Veto),
        ])
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn scenario_at(&self, tick: u64) -> Scenario {
        let mut t = tick % self.period;
        for &(len, scenario) in &self.windows {
            if t < len {
                return scenario;
            }
            t -= len;
        }
        unreachable!("tick reduced modulo the window sum")
    }
}
