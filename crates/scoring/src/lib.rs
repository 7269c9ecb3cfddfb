use std::collections::{BTreeMap, HashMap};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Discrete severity band, uniform at sensor and system level.
/// Ordered by severity; `Danger` is the only band that can trigger veto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Safe = 0,
    Warning = 1,
    Maintenance = 2,
    Danger = 3,
}

impl Status {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Safe => "Safe",
            Status::Warning => "Warning",
            Status::Maintenance => "Maintenance",
            Status::Danger => "Danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("sensor {key}: weight {weight} must be positive")]
    NonPositiveWeight { key: String, weight: f64 },

    #[error("sensor weights sum to {sum}, expected 1.0")]
    WeightSum { sum: f64 },

    #[error("sensor {key}: safe and maintenance limits are both {value}")]
    DegenerateLimits { key: String, value: f64 },

    #[error("duplicate sensor key {key}")]
    DuplicateKey { key: String },
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CycleError {
    #[error("no reading for sensor {key}")]
    IncompleteReading { key: String },

    #[error("reading for unknown sensor {key}")]
    UnknownSensor { key: String },
}

/// Whether danger grows with the raw value (normal) or shrinks with it
/// (inverse, e.g. airflow and filter differential pressure).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Normal,
    Inverse,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Limits {
    pub safe: f64,
    pub caution: f64,
    pub maintenance: f64,
}

/// Raw catalog entry as it arrives from configuration.
/// `limits` is the ordered triple (safe, caution, maintenance).
#[derive(Clone, Debug)]
pub struct SensorConfig {
    pub key: String,
    pub limits: [f64; 3],
    pub weight: f64,
}

/// Validated, immutable definition of one monitored quantity.
/// Direction is fixed at construction from the outer limit pair.
#[derive(Clone, Debug)]
pub struct SensorDefinition {
    pub key: String,
    pub limits: Limits,
    pub weight: f64,
    pub direction: Direction,
}

impl SensorDefinition {
    /// 4-level classification against the full limit triple.
    /// A value exactly at a threshold counts as the safer band.
    pub fn classify(&self, value: f64) -> Status {
        let Limits {
            safe,
            caution,
            maintenance,
        } = self.limits;
        match self.direction {
            Direction::Normal => {
                if value <= safe {
                    Status::Safe
                } else if value <= caution {
                    Status::Warning
                } else if value <= maintenance {
                    Status::Maintenance
                } else {
                    Status::Danger
                }
            }
            Direction::Inverse => {
                if value >= safe {
                    Status::Safe
                } else if value >= caution {
                    Status::Warning
                } else if value >= maintenance {
                    Status::Maintenance
                } else {
                    Status::Danger
                }
            }
        }
    }

    /// Continuous 0..=100 severity, linear between the outer anchors only
    /// (safe and maintenance; the caution band plays no part here). Values
    /// at or better than safe saturate at 0, values past the danger anchor
    /// saturate at 100.
    pub fn normalize(&self, value: f64) -> f64 {
        let Limits {
            safe, maintenance, ..
        } = self.limits;
        let score = match self.direction {
            Direction::Normal => (value - safe) / (maintenance - safe) * 100.0,
            Direction::Inverse => (safe - value) / (safe - maintenance) * 100.0,
        };
        score.clamp(0.0, 100.0)
    }
}

/// The production catalog: 12 sensors, weights summing to 1.0.
pub const STANDARD_CATALOG: &[(&str, [f64; 3], f64)] = &[
    ("gamma", [0.5, 10.0, 25.0], 0.30),
    ("neutron", [0.5, 10.0, 25.0], 0.20),
    ("noble_gas", [50.0, 300.0, 1000.0], 0.08),
    ("alpha_beta", [5.0, 10.0, 20.0], 0.04),
    ("temperature", [28.0, 35.0, 45.0], 0.08),
    ("cool_pressure", [5.5, 6.0, 6.5], 0.08),
    ("diff_pressure", [80.0, 60.0, 40.0], 0.06),
    ("airflow", [90.0, 80.0, 60.0], 0.06),
    ("humidity", [60.0, 70.0, 80.0], 0.04),
    ("co2", [800.0, 1200.0, 2000.0], 0.02),
    ("toxic_gas", [10.0, 20.0, 40.0], 0.02),
    ("particulate", [35.0, 75.0, 120.0], 0.02),
];

/// Immutable sensor catalog. Built once at startup, then shared read-only;
/// every other component looks sensors up here.
#[derive(Clone, Debug)]
pub struct Registry {
    defs: Vec<SensorDefinition>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Validates and freezes a catalog. Fails on a non-positive weight, a
    /// degenerate limit triple (safe == maintenance leaves the direction
    /// undefined and the score slope zero), a duplicate key, or weights
    /// that do not sum to 1.0 within tolerance.
    pub fn load(entries: Vec<SensorConfig>) -> Result<Self, ConfigError> {
        let mut defs = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut sum = 0.0;

        for entry in entries {
            // The negated comparison also rejects NaN weights.
            if !(entry.weight > 0.0) {
                return Err(ConfigError::NonPositiveWeight {
                    key: entry.key,
                    weight: entry.weight,
                });
            }
            let [safe, caution, maintenance] = entry.limits;
            if safe == maintenance {
                return Err(ConfigError::DegenerateLimits {
                    key: entry.key,
                    value: safe,
                });
            }
            if index.contains_key(&entry.key) {
                return Err(ConfigError::DuplicateKey { key: entry.key });
            }
            let direction = if safe < maintenance {
                Direction::Normal
            } else {
                Direction::Inverse
            };
            sum += entry.weight;
            index.insert(entry.key.clone(), defs.len());
            defs.push(SensorDefinition {
                key: entry.key,
                limits: Limits {
                    safe,
                    caution,
                    maintenance,
                },
                weight: entry.weight,
                direction,
            });
        }

        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum { sum });
        }

        Ok(Self { defs, index })
    }

    /// The built-in production catalog.
    pub fn standard() -> Self {
        let entries = STANDARD_CATALOG
            .iter()
            .map(|&(key, limits, weight)| SensorConfig {
                key: key.to_string(),
                limits,
                weight,
            })
            .collect();
        Self::load(entries).expect("built-in catalog is valid")
    }

    pub fn get(&self, key: &str) -> Option<&SensorDefinition> {
        self.index.get(key).map(|&i| &self.defs[i])
    }

    /// All definitions in catalog order.
    pub fn all(&self) -> &[SensorDefinition] {
        &self.defs
    }
}

/// Per-sensor output for one cycle: the raw value plus its classification
/// and normalized score.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorReport {
    pub key: String,
    pub raw_value: f64,
    pub status: Status,
    pub score: f64,
}

/// The engine's aggregate output for one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub raw_weighted_score: f64,
    pub veto_active: bool,
    pub final_score: f64,
    pub system_status: Status,
    pub system_status_label: &'static str,
}

/// Complete output of one evaluation cycle: per-sensor reports in catalog
/// order, readings that named no known sensor, and the aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleResult {
    pub sensors: Vec<SensorReport>,
    pub unknown: Vec<CycleError>,
    pub aggregate: AggregateResult,
}

/// Weighted blend of the per-sensor scores. Every catalog key must be
/// covered; the weights are calibrated assuming full coverage, so a missing
/// sensor is an error rather than a silently lower score.
pub fn aggregate(registry: &Registry, reports: &[SensorReport]) -> Result<f64, CycleError> {
    for def in registry.all() {
        if !reports.iter().any(|r| r.key == def.key) {
            return Err(CycleError::IncompleteReading {
                key: def.key.clone(),
            });
        }
    }
    Ok(reports
        .iter()
        .filter_map(|r| registry.get(&r.key).map(|d| r.score * d.weight))
        .sum())
}

/// True iff any sensor sits in its Danger band. One sensor there is severe
/// enough that the weighted blend must not be allowed to dilute it.
pub fn veto_active(reports: &[SensorReport]) -> bool {
    reports.iter().any(|r| r.status == Status::Danger)
}

/// Maps the weighted score and the veto flag to the final classification.
/// Veto forces the maximum severity outright; otherwise the score is
/// rounded to two decimals and bucketed, boundaries inclusive on the safer
/// side.
pub fn finalize(raw_weighted_score: f64, veto: bool) -> AggregateResult {
    if veto {
        return AggregateResult {
            raw_weighted_score,
            veto_active: true,
            final_score: 100.0,
            system_status: Status::Danger,
            system_status_label: "Danger (Veto)",
        };
    }

    let final_score = (raw_weighted_score * 100.0).round() / 100.0;
    let system_status = if final_score <= 20.0 {
        Status::Safe
    } else if final_score <= 50.0 {
        Status::Warning
    } else if final_score <= 70.0 {
        Status::Maintenance
    } else {
        Status::Danger
    };

    AggregateResult {
        raw_weighted_score,
        veto_active: false,
        final_score,
        system_status,
        system_status_label: system_status.label(),
    }
}

/// Runs one full evaluation cycle over a reading set.
///
/// A catalog key with no reading fails the whole cycle; a reading for a key
/// the catalog does not know is reported in `CycleResult::unknown` and
/// discarded while the known sensors still evaluate.
pub fn evaluate_cycle(
    registry: &Registry,
    readings: &BTreeMap<String, f64>,
) -> Result<CycleResult, CycleError> {
    let mut sensors = Vec::with_capacity(registry.all().len());
    for def in registry.all() {
        let raw = *readings.get(&def.key).ok_or_else(|| {
            CycleError::IncompleteReading {
                key: def.key.clone(),
            }
        })?;
        sensors.push(SensorReport {
            key: def.key.clone(),
            raw_value: raw,
            status: def.classify(raw),
            score: def.normalize(raw),
        });
    }

    let unknown = readings
        .keys()
        .filter(|k| registry.get(k).is_none())
        .map(|k| CycleError::UnknownSensor { key: k.clone() })
        .collect();

    let raw_weighted = aggregate(registry, &sensors)?;
    let result = finalize(raw_weighted, veto_active(&sensors));

    Ok(CycleResult {
        sensors,
        unknown,
        aggregate: result,
    })
}
