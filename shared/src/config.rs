use std::io::Read;

use toml::{Table, Value};

use crate::{get_reader, DataError};

/// Weights of the routing cost
/// `gamma * tariff + alpha * eta * weight * km + beta * lead_time`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostCoefficients {
    pub gamma: f64,
    pub alpha: f64,
    pub eta: f64,
    pub beta: f64,
}

impl Default for CostCoefficients {
    fn default() -> Self {
        CostCoefficients {
            gamma: 1.0,
            alpha: 0.1,
            eta: 0.129,
            beta: 100.0,
        }
    }
}

/// How many improving columns a single pricing call may emit per shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPolicy {
    BestPerShipment,
    AllImproving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub coefficients: CostCoefficients,
    /// Objective coefficient of the covering slack.
    pub big_m: f64,
    pub make_to_order_factor: f64,
    pub primary_departures: Vec<String>,
    pub secondary_departures: Vec<String>,
    pub column_policy: ColumnPolicy,
    pub max_iterations: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            coefficients: CostCoefficients::default(),
            big_m: 1e5,
            make_to_order_factor: 0.25,
            primary_departures: vec!["CH00".into(), "CH01".into(), "CH02".into()],
            secondary_departures: vec!["CH04".into(), "CHS1".into()],
            column_policy: ColumnPolicy::BestPerShipment,
            max_iterations: None,
        }
    }
}

fn float(config: &Table, key: &str, default: f64) -> Result<f64, DataError> {
    match config.get(key) {
        None => Ok(default),
        Some(Value::Float(v)) => Ok(*v),
        Some(Value::Integer(v)) => Ok(*v as f64),
        Some(other) => Err(DataError::Config(format!("{} must be a number, got {}", key, other))),
    }
}

fn codes(config: &Table, key: &str, default: &[String]) -> Result<Vec<String>, DataError> {
    match config.get(key) {
        None => Ok(default.to_vec()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    DataError::Config(format!("{} must only contain strings, got {}", key, v))
                })
            })
            .collect(),
        Some(other) => Err(DataError::Config(format!("{} must be a list, got {}", key, other))),
    }
}

impl RunConfig {
    pub fn load(path: &str) -> Result<RunConfig, DataError> {
        let mut config_toml = String::new();
        get_reader(path)?
            .read_to_string(&mut config_toml)
            .map_err(|e| DataError::Io(path.to_string(), e))?;
        RunConfig::parse(&config_toml)
    }

    /// Every key is optional and falls back to `RunConfig::default()`.
    pub fn parse(config_toml: &str) -> Result<RunConfig, DataError> {
        let parsed = config_toml
            .parse::<Table>()
            .map_err(|e| DataError::Config(e.to_string()))?;
        let defaults = RunConfig::default();

        let coefficients = CostCoefficients {
            gamma: float(&parsed, "gamma", defaults.coefficients.gamma)?,
            alpha: float(&parsed, "alpha", defaults.coefficients.alpha)?,
            eta: float(&parsed, "eta", defaults.coefficients.eta)?,
            beta: float(&parsed, "beta", defaults.coefficients.beta)?,
        };

        let column_policy = match parsed.get("column_policy").map(|v| v.as_str()) {
            None | Some(Some("best")) => ColumnPolicy::BestPerShipment,
            Some(Some("all")) => ColumnPolicy::AllImproving,
            Some(_) => {
                return Err(DataError::Config(
                    "column_policy must be \"best\" or \"all\"".to_string(),
                ))
            }
        };

        let max_iterations = match parsed.get("max_iterations") {
            None => None,
            Some(Value::Integer(v)) if *v > 0 => Some(*v as usize),
            Some(other) => {
                return Err(DataError::Config(format!(
                    "max_iterations must be a positive integer, got {}",
                    other
                )))
            }
        };

        let big_m = float(&parsed, "big_m", defaults.big_m)?;
        if big_m <= 0.0 {
            return Err(DataError::Config("big_m must be positive".to_string()));
        }

        Ok(RunConfig {
            coefficients,
            big_m,
            make_to_order_factor: float(&parsed, "make_to_order_factor", defaults.make_to_order_factor)?,
            primary_departures: codes(&parsed, "primary_departures", &defaults.primary_departures)?,
            secondary_departures: codes(&parsed, "secondary_departures", &defaults.secondary_departures)?,
            column_policy,
            max_iterations,
        })
    }
}
