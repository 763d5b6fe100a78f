use crate::error::{EvalError, Result};
use crate::metrics::DEFAULT_KAPPA_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Budgets and reporting options of a prequential run
///
/// Unknown keys in JSON input are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Samples between snapshots
    pub n_wait: u64,
    pub max_instances: u64,
    /// Wall-time budget in seconds (`None` = unbounded)
    pub max_time: Option<f64>,
    pub batch_size: usize,
    /// Instances used to initialise the model; 0 or 1 disables pretraining
    pub pretrain_size: usize,
    pub show_plot: bool,
    pub show_kappa: bool,
    /// Accepted for callers that persist results; the engine does not write it
    pub output_file: Option<PathBuf>,
    /// Capacity of the prediction/label windows used for kappa
    pub kappa_window: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            n_wait: 200,
            max_instances: 100_000,
            max_time: None,
            batch_size: 1,
            pretrain_size: 200,
            show_plot: false,
            show_kappa: false,
            output_file: None,
            kappa_window: DEFAULT_KAPPA_WINDOW,
        }
    }
}

impl EvaluatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_wait == 0 {
            return Err(EvalError::InvalidParameter(
                "n_wait must be greater than 0".to_string(),
            ));
        }
        if self.max_instances == 0 {
            return Err(EvalError::InvalidParameter(
                "max_instances must be greater than 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(EvalError::InvalidParameter(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if self.kappa_window == 0 {
            return Err(EvalError::InvalidParameter(
                "kappa_window must be greater than 0".to_string(),
            ));
        }
        if let Some(max_time) = self.max_time {
            if max_time.is_nan() || max_time < 0.0 {
                return Err(EvalError::InvalidParameter(format!(
                    "max_time must be a non-negative number of seconds, got {}",
                    max_time
                )));
            }
        }
        Ok(())
    }

    pub fn pretraining_enabled(&self) -> bool {
        self.pretrain_size > 1
    }

    /// Apply a bulk update and validate the result
    ///
    /// The configuration is left untouched when validation fails.
    pub fn apply(&mut self, update: &ConfigUpdate) -> Result<()> {
        let mut next = self.clone();
        if let Some(v) = update.n_wait {
            next.n_wait = v;
        }
        if let Some(v) = update.max_instances {
            next.max_instances = v;
        }
        if let Some(v) = update.max_time {
            next.max_time = v;
        }
        if let Some(v) = update.batch_size {
            next.batch_size = v;
        }
        if let Some(v) = update.pretrain_size {
            next.pretrain_size = v;
        }
        if let Some(v) = update.show_plot {
            next.show_plot = v;
        }
        if let Some(v) = update.show_kappa {
            next.show_kappa = v;
        }
        if let Some(ref v) = update.output_file {
            next.output_file = v.clone();
        }
        if let Some(v) = update.kappa_window {
            next.kappa_window = v;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

/// Typed partial update of an `EvaluatorConfig`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigUpdate {
    pub n_wait: Option<u64>,
    pub max_instances: Option<u64>,
    pub max_time: Option<Option<f64>>,
    pub batch_size: Option<usize>,
    pub pretrain_size: Option<usize>,
    pub show_plot: Option<bool>,
    pub show_kappa: Option<bool>,
    pub output_file: Option<Option<PathBuf>>,
    pub kappa_window: Option<usize>,
}

impl ConfigUpdate {
    /// Parse `key=value` pairs; unknown keys are an error
    ///
    /// `max_time=inf` (positive only) and `output_file=` (empty) clear the optional fields.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut update = Self::default();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                EvalError::InvalidParameter(format!(
                    "Invalid setting '{}': expected key=value",
                    pair
                ))
            })?;
            let key = key.trim();
            let value = value.trim();
            match key {
                "n_wait" => update.n_wait = Some(parse_value(key, value)?),
                "max_instances" => update.max_instances = Some(parse_value(key, value)?),
                "max_time" => {
                    let seconds: f64 = parse_value(key, value)?;
                    update.max_time = Some(if seconds == f64::INFINITY {
                        None
                    } else {
                        Some(seconds)
                    });
                }
                "batch_size" => update.batch_size = Some(parse_value(key, value)?),
                "pretrain_size" => update.pretrain_size = Some(parse_value(key, value)?),
                "show_plot" => update.show_plot = Some(parse_value(key, value)?),
                "show_kappa" => update.show_kappa = Some(parse_value(key, value)?),
                "output_file" => {
                    update.output_file = Some(if value.is_empty() {
                        None
                    } else {
                        Some(PathBuf::from(value))
                    });
                }
                "kappa_window" => update.kappa_window = Some(parse_value(key, value)?),
                other => return Err(EvalError::UnknownParameter(other.to_string())),
            }
        }
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        EvalError::InvalidParameter(format!("Invalid value '{}' for {}", value, key))
    })
}
