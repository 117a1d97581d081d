//! Forecast configuration
//!
//! Selects the regressor and its hyper-parameters.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path, when one is given and exists
//! 2. Override in data dir (~/.local/share/spendcast/config/forecast.toml)
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/forecast.toml");

/// Which single-feature regressor to fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Gradient-boosted regression trees
    GradientBoosting,
    /// Ordinary least squares line
    Linear,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GradientBoosting => "gradient_boosting",
            Self::Linear => "linear",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gradient_boosting" | "boosting" | "gbt" => Ok(Self::GradientBoosting),
            "linear" | "ols" => Ok(Self::Linear),
            _ => Err(format!("Unknown model kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hyper-parameters for gradient-boosted trees
#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
    /// Number of boosting rounds
    pub rounds: usize,
    /// Shrinkage applied to every tree's output
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// L2 regularization on leaf weights
    pub lambda: f64,
    /// Minimum loss reduction required to split a node
    pub min_split_gain: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            lambda: 1.0,
            min_split_gain: 0.0,
        }
    }
}

impl BoostingParams {
    fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(Error::Config("boosting.rounds must be at least 1".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::Config(format!(
                "boosting.learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("boosting.max_depth must be at least 1".into()));
        }
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(Error::Config(format!(
                "boosting.lambda must be non-negative, got {}",
                self.lambda
            )));
        }
        if !self.min_split_gain.is_finite() || self.min_split_gain < 0.0 {
            return Err(Error::Config(format!(
                "boosting.min_split_gain must be non-negative, got {}",
                self.min_split_gain
            )));
        }
        Ok(())
    }
}

/// Forecast configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub model: ModelKind,
    pub boosting: BoostingParams,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::GradientBoosting,
            boosting: BoostingParams::default(),
        }
    }
}

impl ForecastConfig {
    /// Load configuration (explicit path, then data-dir override, then defaults)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(explicit) = path {
            if !explicit.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    explicit.display()
                )));
            }
        }

        let content = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading forecast config");
                fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            _ => DEFAULT_CONFIG.to_string(),
        };

        parse_config(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendcast").join("config").join("forecast.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    model: Option<RawModel>,
    boosting: Option<RawBoosting>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawModel {
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBoosting {
    rounds: Option<usize>,
    learning_rate: Option<f64>,
    max_depth: Option<usize>,
    lambda: Option<f64>,
    min_split_gain: Option<f64>,
}

fn parse_config(content: &str) -> Result<ForecastConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ForecastConfig::default();

    if let Some(kind) = raw.model.and_then(|m| m.kind) {
        config.model = kind.parse().map_err(Error::Config)?;
    }

    if let Some(boosting) = raw.boosting {
        let params = &mut config.boosting;
        if let Some(rounds) = boosting.rounds {
            params.rounds = rounds;
        }
        if let Some(rate) = boosting.learning_rate {
            params.learning_rate = rate;
        }
        if let Some(depth) = boosting.max_depth {
            params.max_depth = depth;
        }
        if let Some(lambda) = boosting.lambda {
            params.lambda = lambda;
        }
        if let Some(gain) = boosting.min_split_gain {
            params.min_split_gain = gain;
        }
    }

    config.boosting.validate()?;
    Ok(config)
}
