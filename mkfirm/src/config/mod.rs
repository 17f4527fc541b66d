//! Model configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! model:
//!   window_policy: within_hyperperiod   # | wrap_around | reject_short
//!   product_encoding: linearized        # | native
//!   hyperperiod_limit: 1000000
//! ```
//!
//! Every key is optional.  A file without a `model:` section yields
//! [`ModelConfig::default()`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::hyperperiod::DEFAULT_HYPERPERIOD_LIMIT;
use crate::task::Time;

// ── Policies ──────────────────────────────────────────────────────────────────

/// Which (m,k) windows the window generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Only windows that fit entirely inside one hyperperiod.  A task with
    /// `k > n_i` gets no window constraint at all.
    #[default]
    WithinHyperperiod,
    /// Also the `k − 1` windows that run across the hyperperiod boundary into
    /// the next (identical) hyperperiod.
    WrapAround,
    /// Like `WithinHyperperiod`, but `k > n_i` is a construction error.
    RejectShort,
}

/// How the demand rows express "assigned to `l` and accepted".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductEncoding {
    /// Auxiliary `W[i,j,l]` with `W ≤ X`, `W ≤ Y`, `W ≥ X + Y − 1`.
    #[default]
    Linearized,
    /// Keep `X[i,l]·Y[i,j]` in the row; needs a solver with binary-product
    /// support.
    Native,
}

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    model: Option<ModelSection>,
}

#[derive(Debug, Deserialize)]
struct ModelSection {
    #[serde(default)]
    window_policy: WindowPolicy,
    #[serde(default)]
    product_encoding: ProductEncoding,
    #[serde(default = "default_hyperperiod_limit")]
    hyperperiod_limit: Time,
}

fn default_hyperperiod_limit() -> Time {
    DEFAULT_HYPERPERIOD_LIMIT
}

// ── ModelConfig ───────────────────────────────────────────────────────────────

/// Knobs of the model generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub window_policy: WindowPolicy,
    pub product_encoding: ProductEncoding,
    pub hyperperiod_limit: Time,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            window_policy: WindowPolicy::default(),
            product_encoding: ProductEncoding::default(),
            hyperperiod_limit: DEFAULT_HYPERPERIOD_LIMIT,
        }
    }
}

impl ModelConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse model configuration YAML")?;
        Ok(file.model.map(Self::from).unwrap_or_default())
    }

    /// Read and parse `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the YAML is
    /// structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading model configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        debug!(
            window_policy = ?config.window_policy,
            product_encoding = ?config.product_encoding,
            hyperperiod_limit = config.hyperperiod_limit,
            "Model configuration"
        );
        Ok(config)
    }
}

impl From<ModelSection> for ModelConfig {
    fn from(s: ModelSection) -> Self {
        Self {
            window_policy: s.window_policy,
            product_encoding: s.product_encoding,
            hyperperiod_limit: s.hyperperiod_limit,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
