use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_DIAGNOSTICS_PREFIX, DEFAULT_SWEEP_FIGURES, FigureFamily};
use crate::error::{FigureError, FigureResult};
use crate::invoke::timeout_from_secs;

/// Figure collector configuration.
///
/// Serializable so dashboards can keep it next to their own settings; every
/// field is optional in JSON and falls back to the dashboard defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Deadline applied to each figure routine individually.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_diagnostics_prefix")]
    pub diagnostics_prefix: String,
    /// Diagnostics figures that receive the selected sweep variables.
    #[serde(default = "default_sweep_figures")]
    pub sweep_figures: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            diagnostics_prefix: default_diagnostics_prefix(),
            sweep_figures: default_sweep_figures(),
        }
    }
}

impl CollectorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: f64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_diagnostics_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.diagnostics_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_sweep_figures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sweep_figures = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> FigureResult<()> {
        timeout_from_secs(self.timeout_secs)?;
        if self.diagnostics_prefix.is_empty() {
            return Err(FigureError::InvalidConfig(
                "diagnostics prefix must not be empty".to_owned(),
            ));
        }
        if let Some(name) = self
            .sweep_figures
            .iter()
            .find(|name| self.family_of(name) != FigureFamily::ModelDiagnostics)
        {
            return Err(FigureError::InvalidConfig(format!(
                "sweep figure `{name}` lacks the `{}` prefix",
                self.diagnostics_prefix
            )));
        }
        Ok(())
    }

    /// Per-figure deadline.
    pub fn timeout(&self) -> FigureResult<Duration> {
        timeout_from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn family_of(&self, name: &str) -> FigureFamily {
        FigureFamily::classify(name, &self.diagnostics_prefix)
    }

    #[must_use]
    pub fn is_sweep_figure(&self, name: &str) -> bool {
        self.sweep_figures.iter().any(|sweep| sweep == name)
    }

    pub fn from_json_str(input: &str) -> FigureResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> FigureResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn default_timeout_secs() -> f64 {
    2.0
}

fn default_diagnostics_prefix() -> String {
    DEFAULT_DIAGNOSTICS_PREFIX.to_owned()
}

fn default_sweep_figures() -> Vec<String> {
    DEFAULT_SWEEP_FIGURES.iter().map(|name| (*name).to_owned()).collect()
}
