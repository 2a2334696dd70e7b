use serde::{Deserialize, Serialize};

/// Reserved prefix marking model-diagnostics figures.
pub const DEFAULT_DIAGNOSTICS_PREFIX: &str = "aimodel";

/// Diagnostics figures whose rendering depends on the selected sweep variables.
pub const DEFAULT_SWEEP_FIGURES: [&str; 2] = ["aimodel_response", "aimodel_varimps"];

/// Dashboard display order.
pub const DEFAULT_FIGURE_NAMES: [&str; 9] = [
    "pdr_profit_vs_time",
    "trader_profit_vs_time",
    "accuracy_vs_time",
    "pdr_profit_vs_ptrue",
    "trader_profit_vs_ptrue",
    "aimodel_varimps",
    "aimodel_response",
    "f1_precision_recall_vs_time",
    "log_loss_vs_time",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FigureFamily {
    /// Rendered from the plot source itself.
    Standard,
    /// Rendered from the source's model diagnostics data.
    ModelDiagnostics,
}

impl FigureFamily {
    /// Classifies a figure name by its prefix.
    #[must_use]
    pub fn classify(name: &str, diagnostics_prefix: &str) -> Self {
        if name.starts_with(diagnostics_prefix) {
            Self::ModelDiagnostics
        } else {
            Self::Standard
        }
    }
}
