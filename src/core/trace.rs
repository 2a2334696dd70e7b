use serde::{Deserialize, Serialize};

use crate::error::{FigureError, FigureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Line,
    Scatter,
    Bar,
    Heatmap,
}

/// One data series inside a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Row-major cell values, heatmaps only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<Vec<Vec<f64>>>,
}

impl Trace {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TraceKind, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            x,
            y,
            z: None,
        }
    }

    #[must_use]
    pub fn heatmap(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>, z: Vec<Vec<f64>>) -> Self {
        Self {
            name: name.into(),
            kind: TraceKind::Heatmap,
            x,
            y,
            z: Some(z),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn validate(&self) -> FigureResult<()> {
        if self.kind != TraceKind::Heatmap && self.x.len() != self.y.len() {
            return Err(FigureError::InvalidData(format!(
                "trace `{}` has {} x values but {} y values",
                self.name,
                self.x.len(),
                self.y.len()
            )));
        }
        if self.x.iter().chain(self.y.iter()).any(|value| !value.is_finite()) {
            return Err(FigureError::InvalidData(format!(
                "trace `{}` coordinates must be finite",
                self.name
            )));
        }

        match (&self.z, self.kind) {
            (Some(rows), TraceKind::Heatmap) => {
                if rows.len() != self.y.len() {
                    return Err(FigureError::InvalidData(format!(
                        "heatmap `{}` needs one z row per y value",
                        self.name
                    )));
                }
                for row in rows {
                    if row.len() != self.x.len() || row.iter().any(|value| !value.is_finite()) {
                        return Err(FigureError::InvalidData(format!(
                            "heatmap `{}` z rows must be finite and match x length",
                            self.name
                        )));
                    }
                }
                Ok(())
            }
            (None, TraceKind::Heatmap) => Err(FigureError::InvalidData(format!(
                "heatmap `{}` is missing z values",
                self.name
            ))),
            (Some(_), _) => Err(FigureError::InvalidData(format!(
                "only heatmap traces carry z values (trace `{}`)",
                self.name
            ))),
            (None, _) => Ok(()),
        }
    }
}
