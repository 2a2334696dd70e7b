use serde::{Deserialize, Serialize};

use crate::core::Trace;
use crate::error::{FigureError, FigureResult};

/// Axis titles and optional pixel size hints consumed by the display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FigureLayout {
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_title: Option<String>,
    #[serde(default)]
    pub width_px: Option<u32>,
    #[serde(default)]
    pub height_px: Option<u32>,
}

impl FigureLayout {
    fn validate(&self) -> FigureResult<()> {
        if self.width_px == Some(0) || self.height_px == Some(0) {
            return Err(FigureError::InvalidData(
                "figure size hints must be > 0 when set".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Backend-agnostic chart value handed to the dashboard.
///
/// `Figure::empty()` doubles as the placeholder stored for figures whose
/// routine missed its deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub layout: FigureLayout,
}

impl Figure {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Empty chart with no title, no traces and default layout.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    #[must_use]
    pub fn with_axis_titles(
        mut self,
        x_title: impl Into<String>,
        y_title: impl Into<String>,
    ) -> Self {
        self.layout.x_title = Some(x_title.into());
        self.layout.y_title = Some(y_title.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, width_px: u32, height_px: u32) -> Self {
        self.layout.width_px = Some(width_px);
        self.layout.height_px = Some(height_px);
        self
    }

    pub fn validate(&self) -> FigureResult<()> {
        self.layout.validate()?;
        for trace in &self.traces {
            trace.validate()?;
        }
        Ok(())
    }

    /// True for the placeholder: nothing a display layer could draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty() && self.title.is_none() && self.layout == FigureLayout::default()
    }
}

#[cfg(test)]
mod tests {
    use super::Figure;
    use crate::core::{Trace, TraceKind};

    #[test]
    fn placeholder_is_empty_and_valid() {
        let placeholder = Figure::empty();
        assert!(placeholder.is_empty());
        placeholder.validate().expect("placeholder validates");
    }

    #[test]
    fn titled_figure_is_not_empty() {
        assert!(!Figure::new("accuracy").is_empty());
    }

    #[test]
    fn zero_size_hint_is_rejected() {
        let figure = Figure::new("x").with_size(0, 300);
        assert!(figure.validate().is_err());
    }

    #[test]
    fn invalid_trace_fails_figure_validation() {
        let trace = Trace::new("bad", TraceKind::Line, vec![0.0, 1.0], vec![f64::NAN, 1.0]);
        let figure = Figure::new("x").with_trace(trace);
        assert!(figure.validate().is_err());
    }
}
