use thiserror::Error;

pub type FigureResult<T> = Result<T, FigureError>;

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("timed out after {seconds} seconds")]
    Timeout { seconds: f64 },

    #[error("no plotting routine is bound to figure `{0}`")]
    UnknownFigure(String),

    #[error("selected variable `{name}` is not one of the diagnostics columns")]
    UnknownVariable { name: String },

    #[error("figure `{figure}` needs model diagnostics but the source has none")]
    MissingDiagnostics { figure: String },

    #[error("invalid figure registry: {0}")]
    InvalidRegistry(String),

    #[error("invalid collector config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("rendering `{figure}` failed: {message}")]
    Render { figure: String, message: String },

    #[error("figure worker panicked: {message}")]
    WorkerPanicked { message: String },

    #[error("failed to spawn figure worker")]
    WorkerSpawn(#[source] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl FigureError {
    /// Shorthand used by plotting routines to report their own failures.
    #[must_use]
    pub fn render(figure: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            figure: figure.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
