pub mod figure;
pub mod names;
pub mod plotdata;
pub mod source;
pub mod trace;

pub use figure::{Figure, FigureLayout};
pub use names::{
    DEFAULT_DIAGNOSTICS_PREFIX, DEFAULT_FIGURE_NAMES, DEFAULT_SWEEP_FIGURES, FigureFamily,
};
pub use plotdata::{AimodelPlotdata, DiagnosticsInput, SweepVars};
pub use source::PlotSource;
pub use trace::{Trace, TraceKind};
