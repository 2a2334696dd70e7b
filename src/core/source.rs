use crate::core::AimodelPlotdata;

/// Simulation results a dashboard draws figures from.
///
/// Sources are shared with figure workers through `Arc`, hence the
/// `Send + Sync + 'static` bound. Standard routines receive the whole source;
/// diagnostics routines only see what `aimodel_plotdata` exposes.
pub trait PlotSource: Send + Sync + 'static {
    /// Model diagnostics, once a model has been trained.
    fn aimodel_plotdata(&self) -> Option<&AimodelPlotdata>;
}
