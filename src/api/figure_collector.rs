use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, debug_span, warn};

use crate::core::{DiagnosticsInput, Figure, PlotSource};
use crate::error::{FigureError, FigureResult};
use crate::invoke::{BoundedTask, spawn_bounded};

use super::{
    CollectionReport, CollectorConfig, FigureBinding, FigureMap, FigureOutcome, FigureRegistry,
};

/// Renders every registered figure under a per-figure deadline.
///
/// Figures are processed one at a time in registry order, each on its own
/// worker. A missed deadline stores `Figure::empty()` under that name; every
/// other failure aborts the call and no partial mapping is returned.
pub struct FigureCollector<S> {
    registry: FigureRegistry<S>,
    config: CollectorConfig,
    timeout: Duration,
}

impl<S> Clone for FigureCollector<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            config: self.config.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S> fmt::Debug for FigureCollector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FigureCollector")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<S: PlotSource> FigureCollector<S> {
    pub fn new(registry: FigureRegistry<S>, config: CollectorConfig) -> FigureResult<Self> {
        config.validate()?;
        if registry.diagnostics_prefix() != config.diagnostics_prefix {
            return Err(FigureError::InvalidConfig(format!(
                "registry classifies with prefix `{}` but config uses `{}`",
                registry.diagnostics_prefix(),
                config.diagnostics_prefix
            )));
        }
        let timeout = config.timeout()?;
        Ok(Self {
            registry,
            config,
            timeout,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &FigureRegistry<S> {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Collects all figures using the configured per-figure timeout.
    pub fn collect<N: AsRef<str>>(
        &self,
        source: &Arc<S>,
        selected_vars: &[N],
    ) -> FigureResult<FigureMap> {
        self.collect_with_report(source, selected_vars, self.timeout)
            .map(CollectionReport::into_figures)
    }

    /// Collects all figures with an explicit per-figure timeout.
    pub fn collect_with_timeout<N: AsRef<str>>(
        &self,
        source: &Arc<S>,
        selected_vars: &[N],
        timeout: Duration,
    ) -> FigureResult<FigureMap> {
        self.collect_with_report(source, selected_vars, timeout)
            .map(CollectionReport::into_figures)
    }

    /// Like `collect_with_timeout`, also reporting how each figure resolved.
    pub fn collect_with_report<N: AsRef<str>>(
        &self,
        source: &Arc<S>,
        selected_vars: &[N],
        timeout: Duration,
    ) -> FigureResult<CollectionReport> {
        if timeout.is_zero() {
            return Err(FigureError::InvalidConfig("timeout must be > 0".to_owned()));
        }
        let span = debug_span!("collect_figures", figures = self.registry.len());
        let _entered = span.enter();

        let mut report = CollectionReport::new(Utc::now(), self.registry.len());
        for (name, binding) in self.registry.iter() {
            let started = Instant::now();
            let task = self.dispatch(name, binding, source, selected_vars)?;

            match task.wait(timeout) {
                Ok(figure) => {
                    figure.validate()?;
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    debug!(figure = name, elapsed_ms, "figure rendered");
                    report.record(name, figure, FigureOutcome::Completed { elapsed_ms });
                }
                Err(FigureError::Timeout { seconds }) => {
                    warn!(
                        figure = name,
                        timeout_secs = seconds,
                        "figure timed out; storing placeholder"
                    );
                    report.record(
                        name,
                        Figure::empty(),
                        FigureOutcome::TimedOut {
                            timeout_ms: timeout.as_millis() as u64,
                        },
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }

    fn dispatch<N: AsRef<str>>(
        &self,
        name: &str,
        binding: &FigureBinding<S>,
        source: &Arc<S>,
        selected_vars: &[N],
    ) -> FigureResult<BoundedTask<Figure>> {
        match binding {
            FigureBinding::Standard(render) => {
                let render = Arc::clone(render);
                let source = Arc::clone(source);
                spawn_bounded(name, move |token| render(&*source, token))
            }
            FigureBinding::Diagnostics(render) => {
                let plotdata = source
                    .aimodel_plotdata()
                    .ok_or_else(|| FigureError::MissingDiagnostics {
                        figure: name.to_owned(),
                    })?;
                let sweep_vars = if self.config.is_sweep_figure(name) {
                    Some(plotdata.resolve_sweep_vars(selected_vars)?)
                } else {
                    None
                };

                let render = Arc::clone(render);
                let source = Arc::clone(source);
                let figure = name.to_owned();
                spawn_bounded(name, move |token| {
                    let plotdata = source
                        .aimodel_plotdata()
                        .ok_or(FigureError::MissingDiagnostics { figure })?;
                    let input = DiagnosticsInput::new(plotdata, sweep_vars.as_deref());
                    render(&input, token)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::FigureCollector;
    use crate::api::{CollectorConfig, FigureRegistry};
    use crate::core::{AimodelPlotdata, Figure, PlotSource};

    struct NoDiagnostics;

    impl PlotSource for NoDiagnostics {
        fn aimodel_plotdata(&self) -> Option<&AimodelPlotdata> {
            None
        }
    }

    #[test]
    fn prefix_mismatch_between_registry_and_config_is_rejected() {
        let registry = FigureRegistry::<NoDiagnostics>::with_diagnostics_prefix("model");
        let result = FigureCollector::new(registry, CollectorConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn invalid_timeout_is_rejected_up_front() {
        let registry = FigureRegistry::<NoDiagnostics>::new()
            .with_standard("x", |_: &NoDiagnostics, _| Ok(Figure::empty()))
            .expect("register");
        let config = CollectorConfig::default().with_timeout_secs(0.0);
        assert!(FigureCollector::new(registry, config).is_err());
    }

    #[test]
    fn clones_and_debugs_without_source_bounds() {
        let registry = FigureRegistry::<NoDiagnostics>::new()
            .with_standard("x", |_: &NoDiagnostics, _| Ok(Figure::new("x")))
            .expect("register");
        let collector =
            FigureCollector::new(registry, CollectorConfig::default()).expect("collector");

        let copy = collector.clone();
        assert_eq!(copy.registry().names().collect::<Vec<_>>(), ["x"]);
        assert_eq!(copy.timeout(), collector.timeout());
        assert!(format!("{copy:?}").contains("FigureCollector"));

        let figures = copy
            .collect::<&str>(&Arc::new(NoDiagnostics), &[])
            .expect("collection succeeds");
        assert_eq!(figures["x"], Figure::new("x"));
    }
}
