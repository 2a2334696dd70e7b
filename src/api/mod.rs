mod collection_report;
mod collector_config;
mod figure_collector;
mod figure_registry;

pub use collection_report::{CollectionReport, FigureMap, FigureOutcome};
pub use collector_config::CollectorConfig;
pub use figure_collector::FigureCollector;
pub use figure_registry::{DiagnosticsRenderFn, FigureBinding, FigureRegistry, StandardRenderFn};
