//! sim-figures: deadline-bounded figure collection for simulation dashboards.
//!
//! A `FigureRegistry` binds each figure name to a plotting routine once at
//! startup. `FigureCollector` walks that registry in display order, runs
//! every routine on its own worker under a per-figure timeout, and returns
//! the figures keyed by name. Slow figures degrade to an empty placeholder;
//! any other failure fails the whole collection.

pub mod api;
pub mod core;
pub mod error;
pub mod invoke;
pub mod telemetry;

pub use api::{CollectionReport, CollectorConfig, FigureCollector, FigureMap, FigureRegistry};
pub use error::{FigureError, FigureResult};
