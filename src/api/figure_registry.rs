use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::{DEFAULT_DIAGNOSTICS_PREFIX, DiagnosticsInput, Figure, FigureFamily, PlotSource};
use crate::error::{FigureError, FigureResult};
use crate::invoke::CancelToken;

pub type StandardRenderFn<S> =
    Arc<dyn Fn(&S, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static>;
pub type DiagnosticsRenderFn = Arc<
    dyn Fn(&DiagnosticsInput<'_>, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static,
>;

/// Plotting routine statically bound to one figure name.
pub enum FigureBinding<S> {
    Standard(StandardRenderFn<S>),
    Diagnostics(DiagnosticsRenderFn),
}

impl<S> FigureBinding<S> {
    #[must_use]
    pub fn family(&self) -> FigureFamily {
        match self {
            Self::Standard(_) => FigureFamily::Standard,
            Self::Diagnostics(_) => FigureFamily::ModelDiagnostics,
        }
    }
}

impl<S> Clone for FigureBinding<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Standard(render) => Self::Standard(Arc::clone(render)),
            Self::Diagnostics(render) => Self::Diagnostics(Arc::clone(render)),
        }
    }
}

impl<S> fmt::Debug for FigureBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FigureBinding").field(&self.family()).finish()
    }
}

/// Ordered table from figure name to plotting routine, built once at startup.
///
/// Iteration order is registration order, which is the dashboard's display
/// order. A binding's kind always agrees with the family its name implies.
pub struct FigureRegistry<S> {
    diagnostics_prefix: String,
    bindings: IndexMap<String, FigureBinding<S>>,
}

impl<S: PlotSource> Default for FigureRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for FigureRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            diagnostics_prefix: self.diagnostics_prefix.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl<S> fmt::Debug for FigureRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FigureRegistry")
            .field("diagnostics_prefix", &self.diagnostics_prefix)
            .field("names", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S: PlotSource> FigureRegistry<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_diagnostics_prefix(DEFAULT_DIAGNOSTICS_PREFIX)
    }

    #[must_use]
    pub fn with_diagnostics_prefix(prefix: impl Into<String>) -> Self {
        Self {
            diagnostics_prefix: prefix.into(),
            bindings: IndexMap::new(),
        }
    }

    /// Binds a routine rendering from the plot source itself.
    pub fn register_standard<F>(&mut self, name: impl Into<String>, render: F) -> FigureResult<()>
    where
        F: Fn(&S, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static,
    {
        self.insert(name.into(), FigureBinding::Standard(Arc::new(render)))
    }

    /// Binds a routine rendering from the source's model diagnostics.
    pub fn register_diagnostics<F>(
        &mut self,
        name: impl Into<String>,
        render: F,
    ) -> FigureResult<()>
    where
        F: Fn(&DiagnosticsInput<'_>, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static,
    {
        self.insert(name.into(), FigureBinding::Diagnostics(Arc::new(render)))
    }

    /// Chaining form of `register_standard`.
    pub fn with_standard<F>(mut self, name: impl Into<String>, render: F) -> FigureResult<Self>
    where
        F: Fn(&S, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static,
    {
        self.register_standard(name, render)?;
        Ok(self)
    }

    /// Chaining form of `register_diagnostics`.
    pub fn with_diagnostics<F>(mut self, name: impl Into<String>, render: F) -> FigureResult<Self>
    where
        F: Fn(&DiagnosticsInput<'_>, &CancelToken) -> FigureResult<Figure> + Send + Sync + 'static,
    {
        self.register_diagnostics(name, render)?;
        Ok(self)
    }

    fn insert(&mut self, name: String, binding: FigureBinding<S>) -> FigureResult<()> {
        if name.is_empty() {
            return Err(FigureError::InvalidRegistry(
                "figure name must not be empty".to_owned(),
            ));
        }
        if name.contains('\0') {
            return Err(FigureError::InvalidRegistry(format!(
                "figure name {name:?} contains a NUL byte"
            )));
        }
        if self.bindings.contains_key(&name) {
            return Err(FigureError::InvalidRegistry(format!(
                "figure `{name}` is already registered"
            )));
        }
        let family = self.family_of(&name);
        if family != binding.family() {
            return Err(FigureError::InvalidRegistry(format!(
                "figure `{name}` is a {family:?} name but was bound as {:?}",
                binding.family()
            )));
        }
        self.bindings.insert(name, binding);
        Ok(())
    }

    /// Returns a registry holding only `names`, in the order given.
    ///
    /// Fails before anything runs when a name has no binding.
    pub fn restrict_to<N: AsRef<str>>(&self, names: &[N]) -> FigureResult<Self> {
        let mut bindings = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let binding = self
                .bindings
                .get(name)
                .ok_or_else(|| FigureError::UnknownFigure(name.to_owned()))?;
            if bindings.insert(name.to_owned(), binding.clone()).is_some() {
                return Err(FigureError::InvalidRegistry(format!(
                    "figure `{name}` is listed twice"
                )));
            }
        }
        Ok(Self {
            diagnostics_prefix: self.diagnostics_prefix.clone(),
            bindings,
        })
    }

    /// Removes a binding, keeping the order of the remaining ones.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.bindings.shift_remove(name).is_some()
    }
}

impl<S> FigureRegistry<S> {
    #[must_use]
    pub fn diagnostics_prefix(&self) -> &str {
        &self.diagnostics_prefix
    }

    #[must_use]
    pub fn family_of(&self, name: &str) -> FigureFamily {
        FigureFamily::classify(name, &self.diagnostics_prefix)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FigureBinding<S>> {
        self.bindings.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FigureBinding<S>)> {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
