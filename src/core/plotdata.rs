use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{FigureError, FigureResult};

/// Column positions chosen for response sweeps; usually one or two.
pub type SweepVars = SmallVec<[usize; 4]>;

/// Model diagnostics attached to a simulation: the training matrix, its
/// column names, and the state needed by the `aimodel_*` figures.
///
/// Deserialized values go through the same checks as `new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlotdataFields")]
pub struct AimodelPlotdata {
    colnames: Vec<String>,
    x_train: Vec<Vec<f64>>,
    ytrue_train: Vec<bool>,
    slicing_x: Vec<f64>,
    varimps: Vec<f64>,
    sweep_vars: Option<SweepVars>,
}

#[derive(Deserialize)]
struct PlotdataFields {
    colnames: Vec<String>,
    x_train: Vec<Vec<f64>>,
    ytrue_train: Vec<bool>,
    slicing_x: Vec<f64>,
    #[serde(default)]
    varimps: Vec<f64>,
    #[serde(default)]
    sweep_vars: Option<SweepVars>,
}

impl TryFrom<PlotdataFields> for AimodelPlotdata {
    type Error = FigureError;

    fn try_from(fields: PlotdataFields) -> FigureResult<Self> {
        let mut plotdata = Self::new(
            fields.colnames,
            fields.x_train,
            fields.ytrue_train,
            fields.slicing_x,
        )?;
        if !fields.varimps.is_empty() {
            plotdata = plotdata.with_varimps(fields.varimps)?;
        }
        match fields.sweep_vars {
            Some(sweep_vars) => plotdata.with_sweep_vars(sweep_vars),
            None => Ok(plotdata),
        }
    }
}

impl AimodelPlotdata {
    pub fn new(
        colnames: Vec<String>,
        x_train: Vec<Vec<f64>>,
        ytrue_train: Vec<bool>,
        slicing_x: Vec<f64>,
    ) -> FigureResult<Self> {
        let plotdata = Self {
            colnames,
            x_train,
            ytrue_train,
            slicing_x,
            varimps: Vec::new(),
            sweep_vars: None,
        };
        plotdata.validate()?;
        Ok(plotdata)
    }

    /// Attaches per-column feature importances.
    pub fn with_varimps(mut self, varimps: Vec<f64>) -> FigureResult<Self> {
        if varimps.len() != self.colnames.len() {
            return Err(FigureError::InvalidData(format!(
                "expected {} variable importances, got {}",
                self.colnames.len(),
                varimps.len()
            )));
        }
        if varimps.iter().any(|value| !value.is_finite()) {
            return Err(FigureError::InvalidData(
                "variable importances must be finite".to_owned(),
            ));
        }
        self.varimps = varimps;
        Ok(self)
    }

    /// Returns a copy whose stored sweep selection is `sweep_vars`.
    pub fn with_sweep_vars(mut self, sweep_vars: SweepVars) -> FigureResult<Self> {
        if let Some(&index) = sweep_vars.iter().find(|&&index| index >= self.colnames.len()) {
            return Err(FigureError::InvalidData(format!(
                "sweep index {index} is out of range for {} columns",
                self.colnames.len()
            )));
        }
        self.sweep_vars = Some(sweep_vars);
        Ok(self)
    }

    fn validate(&self) -> FigureResult<()> {
        if self.colnames.is_empty() {
            return Err(FigureError::InvalidData(
                "diagnostics need at least one column".to_owned(),
            ));
        }
        for (index, name) in self.colnames.iter().enumerate() {
            if self.colnames[..index].contains(name) {
                return Err(FigureError::InvalidData(format!(
                    "duplicate diagnostics column `{name}`"
                )));
            }
        }
        if self.ytrue_train.len() != self.x_train.len() {
            return Err(FigureError::InvalidData(format!(
                "{} training rows but {} labels",
                self.x_train.len(),
                self.ytrue_train.len()
            )));
        }
        let width = self.colnames.len();
        if self
            .x_train
            .iter()
            .any(|row| row.len() != width || row.iter().any(|value| !value.is_finite()))
        {
            return Err(FigureError::InvalidData(format!(
                "training rows must hold {width} finite values"
            )));
        }
        if self.slicing_x.len() != width || self.slicing_x.iter().any(|value| !value.is_finite()) {
            return Err(FigureError::InvalidData(format!(
                "slicing point must hold {width} finite values"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn colnames(&self) -> &[String] {
        &self.colnames
    }

    #[must_use]
    pub fn x_train(&self) -> &[Vec<f64>] {
        &self.x_train
    }

    #[must_use]
    pub fn ytrue_train(&self) -> &[bool] {
        &self.ytrue_train
    }

    #[must_use]
    pub fn slicing_x(&self) -> &[f64] {
        &self.slicing_x
    }

    #[must_use]
    pub fn varimps(&self) -> &[f64] {
        &self.varimps
    }

    #[must_use]
    pub fn sweep_vars(&self) -> Option<&[usize]> {
        self.sweep_vars.as_deref()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.colnames.iter().position(|column| column == name)
    }

    /// Maps selected variable names to column positions, keeping selection order.
    pub fn resolve_sweep_vars<S: AsRef<str>>(&self, selected: &[S]) -> FigureResult<SweepVars> {
        selected
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column_index(name)
                    .ok_or_else(|| FigureError::UnknownVariable {
                        name: name.to_owned(),
                    })
            })
            .collect()
    }
}

/// Arguments for one diagnostics routine: the shared plot data plus the
/// sweep selection computed for this collection call.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsInput<'a> {
    plotdata: &'a AimodelPlotdata,
    sweep_vars: Option<&'a [usize]>,
}

impl<'a> DiagnosticsInput<'a> {
    #[must_use]
    pub fn new(plotdata: &'a AimodelPlotdata, sweep_vars: Option<&'a [usize]>) -> Self {
        Self {
            plotdata,
            sweep_vars,
        }
    }

    #[must_use]
    pub fn plotdata(&self) -> &'a AimodelPlotdata {
        self.plotdata
    }

    /// Sweep selection for this call, falling back to the plot data's stored one.
    #[must_use]
    pub fn sweep_vars(&self) -> Option<&'a [usize]> {
        self.sweep_vars.or_else(|| self.plotdata.sweep_vars())
    }

    /// Column names of the current sweep selection, in selection order.
    #[must_use]
    pub fn sweep_colnames(&self) -> Vec<&'a str> {
        self.sweep_vars()
            .unwrap_or_default()
            .iter()
            .filter_map(|&index| self.plotdata.colnames.get(index))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{AimodelPlotdata, DiagnosticsInput, SweepVars};
    use crate::error::FigureError;

    fn plotdata() -> AimodelPlotdata {
        AimodelPlotdata::new(
            vec!["colA".to_owned(), "colB".to_owned(), "colC".to_owned()],
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            vec![true, false],
            vec![2.5, 3.5, 4.5],
        )
        .expect("valid plotdata")
    }

    #[test]
    fn resolves_selected_names_in_selection_order() {
        let sweep = plotdata()
            .resolve_sweep_vars(&["colB", "colA"])
            .expect("known columns");
        assert_eq!(sweep.as_slice(), &[1, 0]);
    }

    #[test]
    fn unknown_selected_name_fails() {
        let err = plotdata()
            .resolve_sweep_vars(&["colA", "colZ"])
            .expect_err("colZ is not a column");
        assert!(matches!(err, FigureError::UnknownVariable { name } if name == "colZ"));
    }

    #[test]
    fn ragged_training_rows_are_rejected() {
        let result = AimodelPlotdata::new(
            vec!["a".to_owned(), "b".to_owned()],
            vec![vec![1.0]],
            vec![true],
            vec![0.0, 0.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let result = AimodelPlotdata::new(
            vec!["a".to_owned(), "a".to_owned()],
            Vec::new(),
            Vec::new(),
            vec![0.0, 0.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn call_selection_overrides_stored_selection() {
        let stored: SweepVars = smallvec![2];
        let data = plotdata().with_sweep_vars(stored).expect("in range");
        let call = [0usize, 1];

        assert_eq!(DiagnosticsInput::new(&data, None).sweep_vars(), Some(&[2usize][..]));
        let input = DiagnosticsInput::new(&data, Some(&call));
        assert_eq!(input.sweep_vars(), Some(&call[..]));
        assert_eq!(input.sweep_colnames(), vec!["colA", "colB"]);
    }

    #[test]
    fn out_of_range_stored_selection_is_rejected() {
        assert!(plotdata().with_sweep_vars(smallvec![3]).is_err());
    }

    #[test]
    fn deserialized_plotdata_is_validated() {
        let duplicate = r#"{"colnames":["a","a"],"x_train":[],"ytrue_train":[],
            "slicing_x":[0.0,0.0]}"#;
        assert!(serde_json::from_str::<AimodelPlotdata>(duplicate).is_err());

        let stray_sweep = r#"{"colnames":["a"],"x_train":[[1.0]],"ytrue_train":[true],
            "slicing_x":[0.0],"sweep_vars":[9]}"#;
        assert!(serde_json::from_str::<AimodelPlotdata>(stray_sweep).is_err());

        let short_varimps = r#"{"colnames":["a","b"],"x_train":[],"ytrue_train":[],
            "slicing_x":[0.0,0.0],"varimps":[1.0]}"#;
        assert!(serde_json::from_str::<AimodelPlotdata>(short_varimps).is_err());
    }

    #[test]
    fn serialized_plotdata_reads_back() {
        let data = plotdata()
            .with_varimps(vec![0.5, 0.3, 0.2])
            .expect("varimps")
            .with_sweep_vars(smallvec![1, 0])
            .expect("in range");
        let json = serde_json::to_string(&data).expect("serialize");
        let parsed: AimodelPlotdata = serde_json::from_str(&json).expect("valid json");
        assert_eq!(parsed, data);
    }
}
