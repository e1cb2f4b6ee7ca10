use crate::plot::{self, PlotError, PlotSettings};
use crate::validation::{InputError, Selection, SelectionError, ValidSelection, parse_input};
use logistic::{LogisticClassifier, LogisticError, LogisticParams};
use ndarray::array;
use predict_helpers::{DataPoint, Table, TableError};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What went wrong while preparing or fitting the training set.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] TableError),
    #[error(transparent)]
    Model(#[from] LogisticError),
}

/// A failed user action. The `Display` text is what the status line shows.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("Failed to load CSV: {0}")]
    Load(#[source] TableError),
    #[error("Please upload or paste data first")]
    NoData,
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("Error while training model: {0}")]
    Train(#[source] TrainError),
    #[error("Error while plotting graph: {0}")]
    Plot(#[source] PlotError),
    #[error("Please train the model first")]
    NoModel,
    #[error("Invalid input. Please enter valid numbers.")]
    InvalidInput(#[source] InputError),
    #[error("Error during prediction: {0}")]
    Predict(#[source] LogisticError),
}

/// A successful user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// A CSV file was loaded; `columns` feeds all three drop-downs.
    Loaded { path: PathBuf, columns: Vec<String> },
    Trained,
    /// The scatter plot was written to this PNG.
    Plotted(PathBuf),
    Predicted(String),
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Loaded { path, .. } => write!(f, "Successfully loaded {}", path.display()),
            Status::Trained => write!(f, "Model trained successfully!"),
            Status::Plotted(path) => write!(f, "Graph saved to {}", path.display()),
            Status::Predicted(label) => write!(f, "Prediction: {label}"),
        }
    }
}

/// The state shared by every handler: the loaded table, the fitted model and
/// the current column selection.
pub struct Session {
    data: Option<Table>,
    model: Option<LogisticClassifier>,
    pub selection: Selection,
    params: LogisticParams,
    plot_settings: PlotSettings,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LogisticParams::default(), PlotSettings::default())
    }
}

impl Session {
    pub fn new(params: LogisticParams, plot_settings: PlotSettings) -> Self {
        Self {
            data: None,
            model: None,
            selection: Selection::default(),
            params,
            plot_settings,
        }
    }

    /// Column names of the loaded table; empty before the first upload.
    pub fn columns(&self) -> &[String] {
        self.data.as_ref().map(Table::columns).unwrap_or_default()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Loads the CSV file picked in the file dialog.
    ///
    /// A failed load leaves the previous table in place.
    pub fn upload(&mut self, path: Option<&Path>) -> Result<Status, ActionError> {
        let path = path.ok_or(ActionError::NoFileSelected)?;
        let table = Table::from_path(path).map_err(ActionError::Load)?;
        let columns = table.columns().to_vec();
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            columns = columns.len(),
            "loaded CSV"
        );
        self.selection.retain_columns(&columns);
        self.data = Some(table);
        Ok(Status::Loaded {
            path: path.to_path_buf(),
            columns,
        })
    }

    /// Table and selection, once both are usable for training or plotting.
    fn prepared(&self) -> Result<(&Table, ValidSelection<'_>), ActionError> {
        let table = self.data.as_ref().ok_or(ActionError::NoData)?;
        let selection = self.selection.validate()?;
        Ok((table, selection))
    }

    /// Fits a fresh classifier on the selected columns.
    ///
    /// The previous model is dropped whether or not the fit succeeds.
    pub fn train(&mut self) -> Result<Status, ActionError> {
        let (table, selection) = self.prepared()?;
        let fitted = fit(table, selection, &self.params);
        match fitted {
            Ok(model) => {
                tracing::info!(
                    feature1 = selection.feature1,
                    feature2 = selection.feature2,
                    target = selection.target,
                    classes = ?model.classes(),
                    "model trained"
                );
                self.model = Some(model);
                Ok(Status::Trained)
            }
            Err(err) => {
                self.model = None;
                Err(ActionError::Train(err))
            }
        }
    }

    /// Renders the scatter plot of the selected columns.
    pub fn plot(&self) -> Result<Status, ActionError> {
        let (table, selection) = self.prepared()?;
        plot::render_scatter(table, selection, &self.plot_settings)
            .map(Status::Plotted)
            .map_err(ActionError::Plot)
    }

    /// Runs the fitted model on the two text inputs.
    pub fn predict(&self, input1: &str, input2: &str) -> Result<Status, ActionError> {
        let model = self.model.as_ref().ok_or(ActionError::NoModel)?;
        let x1 = parse_input(input1).map_err(ActionError::InvalidInput)?;
        let x2 = parse_input(input2).map_err(ActionError::InvalidInput)?;
        let features = array![x1, x2];

        let label = model.predict(features.view()).map_err(ActionError::Predict)?;
        if let Ok(probabilities) = model.probabilities(features.view()) {
            tracing::debug!(?probabilities, "class probabilities");
        }
        Ok(Status::Predicted(label))
    }
}

fn fit(
    table: &Table,
    selection: ValidSelection<'_>,
    params: &LogisticParams,
) -> Result<LogisticClassifier, TrainError> {
    let records = table.feature_matrix(selection.feature1, selection.feature2)?;
    let labels = table.label_column(selection.target)?;
    let data: Vec<DataPoint<String>> = records
        .rows()
        .into_iter()
        .zip(labels)
        .map(|(row, label)| DataPoint::new(row.to_owned(), label))
        .collect();
    Ok(LogisticClassifier::fit(params, &data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BLOBS: &str = "\
height,weight,label,constant
1.0,1.0,0,x
2.0,1.5,0,x
1.5,2.0,0,x
0.5,1.0,0,x
8.0,8.0,1,x
9.0,8.5,1,x
8.5,9.0,1,x
9.5,9.0,1,x
";

    fn csv_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn loaded(text: &str) -> (Session, NamedTempFile) {
        let file = csv_file(text);
        let mut session = Session::default();
        session.upload(Some(file.path())).unwrap();
        (session, file)
    }

    #[test]
    fn test_upload_populates_columns() {
        let file = csv_file(BLOBS);
        let mut session = Session::default();
        let status = session.upload(Some(file.path())).unwrap();
        let Status::Loaded { columns, .. } = &status else {
            panic!("unexpected status {status:?}");
        };
        assert_eq!(columns, &["height", "weight", "label", "constant"]);
        assert_eq!(session.columns(), columns.as_slice());
        assert!(status.to_string().starts_with("Successfully loaded "));
    }

    #[test]
    fn test_upload_without_file() {
        let mut session = Session::default();
        let err = session.upload(None).unwrap_err();
        assert_eq!(err.to_string(), "No file selected");
    }

    #[test]
    fn test_failed_upload_keeps_previous_table() {
        let (mut session, _file) = loaded(BLOBS);
        let broken = csv_file("a,b\n1,2,3\n");
        let err = session.upload(Some(broken.path())).unwrap_err();
        assert!(matches!(err, ActionError::Load(TableError::RaggedRow { .. })));
        assert!(err.to_string().starts_with("Failed to load CSV: "));
        assert_eq!(session.columns().len(), 4);
    }

    #[test]
    fn test_upload_prunes_stale_selection() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "weight", "label");
        let other = csv_file("height,age,label\n1,2,0\n");
        session.upload(Some(other.path())).unwrap();
        assert_eq!(session.selection.feature1.as_deref(), Some("height"));
        assert_eq!(session.selection.feature2, None);
        assert_eq!(session.selection.target.as_deref(), Some("label"));
    }

    #[test]
    fn test_train_without_data() {
        let mut session = Session::default();
        session.selection = Selection::new("a", "b", "c");
        let err = session.train().unwrap_err();
        assert_eq!(err.to_string(), "Please upload or paste data first");
    }

    #[test]
    fn test_train_with_incomplete_selection() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection.feature1 = Some("height".to_string());
        let err = session.train().unwrap_err();
        assert_eq!(err.to_string(), "Please select features and target");
    }

    #[test]
    fn test_train_rejects_identical_features_before_fitting() {
        let (mut session, _file) = loaded(BLOBS);
        // A single-class target would make the solver fail; the duplicate
        // check must win.
        session.selection = Selection::new("height", "height", "constant");
        let err = session.train().unwrap_err();
        assert!(matches!(
            err,
            ActionError::Selection(SelectionError::DuplicateFeatures)
        ));
        assert_eq!(err.to_string(), "Feature 1 and Feature 2 must be different");
    }

    #[test]
    fn test_train_and_predict() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "weight", "label");
        let status = session.train().unwrap();
        assert_eq!(status.to_string(), "Model trained successfully!");
        assert!(session.has_model());

        let low = session.predict("0", "0").unwrap();
        assert_eq!(low, Status::Predicted("0".to_string()));
        assert_eq!(low.to_string(), "Prediction: 0");
        let high = session.predict(" 10 ", "10.5").unwrap();
        assert_eq!(high.to_string(), "Prediction: 1");
    }

    #[test]
    fn test_failed_training_clears_model() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "weight", "label");
        session.train().unwrap();

        session.selection = Selection::new("height", "weight", "constant");
        let err = session.train().unwrap_err();
        assert!(matches!(
            err,
            ActionError::Train(TrainError::Model(LogisticError::SingleClass(_)))
        ));
        assert!(err.to_string().starts_with("Error while training model: "));
        assert!(!session.has_model());
    }

    #[test]
    fn test_training_on_text_features_fails() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "constant", "label");
        let err = session.train().unwrap_err();
        assert!(matches!(
            err,
            ActionError::Train(TrainError::Data(TableError::NotNumeric { .. }))
        ));
    }

    #[test]
    fn test_predict_before_training() {
        let (session, _file) = loaded(BLOBS);
        let err = session.predict("1", "2").unwrap_err();
        assert_eq!(err.to_string(), "Please train the model first");
    }

    #[test]
    fn test_predict_with_non_numeric_input() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "weight", "label");
        session.train().unwrap();

        let err = session.predict("one", "2").unwrap_err();
        assert!(matches!(err, ActionError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Invalid input. Please enter valid numbers.");
        let other = ActionError::Predict(LogisticError::EmptyTrainingSet);
        assert_ne!(err.to_string(), other.to_string());
        assert!(other.to_string().starts_with("Error during prediction: "));
    }

    #[test]
    fn test_new_upload_keeps_model_and_replaces_table() {
        let (mut session, _file) = loaded(BLOBS);
        session.selection = Selection::new("height", "weight", "label");
        session.train().unwrap();

        let other = csv_file("age,income\n30,1000\n40,2000\n");
        session.upload(Some(other.path())).unwrap();
        assert_eq!(session.columns(), ["age", "income"]);
        assert_eq!(session.selection, Selection::default());

        assert!(session.has_model());
        let status = session.predict("10", "10").unwrap();
        assert_eq!(status, Status::Predicted("1".to_string()));
    }

    #[test]
    fn test_plot_writes_png() {
        let (mut session, _file) = loaded(BLOBS);
        for target in ["label", "constant"] {
            session.selection = Selection::new("height", "weight", target);
            let status = session.plot().unwrap();
            assert!(status.to_string().starts_with("Graph saved to "));
            let Status::Plotted(path) = status else {
                panic!("unexpected status {status:?}");
            };
            assert!(path.exists());
            std::fs::remove_file(&path).unwrap();
        }
    }

    #[test]
    fn test_plot_preconditions() {
        let session = Session::default();
        assert!(matches!(session.plot(), Err(ActionError::NoData)));

        let (mut session, _file) = loaded(BLOBS);
        assert!(matches!(
            session.plot(),
            Err(ActionError::Selection(SelectionError::Incomplete))
        ));
        session.selection = Selection::new("weight", "weight", "label");
        assert!(matches!(
            session.plot(),
            Err(ActionError::Selection(SelectionError::DuplicateFeatures))
        ));
        session.selection = Selection::new("weight", "missing", "label");
        let err = session.plot().unwrap_err();
        assert!(err.to_string().starts_with("Error while plotting graph: "));
    }
}
