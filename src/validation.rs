use thiserror::Error;

/// Why the current column selection cannot be used for training or plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select features and target")]
    Incomplete,
    #[error("Feature 1 and Feature 2 must be different")]
    DuplicateFeatures,
}

/// Why a prediction input field could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a finite number")]
    NotFinite(String),
}

/// The three column choices made in the drop-downs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub feature1: Option<String>,
    pub feature2: Option<String>,
    pub target: Option<String>,
}

/// A selection that passed [`Selection::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidSelection<'a> {
    pub feature1: &'a str,
    pub feature2: &'a str,
    pub target: &'a str,
}

impl Selection {
    pub fn new(
        feature1: impl Into<String>,
        feature2: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            feature1: Some(feature1.into()),
            feature2: Some(feature2.into()),
            target: Some(target.into()),
        }
    }

    /// Checks that all three columns are chosen and the features differ.
    ///
    /// The target may coincide with a feature.
    pub fn validate(&self) -> Result<ValidSelection<'_>, SelectionError> {
        let feature1 = chosen(&self.feature1)?;
        let feature2 = chosen(&self.feature2)?;
        let target = chosen(&self.target)?;
        if feature1 == feature2 {
            return Err(SelectionError::DuplicateFeatures);
        }
        Ok(ValidSelection {
            feature1,
            feature2,
            target,
        })
    }

    /// Clears every choice that names a column outside `columns`.
    pub fn retain_columns(&mut self, columns: &[String]) {
        for slot in [&mut self.feature1, &mut self.feature2, &mut self.target] {
            if slot.as_ref().is_some_and(|name| !columns.contains(name)) {
                *slot = None;
            }
        }
    }
}

fn chosen(value: &Option<String>) -> Result<&str, SelectionError> {
    value
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or(SelectionError::Incomplete)
}

/// Parses one prediction input field.
pub fn parse_input(text: &str) -> Result<f64, InputError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotFinite(trimmed.to_string()));
    }
    Ok(value)
}
