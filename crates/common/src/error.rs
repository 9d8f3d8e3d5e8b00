use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("usage: {0}")]
    Usage(String),

    #[error("invalid input format: {0}")]
    InputFormat(String),

    #[error("insufficient history: {0}")]
    InsufficientHistory(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("numeric conversion error: {0}")]
    NumericConversion(String),

    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("model {model} failed: {reason}")]
    ModelFitting { model: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ForecastError {
    pub fn model_fitting(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModelFitting {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage_error",
            Self::InputFormat(_) => "input_format_error",
            Self::InsufficientHistory(_) => "insufficient_history_error",
            Self::ColumnNotFound(_) => "column_not_found_error",
            Self::NumericConversion(_) => "numeric_conversion_error",
            Self::UnsupportedModel(_) => "unsupported_model_error",
            Self::ModelFitting { .. } => "model_fitting_error",
            Self::Io(_) => "io_error",
            Self::Serde(_) => "serialization_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ForecastError::InsufficientHistory("need at least 5 weeks, got 3".into());
        assert_eq!(
            err.to_string(),
            "insufficient history: need at least 5 weeks, got 3"
        );

        let err = ForecastError::model_fitting("XGB", "empty training set");
        assert_eq!(err.to_string(), "model XGB failed: empty training set");
    }

    #[test]
    fn test_kind() {
        assert_eq!(ForecastError::Usage("x".into()).kind(), "usage_error");
        assert_eq!(
            ForecastError::UnsupportedModel("svm".into()).kind(),
            "unsupported_model_error"
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ForecastError::from(io).kind(), "io_error");
    }
}
