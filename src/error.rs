use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a number, got '{0}'")]
    InvalidPort(String),
}

/// Reasons the model artifact could not be turned into a runnable classifier.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("model input '{0}' is not a loan application column")]
    UnknownInput(String),

    #[error("model does not take column '{0}' as an input")]
    MissingColumn(&'static str),

    #[error("model input '{0}' has no declared element type")]
    UntypedInput(String),

    #[error("onnx: {0}")]
    Onnx(#[from] anyhow::Error),
}

/// A form value that could not be coerced to its column type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("could not convert {field} value '{value}' to {expected}")]
pub struct FieldError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("model does not support probability prediction")]
    Unsupported,

    #[error("record has no value for model input '{0}'")]
    MissingInput(&'static str),

    #[error("model produced no {0}")]
    EmptyOutput(&'static str),

    #[error("inference failed: {0}")]
    Inference(#[from] anyhow::Error),
}
