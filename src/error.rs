use std::fmt;

/// Result type for kine-dnn operations
pub type Result<T> = std::result::Result<T, IkError>;

/// Main error type for the crate
#[derive(Debug, Clone)]
pub enum IkError {
    /// Array shapes do not line up for an operation
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid configuration or argument value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Malformed or misaligned training tables
    Data {
        path: String,
        line: Option<usize>,
        reason: String,
    },

    /// Saved parameters do not fit the model they are loaded into
    ParameterMismatch(String),

    /// IO errors (file operations)
    Io(String),

    /// Serialization/deserialization errors
    Serialization(String),

    /// Training loop misuse or numerical breakdown
    Training(String),

    /// Interchange graph could not be built or read back
    Export(String),
}

impl fmt::Display for IkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IkError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            IkError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            IkError::Data { path, line: Some(line), reason } => {
                write!(f, "Data error in {} at line {}: {}", path, line, reason)
            }
            IkError::Data { path, line: None, reason } => {
                write!(f, "Data error in {}: {}", path, reason)
            }
            IkError::ParameterMismatch(msg) => write!(f, "Parameter mismatch: {}", msg),
            IkError::Io(msg) => write!(f, "IO error: {}", msg),
            IkError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            IkError::Training(msg) => write!(f, "Training error: {}", msg),
            IkError::Export(msg) => write!(f, "Export error: {}", msg),
        }
    }
}

impl std::error::Error for IkError {}

impl From<std::io::Error> for IkError {
    fn from(err: std::io::Error) -> Self {
        IkError::Io(err.to_string())
    }
}

impl From<bincode::Error> for IkError {
    fn from(err: bincode::Error) -> Self {
        IkError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for IkError {
    fn from(err: serde_json::Error) -> Self {
        IkError::Serialization(err.to_string())
    }
}

impl From<prost::DecodeError> for IkError {
    fn from(err: prost::DecodeError) -> Self {
        IkError::Export(format!("malformed ONNX protobuf: {}", err))
    }
}

impl From<csv::Error> for IkError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);
        let reason = match err.kind() {
            csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
                format!("expected {} columns, found {}", expected_len, len)
            }
            _ => err.to_string(),
        };
        IkError::Data {
            path: String::from("<csv>"),
            line,
            reason,
        }
    }
}

// Helper functions for common error patterns
impl IkError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        IkError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        IkError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn data<P: Into<String>, S: Into<String>>(path: P, line: Option<usize>, reason: S) -> Self {
        IkError::Data {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Attach a file path to a data error raised without one.
    pub fn with_path<P: Into<String>>(self, path: P) -> Self {
        match self {
            IkError::Data { line, reason, .. } => IkError::Data {
                path: path.into(),
                line,
                reason,
            },
            other => other,
        }
    }
}
