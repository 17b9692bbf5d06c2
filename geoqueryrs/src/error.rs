use thiserror::Error;

use crate::dialect::FunctionEncoder;

pub type Result<T> = std::result::Result<T, GeoqueryError>;

#[derive(Debug, Error)]
pub enum GeoqueryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("function '{name}' is already registered in this dialect")]
    DuplicateRegistration { name: String },
    #[error("dialect '{0}' is already registered")]
    DuplicateDialect(String),
    #[error("unknown function '{name}' for dialect '{dialect}'")]
    UnknownFunction { name: String, dialect: String },
    #[error("function '{function}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("argument index {index} out of range for function '{function}' with {len} argument(s)")]
    ArgumentIndex {
        function: String,
        index: usize,
        len: usize,
    },
    #[error("{0} clause not set")]
    ClauseNotSet(&'static str),
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("{statement} statements are not supported by dialect '{dialect}'")]
    UnsupportedStatement {
        statement: &'static str,
        dialect: String,
    },
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("expression nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Returned by `SqlDialect::insert` when the name is taken.
///
/// The rejected encoder travels back to the caller untouched.
#[derive(Debug)]
pub struct DuplicateEncoder {
    pub name: String,
    pub encoder: FunctionEncoder,
}

impl std::fmt::Display for DuplicateEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function '{}' is already registered", self.name)
    }
}

impl std::error::Error for DuplicateEncoder {}

impl From<DuplicateEncoder> for GeoqueryError {
    fn from(err: DuplicateEncoder) -> Self {
        GeoqueryError::DuplicateRegistration { name: err.name }
    }
}
