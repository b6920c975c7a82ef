#![forbid(unsafe_code)]

use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// An asset, transaction, manager or league the caller named is not in
    /// the store. Never silently substituted.
    NotFound { kind: &'static str, id: String },
    /// Corrupt upstream data that would otherwise produce silently wrong
    /// lineage; fatal for a graph build.
    DataIntegrity(String),
    /// The backing store failed while the graph was being built or a status
    /// was being resolved.
    Store(Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DataIntegrity(message) => write!(f, "data integrity: {message}"),
            Self::Store(err) => write!(f, "store: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
