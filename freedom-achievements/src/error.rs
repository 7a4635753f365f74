use thiserror::Error;

/// Failure reported by a data collaborator (activity, business, store, notifier).
///
/// The engine never propagates these: each one degrades the affected metric
/// to zero progress or a neutral value and is logged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid data: {0}")]
    Invalid(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
