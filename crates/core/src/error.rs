use crate::Scope;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("duplicate action: {0}")]
    DuplicateAction(String),
    #[error("action {0} has non-finite attributes")]
    NonFiniteAttributes(String),
    #[error("invalid scope {scope:?} for action {action}")]
    InvalidScope { action: String, scope: Option<Scope> },
}
