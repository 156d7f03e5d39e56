use thiserror::Error;

use crate::document::ContractId;
use crate::store::StoreError;

/// Why a mutation was refused.
///
/// A refused mutation leaves both the in-memory contract and the store
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("invalid contract id {0}")]
    InvalidId(ContractId),
    #[error("contract {0} does not exist in the store")]
    NotFound(ContractId),
    #[error("payload.{0} is not defined")]
    MissingField(&'static str),
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error("invalid {label} given: expected {expected}")]
    TypeMismatch {
        label: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MutationError {
    pub(crate) fn mismatch(label: impl Into<String>, expected: &'static str) -> Self {
        MutationError::TypeMismatch {
            label: label.into(),
            expected,
        }
    }
}

/// Outcome of a container mutation.
pub type MutationResult = Result<(), MutationError>;
