//! Stores - Durable key-value storage for contracts.
//!
//! A store owns a single namespace of contracts keyed by integer id. The state
//! container only ever talks to it through [`ContractStore`], so the backing
//! can be swapped without touching mutation logic.
//!
//! ## Example
//!
//! ```ignore
//! use contract_state::{Contract, ContractStore, InMemoryContractStore};
//!
//! let store = InMemoryContractStore::new();
//! let id = store.save_new(&Contract::default())?;
//! let loaded = store.get(id)?.expect("just stored");
//! assert_eq!(loaded.id, id);
//! ```

#[cfg(feature = "fs")]
mod file;
mod in_memory;
mod normalize;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::document::{Contract, ContractId};

/// Error type for contract store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Serialization/deserialization error.
    #[error("contract serialization error: {0}")]
    Serde(String),
    /// Storage-level error.
    #[error("contract storage error: {0}")]
    Storage(String),
    /// Filesystem error from a durable backend.
    #[error("contract store io error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Abstract key-value storage for contracts.
pub trait ContractStore: Send + Sync {
    /// Every stored contract, keyed by id.
    fn get_all(&self) -> Result<BTreeMap<ContractId, Contract>, StoreError>;

    /// Store `contract` under a newly allocated id and return that id.
    ///
    /// The stored copy carries the new id in its `id` field.
    fn save_new(&self, contract: &Contract) -> Result<ContractId, StoreError>;

    /// Overwrite the contract stored under `id`.
    fn save(&self, contract: &Contract, id: ContractId) -> Result<(), StoreError>;

    /// Get a contract by id. Returns None if not found.
    fn get(&self, id: ContractId) -> Result<Option<Contract>, StoreError>;
}

/// Next free id given the ids already in use.
///
/// Fails once the largest stored id is `ContractId::MAX`.
pub(crate) fn next_id<'a>(
    ids: impl Iterator<Item = &'a ContractId>,
) -> Result<ContractId, StoreError> {
    match ids.max() {
        Some(max) => max
            .checked_add(1)
            .map(|id| id.max(0))
            .ok_or_else(|| StoreError::Storage("id space exhausted".into())),
        None => Ok(0),
    }
}

/// Copy of `contract` with its `id` field set to `id`.
pub(crate) fn stamped(contract: &Contract, id: ContractId) -> Contract {
    let mut contract = contract.clone();
    contract.id = id;
    contract
}

#[cfg(feature = "fs")]
pub use file::FileContractStore;
pub use in_memory::InMemoryContractStore;
pub use normalize::normalize_contract;
