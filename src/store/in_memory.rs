//! InMemoryContractStore - HashMap-backed contract store for tests and sessions without disk.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use super::{next_id, stamped, ContractStore, StoreError};
use crate::document::{Contract, ContractId};

/// In-memory contract store backed by a HashMap of JSON bytes.
///
/// Clone-friendly via Arc: clones share one namespace.
#[derive(Clone)]
pub struct InMemoryContractStore {
    storage: Arc<RwLock<HashMap<ContractId, Vec<u8>>>>,
}

impl Default for InMemoryContractStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContractStore {
    /// Create a new empty contract store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored contracts.
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContractStore for InMemoryContractStore {
    fn get_all(&self) -> Result<BTreeMap<ContractId, Contract>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let mut contracts = BTreeMap::new();
        for (id, bytes) in storage.iter() {
            contracts.insert(*id, serde_json::from_slice(bytes)?);
        }
        Ok(contracts)
    }

    fn save_new(&self, contract: &Contract) -> Result<ContractId, StoreError> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let id = next_id(storage.keys())?;
        let bytes = serde_json::to_vec(&stamped(contract, id))?;
        storage.insert(id, bytes);

        Ok(id)
    }

    fn save(&self, contract: &Contract, id: ContractId) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&stamped(contract, id))?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        storage.insert(id, bytes);

        Ok(())
    }

    fn get(&self, id: ContractId) -> Result<Option<Contract>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match storage.get(&id) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }
}
