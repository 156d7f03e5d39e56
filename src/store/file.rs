//! FileContractStore - Durable contract store backed by a single JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{next_id, stamped, ContractStore, StoreError};
use crate::document::{Contract, ContractId};

/// Contract store persisting its whole namespace to one JSON file.
///
/// The file holds an object mapping decimal ids to contract records. Every
/// write rewrites the file through a sibling temp file and a rename, so a
/// crash leaves either the old or the new namespace on disk. A missing file
/// reads as an empty namespace.
#[derive(Clone)]
pub struct FileContractStore {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl FileContractStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_namespace(&self) -> Result<BTreeMap<ContractId, Contract>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };

        let raw: BTreeMap<String, Contract> = serde_json::from_slice(&bytes)?;
        let mut namespace = BTreeMap::new();
        for (key, contract) in raw {
            let id = key
                .parse::<ContractId>()
                .map_err(|_| StoreError::Storage(format!("invalid key `{}` in store file", key)))?;
            namespace.insert(id, contract);
        }
        Ok(namespace)
    }

    fn write_namespace(&self, namespace: &BTreeMap<ContractId, Contract>) -> Result<(), StoreError> {
        let raw: BTreeMap<String, &Contract> = namespace
            .iter()
            .map(|(id, contract)| (id.to_string(), contract))
            .collect();
        let bytes = serde_json::to_vec_pretty(&raw)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<T>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<ContractId, Contract>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let mut namespace = self.read_namespace()?;
        let result = apply(&mut namespace)?;
        self.write_namespace(&namespace)?;
        Ok(result)
    }
}

impl ContractStore for FileContractStore {
    fn get_all(&self) -> Result<BTreeMap<ContractId, Contract>, StoreError> {
        let _lock = self
            .guard
            .lock()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        self.read_namespace()
    }

    fn save_new(&self, contract: &Contract) -> Result<ContractId, StoreError> {
        self.update(|namespace| {
            let id = next_id(namespace.keys())?;
            namespace.insert(id, stamped(contract, id));
            Ok(id)
        })
    }

    fn save(&self, contract: &Contract, id: ContractId) -> Result<(), StoreError> {
        self.update(|namespace| {
            namespace.insert(id, stamped(contract, id));
            Ok(())
        })
    }

    fn get(&self, id: ContractId) -> Result<Option<Contract>, StoreError> {
        Ok(self.get_all()?.remove(&id))
    }
}
