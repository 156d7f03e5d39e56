//! ContractState - The single active contract, kept in lockstep with its store.
//!
//! Every mutation follows the same path: check the payload, apply the change
//! to a draft copy of the body, write the whole draft to the store, and only
//! then swap the draft in. A refused mutation logs one diagnostic, returns an
//! error and changes nothing, in memory or on disk.
//!
//! ## Example
//!
//! ```ignore
//! use contract_state::{ContractState, FieldChange, InMemoryContractStore};
//!
//! let mut state = ContractState::new(InMemoryContractStore::new());
//! state.create_new()?;
//! state.change_string(FieldChange::new("title", "Lease"))?;
//! assert_eq!(state.body().form_data.fields["title"], "Lease");
//! ```

mod edit;
mod local_copy;
mod mutation;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, error};

use crate::document::{init_contract, init_form_data, Contract, ContractId, FormSchema, UNLOADED_ID};
use crate::error::{MutationError, MutationResult};
use crate::store::{normalize_contract, ContractStore, StoreError};
use crate::validation::is_valid_id;

pub use mutation::{
    FieldChange, LoadContract, LocalCopy, Mutation, PartyChange, PartyRemoval, SetData,
};

#[cfg(feature = "emitter")]
const PERSISTED_EVENT: &str = "ContractPersisted";

/// State container for one contract editing session.
pub struct ContractState<S> {
    store: S,
    schema: FormSchema,
    body: Contract,
    id: ContractId,
    load_error: bool,
    update_count: u64,
    #[cfg(feature = "emitter")]
    emitter: event_emitter_rs::EventEmitter,
}

impl<S> fmt::Debug for ContractState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractState")
            .field("id", &self.id)
            .field("load_error", &self.load_error)
            .field("update_count", &self.update_count)
            .field("body", &self.body)
            .finish()
    }
}

impl<S: ContractStore> ContractState<S> {
    /// Start a session over `store` with the default form schema.
    pub fn new(store: S) -> Self {
        Self::with_schema(store, FormSchema::default())
    }

    /// Start a session over `store` whose documents follow `schema`.
    pub fn with_schema(store: S, schema: FormSchema) -> Self {
        ContractState {
            body: init_contract(&schema),
            store,
            schema,
            id: UNLOADED_ID,
            load_error: false,
            update_count: 0,
            #[cfg(feature = "emitter")]
            emitter: event_emitter_rs::EventEmitter::new(),
        }
    }

    pub fn body(&self) -> &Contract {
        &self.body
    }

    /// Id of the loaded contract, or [`UNLOADED_ID`].
    pub fn id(&self) -> ContractId {
        self.id
    }

    /// True iff the most recent load attempt failed.
    pub fn load_error(&self) -> bool {
        self.load_error
    }

    /// Number of writes this session has made to the store.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every contract in the store. Read on each call.
    pub fn all_contracts(&self) -> Result<BTreeMap<ContractId, Contract>, StoreError> {
        self.store.get_all()
    }

    /// Normalized display projection of the body.
    pub fn filtered(&self) -> Value {
        normalize_contract(&self.body)
    }

    /// Register a listener called with the contract id after every write.
    ///
    /// Listeners run on the emitter's threads, after the write has landed.
    #[cfg(feature = "emitter")]
    pub fn on_persisted<F>(&mut self, listener: F) -> String
    where
        F: Fn(ContractId) + Send + Sync + 'static,
    {
        self.emitter
            .on(PERSISTED_EVENT, move |id: ContractId| listener(id))
    }

    /// Apply a serialized mutation.
    pub fn commit(&mut self, mutation: Mutation) -> MutationResult {
        match mutation {
            Mutation::CreateNew => self.create_new(),
            Mutation::LoadContract(payload) => self.load_contract(payload),
            Mutation::CreateNewLocalCopy(payload) => self.create_new_local_copy(payload),
            Mutation::RemoveFromParties(payload) => self.remove_from_parties(payload),
            Mutation::ChangeString(payload) => self.change_string(payload),
            Mutation::ChangeDate(payload) => self.change_date(payload),
            Mutation::ChangeParties(payload) => self.change_parties(payload),
            Mutation::ChangePaymentNote(content) => self.change_payment_note(content),
            Mutation::ChangeRequiredSign(content) => self.change_required_sign(content),
            Mutation::ChangePaymentAmount(content) => self.change_payment_amount(content),
            Mutation::SetTid(payload) => self.set_tid(payload),
            Mutation::SetVersion(payload) => self.set_version(payload),
            Mutation::Reset => self.reset(),
        }
    }

    /// Store a fresh default contract and load it.
    pub fn create_new(&mut self) -> MutationResult {
        let id = match self.store.save_new(&init_contract(&self.schema)) {
            Ok(id) => id,
            Err(err) => return self.report("createNew", Err(err.into())),
        };
        self.record_write(id);
        self.load_contract(LoadContract::new(id))
    }

    /// Replace the body with the stored contract `id`.
    ///
    /// On failure the flag is raised and the id reset, but the previous body
    /// stays visible.
    pub fn load_contract(&mut self, payload: LoadContract) -> MutationResult {
        let result = self.try_load(payload.id);
        if result.is_err() {
            self.load_error = true;
            self.id = UNLOADED_ID;
        }
        self.report("loadContract", result)
    }

    fn try_load(&mut self, id: ContractId) -> MutationResult {
        if !is_valid_id(id) {
            return Err(MutationError::InvalidId(id));
        }
        let contract = self.store.get(id)?.ok_or(MutationError::NotFound(id))?;

        self.body = contract;
        self.id = id;
        self.load_error = false;
        Ok(())
    }

    /// Create a new contract prefilled from an external proposal.
    pub fn create_new_local_copy(&mut self, payload: LocalCopy) -> MutationResult {
        let result = self.try_local_copy(payload);
        self.report("createNewLocalCopy", result)
    }

    fn try_local_copy(&mut self, payload: LocalCopy) -> MutationResult {
        let mut draft = init_contract(&self.schema);
        draft.form_data =
            local_copy::merge_proposal(&self.schema, &draft.form_data, &payload.contract_data)?;
        draft.tid = payload.tid;
        draft.version = payload.version;

        let id = self.store.save_new(&draft)?;
        draft.id = id;

        self.body = draft;
        self.id = id;
        self.record_write(id);
        Ok(())
    }

    /// Restore the form data to its defaults.
    pub fn reset(&mut self) -> MutationResult {
        self.edit("reset", |draft, schema| {
            draft.form_data = init_form_data(schema);
            Ok(())
        })
    }

    /// Apply `apply` to a draft of the body, persist it, then adopt it.
    ///
    /// The draft is saved under the current id, [`UNLOADED_ID`] included.
    fn edit<F>(&mut self, mutation: &'static str, apply: F) -> MutationResult
    where
        F: FnOnce(&mut Contract, &FormSchema) -> MutationResult,
    {
        let result = self.try_edit(apply);
        self.report(mutation, result)
    }

    fn try_edit<F>(&mut self, apply: F) -> MutationResult
    where
        F: FnOnce(&mut Contract, &FormSchema) -> MutationResult,
    {
        let mut draft = self.body.clone();
        apply(&mut draft, &self.schema)?;
        draft.id = self.id;

        self.store.save(&draft, self.id)?;
        self.body = draft;
        self.record_write(self.id);
        Ok(())
    }

    fn record_write(&mut self, id: ContractId) {
        self.update_count += 1;
        debug!(id, writes = self.update_count, "contract persisted");

        #[cfg(feature = "emitter")]
        self.emitter.emit(PERSISTED_EVENT, id);
    }

    fn report(&self, mutation: &'static str, result: MutationResult) -> MutationResult {
        if let Err(err) = &result {
            error!(mutation, id = self.id, error = %err, "contract mutation refused");
        }
        result
    }
}
