//! Validated, persisted state for a single contract document.
//!
//! [`ContractState`] holds the active [`Contract`] and keeps it in lockstep
//! with a [`ContractStore`]: every mutation is validated, applied and written
//! as a whole document, or refused without touching either copy.

pub mod document;
mod error;
mod state;
pub mod store;
pub mod validation;

pub use document::{
    init_contract, init_form_data, Contract, ContractId, FormData, FormSchema, FormSchemaBuilder,
    PartyId, Payment, SchemaError, UNLOADED_ID,
};
pub use error::{MutationError, MutationResult};
pub use state::{
    ContractState, FieldChange, LoadContract, LocalCopy, Mutation, PartyChange, PartyRemoval,
    SetData,
};
#[cfg(feature = "fs")]
pub use store::FileContractStore;
pub use store::{normalize_contract, ContractStore, InMemoryContractStore, StoreError};
