//! Mutation payloads and the serializable [`Mutation`] message.
//!
//! Parts of a payload that come straight from form input (`content`, `data`,
//! `contractData`) stay [`Value`]s; the container checks their shape before
//! applying them. Missing input deserializes to `null` or an empty key so the
//! refusal names the absent field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{ContractId, PartyId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadContract {
    pub id: ContractId,
}

impl LoadContract {
    pub fn new(id: ContractId) -> Self {
        Self { id }
    }
}

/// A proposal to prefill a fresh contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalCopy {
    #[serde(default)]
    pub contract_data: Value,
    #[serde(default)]
    pub tid: Value,
    #[serde(default)]
    pub version: Value,
}

impl LocalCopy {
    pub fn new(contract_data: Value, tid: impl Into<Value>, version: impl Into<Value>) -> Self {
        Self {
            contract_data,
            tid: tid.into(),
            version: version.into(),
        }
    }
}

/// A write to one named text or date field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub content: Value,
}

impl FieldChange {
    pub fn new(key: impl Into<String>, content: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
        }
    }
}

/// Removal of one party from a role; `data` is `{ "id": <party id> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyRemoval {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub data: Value,
}

impl PartyRemoval {
    pub fn new(target: impl Into<String>, id: PartyId) -> Self {
        Self {
            target: target.into(),
            data: serde_json::json!({ "id": id }),
        }
    }
}

/// Wholesale replacement of a role's party list; `data` is an array of ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyChange {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub data: Value,
}

impl PartyChange {
    pub fn new(target: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            target: target.into(),
            data: data.into(),
        }
    }
}

/// Payload of the unconditional setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    #[serde(default)]
    pub data: Value,
}

impl SetData {
    pub fn new(data: impl Into<Value>) -> Self {
        Self { data: data.into() }
    }
}

/// A named mutation with its payload.
///
/// Serialized as `{"type": "<name>", "payload": ...}`, e.g.
/// `{"type": "changeString", "payload": {"key": "title", "content": "Lease"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Mutation {
    CreateNew,
    LoadContract(LoadContract),
    CreateNewLocalCopy(LocalCopy),
    RemoveFromParties(PartyRemoval),
    ChangeString(FieldChange),
    ChangeDate(FieldChange),
    ChangeParties(PartyChange),
    ChangePaymentNote(Value),
    ChangeRequiredSign(Value),
    ChangePaymentAmount(Value),
    SetTid(SetData),
    SetVersion(SetData),
    Reset,
}
