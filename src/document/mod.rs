//! Documents - The contract record and its editable form data.
//!
//! A [`Contract`] is what the store persists and what the state container
//! holds in memory. Its [`FormData`] keeps user-named text fields flattened at
//! the top level next to the structural keys (`dates`, `parties`, `payment`,
//! `purpose`, `tid`, `version`), so the serialized record reads:
//!
//! ```json
//! { "id": 3,
//!   "formData": { "title": "", "dates": { "start": "" },
//!                 "parties": { "buyer": [] },
//!                 "payment": { "amount": 0.0, "note": "" },
//!                 "purpose": false, "tid": null, "version": null },
//!   "tid": null, "version": null }
//! ```

mod factory;
mod schema;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use factory::{init_contract, init_form_data};
pub use schema::{FormSchema, FormSchemaBuilder, SchemaError, STRUCTURAL_KEYS};

/// Identifier of a stored contract.
pub type ContractId = i64;

/// Identifier of a party referenced from a role list.
pub type PartyId = u64;

/// Sentinel id meaning "no contract loaded".
pub const UNLOADED_ID: ContractId = -1;

/// The root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub form_data: FormData,
    #[serde(default)]
    pub tid: Value,
    #[serde(default)]
    pub version: Value,
}

impl Default for Contract {
    fn default() -> Self {
        init_contract(&FormSchema::default())
    }
}

/// User-editable fields of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub dates: BTreeMap<String, String>,
    #[serde(default)]
    pub parties: BTreeMap<String, Vec<PartyId>>,
    #[serde(default)]
    pub payment: Payment,
    /// Whether a signature is required.
    #[serde(default)]
    pub purpose: bool,
    #[serde(default)]
    pub tid: Value,
    #[serde(default)]
    pub version: Value,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl Default for FormData {
    fn default() -> Self {
        init_form_data(&FormSchema::default())
    }
}

impl FormData {
    /// Check that the field set matches `schema` exactly and every date is
    /// either empty or a valid date.
    ///
    /// Returns the first offending key.
    pub fn conforms_to(&self, schema: &FormSchema) -> Result<(), String> {
        if let Some(key) = mismatch(self.fields.keys(), schema.text_fields()) {
            return Err(key);
        }
        if let Some(key) = mismatch(self.dates.keys(), schema.date_fields()) {
            return Err(key);
        }
        if let Some(key) = mismatch(self.parties.keys(), schema.party_roles()) {
            return Err(format!("parties.{}", key));
        }
        for (key, date) in &self.dates {
            if !date.is_empty() && crate::validation::parse_date(date).is_none() {
                return Err(format!("dates.{}", key));
            }
        }
        if !self.payment.amount.is_finite() {
            return Err("payment.amount".into());
        }
        Ok(())
    }
}

/// First key present on one side but not the other.
fn mismatch<'a>(
    actual: impl Iterator<Item = &'a String>,
    expected: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let actual: Vec<&str> = actual.map(String::as_str).collect();
    let expected: Vec<&str> = expected.collect();
    actual
        .iter()
        .find(|key| !expected.contains(key))
        .or_else(|| expected.iter().find(|key| !actual.contains(key)))
        .map(|key| key.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub note: String,
}
