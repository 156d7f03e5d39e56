use serde_json::Value;

use super::{ContractState, FieldChange, PartyChange, PartyRemoval, SetData};
use crate::document::PartyId;
use crate::error::{MutationError, MutationResult};
use crate::store::ContractStore;
use crate::validation::{
    is_array, is_boolean, is_date, is_id, is_string, is_valid_party_data, parse_number,
    parse_party_ids,
};

impl<S: ContractStore> ContractState<S> {
    /// Set one text field of the form.
    pub fn change_string(&mut self, payload: FieldChange) -> MutationResult {
        self.edit("changeString", |draft, _| {
            let FieldChange { key, content } = payload;
            check_field_change(&key, &content, draft.form_data.fields.contains_key(&key))?;

            let Value::String(text) = content else {
                return Err(MutationError::mismatch(key, "a string"));
            };
            draft.form_data.fields.insert(key, text);
            Ok(())
        })
    }

    /// Set one named date of the form. The string is stored as given.
    pub fn change_date(&mut self, payload: FieldChange) -> MutationResult {
        self.edit("changeDate", |draft, _| {
            let FieldChange { key, content } = payload;
            check_field_change(&key, &content, draft.form_data.dates.contains_key(&key))?;

            if !is_date(&content) {
                return Err(MutationError::mismatch(key, "a date"));
            }
            let Value::String(date) = content else {
                return Err(MutationError::mismatch(key, "a date"));
            };
            draft.form_data.dates.insert(key, date);
            Ok(())
        })
    }

    /// Remove the first occurrence of a party from a role.
    pub fn remove_from_parties(&mut self, payload: PartyRemoval) -> MutationResult {
        self.edit("removeFromParties", |draft, _| {
            let PartyRemoval { target, data } = payload;
            check_party_payload(&target, &data)?;

            let id = data.get("id").ok_or(MutationError::MissingField("data.id"))?;
            let id: PartyId = id
                .as_u64()
                .filter(|_| is_id(id))
                .ok_or_else(|| MutationError::mismatch("data.id", "a party id"))?;

            let party = draft
                .form_data
                .parties
                .get_mut(&target)
                .ok_or_else(|| MutationError::UnknownField(format!("parties.{}", target)))?;
            if let Some(index) = party.iter().position(|entry| *entry == id) {
                party.remove(index);
            }
            Ok(())
        })
    }

    /// Replace a role's party list.
    pub fn change_parties(&mut self, payload: PartyChange) -> MutationResult {
        self.edit("changeParties", |draft, _| {
            let PartyChange { target, data } = payload;
            check_party_payload(&target, &data)?;

            let label = format!("parties[{}]_data", target);
            if !is_array(&data) {
                return Err(MutationError::mismatch(label, "an array"));
            }
            let ids = parse_party_ids(&data)
                .ok_or_else(|| MutationError::mismatch(label, "an array of party ids"))?;

            let party = draft
                .form_data
                .parties
                .get_mut(&target)
                .ok_or_else(|| MutationError::UnknownField(format!("parties.{}", target)))?;
            *party = ids;
            Ok(())
        })
    }

    pub fn change_payment_note(&mut self, content: Value) -> MutationResult {
        self.edit("changePaymentNote", |draft, _| {
            let Value::String(note) = content else {
                return Err(MutationError::mismatch("paymentNote", "a string"));
            };
            draft.form_data.payment.note = note;
            Ok(())
        })
    }

    /// Set whether the contract must be signed. Stored in `formData.purpose`.
    pub fn change_required_sign(&mut self, content: Value) -> MutationResult {
        self.edit("changeRequiredSign", |draft, _| {
            if !is_boolean(&content) {
                return Err(MutationError::mismatch("required to sign", "a boolean"));
            }
            draft.form_data.purpose = content.as_bool().unwrap_or_default();
            Ok(())
        })
    }

    /// Set the payment amount from a number or numeric string.
    pub fn change_payment_amount(&mut self, content: Value) -> MutationResult {
        self.edit("changePaymentAmount", |draft, _| {
            let amount = parse_number(&content)
                .ok_or_else(|| MutationError::mismatch("paymentAmount", "a number"))?;
            draft.form_data.payment.amount = amount;
            Ok(())
        })
    }

    /// Set `formData.tid`. The value is not inspected.
    pub fn set_tid(&mut self, payload: SetData) -> MutationResult {
        self.edit("setTid", |draft, _| {
            draft.form_data.tid = payload.data;
            Ok(())
        })
    }

    /// Set `formData.version`. The value is not inspected.
    pub fn set_version(&mut self, payload: SetData) -> MutationResult {
        self.edit("setVersion", |draft, _| {
            draft.form_data.version = payload.data;
            Ok(())
        })
    }
}

/// Preconditions shared by the single-field setters, checked in order.
fn check_field_change(key: &str, content: &Value, known: bool) -> MutationResult {
    if key.is_empty() {
        return Err(MutationError::MissingField("key"));
    }
    if !known {
        return Err(MutationError::UnknownField(key.to_string()));
    }
    if content.is_null() {
        return Err(MutationError::MissingField("content"));
    }
    if !is_string(content) {
        return Err(MutationError::mismatch(key, "a string"));
    }
    Ok(())
}

fn check_party_payload(target: &str, data: &Value) -> MutationResult {
    if is_valid_party_data(target, data) {
        return Ok(());
    }
    if target.is_empty() {
        Err(MutationError::MissingField("target"))
    } else {
        Err(MutationError::MissingField("data"))
    }
}
