use serde_json::Value;

use super::{Contract, FormData, FormSchema, Payment, UNLOADED_ID};

/// Canonical empty form data for `schema`.
pub fn init_form_data(schema: &FormSchema) -> FormData {
    FormData {
        dates: schema
            .date_fields()
            .map(|name| (name.to_string(), String::new()))
            .collect(),
        parties: schema
            .party_roles()
            .map(|role| (role.to_string(), Vec::new()))
            .collect(),
        payment: Payment::default(),
        purpose: false,
        tid: Value::Null,
        version: Value::Null,
        fields: schema
            .text_fields()
            .map(|name| (name.to_string(), String::new()))
            .collect(),
    }
}

/// Canonical empty contract for `schema`, not yet assigned an id.
pub fn init_contract(schema: &FormSchema) -> Contract {
    Contract {
        id: UNLOADED_ID,
        form_data: init_form_data(schema),
        tid: Value::Null,
        version: Value::Null,
    }
}
