//! Merging an external proposal into a fresh form.

use serde_json::Value;
use tracing::warn;

use crate::document::{FormData, FormSchema};
use crate::error::MutationError;
use crate::validation::{is_date, parse_number, parse_party_ids};

/// Why a proposed entry was left out of the merge.
enum Skip {
    Unknown,
    Expected(&'static str),
}

/// Merge `proposal` onto `base`, writing only keys `schema` whitelists.
///
/// Unknown keys and ill-typed values are skipped with a warning, leaving the
/// base value in place. `null` values count as absent. Nested maps (`dates`,
/// `parties`, `payment`) merge per entry under the same rule, so the merged
/// form never gains a key the base did not have.
pub(super) fn merge_proposal(
    schema: &FormSchema,
    base: &FormData,
    proposal: &Value,
) -> Result<FormData, MutationError> {
    let Value::Object(proposal) = proposal else {
        return Err(MutationError::mismatch("contractData", "an object"));
    };

    if proposal.len() != schema.form_key_count() {
        warn!(
            proposed = proposal.len(),
            expected = schema.form_key_count(),
            "proposed contract data has a different number of fields than the form"
        );
    }

    let mut form = base.clone();
    for (key, value) in proposal {
        if value.is_null() {
            continue;
        }
        let merged = match key.as_str() {
            "dates" | "parties" | "payment" => {
                merge_group(schema, &mut form, key, value);
                Ok(())
            }
            _ if !schema.is_form_key(key) => Err(Skip::Unknown),
            _ => merge_scalar(&mut form, key, value),
        };
        if let Err(skip) = merged {
            skipped(key, skip);
        }
    }

    Ok(form)
}

fn merge_scalar(form: &mut FormData, key: &str, value: &Value) -> Result<(), Skip> {
    match key {
        "purpose" => {
            form.purpose = value.as_bool().ok_or(Skip::Expected("a boolean"))?;
        }
        "tid" => form.tid = value.clone(),
        "version" => form.version = value.clone(),
        _ => {
            let text = value.as_str().ok_or(Skip::Expected("a string"))?;
            form.fields.insert(key.to_string(), text.to_string());
        }
    }
    Ok(())
}

fn merge_group(schema: &FormSchema, form: &mut FormData, group: &str, value: &Value) {
    let Value::Object(entries) = value else {
        skipped(group, Skip::Expected("an object"));
        return;
    };

    for (name, inner) in entries {
        if inner.is_null() {
            continue;
        }
        if let Err(skip) = merge_entry(schema, form, group, name, inner) {
            skipped(&format!("{}.{}", group, name), skip);
        }
    }
}

fn merge_entry(
    schema: &FormSchema,
    form: &mut FormData,
    group: &str,
    name: &str,
    value: &Value,
) -> Result<(), Skip> {
    match (group, name) {
        ("dates", _) if schema.has_date_field(name) => {
            let date = value
                .as_str()
                .filter(|raw| raw.is_empty() || is_date(value))
                .ok_or(Skip::Expected("a date"))?;
            form.dates.insert(name.to_string(), date.to_string());
        }
        ("parties", _) if schema.has_party_role(name) => {
            let ids = parse_party_ids(value).ok_or(Skip::Expected("an array of party ids"))?;
            form.parties.insert(name.to_string(), ids);
        }
        ("payment", "amount") => {
            form.payment.amount = parse_number(value).ok_or(Skip::Expected("a number"))?;
        }
        ("payment", "note") => {
            form.payment.note = value.as_str().ok_or(Skip::Expected("a string"))?.to_string();
        }
        _ => return Err(Skip::Unknown),
    }
    Ok(())
}

fn skipped(key: &str, skip: Skip) {
    match skip {
        Skip::Unknown => warn!(key = %key, "form has no such field, skipping proposed value"),
        Skip::Expected(expected) => warn!(
            key = %key,
            expected,
            "proposed value has the wrong type, keeping the default"
        ),
    }
}
