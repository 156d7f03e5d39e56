//! FormSchema - Explicit whitelist of the fields a contract form carries.

use std::collections::BTreeSet;

use thiserror::Error;

/// Keys of `formData` that are structural rather than user-named fields.
pub const STRUCTURAL_KEYS: [&str; 6] = ["dates", "parties", "payment", "purpose", "tid", "version"];

/// Error type for schema construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name collides with one of the structural `formData` keys.
    #[error("`{0}` is a reserved form data key")]
    Reserved(String),
    /// The same name was declared twice within one group.
    #[error("`{name}` declared more than once as a {group}")]
    Duplicate { group: &'static str, name: String },
    /// Empty names cannot be addressed by a mutation.
    #[error("field names must not be empty")]
    Empty,
}

/// The field set of a contract form.
///
/// Consulted by the document factory to build the empty form, by the merge
/// routine of local copies to decide which proposed keys may be written, and
/// by the container to check that an edited field exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    text_fields: BTreeSet<String>,
    date_fields: BTreeSet<String>,
    party_roles: BTreeSet<String>,
}

impl Default for FormSchema {
    fn default() -> Self {
        FormSchema {
            text_fields: ["title", "description", "location", "conditions", "note"]
                .into_iter()
                .map(String::from)
                .collect(),
            date_fields: ["start", "end", "signing"]
                .into_iter()
                .map(String::from)
                .collect(),
            party_roles: ["buyer", "seller", "witnesses"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl FormSchema {
    /// Start an empty schema.
    pub fn builder() -> FormSchemaBuilder {
        FormSchemaBuilder::default()
    }

    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.text_fields.iter().map(String::as_str)
    }

    pub fn date_fields(&self) -> impl Iterator<Item = &str> {
        self.date_fields.iter().map(String::as_str)
    }

    pub fn party_roles(&self) -> impl Iterator<Item = &str> {
        self.party_roles.iter().map(String::as_str)
    }

    pub fn has_text_field(&self, key: &str) -> bool {
        self.text_fields.contains(key)
    }

    pub fn has_date_field(&self, key: &str) -> bool {
        self.date_fields.contains(key)
    }

    pub fn has_party_role(&self, role: &str) -> bool {
        self.party_roles.contains(role)
    }

    /// Whether `key` is a top-level key of `formData` under this schema.
    pub fn is_form_key(&self, key: &str) -> bool {
        STRUCTURAL_KEYS.contains(&key) || self.text_fields.contains(key)
    }

    /// Number of top-level keys in `formData`.
    pub fn form_key_count(&self) -> usize {
        STRUCTURAL_KEYS.len() + self.text_fields.len()
    }
}

/// Builder for custom form schemas.
#[derive(Debug, Default)]
pub struct FormSchemaBuilder {
    text_fields: Vec<String>,
    date_fields: Vec<String>,
    party_roles: Vec<String>,
}

impl FormSchemaBuilder {
    pub fn text(mut self, name: impl Into<String>) -> Self {
        self.text_fields.push(name.into());
        self
    }

    pub fn date(mut self, name: impl Into<String>) -> Self {
        self.date_fields.push(name.into());
        self
    }

    pub fn role(mut self, name: impl Into<String>) -> Self {
        self.party_roles.push(name.into());
        self
    }

    pub fn build(self) -> Result<FormSchema, SchemaError> {
        for name in &self.text_fields {
            if STRUCTURAL_KEYS.contains(&name.as_str()) {
                return Err(SchemaError::Reserved(name.clone()));
            }
        }

        Ok(FormSchema {
            text_fields: collect_unique("text field", self.text_fields)?,
            date_fields: collect_unique("date field", self.date_fields)?,
            party_roles: collect_unique("party role", self.party_roles)?,
        })
    }
}

fn collect_unique(group: &'static str, names: Vec<String>) -> Result<BTreeSet<String>, SchemaError> {
    let mut set = BTreeSet::new();
    for name in names {
        if name.is_empty() {
            return Err(SchemaError::Empty);
        }
        if set.contains(&name) {
            return Err(SchemaError::Duplicate { group, name });
        }
        set.insert(name);
    }
    Ok(set)
}
