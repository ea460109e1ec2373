//! # Field Schemas
//!
//! A resource is described by an ordered table of field descriptors, so
//! one controller implementation serves every collection. The schema owns
//! the two data-shaping boundaries of the client:
//!
//! - **Outbound**: draft text is validated, numeric fields are coerced
//!   (and omitted when blank, never sent as zero or null), blank
//!   skip-blank fields are dropped, and internal keys are renamed to the
//!   server's casing.
//! - **Inbound**: raw JSON records are normalized into [`ResourceItem`]s,
//!   folding server-side casing variants back onto the internal keys.
//!
//! Keeping both boundaries here means the controller and the views only
//! ever see one spelling of each field.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Input kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultiLine,
    Numeric,
}

/// When a field must be non-blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Required,
    /// Required when creating, optional when editing (user passwords).
    RequiredOnCreate,
}

/// One entry in a resource's field table.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
    /// Included in create payloads. Update-only fields (user role) are
    /// skipped when creating.
    pub on_create: bool,
    /// Dropped from payloads when blank instead of sent as an empty
    /// string (user password on update). Numeric fields are always
    /// omitted when blank.
    pub skip_blank: bool,
    /// Initial draft value; empty unless the form has a preset.
    pub default_value: &'static str,
}

impl FieldSpec {
    fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            requirement: Requirement::Optional,
            on_create: true,
            skip_blank: false,
            default_value: "",
        }
    }

    pub fn text(key: &'static str) -> Self {
        Self::new(key, FieldKind::Text)
    }

    pub fn multiline(key: &'static str) -> Self {
        Self::new(key, FieldKind::MultiLine)
    }

    pub fn numeric(key: &'static str) -> Self {
        Self::new(key, FieldKind::Numeric)
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    pub fn required_on_create(mut self) -> Self {
        self.requirement = Requirement::RequiredOnCreate;
        self
    }

    pub fn update_only(mut self) -> Self {
        self.on_create = false;
        self
    }

    pub fn skip_blank(mut self) -> Self {
        self.skip_blank = true;
        self
    }

    pub fn with_default(mut self, value: &'static str) -> Self {
        self.default_value = value;
        self
    }
}

/// A catalog record as held by a controller: stable identifier plus the
/// normalized field map.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceItem {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl ResourceItem {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }
}

/// Schema for one resource collection.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    /// Singular resource label used in messages and logs.
    pub label: &'static str,
    /// Collection endpoint; item endpoints append `/:id`.
    pub base_path: &'static str,
    /// POST target for creation when it differs from the base path
    /// (admin-only user creation).
    pub create_path: Option<&'static str>,
    pub fields: Vec<FieldSpec>,
    /// (internal key, server key) pairs: renamed on the way out, folded
    /// back on the way in. The server casing wins when both arrive.
    renames: Vec<(&'static str, &'static str)>,
}

impl ResourceSchema {
    pub fn new(label: &'static str, base_path: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            label,
            base_path,
            create_path: None,
            fields,
            renames: Vec::new(),
        }
    }

    pub fn with_create_path(mut self, path: &'static str) -> Self {
        self.create_path = Some(path);
        self
    }

    /// Declares a field stored server-side under a different casing.
    pub fn with_rename(mut self, internal: &'static str, server: &'static str) -> Self {
        self.renames.push((internal, server));
        self
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.base_path, id)
    }

    pub fn create_target(&self) -> &str {
        self.create_path.unwrap_or(self.base_path)
    }

    /// A fresh draft holding each field's default value.
    pub fn blank_draft(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.key.to_owned(), f.default_value.to_owned()))
            .collect()
    }

    /// Draft populated from an existing item, for editing. Numbers are
    /// rendered back to text; absent fields fall back to the default.
    pub fn draft_from_item(&self, item: &ResourceItem) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|f| {
                let value = match item.field(f.key) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => f.default_value.to_owned(),
                };
                (f.key.to_owned(), value)
            })
            .collect()
    }

    /// Local validation; the message is shown inline and nothing reaches
    /// the network on failure.
    pub fn validate(&self, draft: &BTreeMap<String, String>, creating: bool) -> Result<(), String> {
        for field in &self.fields {
            let raw = draft.get(field.key).map(String::as_str).unwrap_or("");
            let blank = raw.trim().is_empty();
            let required = match field.requirement {
                Requirement::Required => true,
                Requirement::RequiredOnCreate => creating,
                Requirement::Optional => false,
            };
            if required && blank {
                return Err(format!("{} is required", field.key));
            }
            if field.kind == FieldKind::Numeric && !blank && raw.trim().parse::<f64>().is_err() {
                return Err(format!("{} must be a number", field.key));
            }
        }
        Ok(())
    }

    /// Validates the draft and assembles the outbound JSON payload.
    ///
    /// Blank numeric input is omitted: absence and zero mean different
    /// things to the server, so blanks are never coerced. Integral
    /// numbers are sent as integers.
    pub fn assemble_payload(
        &self,
        draft: &BTreeMap<String, String>,
        creating: bool,
    ) -> Result<Value, String> {
        self.validate(draft, creating)?;

        let mut payload = Map::new();
        for field in &self.fields {
            if creating && !field.on_create {
                continue;
            }
            let raw = draft.get(field.key).cloned().unwrap_or_default();
            let trimmed = raw.trim();

            let value = match field.kind {
                FieldKind::Numeric => {
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Ok(n) = trimmed.parse::<i64>() {
                        Value::from(n)
                    } else {
                        let n: f64 = trimmed
                            .parse()
                            .map_err(|_| format!("{} must be a number", field.key))?;
                        Value::from(n)
                    }
                }
                FieldKind::Text | FieldKind::MultiLine => {
                    if trimmed.is_empty() && field.skip_blank {
                        continue;
                    }
                    Value::String(raw)
                }
            };
            payload.insert(self.outbound_key(field.key).to_owned(), value);
        }
        Ok(Value::Object(payload))
    }

    fn outbound_key(&self, internal: &'static str) -> &'static str {
        self.renames
            .iter()
            .find(|(from, _)| *from == internal)
            .map(|(_, to)| *to)
            .unwrap_or(internal)
    }

    /// Normalizes one raw record into a [`ResourceItem`]. Returns `None`
    /// when the record is not an object or has no identifier.
    pub fn normalize_item(&self, raw: &Value) -> Option<ResourceItem> {
        let object = raw.as_object()?;
        let id = object
            .get("_id")
            .or_else(|| object.get("id"))
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })?;

        let mut fields = object.clone();
        for (internal, server) in &self.renames {
            // The server casing wins when both spellings are present.
            if let Some(value) = fields.remove(*server) {
                fields.insert((*internal).to_owned(), value);
            }
        }
        Some(ResourceItem { id, fields })
    }

    /// Normalizes a list response. Anything that is not an array yields
    /// an empty list; records without an identifier are skipped.
    pub fn normalize_list(&self, raw: &Value) -> Vec<ResourceItem> {
        let Some(entries) = raw.as_array() else {
            debug!(resource = self.label, "list response was not an array");
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| {
                let item = self.normalize_item(entry);
                if item.is_none() {
                    debug!(resource = self.label, "skipping record without identifier");
                }
                item
            })
            .collect()
    }
}
