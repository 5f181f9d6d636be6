//! Connect sheet session.
//!
//! A session owns one [`ConnectState`] and applies user edits to it, keeping
//! framework, variant and library consistent with the catalog.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use common::models::{Dialect, Resolution, Selection};

use crate::catalog::Catalog;
use crate::resolver::{resolve, resolve_library_key};

use super::schema::{active_fields, default_state, reset_dependent_fields, ConnectSchema, FieldType, OptionSource};
use super::steps::{resolve_steps, ResolvedStep};
use super::types::{ConnectMode, ConnectState, FieldId, FieldValue};

/// Overrides applied on top of the schema defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InitialState {
    #[serde(default)]
    pub mode: Option<ConnectMode>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub values: BTreeMap<FieldId, FieldValue>,
}

/// A selectable option of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// A field currently shown, with its value and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActiveField {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
    pub options: Vec<FieldOption>,
}

/// An edit to the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SheetAction {
    SetMode { mode: ConnectMode },
    UpdateField { field: String, value: FieldValue },
}

/// Everything the sheet renders for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SheetView {
    pub state: ConnectState,
    pub fields: Vec<ActiveField>,
    pub steps: Vec<ResolvedStep>,
    pub resolution: Resolution,
}

const CONNECTION_METHODS: [(&str, &str); 3] = [
    ("direct", "Direct connection"),
    ("transaction", "Transaction pooler"),
    ("session", "Session pooler"),
];

const MCP_CLIENTS: [(&str, &str); 5] = [
    ("cursor", "Cursor"),
    ("codex", "Codex"),
    ("claude-code", "Claude Code"),
    ("windsurf", "Windsurf"),
    ("vscode", "VS Code"),
];

fn dialect_label(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Uri => "URI",
        Dialect::Psql => "PSQL",
        Dialect::Golang => "Golang",
        Dialect::Jdbc => "JDBC",
        Dialect::Dotnet => ".NET",
        Dialect::Nodejs => "Node.js",
        Dialect::Php => "PHP",
        Dialect::Python => "Python",
        Dialect::Sqlalchemy => "SQLAlchemy",
    }
}

#[derive(Debug, Clone)]
pub struct ConnectSession<'a> {
    schema: &'a ConnectSchema,
    catalog: &'a Catalog,
    state: ConnectState,
}

impl<'a> ConnectSession<'a> {
    /// Schema defaults merged with `initial`, then framework-derived fields filled in.
    pub fn new(schema: &'a ConnectSchema, catalog: &'a Catalog, initial: InitialState) -> Self {
        let mut state = default_state(schema);
        if let Some(mode) = initial.mode {
            state.mode = mode;
        }
        let picks_framework = initial.values.contains_key(&FieldId::Framework);
        let picks_library = initial.values.contains_key(&FieldId::Library);
        state.values.extend(initial.values);

        let mut session = Self {
            schema,
            catalog,
            state,
        };
        if picks_framework && !picks_library {
            session.state.clear(FieldId::Library);
        }
        session.derive_framework_fields();
        session
    }

    /// Session over an existing state, used as is.
    pub fn from_state(schema: &'a ConnectSchema, catalog: &'a Catalog, state: ConnectState) -> Self {
        Self {
            schema,
            catalog,
            state,
        }
    }

    pub fn state(&self) -> &ConnectState {
        &self.state
    }

    pub fn into_state(self) -> ConnectState {
        self.state
    }

    pub fn apply(&mut self, action: SheetAction) {
        match action {
            SheetAction::SetMode { mode } => self.set_mode(mode),
            SheetAction::UpdateField { field, value } => match FieldId::from_key(&field) {
                Some(field) => self.update_field(field, value),
                None => debug!(field = %field, "忽略未知字段"),
            },
        }
    }

    /// Switches mode, filling that mode's defaults; other values are kept.
    pub fn set_mode(&mut self, mode: ConnectMode) {
        self.state.mode = mode;
        self.fill_mode_defaults();
    }

    /// Sets one field and updates everything that depends on it.
    pub fn update_field(&mut self, field: FieldId, value: FieldValue) {
        self.state.set(field, value);
        match field {
            FieldId::Framework => {
                self.state.clear(FieldId::FrameworkVariant);
                self.state.clear(FieldId::Library);
                self.derive_framework_fields();
            }
            FieldId::FrameworkVariant => {
                self.state.clear(FieldId::Library);
                self.derive_framework_fields();
            }
            _ => {}
        }
        self.state = reset_dependent_fields(&self.state, field, self.schema);
        self.fill_mode_defaults();
    }

    /// Options of the field with key `field`; empty for unknown or inactive fields.
    pub fn field_options(&self, field: &str) -> Vec<FieldOption> {
        let Some(def) = FieldId::from_key(field)
            .and_then(|id| active_fields(self.schema, &self.state).into_iter().find(|f| f.id == id))
        else {
            return Vec::new();
        };
        def.options
            .map(|source| self.options_from(source))
            .unwrap_or_default()
    }

    pub fn active_fields(&self) -> Vec<ActiveField> {
        active_fields(self.schema, &self.state)
            .into_iter()
            .map(|def| ActiveField {
                id: def.id,
                field_type: def.field_type,
                label: def.label.clone(),
                value: self.state.get(def.id).cloned(),
                options: def
                    .options
                    .map(|source| self.options_from(source))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Steps for the current state with `{{field}}` placeholders filled in.
    pub fn resolved_steps(&self) -> Vec<ResolvedStep> {
        resolve_steps(&self.schema.steps, &self.state)
            .into_iter()
            .map(|mut step| {
                step.content = self.interpolate(&step.content);
                step
            })
            .collect()
    }

    /// Content path, library and install command of the framework selection.
    pub fn resolution(&self) -> Resolution {
        let text = |field| self.state.text(field).map(String::from);
        resolve(
            &Selection::SchemaField {
                framework: text(FieldId::Framework),
                framework_variant: text(FieldId::FrameworkVariant),
                library: text(FieldId::Library),
            },
            self.catalog,
        )
    }

    pub fn view(&self) -> SheetView {
        SheetView {
            state: self.state.clone(),
            fields: self.active_fields(),
            steps: self.resolved_steps(),
            resolution: self.resolution(),
        }
    }

    fn fill_mode_defaults(&mut self) {
        let Some(mode) = self.schema.mode(self.state.mode) else {
            return;
        };
        // Mode fields are ordered so a dependency is filled before its dependents.
        for id in &mode.fields {
            if self.state.get(*id).is_some() {
                continue;
            }
            let default = self
                .schema
                .field(*id)
                .filter(|f| f.applies(&self.state))
                .and_then(|f| f.default_value.clone());
            if let Some(value) = default {
                self.state.set(*id, value);
            }
        }
    }

    /// Picks the first variant of a framework with variants, then a library.
    fn derive_framework_fields(&mut self) {
        let Some(node) = self
            .state
            .text(FieldId::Framework)
            .and_then(|key| self.catalog.framework(key))
        else {
            return;
        };
        let has_variants = node.children.iter().any(|child| !child.is_leaf());
        let variant_known = self
            .state
            .text(FieldId::FrameworkVariant)
            .is_some_and(|variant| node.child(variant).is_some());
        if has_variants && !variant_known {
            if let Some(first) = node.first_child() {
                self.state
                    .set(FieldId::FrameworkVariant, FieldValue::text(first.key.as_str()));
            }
        }

        let library = resolve_library_key(
            self.state.text(FieldId::Framework),
            self.state.text(FieldId::FrameworkVariant),
            self.state.text(FieldId::Library),
            self.catalog.framework_trees(),
        );
        if let Some(library) = library {
            self.state.set(FieldId::Library, FieldValue::Text(library));
        }
    }

    fn options_from(&self, source: OptionSource) -> Vec<FieldOption> {
        let nodes = |nodes: &[common::models::ConnectionType]| {
            nodes
                .iter()
                .map(|n| FieldOption::new(&n.key, &n.label))
                .collect::<Vec<_>>()
        };
        let framework = self
            .state
            .text(FieldId::Framework)
            .and_then(|key| self.catalog.framework(key));

        match source {
            OptionSource::Frameworks => self
                .catalog
                .framework_trees()
                .map(|n| FieldOption::new(&n.key, &n.label))
                .collect(),
            OptionSource::FrameworkVariants => framework
                .filter(|node| node.children.iter().any(|c| !c.is_leaf()))
                .map(|node| nodes(&node.children))
                .unwrap_or_default(),
            OptionSource::Libraries => {
                let Some(node) = framework else {
                    return Vec::new();
                };
                let variant = self
                    .state
                    .text(FieldId::FrameworkVariant)
                    .and_then(|key| node.child(key))
                    .filter(|variant| !variant.is_leaf());
                match variant {
                    Some(variant) => nodes(&variant.children),
                    None if node.children.iter().all(|c| c.is_leaf()) => nodes(&node.children),
                    None => Vec::new(),
                }
            }
            OptionSource::Orms => nodes(&self.catalog.orms),
            OptionSource::ConnectionTypes => Dialect::ALL
                .into_iter()
                .map(|d| FieldOption::new(d.key(), dialect_label(d)))
                .collect(),
            OptionSource::ConnectionMethods => CONNECTION_METHODS
                .into_iter()
                .map(|(value, label)| FieldOption::new(value, label))
                .collect(),
            OptionSource::McpClients => MCP_CLIENTS
                .into_iter()
                .map(|(value, label)| FieldOption::new(value, label))
                .collect(),
        }
    }

    fn interpolate(&self, content: &str) -> String {
        let mut out = content.to_string();
        for field in FieldId::ALL {
            let placeholder = format!("{{{{{}}}}}", field.key());
            if out.contains(&placeholder) {
                let value = self
                    .state
                    .get(field)
                    .map(FieldValue::condition_key)
                    .unwrap_or_default();
                out = out.replace(&placeholder, &value);
            }
        }
        out
    }
}
