//! Connect sheet state types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Top-level mode of the connect sheet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ConnectMode {
    #[default]
    Framework,
    Direct,
    Orm,
    Mcp,
}

impl ConnectMode {
    pub fn key(&self) -> &'static str {
        match self {
            ConnectMode::Framework => "framework",
            ConnectMode::Direct => "direct",
            ConnectMode::Orm => "orm",
            ConnectMode::Mcp => "mcp",
        }
    }
}

/// A sheet field.
///
/// Declaration order is the order in which state values are matched against
/// conditional branches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Framework,
    FrameworkVariant,
    Library,
    FrameworkUi,
    Orm,
    ConnectionMethod,
    ConnectionType,
    UseSharedPooler,
    McpClient,
    McpReadonly,
}

impl FieldId {
    pub const ALL: [FieldId; 10] = [
        FieldId::Framework,
        FieldId::FrameworkVariant,
        FieldId::Library,
        FieldId::FrameworkUi,
        FieldId::Orm,
        FieldId::ConnectionMethod,
        FieldId::ConnectionType,
        FieldId::UseSharedPooler,
        FieldId::McpClient,
        FieldId::McpReadonly,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FieldId::Framework => "framework",
            FieldId::FrameworkVariant => "frameworkVariant",
            FieldId::Library => "library",
            FieldId::FrameworkUi => "frameworkUi",
            FieldId::Orm => "orm",
            FieldId::ConnectionMethod => "connectionMethod",
            FieldId::ConnectionType => "connectionType",
            FieldId::UseSharedPooler => "useSharedPooler",
            FieldId::McpClient => "mcpClient",
            FieldId::McpReadonly => "mcpReadonly",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Value of a field: a selection key or a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Key used to match conditional branches; switches match `"true"`/`"false"`.
    pub fn condition_key(&self) -> String {
        match self {
            FieldValue::Flag(flag) => flag.to_string(),
            FieldValue::Text(text) => text.clone(),
        }
    }
}

/// Key naming the mode in step trees and conditionals.
pub const MODE_KEY: &str = "mode";

/// Current sheet state: the mode plus any field values that are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConnectState {
    #[serde(default)]
    pub mode: ConnectMode,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub values: BTreeMap<FieldId, FieldValue>,
}

impl ConnectState {
    pub fn new(mode: ConnectMode) -> Self {
        Self {
            mode,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: FieldId) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Text value of `field`; switches and unset fields yield `None`.
    pub fn text(&self, field: FieldId) -> Option<&str> {
        match self.values.get(&field) {
            Some(FieldValue::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn set(&mut self, field: FieldId, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn clear(&mut self, field: FieldId) {
        self.values.remove(&field);
    }

    /// Builder-style setter.
    pub fn with(mut self, field: FieldId, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// Value of `key` (the mode or a field) for condition matching.
    pub fn condition_value(&self, key: &str) -> Option<String> {
        if key == MODE_KEY {
            return Some(self.mode.key().to_string());
        }
        FieldId::from_key(key)
            .and_then(|field| self.get(field))
            .map(FieldValue::condition_key)
    }

    /// Candidate branch keys: the mode first, then field values in declaration order.
    pub fn condition_keys(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.mode.key().to_string()).chain(
            FieldId::ALL
                .into_iter()
                .filter_map(|field| self.get(field).map(FieldValue::condition_key)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wire_format() {
        let state: ConnectState = serde_json::from_str(
            r#"{"mode":"direct","connectionMethod":"transaction","useSharedPooler":true}"#,
        )
        .unwrap();
        assert_eq!(state.mode, ConnectMode::Direct);
        assert_eq!(state.text(FieldId::ConnectionMethod), Some("transaction"));
        assert_eq!(state.get(FieldId::UseSharedPooler), Some(&FieldValue::Flag(true)));

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["mode"], "direct");
        assert_eq!(value["useSharedPooler"], true);
    }

    #[test]
    fn test_condition_keys_order() {
        let state = ConnectState::new(ConnectMode::Framework)
            .with(FieldId::FrameworkUi, FieldValue::Flag(true))
            .with(FieldId::Framework, FieldValue::text("nextjs"));
        let keys: Vec<_> = state.condition_keys().collect();
        assert_eq!(keys, vec!["framework", "nextjs", "true"]);
        assert_eq!(state.condition_value(MODE_KEY).as_deref(), Some("framework"));
        assert_eq!(state.condition_value("frameworkUi").as_deref(), Some("true"));
        assert_eq!(state.condition_value("orm"), None);
    }

    #[test]
    fn test_field_keys() {
        for field in FieldId::ALL {
            assert_eq!(FieldId::from_key(field.key()), Some(field));
        }
        assert_eq!(FieldId::from_key("mcpFeatures"), None);
    }
}
