//! State-dependent values.

use std::collections::BTreeMap;

use super::types::ConnectState;

/// Branch key taken when no state value matches.
pub const DEFAULT_BRANCH: &str = "DEFAULT";

/// A value that may depend on the sheet state.
///
/// Branch maps are keyed by state values (`"framework"`, `"nextjs"`,
/// `"true"`, ...) and nest arbitrarily deep.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional<T> {
    Value(T),
    Branch(BTreeMap<String, Conditional<T>>),
}

impl<T> Conditional<T> {
    /// Branch map built from `(key, value)` pairs.
    pub fn branch<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Conditional<T>)>,
        K: Into<String>,
    {
        Conditional::Branch(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<T> From<T> for Conditional<T> {
    fn from(value: T) -> Self {
        Conditional::Value(value)
    }
}

/// Resolves `value` against `state`.
///
/// At each branch level the mode is tried first, then every set field value
/// in field declaration order; the first key present in the map wins, and
/// `DEFAULT` is used when none is. Returns `None` when a level has neither.
pub fn resolve_conditional<'a, T>(value: &'a Conditional<T>, state: &ConnectState) -> Option<&'a T> {
    match value {
        Conditional::Value(value) => Some(value),
        Conditional::Branch(branches) => {
            let next = state
                .condition_keys()
                .find_map(|key| branches.get(&key))
                .or_else(|| branches.get(DEFAULT_BRANCH))?;
            resolve_conditional(next, state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::types::{ConnectMode, FieldId, FieldValue};

    fn v(text: &str) -> Conditional<String> {
        Conditional::Value(text.to_string())
    }

    fn state(mode: ConnectMode) -> ConnectState {
        ConnectState::new(mode)
    }

    #[test]
    fn test_plain_values_resolve_directly() {
        assert_eq!(
            resolve_conditional(&v("hello"), &state(ConnectMode::Framework)),
            Some(&"hello".to_string())
        );
        let numbers: Conditional<Vec<u8>> = vec![1, 2, 3].into();
        assert_eq!(
            resolve_conditional(&numbers, &state(ConnectMode::Orm)),
            Some(&vec![1, 2, 3])
        );
    }

    #[test]
    fn test_mode_branches_with_default() {
        let value = Conditional::branch([
            ("framework", v("Framework Content")),
            ("direct", v("Direct Content")),
            (DEFAULT_BRANCH, v("Default Content")),
        ]);
        let resolve = |mode| resolve_conditional(&value, &state(mode)).cloned();
        assert_eq!(resolve(ConnectMode::Framework).as_deref(), Some("Framework Content"));
        assert_eq!(resolve(ConnectMode::Direct).as_deref(), Some("Direct Content"));
        assert_eq!(resolve(ConnectMode::Orm).as_deref(), Some("Default Content"));
    }

    #[test]
    fn test_nested_branches() {
        let value = Conditional::branch([
            (
                "framework",
                Conditional::branch([
                    (
                        "nextjs",
                        Conditional::branch([
                            ("app", v("App Router Content")),
                            ("pages", v("Pages Router Content")),
                            (DEFAULT_BRANCH, v("Generic Next.js")),
                        ]),
                    ),
                    (DEFAULT_BRANCH, v("Generic Framework")),
                ]),
            ),
            ("direct", v("Direct Content")),
        ]);
        let nextjs = |variant: &str| {
            state(ConnectMode::Framework)
                .with(FieldId::Framework, FieldValue::text("nextjs"))
                .with(FieldId::FrameworkVariant, FieldValue::text(variant))
        };
        let resolve = |s: ConnectState| resolve_conditional(&value, &s).cloned();

        assert_eq!(resolve(nextjs("app")).as_deref(), Some("App Router Content"));
        assert_eq!(resolve(nextjs("pages")).as_deref(), Some("Pages Router Content"));
        assert_eq!(resolve(nextjs("unknown")).as_deref(), Some("Generic Next.js"));
        assert_eq!(
            resolve(state(ConnectMode::Framework).with(FieldId::Framework, FieldValue::text("vue")))
                .as_deref(),
            Some("Generic Framework")
        );
        assert_eq!(resolve(state(ConnectMode::Direct)).as_deref(), Some("Direct Content"));
        assert_eq!(resolve(state(ConnectMode::Orm)), None);
    }

    #[test]
    fn test_switch_values_match_as_text() {
        let value = Conditional::branch([(
            "framework",
            Conditional::branch([(
                "nextjs",
                Conditional::branch([
                    ("true", v("Shadcn Steps")),
                    (DEFAULT_BRANCH, v("Regular Steps")),
                ]),
            )]),
        )]);
        let with_ui = |flag| {
            state(ConnectMode::Framework)
                .with(FieldId::Framework, FieldValue::text("nextjs"))
                .with(FieldId::FrameworkUi, FieldValue::Flag(flag))
        };
        assert_eq!(
            resolve_conditional(&value, &with_ui(true)).map(String::as_str),
            Some("Shadcn Steps")
        );
        assert_eq!(
            resolve_conditional(&value, &with_ui(false)).map(String::as_str),
            Some("Regular Steps")
        );
    }

    #[test]
    fn test_mcp_client_branches() {
        let value = Conditional::branch([(
            "mcp",
            Conditional::branch([
                ("cursor", v("Cursor Config")),
                ("claude-code", v("Claude Code Config")),
                (DEFAULT_BRANCH, v("Generic MCP")),
            ]),
        )]);
        let client = |name: &str| {
            state(ConnectMode::Mcp).with(FieldId::McpClient, FieldValue::text(name))
        };
        assert_eq!(
            resolve_conditional(&value, &client("claude-code")).map(String::as_str),
            Some("Claude Code Config")
        );
        assert_eq!(
            resolve_conditional(&value, &client("zed")).map(String::as_str),
            Some("Generic MCP")
        );
    }
}
