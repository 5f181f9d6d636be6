//! Instruction steps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::conditional::{resolve_conditional, Conditional, DEFAULT_BRANCH};
use super::types::{ConnectState, MODE_KEY};

/// A step whose content may depend on the state.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Content path; steps resolving to nothing or an empty path are dropped.
    pub content: Conditional<String>,
}

impl Step {
    pub fn new(id: &str, title: &str, description: &str, content: impl Into<Conditional<String>>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            content: content.into(),
        }
    }
}

/// A step after its content was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Steps selected by state values.
///
/// `Keyed` entries are visited in order; each looks up the state value of
/// its key (`mode` or a field key) in its branch map, falling back to
/// `DEFAULT`, and appends whatever the chosen subtree yields.
#[derive(Debug, Clone, PartialEq)]
pub enum StepTree {
    Steps(Vec<Step>),
    Keyed(Vec<(String, BTreeMap<String, StepTree>)>),
}

impl StepTree {
    /// Keyed tree with a single key.
    pub fn on<I, K>(key: &str, branches: I) -> Self
    where
        I: IntoIterator<Item = (K, StepTree)>,
        K: Into<String>,
    {
        StepTree::Keyed(vec![(key.to_string(), collect_branches(branches))])
    }

    /// Appends another keyed lookup after the existing ones.
    pub fn then<I, K>(self, key: &str, branches: I) -> Self
    where
        I: IntoIterator<Item = (K, StepTree)>,
        K: Into<String>,
    {
        let entry = (key.to_string(), collect_branches(branches));
        match self {
            StepTree::Keyed(mut entries) => {
                entries.push(entry);
                StepTree::Keyed(entries)
            }
            steps @ StepTree::Steps(_) => StepTree::Keyed(vec![
                (MODE_KEY.to_string(), collect_branches([(DEFAULT_BRANCH, steps)])),
                entry,
            ]),
        }
    }
}

fn collect_branches<I, K>(branches: I) -> BTreeMap<String, StepTree>
where
    I: IntoIterator<Item = (K, StepTree)>,
    K: Into<String>,
{
    branches.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Resolves the steps that apply to `state`.
pub fn resolve_steps(tree: &StepTree, state: &ConnectState) -> Vec<ResolvedStep> {
    let mut out = Vec::new();
    collect(tree, state, &mut out);
    out
}

fn collect(tree: &StepTree, state: &ConnectState, out: &mut Vec<ResolvedStep>) {
    match tree {
        StepTree::Steps(steps) => {
            out.extend(steps.iter().filter_map(|step| {
                let content = resolve_conditional(&step.content, state)?;
                (!content.is_empty()).then(|| ResolvedStep {
                    id: step.id.clone(),
                    title: step.title.clone(),
                    description: step.description.clone(),
                    content: content.clone(),
                })
            }));
        }
        StepTree::Keyed(entries) => {
            for (key, branches) in entries {
                let chosen = state
                    .condition_value(key)
                    .and_then(|value| branches.get(&value))
                    .or_else(|| branches.get(DEFAULT_BRANCH));
                if let Some(subtree) = chosen {
                    collect(subtree, state, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::types::{ConnectMode, FieldId, FieldValue};

    fn step(id: &str, content: &str) -> Step {
        Step::new(id, id, "", content.to_string())
    }

    fn ids(steps: &[ResolvedStep]) -> Vec<&str> {
        steps.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_mode_selects_step_list() {
        let tree = StepTree::on(
            MODE_KEY,
            [
                (
                    "framework",
                    StepTree::Steps(vec![step("step1", "install"), step("step2", "config")]),
                ),
                ("direct", StepTree::Steps(vec![step("connection", "direct")])),
            ],
        );
        let steps = resolve_steps(&tree, &ConnectState::new(ConnectMode::Framework));
        assert_eq!(ids(&steps), vec!["step1", "step2"]);
        let steps = resolve_steps(&tree, &ConnectState::new(ConnectMode::Direct));
        assert_eq!(ids(&steps), vec!["connection"]);
        assert!(resolve_steps(&tree, &ConnectState::new(ConnectMode::Mcp)).is_empty());
    }

    #[test]
    fn test_empty_content_is_dropped() {
        let tree = StepTree::Steps(vec![
            step("valid", "valid-content"),
            step("empty", ""),
            Step::new(
                "unmatched",
                "Unmatched",
                "",
                Conditional::branch([("orm", Conditional::Value("x".to_string()))]),
            ),
        ]);
        let steps = resolve_steps(&tree, &ConnectState::new(ConnectMode::Framework));
        assert_eq!(ids(&steps), vec!["valid"]);
    }

    #[test]
    fn test_conditional_content() {
        let tree = StepTree::Steps(vec![Step::new(
            "configure",
            "Configure",
            "",
            Conditional::branch([
                ("nextjs", Conditional::Value("nextjs-content".to_string())),
                ("react", Conditional::Value("react-content".to_string())),
                (DEFAULT_BRANCH, Conditional::Value("generic-content".to_string())),
            ]),
        )]);
        let content = |framework: &str| {
            let state = ConnectState::new(ConnectMode::Framework)
                .with(FieldId::Framework, FieldValue::text(framework));
            resolve_steps(&tree, &state)[0].content.clone()
        };
        assert_eq!(content("nextjs"), "nextjs-content");
        assert_eq!(content("react"), "react-content");
        assert_eq!(content("vue"), "generic-content");
    }

    #[test]
    fn test_keyed_entries_append_in_order() {
        let tree = StepTree::on(
            "framework",
            [("nextjs", StepTree::Steps(vec![step("base", "base")]))],
        )
        .then(
            "frameworkUi",
            [("true", StepTree::Steps(vec![step("ui", "ui")]))],
        );
        let state = ConnectState::new(ConnectMode::Framework)
            .with(FieldId::Framework, FieldValue::text("nextjs"))
            .with(FieldId::FrameworkUi, FieldValue::Flag(true));
        assert_eq!(ids(&resolve_steps(&tree, &state)), vec!["base", "ui"]);

        let state = state.with(FieldId::FrameworkUi, FieldValue::Flag(false));
        assert_eq!(ids(&resolve_steps(&tree, &state)), vec!["base"]);
    }

    #[test]
    fn test_default_branch_when_value_unset() {
        let tree = StepTree::on(
            "mcpClient",
            [
                ("codex", StepTree::Steps(vec![step("codex-add-server", "a")])),
                (DEFAULT_BRANCH, StepTree::Steps(vec![step("configure-mcp", "b")])),
            ],
        );
        let steps = resolve_steps(&tree, &ConnectState::new(ConnectMode::Mcp));
        assert_eq!(ids(&steps), vec!["configure-mcp"]);
    }
}
