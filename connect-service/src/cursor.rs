//! Connect wizard cursor.
//!
//! The cursor is the tab plus the parent/child/grandchild selection inside
//! that tab's tree. Every transition re-selects the levels below the one that
//! changed, so a level never points outside its ancestor chain.

use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use common::models::connect::find_node;
use common::models::{ConnectTab, ConnectionType};

use crate::catalog::Catalog;
use crate::resolver::{resolve_connect_tab_from_parent_key, resolve_content_path};

/// Query parameter carrying the parent key.
pub const FRAMEWORK_PARAM: &str = "framework";
/// Query parameter carrying the child key.
pub const USING_PARAM: &str = "using";
/// Query parameter carrying the grandchild key.
pub const WITH_PARAM: &str = "with";
/// Query parameter carrying the tab.
pub const TAB_PARAM: &str = "connectTab";

/// Current wizard selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectCursor {
    pub tab: ConnectTab,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub child: String,
    #[serde(default)]
    pub grandchild: String,
}

/// A user interaction with the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CursorAction {
    SelectTab { tab: ConnectTab },
    SelectParent { key: String },
    SelectChild { key: String },
    SelectGrandchild { key: String },
    /// Restores the cursor from deep-link query parameters.
    Restore {
        #[serde(default)]
        tab: Option<ConnectTab>,
        #[serde(default)]
        framework: Option<String>,
        #[serde(default)]
        using: Option<String>,
        #[serde(default)]
        with: Option<String>,
    },
}

fn first_key(nodes: &[ConnectionType]) -> String {
    nodes.first().map(|node| node.key.clone()).unwrap_or_default()
}

impl ConnectCursor {
    /// Cursor on the first node of the frameworks tree.
    pub fn new(catalog: &Catalog) -> Self {
        let mut cursor = Self {
            tab: ConnectTab::Frameworks,
            parent: String::new(),
            child: String::new(),
            grandchild: String::new(),
        };
        cursor.select_tab(ConnectTab::Frameworks, catalog);
        cursor
    }

    /// Applies one action.
    pub fn apply(&mut self, action: CursorAction, catalog: &Catalog) {
        match action {
            CursorAction::SelectTab { tab } => self.select_tab(tab, catalog),
            CursorAction::SelectParent { key } => self.select_parent(&key, catalog),
            CursorAction::SelectChild { key } => self.select_child(&key, catalog),
            CursorAction::SelectGrandchild { key } => self.select_grandchild(&key, catalog),
            CursorAction::Restore {
                tab,
                framework,
                using,
                with,
            } => {
                *self = Self::from_query(
                    tab,
                    framework.as_deref(),
                    using.as_deref(),
                    with.as_deref(),
                    catalog,
                )
            }
        }
    }

    /// Switches tab and selects the first node of each level.
    pub fn select_tab(&mut self, tab: ConnectTab, catalog: &Catalog) {
        self.tab = tab;
        self.parent = first_key(catalog.tree(tab));
        self.reset_below_parent(catalog);
    }

    /// Selects a parent in the current tree; unknown keys are ignored.
    pub fn select_parent(&mut self, key: &str, catalog: &Catalog) {
        if find_node(catalog.tree(self.tab), key).is_none() {
            debug!(tab = %self.tab.key(), key, "忽略未知的父级选项");
            return;
        }
        self.parent = key.to_string();
        self.reset_below_parent(catalog);
    }

    /// Selects a child of the current parent; unknown keys are ignored.
    pub fn select_child(&mut self, key: &str, catalog: &Catalog) {
        let Some(child) = self.parent_node(catalog).and_then(|p| p.child(key)) else {
            debug!(parent = %self.parent, key, "忽略未知的子级选项");
            return;
        };
        self.child = child.key.clone();
        self.grandchild = first_key(&child.children);
    }

    /// Selects a grandchild; an empty key clears it, unknown keys are ignored.
    pub fn select_grandchild(&mut self, key: &str, catalog: &Catalog) {
        if key.is_empty() {
            self.grandchild.clear();
            return;
        }
        let known = self
            .child_node(catalog)
            .and_then(|child| child.child(key))
            .is_some();
        if known {
            self.grandchild = key.to_string();
        } else {
            debug!(child = %self.child, key, "忽略未知的孙级选项");
        }
    }

    /// Restores a cursor from deep-link parameters.
    ///
    /// Without an explicit tab the tab is inferred from `framework`. Each
    /// level falls back to the first node when its key is missing or unknown.
    pub fn from_query(
        tab: Option<ConnectTab>,
        framework: Option<&str>,
        using: Option<&str>,
        with: Option<&str>,
        catalog: &Catalog,
    ) -> Self {
        let tab = tab
            .or_else(|| resolve_connect_tab_from_parent_key(framework, catalog))
            .unwrap_or(ConnectTab::Frameworks);
        let tree = catalog.tree(tab);

        let parent = framework
            .and_then(|key| find_node(tree, key))
            .or_else(|| tree.first());
        let child = parent.and_then(|p| {
            using
                .and_then(|key| p.child(key))
                .or_else(|| p.first_child())
        });
        let grandchild = child.and_then(|c| {
            with.and_then(|key| c.child(key))
                .or_else(|| c.first_child())
        });

        let key = |node: Option<&ConnectionType>| node.map(|n| n.key.clone()).unwrap_or_default();
        Self {
            tab,
            parent: key(parent),
            child: key(child),
            grandchild: key(grandchild),
        }
    }

    /// Deep-link parameters for the cursor; empty levels are omitted.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![(TAB_PARAM, self.tab.key().to_string())];
        for (name, value) in [
            (FRAMEWORK_PARAM, &self.parent),
            (USING_PARAM, &self.child),
            (WITH_PARAM, &self.grandchild),
        ] {
            if !value.is_empty() {
                params.push((name, value.clone()));
            }
        }
        params
    }

    /// Content path of the current selection.
    pub fn content_path(&self, catalog: &Catalog) -> String {
        resolve_content_path(
            catalog.tree(self.tab),
            &self.parent,
            &self.child,
            &self.grandchild,
        )
    }

    fn parent_node<'c>(&self, catalog: &'c Catalog) -> Option<&'c ConnectionType> {
        find_node(catalog.tree(self.tab), &self.parent)
    }

    fn child_node<'c>(&self, catalog: &'c Catalog) -> Option<&'c ConnectionType> {
        self.parent_node(catalog).and_then(|p| p.child(&self.child))
    }

    fn reset_below_parent(&mut self, catalog: &Catalog) {
        let child = self.parent_node(catalog).and_then(ConnectionType::first_child);
        self.child = child.map(|c| c.key.clone()).unwrap_or_default();
        self.grandchild = child.map(|c| first_key(&c.children)).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    /// Every non-empty level belongs to the chain above it.
    fn assert_consistent(cursor: &ConnectCursor) {
        let tree = catalog().tree(cursor.tab);
        if cursor.parent.is_empty() {
            assert!(cursor.child.is_empty() && cursor.grandchild.is_empty());
            return;
        }
        let parent = find_node(tree, &cursor.parent).expect("parent in tree");
        if cursor.child.is_empty() {
            assert!(cursor.grandchild.is_empty());
            return;
        }
        let child = parent.child(&cursor.child).expect("child under parent");
        if !cursor.grandchild.is_empty() {
            assert!(child.child(&cursor.grandchild).is_some());
        }
    }

    #[test]
    fn test_new_cursor_selects_first_nodes() {
        let cursor = ConnectCursor::new(catalog());
        assert_eq!(cursor.parent, "nextjs");
        assert_eq!(cursor.child, "app");
        assert_eq!(cursor.grandchild, "supabasejs");
        assert_eq!(cursor.content_path(catalog()), "nextjs/app/supabasejs");
    }

    #[test]
    fn test_tab_change_cascades() {
        let mut cursor = ConnectCursor::new(catalog());
        cursor.select_tab(ConnectTab::Mobiles, catalog());
        assert_eq!(cursor.parent, "exporeactnative");
        assert_eq!(cursor.child, "supabasejs");
        assert_eq!(cursor.grandchild, "");
        assert_consistent(&cursor);

        cursor.select_tab(ConnectTab::Orms, catalog());
        assert_eq!(cursor.parent, "prisma");
        assert_eq!(cursor.child, "");
        assert_consistent(&cursor);

        cursor.select_tab(ConnectTab::Direct, catalog());
        assert_eq!(cursor.parent, "");
        assert_consistent(&cursor);
    }

    #[test]
    fn test_parent_and_child_changes_cascade() {
        let mut cursor = ConnectCursor::new(catalog());
        cursor.select_parent("react", catalog());
        assert_eq!(cursor.child, "create-react-app");
        assert_eq!(cursor.grandchild, "supabasejs");

        cursor.select_child("vite", catalog());
        assert_eq!(cursor.child, "vite");
        assert_eq!(cursor.grandchild, "supabasejs");

        cursor.select_parent("nuxt", catalog());
        assert_eq!(cursor.child, "supabasejs");
        assert_eq!(cursor.grandchild, "");
        assert_consistent(&cursor);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut cursor = ConnectCursor::new(catalog());
        let before = cursor.clone();
        cursor.select_parent("flutter", catalog());
        cursor.select_child("vite", catalog());
        cursor.select_grandchild("missing", catalog());
        assert_eq!(cursor, before);

        cursor.select_grandchild("", catalog());
        assert_eq!(cursor.grandchild, "");
        assert_eq!(cursor.content_path(catalog()), "nextjs/app");
    }

    #[test]
    fn test_actions_keep_the_chain_consistent() {
        let mut cursor = ConnectCursor::new(catalog());
        let actions = [
            CursorAction::SelectParent { key: "react".into() },
            CursorAction::SelectChild { key: "vite".into() },
            CursorAction::SelectTab { tab: ConnectTab::Mobiles },
            CursorAction::SelectParent { key: "swift".into() },
            CursorAction::SelectChild { key: "app".into() },
            CursorAction::SelectTab { tab: ConnectTab::Frameworks },
            CursorAction::SelectParent { key: "prisma".into() },
            CursorAction::SelectGrandchild { key: "supabasejs".into() },
        ];
        for action in actions {
            cursor.apply(action, catalog());
            assert_consistent(&cursor);
        }
    }

    #[test]
    fn test_restore_infers_tab_and_validates_levels() {
        let cursor = ConnectCursor::from_query(None, Some("flutter"), None, None, catalog());
        assert_eq!(cursor.tab, ConnectTab::Mobiles);
        assert_eq!(cursor.child, "supabaseflutter");

        let cursor = ConnectCursor::from_query(
            None,
            Some("nextjs"),
            Some("pages"),
            Some("bogus"),
            catalog(),
        );
        assert_eq!(cursor.tab, ConnectTab::Frameworks);
        assert_eq!(cursor.child, "pages");
        assert_eq!(cursor.grandchild, "supabasejs");

        let cursor = ConnectCursor::from_query(
            Some(ConnectTab::Orms),
            Some("nextjs"),
            None,
            None,
            catalog(),
        );
        assert_eq!(cursor.parent, "prisma");
        assert_consistent(&cursor);
    }

    #[test]
    fn test_query_params_round_trip() {
        let mut cursor = ConnectCursor::new(catalog());
        cursor.select_parent("react", catalog());
        cursor.select_child("vite", catalog());

        let params = cursor.query_params();
        assert_eq!(
            params,
            vec![
                (TAB_PARAM, "frameworks".to_string()),
                (FRAMEWORK_PARAM, "react".to_string()),
                (USING_PARAM, "vite".to_string()),
                (WITH_PARAM, "supabasejs".to_string()),
            ]
        );

        let get = |name: &str| {
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };
        let restored = ConnectCursor::from_query(
            get(TAB_PARAM).and_then(ConnectTab::from_key),
            get(FRAMEWORK_PARAM),
            get(USING_PARAM),
            get(WITH_PARAM),
            catalog(),
        );
        assert_eq!(restored, cursor);
    }

    #[test]
    fn test_action_wire_format() {
        let action: CursorAction =
            serde_json::from_str(r#"{"type":"select_parent","key":"nuxt"}"#).unwrap();
        assert_eq!(action, CursorAction::SelectParent { key: "nuxt".into() });
        let action: CursorAction =
            serde_json::from_str(r#"{"type":"restore","framework":"swift"}"#).unwrap();
        assert!(matches!(action, CursorAction::Restore { tab: None, .. }));
    }
}
