//! Selection resolution.
//!
//! Both selection forms resolve through [`resolve`]: tree paths walk one
//! catalog tree with the grandchild → child → parent fallback, schema fields
//! pick a library and map onto the same path shape.

use common::models::connect::find_node;
use common::models::{ConnectTab, ConnectionType, Resolution, Selection};

use crate::catalog::Catalog;

/// Content path for a tree walk.
///
/// Falls back to the deepest level that exists: an unknown grandchild yields
/// `parent/child`, an unknown child yields `parent`, an unknown parent yields
/// an empty string.
pub fn resolve_content_path(
    tree: &[ConnectionType],
    parent: &str,
    child: &str,
    grandchild: &str,
) -> String {
    let Some(parent_node) = find_node(tree, parent) else {
        return String::new();
    };
    let Some(child_node) = parent_node.child(child) else {
        return parent_node.key.clone();
    };
    match child_node.child(grandchild) {
        Some(grandchild_node) => format!(
            "{}/{}/{}",
            parent_node.key, child_node.key, grandchild_node.key
        ),
        None => format!("{}/{}", parent_node.key, child_node.key),
    }
}

/// Library key for a framework selection.
///
/// An explicit library always wins. Otherwise the variant's first child is
/// used, then the framework's first child's first grandchild, then the first
/// child itself.
pub fn resolve_library_key<'a>(
    framework: Option<&str>,
    framework_variant: Option<&str>,
    library: Option<&str>,
    mut framework_trees: impl Iterator<Item = &'a ConnectionType>,
) -> Option<String> {
    let framework = framework.filter(|f| !f.is_empty())?;
    if let Some(library) = library.filter(|l| !l.is_empty()) {
        return Some(library.to_string());
    }

    let node = framework_trees.find(|node| node.key == framework)?;
    let first_child = node.first_child()?;

    if let Some(nested) = framework_variant
        .and_then(|variant| node.child(variant))
        .and_then(ConnectionType::first_child)
    {
        return Some(nested.key.clone());
    }

    Some(
        first_child
            .first_child()
            .map_or_else(|| first_child.key.clone(), |grandchild| grandchild.key.clone()),
    )
}

/// Tab whose tree contains `parent`, checked frameworks → mobiles → orms.
pub fn resolve_connect_tab_from_parent_key(
    parent: Option<&str>,
    catalog: &Catalog,
) -> Option<ConnectTab> {
    let parent = parent?;
    [ConnectTab::Frameworks, ConnectTab::Mobiles, ConnectTab::Orms]
        .into_iter()
        .find(|tab| find_node(catalog.tree(*tab), parent).is_some())
}

/// Resolves either selection form to a content path, library and install command.
pub fn resolve(selection: &Selection, catalog: &Catalog) -> Resolution {
    match selection {
        Selection::TreePath {
            tab,
            parent,
            child,
            grandchild,
        } => {
            let Some(tab) = tab
                .filter(ConnectTab::has_tree)
                .or_else(|| resolve_connect_tab_from_parent_key(Some(parent.as_str()), catalog))
            else {
                return Resolution::default();
            };
            let tree = catalog.tree(tab);
            let content_path = resolve_content_path(tree, parent, child, grandchild);
            let library = library_of_path(tree, &content_path);
            finish(Some(tab), content_path, library, catalog)
        }
        Selection::SchemaField {
            framework,
            framework_variant,
            library,
        } => {
            let library = resolve_library_key(
                framework.as_deref(),
                framework_variant.as_deref(),
                library.as_deref(),
                catalog.framework_trees(),
            );
            let Some(node) = framework.as_deref().and_then(|key| catalog.framework(key)) else {
                return Resolution {
                    library,
                    ..Default::default()
                };
            };
            let tab = resolve_connect_tab_from_parent_key(Some(node.key.as_str()), catalog);

            // Frameworks with variants nest the library one level deeper.
            let has_variants = node.children.iter().any(|child| !child.is_leaf());
            let child = match framework_variant.as_deref().filter(|v| !v.is_empty()) {
                Some(variant) => variant.to_string(),
                None if has_variants => node
                    .first_child()
                    .map(|c| c.key.clone())
                    .unwrap_or_default(),
                None => library.clone().unwrap_or_default(),
            };
            let grandchild = if has_variants {
                library.clone().unwrap_or_default()
            } else {
                String::new()
            };
            let tree = tab.map(|tab| catalog.tree(tab)).unwrap_or_default();
            let content_path = resolve_content_path(tree, &node.key, &child, &grandchild);
            finish(tab, content_path, library, catalog)
        }
    }
}

/// Last path segment that names a leaf, i.e. a library or an ORM.
fn library_of_path(tree: &[ConnectionType], content_path: &str) -> Option<String> {
    let mut nodes = tree;
    let mut leaf = None;
    for segment in content_path.split('/').filter(|s| !s.is_empty()) {
        let node = find_node(nodes, segment)?;
        if node.is_leaf() {
            leaf = Some(node.key.clone());
        }
        nodes = &node.children;
    }
    leaf
}

fn finish(
    tab: Option<ConnectTab>,
    content_path: String,
    library: Option<String>,
    catalog: &Catalog,
) -> Resolution {
    let parent = content_path.split('/').next().filter(|p| !p.is_empty());
    let install_command = library
        .as_deref()
        .and_then(|library| catalog.install_command(parent, library))
        .map(String::from);
    Resolution {
        tab,
        content_path,
        library,
        install_command,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog;

    fn nextjs_tree() -> Vec<ConnectionType> {
        vec![ConnectionType::leaf("nextjs", "Next.js", "").with_children(vec![
            ConnectionType::leaf("app", "App", "")
                .with_children(vec![ConnectionType::leaf("supabasejs", "supabase-js", "")]),
        ])]
    }

    #[test]
    fn test_content_path_example() {
        let tree = nextjs_tree();
        assert_eq!(
            resolve_content_path(&tree, "nextjs", "app", "supabasejs"),
            "nextjs/app/supabasejs"
        );
        assert_eq!(resolve_content_path(&tree, "nextjs", "app", "missing"), "nextjs/app");
    }

    #[test]
    fn test_content_path_fallback_law() {
        let tree = catalog().tree(ConnectTab::Frameworks);
        for parent in ["nextjs", "react", "nuxt", "nope", ""] {
            for child in ["app", "vite", "supabasejs", "missing", ""] {
                let full = resolve_content_path(tree, parent, child, "bogus");
                assert_eq!(full, resolve_content_path(tree, parent, child, ""));
                assert_eq!(full, resolve_content_path(tree, parent, child, "bogus"));
            }
            assert_eq!(
                resolve_content_path(tree, parent, "bogus", "supabasejs"),
                resolve_content_path(tree, parent, "", "")
            );
        }
        assert_eq!(resolve_content_path(tree, "nope", "app", "supabasejs"), "");
    }

    #[test]
    fn test_library_key_rules() {
        let trees = || catalog().framework_trees();
        assert_eq!(resolve_library_key(None, None, Some("x"), trees()), None);
        assert_eq!(
            resolve_library_key(Some("nextjs"), None, Some("custom"), trees()),
            Some("custom".into())
        );
        assert_eq!(
            resolve_library_key(Some("nextjs"), Some("pages"), None, trees()),
            Some("supabasejs".into())
        );
        assert_eq!(
            resolve_library_key(Some("nextjs"), Some("unknown"), None, trees()),
            Some("supabasejs".into())
        );
        assert_eq!(
            resolve_library_key(Some("flutter"), None, None, trees()),
            Some("supabaseflutter".into())
        );
        assert_eq!(resolve_library_key(Some("missing"), None, None, trees()), None);

        let leafless = [ConnectionType::leaf("bare", "Bare", "")];
        assert_eq!(resolve_library_key(Some("bare"), None, None, leafless.iter()), None);
    }

    #[test]
    fn test_tab_from_parent_key() {
        let catalog = catalog();
        assert_eq!(
            resolve_connect_tab_from_parent_key(Some("nuxt"), catalog),
            Some(ConnectTab::Frameworks)
        );
        assert_eq!(
            resolve_connect_tab_from_parent_key(Some("swift"), catalog),
            Some(ConnectTab::Mobiles)
        );
        assert_eq!(
            resolve_connect_tab_from_parent_key(Some("drizzle"), catalog),
            Some(ConnectTab::Orms)
        );
        assert_eq!(resolve_connect_tab_from_parent_key(Some("cobol"), catalog), None);
        assert_eq!(resolve_connect_tab_from_parent_key(None, catalog), None);
    }

    #[test]
    fn test_resolve_tree_path() {
        let resolution = resolve(
            &Selection::TreePath {
                tab: None,
                parent: "nextjs".into(),
                child: "app".into(),
                grandchild: "supabasejs".into(),
            },
            catalog(),
        );
        assert_eq!(resolution.tab, Some(ConnectTab::Frameworks));
        assert_eq!(resolution.content_path, "nextjs/app/supabasejs");
        assert_eq!(resolution.library.as_deref(), Some("supabasejs"));
        assert_eq!(
            resolution.install_command.as_deref(),
            Some("npm install @supabase/supabase-js @supabase/ssr")
        );

        let orm = resolve(
            &Selection::TreePath {
                tab: Some(ConnectTab::Orms),
                parent: "prisma".into(),
                child: String::new(),
                grandchild: String::new(),
            },
            catalog(),
        );
        assert_eq!(orm.content_path, "prisma");
        assert_eq!(orm.library.as_deref(), Some("prisma"));
        assert!(orm.install_command.is_some());
    }

    #[test]
    fn test_resolve_unknown_tree_path_is_empty() {
        let resolution = resolve(
            &Selection::TreePath {
                tab: Some(ConnectTab::Mcp),
                parent: "cursor".into(),
                child: String::new(),
                grandchild: String::new(),
            },
            catalog(),
        );
        assert_eq!(resolution, Resolution::default());
    }

    #[test]
    fn test_resolve_schema_fields_match_tree_paths() {
        let schema = resolve(
            &Selection::SchemaField {
                framework: Some("react".into()),
                framework_variant: Some("vite".into()),
                library: None,
            },
            catalog(),
        );
        assert_eq!(schema.content_path, "react/vite/supabasejs");
        assert_eq!(schema.library.as_deref(), Some("supabasejs"));

        let flat = resolve(
            &Selection::SchemaField {
                framework: Some("nuxt".into()),
                framework_variant: None,
                library: None,
            },
            catalog(),
        );
        assert_eq!(flat.content_path, "nuxt/supabasejs");
        assert_eq!(flat.tab, Some(ConnectTab::Frameworks));

        let defaulted = resolve(
            &Selection::SchemaField {
                framework: Some("nextjs".into()),
                framework_variant: None,
                library: None,
            },
            catalog(),
        );
        assert_eq!(defaulted.content_path, "nextjs/app/supabasejs");

        let mobile = resolve(
            &Selection::SchemaField {
                framework: Some("swift".into()),
                framework_variant: None,
                library: None,
            },
            catalog(),
        );
        assert_eq!(mobile.tab, Some(ConnectTab::Mobiles));
        assert_eq!(mobile.content_path, "swift/supabaseswift");
    }

    #[test]
    fn test_resolve_schema_without_framework() {
        let resolution = resolve(
            &Selection::SchemaField {
                framework: None,
                framework_variant: None,
                library: Some("supabasejs".into()),
            },
            catalog(),
        );
        assert_eq!(resolution, Resolution::default());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let selection = Selection::TreePath {
            tab: None,
            parent: "react".into(),
            child: "vite".into(),
            grandchild: String::new(),
        };
        assert_eq!(resolve(&selection, catalog()), resolve(&selection, catalog()));
    }
}
