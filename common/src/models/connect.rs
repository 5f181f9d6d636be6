//! Connect-flow models.
//!
//! The connect wizard walks a static tree of frameworks, mobile SDKs and
//! ORMs. These types describe the tree, the wizard tabs and the selection
//! forms the resolver accepts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A selectable node: framework, variant, library, SDK or ORM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionType {
    /// Key, unique among siblings.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Icon identifier.
    #[serde(default)]
    pub icon: String,
    /// Link to the framework's quickstart guide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guide_link: Option<String>,
    /// Child nodes; empty for leaves.
    #[serde(default)]
    #[schema(no_recursion)]
    pub children: Vec<ConnectionType>,
}

impl ConnectionType {
    /// Creates a leaf node.
    pub fn leaf(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            guide_link: None,
            children: Vec::new(),
        }
    }

    /// Sets the guide link.
    pub fn with_guide(mut self, link: &str) -> Self {
        self.guide_link = Some(link.to_string());
        self
    }

    /// Sets the children.
    pub fn with_children(mut self, children: Vec<ConnectionType>) -> Self {
        self.children = children;
        self
    }

    /// Finds a direct child by key.
    pub fn child(&self, key: &str) -> Option<&ConnectionType> {
        find_node(&self.children, key)
    }

    /// First child, if any.
    pub fn first_child(&self) -> Option<&ConnectionType> {
        self.children.first()
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Finds a node by key among `nodes`.
pub fn find_node<'a>(nodes: &'a [ConnectionType], key: &str) -> Option<&'a ConnectionType> {
    nodes.iter().find(|node| node.key == key)
}

/// Top-level tab of the connect wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectTab {
    Frameworks,
    Mobiles,
    Orms,
    Direct,
    Mcp,
}

impl ConnectTab {
    /// All tabs in display order.
    pub const ALL: [ConnectTab; 5] = [
        ConnectTab::Direct,
        ConnectTab::Frameworks,
        ConnectTab::Mobiles,
        ConnectTab::Orms,
        ConnectTab::Mcp,
    ];

    /// Whether the tab is backed by a selection tree.
    pub fn has_tree(&self) -> bool {
        matches!(
            self,
            ConnectTab::Frameworks | ConnectTab::Mobiles | ConnectTab::Orms
        )
    }

    /// Key used in query strings.
    pub fn key(&self) -> &'static str {
        match self {
            ConnectTab::Frameworks => "frameworks",
            ConnectTab::Mobiles => "mobiles",
            ConnectTab::Orms => "orms",
            ConnectTab::Direct => "direct",
            ConnectTab::Mcp => "mcp",
        }
    }

    /// Parses a tab key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.key() == key)
    }
}

/// Wizard selection in either of its two forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Selection {
    /// Parent/child/grandchild keys walked through one tree.
    TreePath {
        /// Tree to walk; inferred from the parent key when absent.
        #[serde(default)]
        tab: Option<ConnectTab>,
        #[serde(default)]
        parent: String,
        #[serde(default)]
        child: String,
        #[serde(default)]
        grandchild: String,
    },
    /// Framework/variant/library fields of the connect sheet.
    SchemaField {
        #[serde(default)]
        framework: Option<String>,
        #[serde(default)]
        framework_variant: Option<String>,
        #[serde(default)]
        library: Option<String>,
    },
}

/// What a selection resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Resolution {
    /// Tab whose tree produced the path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<ConnectTab>,
    /// Slash-separated content path; empty when nothing resolves.
    pub content_path: String,
    /// Library key, if one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    /// Package install command for the library.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
}
