//! Connect sheet schema.
//!
//! The schema lists the modes, the fields each mode shows, when a field
//! applies, and the instruction steps for every combination of values.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::conditional::{Conditional, DEFAULT_BRANCH};
use super::steps::{Step, StepTree};
use super::types::{ConnectMode, ConnectState, FieldId, FieldValue, MODE_KEY};

/// Input control of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    RadioGrid,
    RadioList,
    Select,
    Switch,
}

/// Where a field's options come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OptionSource {
    Frameworks,
    FrameworkVariants,
    Libraries,
    ConnectionMethods,
    ConnectionTypes,
    Orms,
    McpClients,
}

/// A field applies only while `field` holds one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Dependency {
    pub field: FieldId,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldDef {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<Dependency>,
}

impl FieldDef {
    pub fn new(id: FieldId, field_type: FieldType, label: &str) -> Self {
        Self {
            id,
            field_type,
            label: label.to_string(),
            default_value: None,
            options: None,
            depends_on: Vec::new(),
        }
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn options(mut self, source: OptionSource) -> Self {
        self.options = Some(source);
        self
    }

    pub fn depends_on(mut self, field: FieldId, values: &[&str]) -> Self {
        self.depends_on.push(Dependency {
            field,
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// Whether every dependency holds in `state`.
    pub fn applies(&self, state: &ConnectState) -> bool {
        self.depends_on.iter().all(|dep| {
            state
                .get(dep.field)
                .map(FieldValue::condition_key)
                .is_some_and(|value| dep.values.contains(&value))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModeDef {
    pub id: ConnectMode,
    pub label: String,
    pub description: String,
    pub fields: Vec<FieldId>,
}

impl ModeDef {
    pub fn new(id: ConnectMode, label: &str, description: &str, fields: &[FieldId]) -> Self {
        Self {
            id,
            label: label.to_string(),
            description: description.to_string(),
            fields: fields.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectSchema {
    pub modes: Vec<ModeDef>,
    pub fields: Vec<FieldDef>,
    pub steps: StepTree,
}

impl ConnectSchema {
    pub fn mode(&self, mode: ConnectMode) -> Option<&ModeDef> {
        self.modes.iter().find(|m| m.id == mode)
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Fields of the current mode whose dependencies hold; empty for modes the
/// schema does not define.
pub fn active_fields<'s>(schema: &'s ConnectSchema, state: &ConnectState) -> Vec<&'s FieldDef> {
    let Some(mode) = schema.mode(state.mode) else {
        return Vec::new();
    };
    mode.fields
        .iter()
        .filter_map(|id| schema.field(*id))
        .filter(|field| field.applies(state))
        .collect()
}

/// First mode (or `direct`) plus every field default.
pub fn default_state(schema: &ConnectSchema) -> ConnectState {
    let mode = schema
        .modes
        .first()
        .map(|m| m.id)
        .unwrap_or(ConnectMode::Direct);
    let mut state = ConnectState::new(mode);
    for field in &schema.fields {
        if let Some(value) = &field.default_value {
            state.set(field.id, value.clone());
        }
    }
    state
}

/// Clears fields that depend on `changed` and no longer apply.
pub fn reset_dependent_fields(
    state: &ConnectState,
    changed: FieldId,
    schema: &ConnectSchema,
) -> ConnectState {
    let mut next = state.clone();
    for field in &schema.fields {
        let depends = field.depends_on.iter().any(|dep| dep.field == changed);
        if depends && !field.applies(state) {
            next.clear(field.id);
        }
    }
    next
}

static CONNECT_SCHEMA: LazyLock<ConnectSchema> = LazyLock::new(build_schema);

/// The built-in connect sheet schema.
pub fn connect_schema() -> &'static ConnectSchema {
    &CONNECT_SCHEMA
}

fn build_schema() -> ConnectSchema {
    use FieldId::*;

    let modes = vec![
        ModeDef::new(
            ConnectMode::Framework,
            "Framework",
            "Use a client library",
            &[Framework, FrameworkVariant, Library, FrameworkUi],
        ),
        ModeDef::new(
            ConnectMode::Direct,
            "Direct",
            "Connection string",
            &[ConnectionMethod, UseSharedPooler, ConnectionType],
        ),
        ModeDef::new(ConnectMode::Orm, "ORM", "Third-party library", &[Orm]),
        ModeDef::new(ConnectMode::Mcp, "MCP", "Connect your agent", &[McpClient, McpReadonly]),
    ];

    let nextjs_or_react = ["nextjs", "react"];
    let fields = vec![
        FieldDef::new(Framework, FieldType::RadioGrid, "Framework")
            .options(OptionSource::Frameworks)
            .default_value(FieldValue::text("nextjs")),
        FieldDef::new(FrameworkVariant, FieldType::Select, "Variant")
            .options(OptionSource::FrameworkVariants)
            .depends_on(Framework, &nextjs_or_react),
        FieldDef::new(Library, FieldType::Select, "Library")
            .options(OptionSource::Libraries)
            .default_value(FieldValue::text("supabasejs")),
        FieldDef::new(FrameworkUi, FieldType::Switch, "Shadcn")
            .default_value(FieldValue::Flag(false))
            .depends_on(Framework, &nextjs_or_react),
        FieldDef::new(Orm, FieldType::RadioList, "ORM")
            .options(OptionSource::Orms)
            .default_value(FieldValue::text("prisma")),
        FieldDef::new(ConnectionMethod, FieldType::RadioList, "Connection method")
            .options(OptionSource::ConnectionMethods)
            .default_value(FieldValue::text("direct")),
        FieldDef::new(ConnectionType, FieldType::Select, "Type")
            .options(OptionSource::ConnectionTypes)
            .default_value(FieldValue::text("uri")),
        FieldDef::new(UseSharedPooler, FieldType::Switch, "Use IPv4 connection (Shared Pooler)")
            .depends_on(ConnectionMethod, &["transaction"]),
        FieldDef::new(McpClient, FieldType::Select, "Client")
            .options(OptionSource::McpClients)
            .default_value(FieldValue::text("cursor")),
        FieldDef::new(McpReadonly, FieldType::Switch, "Read-only")
            .default_value(FieldValue::Flag(false)),
    ];

    ConnectSchema {
        modes,
        fields,
        steps: build_steps(),
    }
}

fn steps(list: Vec<Step>) -> StepTree {
    StepTree::Steps(list)
}

fn build_steps() -> StepTree {
    let install = || Step::new("install", "Install package", "Add the client library to your project", "steps/install".to_string());
    let skills = steps(vec![Step::new(
        "install-skills",
        "Install agent skills",
        "Teach your AI assistant about Supabase",
        "steps/skills-install".to_string(),
    )]);

    let framework_configure = Step::new(
        "configure",
        "Add files",
        "Configure the client for your framework",
        "steps/configure".to_string(),
    );
    let shadcn = steps(vec![
        Step::new("shadcn-add", "Add the blocks", "Install Supabase UI components", "steps/shadcn/command".to_string()),
        Step::new("shadcn-explore", "Explore the blocks", "Browse the installed components", "steps/shadcn/explore".to_string()),
    ]);
    let plain_framework = steps(vec![install(), framework_configure]);
    let with_ui = || {
        StepTree::on(
            FieldId::FrameworkUi.key(),
            [("true", shadcn.clone()), (DEFAULT_BRANCH, plain_framework.clone())],
        )
    };
    let framework = StepTree::on(
        FieldId::Framework.key(),
        [
            ("nextjs", with_ui()),
            ("react", with_ui()),
            (DEFAULT_BRANCH, plain_framework.clone()),
        ],
    );

    let direct_files = steps(vec![
        Step::new("direct-install", "Install driver", "Install a Postgres client", "steps/direct/install".to_string()),
        Step::new("direct-files", "Add files", "Use the connection string in code", "steps/direct/files".to_string()),
    ]);
    let direct = StepTree::on(
        MODE_KEY,
        [(
            DEFAULT_BRANCH,
            steps(vec![Step::new(
                "connection",
                "Connection string",
                "Copy the connection details",
                "steps/direct-connection".to_string(),
            )]),
        )],
    )
    .then(
        FieldId::ConnectionType.key(),
        ["nodejs", "golang", "python", "dotnet", "php", "jdbc", "sqlalchemy"]
            .map(|key| (key, direct_files.clone())),
    );

    let orm = steps(vec![
        install(),
        Step::new("configure", "Configure ORM", "Point the ORM at your database", "{{orm}}".to_string()),
    ]);

    let mcp_configure = Step::new(
        "configure-mcp",
        "Configure MCP",
        "Add the Supabase MCP server to your client",
        Conditional::branch([
            ("cursor", Conditional::Value("steps/mcp/cursor".to_string())),
            ("windsurf", Conditional::Value("steps/mcp/windsurf".to_string())),
            ("vscode", Conditional::Value("steps/mcp/vscode".to_string())),
            (DEFAULT_BRANCH, Conditional::Value("steps/mcp/generic".to_string())),
        ]),
    );
    let mcp = StepTree::on(
        FieldId::McpClient.key(),
        [
            (
                "codex",
                steps(vec![
                    Step::new("codex-add-server", "Add server", "Register the MCP server", "steps/mcp/codex/add-server".to_string()),
                    Step::new("codex-enable-remote", "Enable remote servers", "Turn on remote MCP support", "steps/mcp/codex/enable-remote".to_string()),
                    Step::new("codex-authenticate", "Authenticate", "Log in to Supabase", "steps/mcp/codex/authenticate".to_string()),
                    Step::new("codex-verify", "Verify", "Check the server is connected", "steps/mcp/codex/verify".to_string()),
                ]),
            ),
            (
                "claude-code",
                steps(vec![
                    Step::new("claude-add-server", "Add server", "Register the MCP server", "steps/mcp/claude-code/add-server".to_string()),
                    Step::new("claude-authenticate", "Authenticate", "Log in to Supabase", "steps/mcp/claude-code/authenticate".to_string()),
                ]),
            ),
            (DEFAULT_BRANCH, steps(vec![mcp_configure])),
        ],
    );

    StepTree::on(
        MODE_KEY,
        [
            ("framework", framework),
            ("direct", direct),
            ("orm", orm),
            ("mcp", mcp),
        ],
    )
    .then(MODE_KEY, [(DEFAULT_BRANCH, skills)])
}
