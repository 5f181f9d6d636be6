//! Connection-string models.
//!
//! Inputs describe a project's direct and pooled endpoints; outputs are the
//! rendered connection strings and the annotated syntax tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Literal substituted for the password in every rendered string.
pub const PASSWORD_PLACEHOLDER: &str = "[YOUR-PASSWORD]";

/// Marker in a pooler URI that identifies md5 authentication.
pub const MD5_MARKER: &str = "options=reference";

/// Returns true when the raw pooler connection string uses md5 auth.
pub fn is_md5_auth(raw_connection_string: &str) -> bool {
    raw_connection_string.contains(MD5_MARKER)
}

/// Direct (non-pooled) database endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ConnectionInfo {
    /// Database user.
    pub db_user: String,
    /// Database host.
    pub db_host: String,
    /// Database port.
    pub db_port: u16,
    /// Database name.
    pub db_name: String,
}

/// One pooler endpoint (shared or dedicated).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PoolingInfo {
    /// Raw pooler URI as reported by the platform.
    pub connection_string: String,
    /// Pooler host.
    pub db_host: String,
    /// Pooler port.
    pub db_port: u16,
    /// Database name behind the pooler.
    pub db_name: String,
    /// Pooler user.
    pub db_user: String,
}

impl PoolingInfo {
    /// Whether this pooler authenticates with md5.
    pub fn is_md5(&self) -> bool {
        is_md5_auth(&self.connection_string)
    }
}

/// Extra project context for rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ConnectionMetadata {
    /// Project reference, used to qualify pooler users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_ref: Option<String>,
    /// Postgres version of the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pg_version: Option<String>,
}

/// Output format of a connection string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Uri,
    Psql,
    Golang,
    Jdbc,
    Dotnet,
    Nodejs,
    Php,
    Python,
    Sqlalchemy,
}

impl Dialect {
    /// All dialects in display order.
    pub const ALL: [Dialect; 9] = [
        Dialect::Uri,
        Dialect::Psql,
        Dialect::Golang,
        Dialect::Jdbc,
        Dialect::Dotnet,
        Dialect::Nodejs,
        Dialect::Php,
        Dialect::Python,
        Dialect::Sqlalchemy,
    ];

    /// Key used in API payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Dialect::Uri => "uri",
            Dialect::Psql => "psql",
            Dialect::Golang => "golang",
            Dialect::Jdbc => "jdbc",
            Dialect::Dotnet => "dotnet",
            Dialect::Nodejs => "nodejs",
            Dialect::Php => "php",
            Dialect::Python => "python",
            Dialect::Sqlalchemy => "sqlalchemy",
        }
    }

    /// Parses a dialect key; unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.key() == key)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Rendered strings for one target (direct or pooler), keyed by dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStringSet {
    pub uri: String,
    pub psql: String,
    pub golang: String,
    pub jdbc: String,
    pub dotnet: String,
    pub nodejs: String,
    pub php: String,
    pub python: String,
    pub sqlalchemy: String,
}

impl ConnectionStringSet {
    /// Returns the string rendered for `dialect`.
    pub fn get(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Uri => &self.uri,
            Dialect::Psql => &self.psql,
            Dialect::Golang => &self.golang,
            Dialect::Jdbc => &self.jdbc,
            Dialect::Dotnet => &self.dotnet,
            Dialect::Nodejs => &self.nodejs,
            Dialect::Php => &self.php,
            Dialect::Python => &self.python,
            Dialect::Sqlalchemy => &self.sqlalchemy,
        }
    }

    /// Mutable access to the slot for `dialect`.
    pub fn slot_mut(&mut self, dialect: Dialect) -> &mut String {
        match dialect {
            Dialect::Uri => &mut self.uri,
            Dialect::Psql => &mut self.psql,
            Dialect::Golang => &mut self.golang,
            Dialect::Jdbc => &mut self.jdbc,
            Dialect::Dotnet => &mut self.dotnet,
            Dialect::Nodejs => &mut self.nodejs,
            Dialect::Php => &mut self.php,
            Dialect::Python => &mut self.python,
            Dialect::Sqlalchemy => &mut self.sqlalchemy,
        }
    }
}

/// Connection strings for both targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConnectionStrings {
    pub direct: ConnectionStringSet,
    pub pooler: ConnectionStringSet,
}

/// One fragment of an annotated connection-string template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyntaxToken {
    /// Literal text or placeholder.
    pub value: String,
    /// Hover description for meaningful fragments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl SyntaxToken {
    /// Token without a tooltip.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tooltip: None,
        }
    }

    /// Token with a tooltip.
    pub fn described(value: impl Into<String>, tooltip: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            tooltip: Some(tooltip.into()),
        }
    }
}

/// Request body for rendering connection strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BuildConnectionStringsRequest {
    /// Direct endpoint.
    pub connection_info: ConnectionInfo,
    /// Pooler endpoint.
    pub pooling_info: PoolingInfo,
    /// Project context.
    pub metadata: ConnectionMetadata,
}

/// Options controlling syntax annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SyntaxOptions {
    /// Dialect key; unknown keys produce no tokens.
    #[validate(length(max = 32, message = "selected_tab must be at most 32 characters"))]
    pub selected_tab: String,
    /// Annotate the pooler host instead of the direct host.
    pub use_pooler_connection: bool,
    /// Project reference.
    #[validate(length(max = 64, message = "project_ref must be at most 64 characters"))]
    pub project_ref: String,
    /// Cloud provider, e.g. `AWS`.
    pub cloud_provider: String,
    /// Project region, e.g. `us-east-1`.
    pub region: String,
    /// Top-level domain of the pooler host; derived from the raw string when empty.
    pub tld: String,
    /// Port shown in the template.
    pub port_number: String,
}

/// Request body for syntax annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct AnnotateSyntaxRequest {
    /// Raw pooler connection string, used for md5 detection.
    pub connection_string: String,
    /// Annotation options.
    #[validate(nested)]
    pub options: SyntaxOptions,
}
