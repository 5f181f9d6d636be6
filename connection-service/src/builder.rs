//! Connection-string rendering.
//!
//! Renders every dialect for the direct and the pooler endpoint. A few
//! dialects reuse the raw pooler URI instead of a template; those reuses are
//! kept exactly as the dashboard has always shown them.

use common::models::connection::PASSWORD_PLACEHOLDER;
use common::models::{
    ConnectionInfo, ConnectionMetadata, ConnectionStringSet, ConnectionStrings, Dialect,
    PoolingInfo,
};

use crate::template::{expand, template_for, Fragment, Slot, Target, TemplateContext};

/// How one dialect is produced for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rendering {
    /// Render the dialect template.
    Template,
    /// Render the template and wrap it in an appsettings.json blob.
    DotnetJson,
    /// The raw pooler connection string, verbatim.
    RawPooler,
    /// `DATABASE_URL=` followed by the raw pooler connection string.
    DatabaseUrl,
}

fn rendering(dialect: Dialect, target: Target) -> Rendering {
    match (dialect, target) {
        (Dialect::Nodejs, _) => Rendering::DatabaseUrl,
        (Dialect::Golang | Dialect::Php | Dialect::Python, Target::Direct) => {
            Rendering::DatabaseUrl
        }
        (Dialect::Uri, Target::Pooler) => Rendering::RawPooler,
        (Dialect::Dotnet, _) => Rendering::DotnetJson,
        _ => Rendering::Template,
    }
}

/// Endpoint values substituted into templates.
struct Endpoint<'a> {
    user: &'a str,
    host: &'a str,
    port: String,
    db_name: &'a str,
}

impl Endpoint<'_> {
    fn value<'s>(&'s self, slot: Slot, ctx: &'s TemplateContext<'_>) -> &'s str {
        match slot {
            Slot::User => self.user,
            Slot::Password => PASSWORD_PLACEHOLDER,
            Slot::Host => self.host,
            Slot::Port => &self.port,
            Slot::DbName => self.db_name,
            Slot::ProjectRef => ctx.project_ref.unwrap_or_default(),
        }
    }
}

/// Builds the direct and pooler connection strings for a project.
pub fn build_connection_strings(
    connection_info: &ConnectionInfo,
    pooling_info: &PoolingInfo,
    metadata: &ConnectionMetadata,
) -> ConnectionStrings {
    let md5 = pooling_info.is_md5();
    let project_ref = metadata.project_ref.as_deref();

    let direct = Endpoint {
        user: &connection_info.db_user,
        host: &connection_info.db_host,
        port: connection_info.db_port.to_string(),
        db_name: &connection_info.db_name,
    };
    let direct_ctx = TemplateContext {
        md5,
        target: Target::Direct,
        project_ref,
    };

    let pooler_ctx = TemplateContext {
        md5,
        target: Target::Pooler,
        project_ref,
    };
    let pooler = Endpoint {
        user: unqualified_user(&pooling_info.db_user, &pooler_ctx),
        host: &pooling_info.db_host,
        port: pooling_info.db_port.to_string(),
        db_name: &pooling_info.db_name,
    };

    let raw = pooling_info.connection_string.as_str();
    ConnectionStrings {
        direct: render_set(&direct, &direct_ctx, raw),
        pooler: render_set(&pooler, &pooler_ctx, raw),
    }
}

/// Strips an existing `.{ref}` suffix so qualification is applied once.
fn unqualified_user<'a>(user: &'a str, ctx: &TemplateContext<'_>) -> &'a str {
    match ctx.project_ref {
        Some(project_ref) if ctx.qualifies_user() => user
            .strip_suffix(project_ref)
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|base| !base.is_empty())
            .unwrap_or(user),
        _ => user,
    }
}

fn render_set(endpoint: &Endpoint<'_>, ctx: &TemplateContext<'_>, raw: &str) -> ConnectionStringSet {
    let mut set = ConnectionStringSet::default();
    for dialect in Dialect::ALL {
        *set.slot_mut(dialect) = match rendering(dialect, ctx.target) {
            Rendering::Template => render_template(dialect, endpoint, ctx),
            Rendering::DotnetJson => dotnet_json(&render_template(dialect, endpoint, ctx)),
            Rendering::RawPooler => raw.to_string(),
            Rendering::DatabaseUrl => format!("DATABASE_URL={raw}"),
        };
    }
    set
}

fn render_template(dialect: Dialect, endpoint: &Endpoint<'_>, ctx: &TemplateContext<'_>) -> String {
    expand(template_for(dialect, ctx.md5, ctx.target), ctx)
        .into_iter()
        .fold(String::new(), |mut out, fragment| {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Slot(slot) => out.push_str(endpoint.value(slot, ctx)),
            }
            out
        })
}

fn dotnet_json(connection_string: &str) -> String {
    let blob = serde_json::json!({
        "ConnectionStrings": {
            "DefaultConnection": connection_string,
        }
    });
    serde_json::to_string_pretty(&blob).unwrap_or_default()
}
