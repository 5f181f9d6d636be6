//! Connection-string templates.
//!
//! Each templated dialect is written down once as a list of pieces. The
//! builder turns the expanded pieces into values and the syntax annotator
//! turns the same pieces into tooltip tokens, so the two cannot drift apart.

use common::models::Dialect;

/// One element of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Text(&'static str),
    User,
    /// `.{ref}` after the user on pooled, non-md5 connections.
    UserQualifier,
    Password,
    Host,
    Port,
    DbName,
    /// `{prefix}{ref}{suffix}` on pooled md5 connections.
    ReferenceOption {
        prefix: &'static str,
        suffix: &'static str,
    },
}

/// Which endpoint a template is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Direct,
    Pooler,
}

/// Value slots a renderer has to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    User,
    Password,
    Host,
    Port,
    DbName,
    ProjectRef,
}

/// A template piece after the md5/target/ref decisions are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    Text(&'static str),
    Slot(Slot),
}

/// Decisions that turn pieces into fragments.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub md5: bool,
    pub target: Target,
    pub project_ref: Option<&'a str>,
}

impl TemplateContext<'_> {
    fn project_ref(&self) -> Option<&str> {
        self.project_ref.filter(|r| !r.is_empty())
    }

    /// Pooler users are qualified with the project ref unless md5 is used.
    pub fn qualifies_user(&self) -> bool {
        self.target == Target::Pooler && !self.md5 && self.project_ref().is_some()
    }

    /// md5 poolers take the project ref as a connection option instead.
    pub fn adds_reference(&self) -> bool {
        self.target == Target::Pooler && self.md5 && self.project_ref().is_some()
    }
}

use Piece::*;

const URI: &[Piece] = &[
    Text("postgresql://"),
    User,
    UserQualifier,
    Text(":"),
    Password,
    Text("@"),
    Host,
    Text(":"),
    Port,
    Text("/"),
    DbName,
    ReferenceOption {
        prefix: "?options=reference%3D",
        suffix: "",
    },
];

const PSQL_URI: &[Piece] = &[
    Text("psql \"postgresql://"),
    User,
    Text(":"),
    Password,
    Text("@"),
    Host,
    Text(":"),
    Port,
    Text("/"),
    DbName,
    ReferenceOption {
        prefix: "?options=reference%3D",
        suffix: "",
    },
    Text("\""),
];

const PSQL_FLAGS: &[Piece] = &[
    Text("psql -h "),
    Host,
    Text(" -p "),
    Port,
    Text(" -d "),
    DbName,
    Text(" -U "),
    User,
    UserQualifier,
];

/// One pair per line; only `user` and `password` keep a trailing space.
const KEY_VALUE: &[Piece] = &[
    Text("user="),
    User,
    UserQualifier,
    Text(" \npassword="),
    Password,
    Text(" \nhost="),
    Host,
    Text("\nport="),
    Port,
    Text("\ndbname="),
    DbName,
    ReferenceOption {
        prefix: " options=reference=",
        suffix: "",
    },
];

/// One pair per line, every line but the last ending in a space. Never
/// carries the reference option.
const PLAIN_KEY_VALUE: &[Piece] = &[
    Text("user="),
    User,
    UserQualifier,
    Text(" \npassword="),
    Password,
    Text(" \nhost="),
    Host,
    Text(" \nport="),
    Port,
    Text(" \ndbname="),
    DbName,
];

const JDBC: &[Piece] = &[
    Text("jdbc:postgresql://"),
    Host,
    Text(":"),
    Port,
    Text("/"),
    DbName,
    Text("?user="),
    User,
    UserQualifier,
    ReferenceOption {
        prefix: "&options=reference%3D",
        suffix: "",
    },
    Text("&password="),
    Password,
];

const DOTNET_DIRECT: &[Piece] = &[
    Text("Host="),
    Host,
    Text(";Database="),
    DbName,
    Text(";Username="),
    User,
    Text(";Password="),
    Password,
    Text(";SSL Mode=Require;Trust Server Certificate=true"),
];

const DOTNET_POOLER: &[Piece] = &[
    Text("User Id="),
    User,
    UserQualifier,
    Text(";Password="),
    Password,
    Text(";Server="),
    Host,
    Text(";Port="),
    Port,
    Text(";Database="),
    DbName,
    ReferenceOption {
        prefix: ";Options='reference=",
        suffix: "'",
    },
];

/// Template for `dialect` on `target`.
pub fn template_for(dialect: Dialect, md5: bool, target: Target) -> &'static [Piece] {
    match dialect {
        Dialect::Uri | Dialect::Nodejs => URI,
        Dialect::Psql if md5 => PSQL_URI,
        Dialect::Psql => PSQL_FLAGS,
        Dialect::Golang | Dialect::Php | Dialect::Python => KEY_VALUE,
        Dialect::Sqlalchemy => PLAIN_KEY_VALUE,
        Dialect::Jdbc => JDBC,
        Dialect::Dotnet => match target {
            Target::Direct => DOTNET_DIRECT,
            Target::Pooler => DOTNET_POOLER,
        },
    }
}

/// Applies the context to `pieces`, dropping inactive qualifiers and options.
pub fn expand(pieces: &[Piece], ctx: &TemplateContext<'_>) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(pieces.len() + 3);
    for piece in pieces {
        match *piece {
            Text(text) => out.push(Fragment::Text(text)),
            User => out.push(Fragment::Slot(Slot::User)),
            Password => out.push(Fragment::Slot(Slot::Password)),
            Host => out.push(Fragment::Slot(Slot::Host)),
            Port => out.push(Fragment::Slot(Slot::Port)),
            DbName => out.push(Fragment::Slot(Slot::DbName)),
            UserQualifier => {
                if ctx.qualifies_user() {
                    out.push(Fragment::Text("."));
                    out.push(Fragment::Slot(Slot::ProjectRef));
                }
            }
            ReferenceOption { prefix, suffix } => {
                if ctx.adds_reference() {
                    out.push(Fragment::Text(prefix));
                    out.push(Fragment::Slot(Slot::ProjectRef));
                    if !suffix.is_empty() {
                        out.push(Fragment::Text(suffix));
                    }
                }
            }
        }
    }
    out
}

/// Top-level domain of the pooler host in a raw connection string.
///
/// Falls back to `com` when the string has no `pooler.supabase.` host.
pub fn pooler_tld(raw_connection_string: &str) -> String {
    raw_connection_string
        .split_once("pooler.supabase.")
        .map(|(_, rest)| {
            rest.split([':', '/', '?'])
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .filter(|tld| !tld.is_empty())
        .unwrap_or_else(|| "com".to_string())
}
