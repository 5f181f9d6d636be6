//! Connection-string syntax annotation.
//!
//! Turns the same templates the builder renders into display tokens, with a
//! tooltip on every fragment a user has to fill in or may want explained.

use common::models::connection::is_md5_auth;
use common::models::{Dialect, SyntaxOptions, SyntaxToken};

use crate::template::{expand, pooler_tld, template_for, Fragment, Slot, Target, TemplateContext};

const DB_USER_DESC: &str = "Database user (e.g postgres)";
const DB_PASS_DESC: &str = "Database password";
const DB_NAME_DESC: &str = "Database name (e.g postgres)";
const PROJECT_REF_DESC: &str = "Project's reference ID";
const PORT_NUMBER_DESC: &str = "Port number (Use 5432 if using prepared statements)";

/// Placeholder shown for the user.
pub const USER_TOKEN: &str = "[user]";
/// Placeholder shown for the password.
pub const PASSWORD_TOKEN: &str = "[password]";
/// Placeholder shown for the database name.
pub const DB_NAME_TOKEN: &str = "[db-name]";

/// Annotates the template of `options.selected_tab`.
///
/// `raw_connection_string` is the pooler URI; it decides md5 mode and, when
/// `options.tld` is empty, the host's top-level domain. Unknown dialects
/// produce no tokens.
pub fn annotate_syntax(raw_connection_string: &str, options: &SyntaxOptions) -> Vec<SyntaxToken> {
    let Some(dialect) = Dialect::from_key(&options.selected_tab) else {
        return Vec::new();
    };

    let ctx = TemplateContext {
        md5: is_md5_auth(raw_connection_string),
        target: if options.use_pooler_connection {
            Target::Pooler
        } else {
            Target::Direct
        },
        project_ref: Some(options.project_ref.as_str()),
    };
    let tld = if options.tld.is_empty() {
        pooler_tld(raw_connection_string)
    } else {
        options.tld.clone()
    };

    let mut tokens = Vec::new();
    for fragment in expand(template_for(dialect, ctx.md5, ctx.target), &ctx) {
        match fragment {
            Fragment::Text(text) => tokens.push(SyntaxToken::plain(text)),
            Fragment::Slot(slot) => slot_tokens(&mut tokens, slot, ctx.target, options, &tld),
        }
    }
    tokens.retain(|token| !token.value.is_empty());
    tokens
}

fn slot_tokens(
    tokens: &mut Vec<SyntaxToken>,
    slot: Slot,
    target: Target,
    options: &SyntaxOptions,
    tld: &str,
) {
    let token = match slot {
        Slot::Host => return host_tokens(tokens, target, options, tld),
        Slot::User => SyntaxToken::described(USER_TOKEN, DB_USER_DESC),
        Slot::Password => SyntaxToken::described(PASSWORD_TOKEN, DB_PASS_DESC),
        Slot::DbName => SyntaxToken::described(DB_NAME_TOKEN, DB_NAME_DESC),
        Slot::Port => SyntaxToken::described(options.port_number.as_str(), PORT_NUMBER_DESC),
        Slot::ProjectRef => SyntaxToken::described(options.project_ref.as_str(), PROJECT_REF_DESC),
    };
    tokens.push(token);
}

fn host_tokens(tokens: &mut Vec<SyntaxToken>, target: Target, options: &SyntaxOptions, tld: &str) {
    match target {
        Target::Pooler => {
            tokens.push(SyntaxToken::described(
                options.cloud_provider.to_lowercase(),
                "Cloud provider",
            ));
            tokens.push(SyntaxToken::plain("-0-"));
            tokens.push(SyntaxToken::described(options.region.as_str(), "Project's region"));
            tokens.push(SyntaxToken::plain(format!(".pooler.supabase.{tld}")));
        }
        Target::Direct => {
            tokens.push(SyntaxToken::plain("db."));
            tokens.push(SyntaxToken::described(options.project_ref.as_str(), PROJECT_REF_DESC));
            tokens.push(SyntaxToken::plain(format!(".supabase.{tld}")));
        }
    }
}

/// Concatenated token values.
pub fn join_tokens(tokens: &[SyntaxToken]) -> String {
    tokens.iter().map(|token| token.value.as_str()).collect()
}
