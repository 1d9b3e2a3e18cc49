//! Authorized e-mail allow-list rules: normalization, validation, and the
//! bulk "paste one address per line" import format.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::{Role, ROLE_USER};

/// Longest accepted address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$")
            .expect("email regex is valid")
    })
}

/// Canonical form used for storage and lookups: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize and validate an address, returning the canonical form.
pub fn validate_email(email: &str) -> Result<String, CoreError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(CoreError::Validation("E-mail is required".into()));
    }
    if normalized.len() > MAX_EMAIL_LENGTH || !email_regex().is_match(&normalized) {
        return Err(CoreError::Validation(format!(
            "Invalid e-mail address '{}'",
            email.trim()
        )));
    }
    Ok(normalized)
}

/// Display name to use when the identity provider did not supply one: the
/// local part of the address.
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// One line of a bulk import, before server-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    ROLE_USER.to_string()
}

/// Parse pasted text into import entries.
///
/// One entry per line, `email[,role]`. Lines are trimmed; blank lines and
/// lines without `@` are skipped; a missing or blank role means `user`.
/// Roles are not validated here.
pub fn parse_import_text(text: &str) -> Vec<ImportEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains('@'))
        .map(|line| {
            let mut parts = line.split(',').map(str::trim);
            let email = parts.next().unwrap_or_default().to_string();
            let role = parts
                .next()
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_role);
            ImportEntry { email, role }
        })
        .collect()
}

/// Validate one import entry, returning the canonical e-mail and role.
pub fn validate_import_entry(entry: &ImportEntry) -> Result<(String, Role), CoreError> {
    let email = validate_email(&entry.email)?;
    let role = entry.role.parse::<Role>()?;
    Ok((email, role))
}

/// Why a single import entry was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub email: String,
    pub error: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<ImportFailure>,
}

impl ImportSummary {
    pub fn record_success(&mut self) {
        self.total += 1;
        self.success += 1;
    }

    pub fn record_failure(&mut self, email: impl Into<String>, error: impl Into<String>) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(ImportFailure {
            email: email.into(),
            error: error.into(),
        });
    }
}
