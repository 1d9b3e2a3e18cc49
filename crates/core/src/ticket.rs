//! Ticket status and priority rules, code formatting, and new-ticket form
//! validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attachment::{validate_file, FileMeta};
use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// A freshly filed ticket nobody has picked up yet.
pub const STATUS_OPEN: &str = "open";
/// A technician is working the ticket.
pub const STATUS_IN_PROGRESS: &str = "in_progress";
/// The fix has been delivered and awaits confirmation.
pub const STATUS_RESOLVED: &str = "resolved";
/// Done. Can only be re-opened.
pub const STATUS_CLOSED: &str = "closed";

/// All valid ticket statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

// ---------------------------------------------------------------------------
// Priority constants
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: i32 = 1;
pub const PRIORITY_MEDIUM: i32 = 2;
pub const PRIORITY_HIGH: i32 = 3;
pub const PRIORITY_CRITICAL: i32 = 4;

/// Priority assigned when the submitter does not pick one.
pub const DEFAULT_PRIORITY: i32 = PRIORITY_MEDIUM;

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Length of a subject derived from the description.
const DERIVED_SUBJECT_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses that `from_status` may move to.
///
/// - `open`        -> `in_progress`, `closed`
/// - `in_progress` -> `resolved`, `open`
/// - `resolved`    -> `closed`, `in_progress` (re-open)
/// - `closed`      -> `open` (re-open)
pub fn valid_transitions(from_status: &str) -> &'static [&'static str] {
    match from_status {
        STATUS_OPEN => &[STATUS_IN_PROGRESS, STATUS_CLOSED],
        STATUS_IN_PROGRESS => &[STATUS_RESOLVED, STATUS_OPEN],
        STATUS_RESOLVED => &[STATUS_CLOSED, STATUS_IN_PROGRESS],
        STATUS_CLOSED => &[STATUS_OPEN],
        _ => &[],
    }
}

/// Validate a status string against the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid ticket status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

/// Validate that a ticket may move from `current` to `next`.
///
/// Setting the status it already has is accepted as a no-op.
pub fn validate_transition(current: &str, next: &str) -> Result<(), CoreError> {
    validate_status(next)?;
    if current == next {
        return Ok(());
    }
    let allowed = valid_transitions(current);
    if allowed.contains(&next) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move ticket from '{current}' to '{next}'. Allowed: {allowed:?}"
        )))
    }
}

/// Human label for a status, as shown in the ticket list.
pub fn status_label(status: &str) -> &'static str {
    match status {
        STATUS_IN_PROGRESS => "En Progreso",
        STATUS_RESOLVED => "Resuelto",
        STATUS_CLOSED => "Cerrado",
        _ => "Abierto",
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

pub fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if (PRIORITY_LOW..=PRIORITY_CRITICAL).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {PRIORITY_LOW} and {PRIORITY_CRITICAL} (got {priority})"
        )))
    }
}

/// Human label for a priority. Out-of-range values read as critical.
pub fn priority_label(priority: i32) -> &'static str {
    match priority {
        PRIORITY_LOW => "Baja",
        PRIORITY_MEDIUM => "Media",
        PRIORITY_HIGH => "Alta",
        _ => "Crítica",
    }
}

// ---------------------------------------------------------------------------
// Codes and subjects
// ---------------------------------------------------------------------------

/// Public ticket code, e.g. `TK-2026-000042`.
pub fn format_ticket_code(year: i32, id: DbId) -> String {
    format!("TK-{year}-{id:06}")
}

/// Subject to store when the submitter left it blank: the first non-empty
/// line of the description, cut to 100 characters.
pub fn derive_subject(description: &str) -> String {
    description
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.chars().take(DERIVED_SUBJECT_LENGTH).collect())
        .unwrap_or_default()
}

/// Validate a message body before it is posted to a ticket.
pub fn validate_message_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Message body is required".into()));
    }
    if body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Message exceeds maximum length of {MAX_MESSAGE_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// New-ticket form
// ---------------------------------------------------------------------------

/// Field name -> error message. Ordered so error output is stable.
pub type FieldErrors = BTreeMap<String, String>;

/// Everything the new-ticket form collects before submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTicketForm {
    pub module_id: Option<DbId>,
    pub ticket_type_id: Option<DbId>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<i32>,
    #[serde(default)]
    pub files: Vec<FileMeta>,
}

/// Check the new-ticket form, collecting every problem instead of stopping
/// at the first one.
///
/// Keys: `module_id`, `ticket_type_id`, `subject`, `description`,
/// `priority`, and `file_<index>` for each rejected file.
pub fn validate_new_ticket(form: &NewTicketForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.module_id.is_none() {
        errors.insert("module_id".into(), "A module must be selected".into());
    }
    if form.ticket_type_id.is_none() {
        errors.insert(
            "ticket_type_id".into(),
            "A ticket type must be selected".into(),
        );
    }
    if form.subject.chars().count() > MAX_SUBJECT_LENGTH {
        errors.insert(
            "subject".into(),
            format!("Subject exceeds {MAX_SUBJECT_LENGTH} characters"),
        );
    }
    if form.description.trim().is_empty() {
        errors.insert("description".into(), "Description is required".into());
    } else if form.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.insert(
            "description".into(),
            format!("Description exceeds {MAX_DESCRIPTION_LENGTH} characters"),
        );
    }
    if let Some(p) = form.priority {
        if let Err(CoreError::Validation(msg)) = validate_priority(p) {
            errors.insert("priority".into(), msg);
        }
    }
    for (index, file) in form.files.iter().enumerate() {
        if let Err(CoreError::Validation(msg)) = validate_file(file) {
            errors.insert(format!("file_{index}"), msg);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Render field errors as one line, for log output and error bodies.
pub fn describe_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
