//! Page state for the ticket board and the allow-list admin page.
//!
//! Each page owns a local copy of its rows and keeps it in step with the
//! server after every successful write, so the UI never refetches just to
//! show its own change.

use mesa_core::attachment::FileMeta;
use mesa_core::authorized_email::{parse_import_text, ImportSummary};
use mesa_core::dashboard::{recent, TicketStats, RECENT_TICKETS};
use mesa_core::ticket::{validate_new_ticket, FieldErrors, NewTicketForm};
use mesa_core::types::DbId;

use crate::api::{ApiClient, UploadFile};
use crate::dto::{AuthorizedEmail, CreateTicket, Ticket, TicketQuery, UpdateTicket};
use crate::error::ClientError;

/// Shown when pasted import text contains no usable line.
pub const NO_VALID_EMAILS: &str = "No valid e-mails to import";

// ---------------------------------------------------------------------------
// Ticket board
// ---------------------------------------------------------------------------

pub struct TicketBoard {
    client: ApiClient,
    pub tickets: Vec<Ticket>,
    pub error: Option<String>,
}

impl TicketBoard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            tickets: Vec::new(),
            error: None,
        }
    }

    pub async fn fetch(&mut self, query: &TicketQuery) -> Result<(), ClientError> {
        let result = self.client.list_tickets(query).await;
        let tickets = self.record(result)?;
        self.tickets = tickets;
        Ok(())
    }

    /// Validate the form locally, file the ticket, then upload `files`.
    ///
    /// Upload failures are logged and do not undo the ticket; it is
    /// prepended to the board either way.
    pub async fn create(
        &mut self,
        mut form: NewTicketForm,
        files: Vec<UploadFile>,
    ) -> Result<Ticket, ClientError> {
        form.files = files
            .iter()
            .map(|f| FileMeta::new(f.name.clone(), f.mime_type.clone(), f.bytes.len() as u64))
            .collect();
        validate_new_ticket(&form).map_err(ClientError::Validation)?;

        let (Some(module_id), Some(ticket_type_id)) = (form.module_id, form.ticket_type_id) else {
            return Err(ClientError::Validation(FieldErrors::new()));
        };
        let subject = form.subject.trim();
        let input = CreateTicket {
            module_id,
            ticket_type_id,
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            description: form.description.trim().to_string(),
            priority: form.priority,
        };

        let result = self.client.create_ticket(&input).await;
        let ticket = self.record(result)?;

        if !files.is_empty() {
            if let Err(e) = self.client.upload_attachments(ticket.id, &files).await {
                tracing::warn!(
                    ticket_id = ticket.id,
                    error = %e,
                    "Ticket created but attachment upload failed"
                );
            }
        }

        self.tickets.insert(0, ticket.clone());
        Ok(ticket)
    }

    pub async fn update(&mut self, id: DbId, input: &UpdateTicket) -> Result<Ticket, ClientError> {
        let result = self.client.update_ticket(id, input).await;
        let ticket = self.record(result)?;
        if let Some(slot) = self.tickets.iter_mut().find(|t| t.id == id) {
            *slot = ticket.clone();
        }
        Ok(ticket)
    }

    pub async fn delete(&mut self, id: DbId) -> Result<(), ClientError> {
        let result = self.client.delete_ticket(id).await;
        self.record(result)?;
        self.tickets.retain(|t| t.id != id);
        Ok(())
    }

    /// Counters over the loaded tickets, `mine` relative to the session.
    pub fn stats(&self) -> TicketStats {
        let viewer = self.client.session().map(|s| s.email.as_str());
        TicketStats::compute(&self.tickets, viewer)
    }

    pub fn recent(&self) -> Vec<Ticket> {
        recent(&self.tickets, RECENT_TICKETS)
    }

    /// Keep the error banner in step with the last request.
    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => self.error = Some(e.message()),
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Authorized e-mails admin page
// ---------------------------------------------------------------------------

pub struct AuthorizedEmailsPage {
    client: ApiClient,
    pub rows: Vec<AuthorizedEmail>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl AuthorizedEmailsPage {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            rows: Vec::new(),
            error: None,
            success: None,
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let result = self.client.list_authorized_emails().await;
        self.rows = self.record(result)?;
        Ok(())
    }

    pub async fn add(&mut self, email: &str, role: &str) -> Result<(), ClientError> {
        let result = self.client.add_authorized_email(email, role).await;
        let row = self.record(result)?;
        self.success = Some(format!("{} authorized as {}", row.email, row.allowed_role));
        self.rows.push(row);
        self.rows.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(())
    }

    pub async fn change_role(&mut self, id: DbId, role: &str) -> Result<(), ClientError> {
        let result = self.client.update_authorized_email(id, role).await;
        let row = self.record(result)?;
        self.success = Some(format!("{} is now {}", row.email, row.allowed_role));
        if let Some(slot) = self.rows.iter_mut().find(|r| r.id == id) {
            *slot = row;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: DbId) -> Result<(), ClientError> {
        let result = self.client.delete_authorized_email(id).await;
        self.record(result)?;
        self.rows.retain(|r| r.id != id);
        self.success = Some("E-mail removed".to_string());
        Ok(())
    }

    /// Import pasted `email[,role]` lines, then reload the table.
    pub async fn import_text(&mut self, text: &str) -> Result<ImportSummary, ClientError> {
        let entries = parse_import_text(text);
        if entries.is_empty() {
            self.success = None;
            self.error = Some(NO_VALID_EMAILS.to_string());
            let mut errors = FieldErrors::new();
            errors.insert("emails".into(), NO_VALID_EMAILS.into());
            return Err(ClientError::Validation(errors));
        }

        let result = self.client.import_authorized_emails(&entries).await;
        let summary = self.record(result)?;
        self.success = Some(format!(
            "Imported {} of {} e-mails",
            summary.success, summary.total
        ));
        self.load().await?;
        Ok(summary)
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match &result {
            Ok(_) => self.error = None,
            Err(e) => {
                self.success = None;
                self.error = Some(e.message());
            }
        }
        result
    }
}
