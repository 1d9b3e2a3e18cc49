//! REST client for the helpdesk API.
//!
//! Every request carries the signed-in user's e-mail in `x-user-email`.
//! Status handling follows what the UI expects: 403 becomes
//! [`ClientError::Unauthorized`], 401 [`ClientError::NotSignedIn`], and any
//! other failure [`ClientError::Api`] with the raw body.

use mesa_core::authorized_email::{ImportEntry, ImportSummary};
use mesa_core::types::DbId;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dto::{
    Attachment, AuthorizedEmail, CreateTicket, Dashboard, EmailCheck, Envelope, ImportResult, Me,
    Message, Module, Ticket, TicketQuery, TicketType, UpdateTicket, UploadResult, User, UserRef,
};
use crate::error::ClientError;

/// Where the API lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

const USER_EMAIL_HEADER: &str = "x-user-email";

/// The identity-provider session the client acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub name: Option<String>,
}

impl Session {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name,
        }
    }
}

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for one API deployment.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ApiClient {
    /// * `base_url` - API root including `/api`, e.g. `http://host:3001/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- auth ----

    /// `POST /auth/verify`. Needs no session; the e-mail travels in the body.
    pub async fn verify(&self, email: &str, name: Option<&str>) -> Result<User, ClientError> {
        let body = serde_json::json!({ "email": email, "name": name });
        let response = self.request(Method::POST, "/auth/verify").json(&body).send().await?;
        Self::parse_response(response).await
    }

    /// `GET /auth/check-email/{email}`. The address is sent as a single
    /// percent-encoded path segment, so `/`, `?`, `#` and `%` survive intact.
    pub async fn check_email(&self, email: &str) -> Result<EmailCheck, ClientError> {
        let base = self.url("/auth/check-email");
        let mut url =
            reqwest::Url::parse(&base).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(base.clone()))?
            .push(email);

        let mut request = self.client.get(url);
        if let Some(session) = &self.session {
            request = request.header(USER_EMAIL_HEADER, session.email.as_str());
        }
        let envelope: Envelope<EmailCheck> = Self::parse_response(request.send().await?).await?;
        Ok(envelope.data)
    }

    /// `POST /auth/sync-user` with the session's display name.
    pub async fn sync_user(&self) -> Result<User, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;
        let body = serde_json::json!({ "name": session.name });
        let envelope: Envelope<User> = self.send_json(Method::POST, "/auth/sync-user", &body).await?;
        Ok(envelope.data)
    }

    pub async fn me(&self) -> Result<Me, ClientError> {
        self.get("/auth/me").await
    }

    // ---- tickets ----

    pub async fn list_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, ClientError> {
        let response = self.authed(Method::GET, "/tickets")?.query(query).send().await?;
        Self::parse_response(response).await
    }

    pub async fn get_ticket(&self, id: DbId) -> Result<Ticket, ClientError> {
        self.get(&format!("/tickets/{id}")).await
    }

    pub async fn create_ticket(&self, input: &CreateTicket) -> Result<Ticket, ClientError> {
        self.send_json(Method::POST, "/tickets", input).await
    }

    pub async fn update_ticket(&self, id: DbId, input: &UpdateTicket) -> Result<Ticket, ClientError> {
        self.send_json(Method::PUT, &format!("/tickets/{id}"), input).await
    }

    pub async fn delete_ticket(&self, id: DbId) -> Result<(), ClientError> {
        let response = self.authed(Method::DELETE, &format!("/tickets/{id}"))?.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    pub async fn list_messages(&self, ticket_id: DbId) -> Result<Vec<Message>, ClientError> {
        self.get(&format!("/tickets/{ticket_id}/messages")).await
    }

    pub async fn post_message(
        &self,
        ticket_id: DbId,
        body: &str,
        is_internal: bool,
    ) -> Result<Message, ClientError> {
        let payload = serde_json::json!({ "body": body, "is_internal": is_internal });
        self.send_json(Method::POST, &format!("/tickets/{ticket_id}/messages"), &payload)
            .await
    }

    pub async fn dashboard(&self) -> Result<Dashboard, ClientError> {
        self.get("/dashboard/stats").await
    }

    pub async fn modules(&self) -> Result<Vec<Module>, ClientError> {
        self.get("/modules").await
    }

    pub async fn ticket_types(&self) -> Result<Vec<TicketType>, ClientError> {
        self.get("/ticket-types").await
    }

    pub async fn technicians(&self) -> Result<Vec<UserRef>, ClientError> {
        self.get("/users/technicians").await
    }

    // ---- attachments ----

    /// List a ticket's attachments. A 404 or 500 yields an empty list so the
    /// ticket page still renders.
    pub async fn list_attachments(&self, ticket_id: DbId) -> Result<Vec<Attachment>, ClientError> {
        let response = self
            .authed(Method::GET, &format!("/tickets/{ticket_id}/attachments"))?
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::warn!(ticket_id, status = status.as_u16(), "Attachment listing failed, showing none");
            return Ok(Vec::new());
        }
        Self::parse_response(response).await
    }

    pub async fn upload_attachments(
        &self,
        ticket_id: DbId,
        files: &[UploadFile],
    ) -> Result<Vec<Attachment>, ClientError> {
        let mut form = reqwest::multipart::Form::new();
        for file in files {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type)?;
            form = form.part("files", part);
        }
        let response = self
            .authed(Method::POST, &format!("/tickets/{ticket_id}/attachments"))?
            .multipart(form)
            .send()
            .await?;
        let result: UploadResult = Self::parse_response(response).await?;
        Ok(result.attachments)
    }

    pub async fn download_attachment(&self, id: DbId) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("/tickets/attachments/{id}/download")).await
    }

    /// Inline bytes for previews; the server only serves images and PDFs.
    pub async fn view_attachment(&self, id: DbId) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("/tickets/attachments/{id}/view")).await
    }

    // ---- authorized e-mails ----

    pub async fn list_authorized_emails(&self) -> Result<Vec<AuthorizedEmail>, ClientError> {
        let envelope: Envelope<Vec<AuthorizedEmail>> = self.get("/authorized-emails").await?;
        Ok(envelope.data)
    }

    pub async fn add_authorized_email(
        &self,
        email: &str,
        role: &str,
    ) -> Result<AuthorizedEmail, ClientError> {
        let body = serde_json::json!({ "email": email, "role": role });
        let envelope: Envelope<AuthorizedEmail> =
            self.send_json(Method::POST, "/authorized-emails", &body).await?;
        Ok(envelope.data)
    }

    pub async fn update_authorized_email(
        &self,
        id: DbId,
        role: &str,
    ) -> Result<AuthorizedEmail, ClientError> {
        let body = serde_json::json!({ "role": role });
        let envelope: Envelope<AuthorizedEmail> = self
            .send_json(Method::PUT, &format!("/authorized-emails/{id}"), &body)
            .await?;
        Ok(envelope.data)
    }

    pub async fn delete_authorized_email(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .authed(Method::DELETE, &format!("/authorized-emails/{id}"))?
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    pub async fn import_authorized_emails(
        &self,
        entries: &[ImportEntry],
    ) -> Result<ImportSummary, ClientError> {
        let body = serde_json::json!({ "emails": entries });
        let result: ImportResult = self
            .send_json(Method::POST, "/authorized-emails/import", &body)
            .await?;
        Ok(result.summary)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// A request carrying the session identity; fails without a session.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;
        Ok(self
            .request(method, path)
            .header(USER_EMAIL_HEADER, session.email.as_str()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = match self.session {
            Some(_) => self.authed(Method::GET, path)?,
            None => self.request(Method::GET, path),
        }
        .send()
        .await?;
        Self::parse_response(response).await
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.authed(Method::GET, path)?.send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.authed(method, path)?.json(body).send().await?;
        Self::parse_response(response).await
    }

    /// Return the response unchanged on 2xx, else the matching error with
    /// the body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        tracing::debug!(status = status.as_u16(), %body, "API request failed");
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::NotSignedIn,
            StatusCode::FORBIDDEN => ClientError::Unauthorized { body },
            _ => ClientError::Api {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
