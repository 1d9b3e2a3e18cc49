use mesa_core::ticket::{describe_field_errors, FieldErrors};

/// Errors from the API client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server refused the signed-in user (403); the UI sends them to the
    /// unauthorized page.
    #[error("Not authorized: {body}")]
    Unauthorized { body: String },

    /// No session, or the server did not receive an identity (401).
    #[error("Not signed in")]
    NotSignedIn,

    /// Any other non-2xx response.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured base URL cannot carry the request path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rejected locally before anything was sent.
    #[error("Invalid input: {}", describe_field_errors(.0))]
    Validation(FieldErrors),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(403),
            ClientError::NotSignedIn => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            ClientError::InvalidUrl(_) | ClientError::Validation(_) => None,
        }
    }

    /// The server's `error` message when the body is the usual JSON error
    /// object, else the raw body.
    pub fn message(&self) -> String {
        match self {
            ClientError::Unauthorized { body } | ClientError::Api { body, .. } => {
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                    .unwrap_or_else(|| body.clone())
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_json_error_field() {
        let err = ClientError::Api {
            status: 409,
            body: r#"{"error":"Duplicate value","code":"CONFLICT"}"#.into(),
        };
        assert_eq!(err.message(), "Duplicate value");
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        let err = ClientError::Api {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(err.message(), "Bad Gateway");
    }
}
