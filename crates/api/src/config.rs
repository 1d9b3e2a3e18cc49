use std::path::PathBuf;

use mesa_core::attachment::MAX_FILE_SIZE;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Root directory for stored attachment files.
    pub attachment_dir: PathBuf,
    /// Largest accepted attachment, in bytes.
    pub max_upload_bytes: u64,
    /// Most files accepted in one upload request.
    pub max_files_per_upload: usize,
    /// How long a resolved `x-user-email` identity stays cached.
    pub auth_cache_ttl_secs: u64,
    /// Addresses granted `admin` on the allow-list at startup.
    pub bootstrap_admin_emails: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `HOST`                   | `0.0.0.0`               |
    /// | `PORT`                   | `3001`                  |
    /// | `CORS_ORIGINS`           | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                    |
    /// | `ATTACHMENT_DIR`         | `storage/attachments`   |
    /// | `MAX_UPLOAD_BYTES`       | `10485760`              |
    /// | `MAX_FILES_PER_UPLOAD`   | `5`                     |
    /// | `AUTH_CACHE_TTL_SECS`    | `300`                   |
    /// | `BOOTSTRAP_ADMIN_EMAILS` | (empty)                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let attachment_dir = PathBuf::from(
            std::env::var("ATTACHMENT_DIR").unwrap_or_else(|_| "storage/attachments".into()),
        );

        let max_upload_bytes: u64 = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| MAX_FILE_SIZE.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid u64");

        let max_files_per_upload: usize = std::env::var("MAX_FILES_PER_UPLOAD")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("MAX_FILES_PER_UPLOAD must be a valid usize");

        let auth_cache_ttl_secs: u64 = std::env::var("AUTH_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("AUTH_CACHE_TTL_SECS must be a valid u64");

        let bootstrap_admin_emails =
            split_list(&std::env::var("BOOTSTRAP_ADMIN_EMAILS").unwrap_or_default());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            attachment_dir,
            max_upload_bytes,
            max_files_per_upload,
            auth_cache_ttl_secs,
            bootstrap_admin_emails,
        }
    }

    /// Request body limit for upload routes: every allowed file at full size
    /// plus room for multipart framing. Saturates instead of overflowing on
    /// oversized settings.
    pub fn max_request_bytes(&self) -> usize {
        usize::try_from(self.max_upload_bytes)
            .unwrap_or(usize::MAX)
            .saturating_mul(self.max_files_per_upload.max(1))
            .saturating_add(1024 * 1024)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
