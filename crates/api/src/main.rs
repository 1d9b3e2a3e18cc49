use std::net::SocketAddr;
use std::time::Duration;

use mesa_core::authorized_email::validate_email;
use mesa_core::roles::ROLE_ADMIN;
use mesa_db::repositories::{AuthorizedEmailRepo, UserRepo};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mesa_api::config::ServerConfig;
use mesa_api::router::build_app_router;
use mesa_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mesa_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mesa_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    mesa_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    mesa_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    seed_admins(&pool, &config.bootstrap_admin_emails).await;

    // --- Attachment storage ---
    tokio::fs::create_dir_all(&config.attachment_dir)
        .await
        .expect("Failed to create attachment directory");
    tracing::info!(dir = %config.attachment_dir.display(), "Attachment storage ready");

    // --- Router ---
    let state = AppState::new(pool, config.clone());
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    tokio::select! {
        result = server => result.expect("Server error"),
        () = async {
            shutdown_signal().await;
            tokio::time::sleep(drain).await;
        } => {
            tracing::warn!(timeout_secs = drain.as_secs(), "In-flight requests did not drain in time");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Make sure every bootstrap address is on the allow-list as an admin, so a
/// fresh deployment has someone who can manage it.
async fn seed_admins(pool: &mesa_db::DbPool, emails: &[String]) {
    for raw in emails {
        let email = match validate_email(raw) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(email = %raw, error = %e, "Skipping invalid bootstrap admin e-mail");
                continue;
            }
        };
        match AuthorizedEmailRepo::upsert(pool, &email, ROLE_ADMIN).await {
            Ok(_) => {
                if let Err(e) = UserRepo::sync_role(pool, &email, ROLE_ADMIN).await {
                    tracing::warn!(%email, error = %e, "Failed to sync bootstrap admin role");
                }
                tracing::info!(%email, "Bootstrap admin authorized");
            }
            Err(e) => tracing::error!(%email, error = %e, "Failed to seed bootstrap admin"),
        }
    }
}

/// Wait for SIGINT or SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
