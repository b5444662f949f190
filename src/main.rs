//! ShopRate server binary.

use anyhow::{Context, Result};
use clap::Parser;
use shoprate::{api::routes::create_router, auth::AuthService, db::DbClient, AppState, Config};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shoprate-server", version, about = "ShopRate REST API server")]
struct Cli {
    /// Bind address (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database path, ":memory:" for ephemeral (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "shoprate=debug,tower_http=debug"
    } else {
        "shoprate=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }

    let db = Arc::new(
        DbClient::new_local(&config.database.path)
            .await
            .context("Failed to open database")?,
    );
    info!(path = %config.database.path, "database ready");

    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.token_expiry_secs,
    ));

    bootstrap_admin(&db, &auth_service, &config).await?;

    let state = AppState {
        db,
        auth_service,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(
            "/api-docs/openapi.json",
            <shoprate::api::ApiDoc as utoipa::OpenApi>::openapi(),
        ),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Creates the bootstrap admin account when `ADMIN_EMAIL`/`ADMIN_PASSWORD`
/// are configured and the email is not yet registered.
async fn bootstrap_admin(
    db: &Arc<DbClient>,
    auth_service: &Arc<AuthService>,
    config: &Config,
) -> Result<()> {
    let (email, password) = match (&config.auth.admin_email, &config.auth.admin_password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            info!("ADMIN_EMAIL/ADMIN_PASSWORD not set; skipping admin bootstrap");
            return Ok(());
        }
    };

    if db
        .get_user_by_email(email)
        .await
        .context("Failed to check for existing admin")?
        .is_some()
    {
        return Ok(());
    }

    let password_hash = auth_service
        .hash_password(password)
        .context("Failed to hash admin password")?;
    let admin = db
        .create_user(
            "Administrator",
            email,
            "N/A",
            &password_hash,
            shoprate::Role::Admin,
        )
        .await
        .context("Failed to create admin account")?;

    info!(user_id = %admin.id, "created bootstrap admin account");

    Ok(())
}
