use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use uuid::Uuid;

use crate::app::app;
use crate::config::{self, AppConfig};
use crate::database::{manager::redact_url, Database};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "legality360")]
#[command(about = "Legality360 - legal case management API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Bind address (overrides LEGALITY_HOST)")]
        host: Option<String>,

        #[arg(long, short, help = "Port to listen on (overrides LEGALITY_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Apply database migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Mint an identity token signed with the configured secret")]
    Token {
        #[arg(long, help = "Profile id (random when omitted)")]
        user_id: Option<Uuid>,

        #[arg(long)]
        email: String,

        #[arg(long, help = "Display name stored in user_metadata.full_name")]
        name: Option<String>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config().clone();

    match cli.command {
        Commands::Serve { host, port, migrate } => serve(config, host, port, migrate).await,
        Commands::Migrate => {
            let db = Database::connect_lazy(&config.database)?;
            db.migrate().await.context("failed to apply migrations")?;
            db.close().await;
            Ok(())
        }
        Commands::Token { user_id, email, name } => {
            let user_id = user_id.unwrap_or_else(Uuid::new_v4);
            let token = crate::auth::issue_token(&config.identity, user_id, &email, name.as_deref())?;
            if cli.json {
                let out = json!({
                    "token": token,
                    "user_id": user_id,
                    "email": email,
                    "expires_in_hours": config.identity.token_expiry_hours,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{token}");
            }
            Ok(())
        }
    }
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Legality360 API in {:?} mode", config.environment);
    if crate::is_development!() {
        tracing::warn!("Development mode: tokens are verified with the built-in development secret unless IDENTITY_JWT_SECRET is set");
    }
    if config.identity.jwt_secret.is_empty() {
        tracing::warn!("IDENTITY_JWT_SECRET is not set; authenticated routes will answer 503");
    }

    let db = Database::connect_lazy(&config.database)?;
    if migrate || config.database.run_migrations {
        // A missing database should not stop the server from coming up.
        if let Err(e) = db.migrate().await {
            tracing::error!("Migrations failed against {}: {}", redact_url(&config.database.url), e);
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let state = AppState::new(config, db.clone());
    tracing::info!("Legality360 API listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from(["legality360", "serve", "--port", "4100", "--migrate"]).unwrap();
        match cli.command {
            Commands::Serve { host, port, migrate } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(4100));
                assert!(migrate);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn token_requires_email() {
        assert!(Cli::try_parse_from(["legality360", "token"]).is_err());
        let cli = Cli::try_parse_from(["legality360", "--json", "token", "--email", "a@b.co"]).unwrap();
        assert!(cli.json);
    }
}
