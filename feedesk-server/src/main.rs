//! FeeDesk HTTP server
//!
//! Configuration comes from `FEEDESK_*` environment variables; see
//! [`AuthConfig::from_env`] and [`ServerConfig::from_env`].

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use feedesk_auth::auth::ParentProfile;
use feedesk_auth::{AuthConfig, Database, NewUser, Role, SessionManager, SessionReaper};
use feedesk_server::config::BootstrapAdmin;
use feedesk_server::logging::{init_logging, LogFormat};
use feedesk_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::from_env());

    let auth_config = AuthConfig::from_env().context("invalid auth configuration")?;
    let server_config = ServerConfig::from_env().context("invalid server configuration")?;

    let db = Database::open(&auth_config)
        .await
        .with_context(|| format!("opening {}", auth_config.database_path.display()))?;
    let manager = SessionManager::new(db.clone(), &auth_config)?;

    if let Some(admin) = &server_config.bootstrap_admin {
        bootstrap_admin(&manager, admin).await?;
    }

    let _reaper = server_config
        .reap_interval
        .map(|every| SessionReaper::start(manager.sessions().clone(), every));

    let app = router(AppState::new(manager));
    let listener = TcpListener::bind(server_config.bind)
        .await
        .with_context(|| format!("binding {}", server_config.bind))?;
    info!(addr = %server_config.bind, production = auth_config.production, "FeeDesk server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;

    db.close();
    info!("FeeDesk server stopped");
    Ok(())
}

/// Create the first admin account unless that email is already taken
async fn bootstrap_admin(manager: &SessionManager, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let (user, created) = manager
        .users()
        .ensure(NewUser {
            name: "Administrator".into(),
            email: admin.email.clone(),
            role: Role::Admin,
            password: admin.password.clone(),
            parent: ParentProfile::default(),
        })
        .await
        .context("creating bootstrap admin")?;

    if created {
        info!(user_id = user.id, "Bootstrap admin created");
    } else if user.role != Role::Admin || !user.is_active {
        warn!(user_id = user.id, role = %user.role, "Bootstrap email belongs to a non-admin or inactive account");
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                warn!("Could not register signal handlers; stop with Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
