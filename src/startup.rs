//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::application::services::{ActivityServiceImpl, MentionServiceImpl, NotificationServiceImpl};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::push::{create_push_client, PushClient};
use crate::infrastructure::repositories::{PgNotificationRepository, PgUserRepository};
use crate::presentation::http::{handlers, routes};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::websocket::BroadcastHub;

/// Delivery gateway over the Postgres repositories.
pub type PgNotificationService = NotificationServiceImpl<PgNotificationRepository, PgUserRepository>;

/// Mention resolver over the Postgres repositories.
pub type PgMentionService = MentionServiceImpl<PgUserRepository, PgNotificationService>;

/// Activity producers over the Postgres repositories and the live hub.
pub type PgActivityService = ActivityServiceImpl<PgUserRepository, PgNotificationService, BroadcastHub>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub hub: BroadcastHub,
    pub push: Arc<dyn PushClient>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: PgPool, hub: BroadcastHub, push: Arc<dyn PushClient>, settings: Settings) -> Self {
        Self {
            db,
            hub,
            push,
            settings: Arc::new(settings),
        }
    }

    /// Delivery gateway for request handlers and producers.
    pub fn notification_service(&self) -> PgNotificationService {
        NotificationServiceImpl::new(
            Arc::new(PgNotificationRepository::new(self.db.clone())),
            Arc::new(PgUserRepository::new(self.db.clone())),
            self.push.clone(),
            self.settings.push.timeout(),
        )
    }

    /// Mention resolver for producers persisting free text.
    pub fn mention_service(&self) -> PgMentionService {
        MentionServiceImpl::new(
            Arc::new(PgUserRepository::new(self.db.clone())),
            Arc::new(self.notification_service()),
        )
    }

    /// Canonical activity notifications and flash broadcasts.
    pub fn activity_service(&self) -> PgActivityService {
        ActivityServiceImpl::new(
            Arc::new(PgUserRepository::new(self.db.clone())),
            Arc::new(self.notification_service()),
            Arc::new(self.hub.clone()),
        )
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    hub: BroadcastHub,
    hub_task: JoinHandle<()>,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        handlers::health::init_server_start();

        let db = database::create_pool(&settings.database)
            .await
            .context("Failed to create database pool")?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }

        let push = create_push_client(&settings.push);
        tracing::info!(
            provider = push.provider(),
            configured = push.is_configured(),
            "Push client ready"
        );

        let (hub, hub_task) = BroadcastHub::spawn(&settings.flash);

        let cors = create_cors_layer(&settings.cors);
        let addr = settings.server_addr();
        let state = AppState::new(db, hub.clone(), push, settings);

        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(cors);

        let listener = TcpListener::bind(addr.as_str())
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            hub,
            hub_task,
        })
    }

    /// Run the server until a shutdown signal arrives, then close every
    /// flash connection and stop the hub.
    pub async fn run_until_stopped(self) -> Result<()> {
        let hub = self.hub.clone();
        let shutdown = async move {
            if let Err(e) = wait_for_shutdown_signal().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
            hub.shutdown().await;
        };

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.hub.shutdown().await;
        if let Err(e) = self.hub_task.await {
            tracing::error!(error = %e, "Broadcast hub task failed");
        }

        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
