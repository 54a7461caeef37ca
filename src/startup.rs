use std::net::TcpListener;

use axum::{
    routing::{get, post},
    serve::Serve,
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::configuration::{DatabaseSettings, Settings};
use crate::routes::{health_check, home, subscribe};

pub struct Application {
    port: u16,
    server: Serve<Router, Router>,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connection = get_connection_pool(&configuration.database).await?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, connection)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn get_connection_pool(
    configuration: &DatabaseSettings,
) -> Result<DatabaseConnection, sea_orm::DbErr> {
    sea_orm::Database::connect(configuration.with_db()).await
}

#[derive(Clone)]
pub struct AppState {
    pub connection: DatabaseConnection,
}

pub fn run(
    listener: TcpListener,
    connection: DatabaseConnection,
) -> Result<Serve<Router, Router>, std::io::Error> {
    let state = AppState { connection };

    // The form may be posted cross-origin when the page is hosted elsewhere.
    let app = Router::new()
        .route("/", get(home))
        .route("/health_check", get(health_check))
        .route("/subscriptions", post(subscribe))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(listener)?;

    let server = axum::serve(listener, app);
    Ok(server)
}
