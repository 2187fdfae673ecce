use std::time::Duration;

use crate::{
    accounts::AccountService, auth::Authenticator, backend::AppointmentBackend,
    booking::BookingService, configuration::Configuration,
    configuration_handler::ConfigurationHandler, database_interface::DatabaseInterface,
    http::create_app, local_ledger::LocalLedger,
};
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
    time::sleep,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod accounts;
mod auth;
mod backend;
mod booking;
mod configuration;
mod configuration_handler;
mod database_interface;
mod error;
mod http;
mod local_ledger;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
pub struct AppState<T: AppointmentBackend> {
    accounts: AccountService<T>,
    booking: BookingService<T>,
    authenticator: Authenticator,
}

impl<T: AppointmentBackend> AppState<T> {
    pub fn new<C: Configuration>(backend: T, configuration: &C) -> Self {
        let authenticator = Authenticator::new(
            &configuration.token_secret(),
            configuration.password_hash_cost(),
        );
        Self {
            accounts: AccountService::new(backend.clone(), authenticator.clone()),
            booking: BookingService::new(backend),
            authenticator,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting appointment manager");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = TcpListener::bind(&address).await?;
    info!("Accessible at {address}");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseInterface::new(&database_url) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(%err, "Failed to establish database connection. Retry in 1 sec. You may want to restart it with database disabled (impersistent data).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        if configuration.reset_database() {
            backend.reset_schema()?;
        }
        create_app(backend, &configuration)
    } else {
        warn!("No database configured, all data is kept in memory");
        create_app(LocalLedger::default(), &configuration)
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!(%err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(%err, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
