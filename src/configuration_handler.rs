use crate::configuration::Configuration;
use clap::Parser;
use tracing::debug;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "appointment_manager",
    about = "Appointment booking between students and professors"
)]
pub struct ConfigurationHandler {
    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    port: u16,

    /// PostgreSQL connection URL. Without it, all data is kept in memory
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Shared secret used to sign bearer tokens
    #[arg(long, env = "TOKEN_SECRET", hide_env_values = true)]
    token_secret: String,

    /// bcrypt cost factor for stored passwords
    #[arg(
        long,
        env = "PASSWORD_HASH_COST",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    password_hash_cost: u32,

    /// Drop and recreate the database schema on startup
    #[arg(long, env = "RESET_DATABASE")]
    reset_database: bool,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            debug!(?err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn port(&self) -> u16 {
        self.port
    }

    fn database_url(&self) -> Option<String> {
        self.database_url.clone()
    }

    fn token_secret(&self) -> String {
        self.token_secret.clone()
    }

    fn password_hash_cost(&self) -> u32 {
        self.password_hash_cost
    }

    fn reset_database(&self) -> bool {
        self.reset_database
    }
}
