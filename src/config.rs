use std::time::Duration;

use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Postgres connection string for the FlashLearn database
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
    #[arg(long, env = "FLASHLEARN_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection
    #[arg(
        long,
        env = "FLASHLEARN_ACQUIRE_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub acquire_timeout_secs: u64,
}

impl Settings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}
