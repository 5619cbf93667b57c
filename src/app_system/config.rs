use clap::Parser;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/shopping_list.db";

/// Runtime settings, from flags or `SHOPPING_LIST_*` environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "shopping_list", about = "A shopping list backed by a local database")]
pub struct Settings {
    /// SQLite database the list is stored in.
    #[arg(long, env = "SHOPPING_LIST_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Keep the list in memory instead of a database.
    #[arg(long, env = "SHOPPING_LIST_MEMORY")]
    pub memory: bool,

    /// Request buffer size of each actor.
    #[arg(long, env = "SHOPPING_LIST_CHANNEL_CAPACITY", default_value_t = 32)]
    pub channel_capacity: usize,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, env = "SHOPPING_LIST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            memory: false,
            channel_capacity: 32,
            log_level: "info".to_string(),
        }
    }
}
