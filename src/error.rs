use miette::Diagnostic;
use thiserror::Error;

/// Main error type for registrar operations
#[derive(Error, Debug, Diagnostic)]
pub enum RegistrarError {
    #[error("Store error")]
    #[diagnostic(help("Check the Redis connection"))]
    Store(#[from] StoreError),

    #[error("Discord error")]
    #[diagnostic(help("Check the bot token and guild permissions"))]
    Discord(#[from] DiscordError),

    #[error("Configuration error")]
    #[diagnostic(help("Check your configuration file and environment"))]
    Config(#[from] ConfigError),

    #[error("Roster error")]
    Roster(#[from] RosterError),

    #[error("Content error")]
    #[diagnostic(help("The upstream content API may be down"))]
    Content(#[from] ContentError),
}

/// Class record store errors
#[derive(Error, Debug, Diagnostic)]
pub enum StoreError {
    #[error("Failed to connect to Redis at {url}")]
    #[diagnostic(
        code(registrar::store::connection_failed),
        help("Ensure Redis is running and REDIS_URL is correct")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Store command failed: {context}")]
    #[diagnostic(code(registrar::store::command_failed))]
    CommandFailed {
        context: String,
        #[source]
        source: redis::RedisError,
    },

    #[error("Corrupt record at {key}")]
    #[diagnostic(
        code(registrar::store::corrupt_record),
        help("The stored JSON no longer matches the record shape")
    )]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Discord-side errors
#[derive(Error, Debug, Diagnostic)]
pub enum DiscordError {
    #[error("Discord bot token not configured")]
    #[diagnostic(
        code(registrar::discord::no_token),
        help("Set DISCORD_TOKEN in .env or the config file")
    )]
    NoToken,

    #[error("Failed to connect to Discord")]
    #[diagnostic(
        code(registrar::discord::connection_failed),
        help("Check bot token and network connection")
    )]
    ConnectionFailed {
        #[source]
        source: serenity::Error,
    },

    #[error("Discord API call failed: {context}")]
    #[diagnostic(code(registrar::discord::api_failed))]
    ApiFailed {
        context: String,
        #[source]
        source: serenity::Error,
    },

    #[error("Discord error: {0}")]
    #[diagnostic()]
    Other(#[from] serenity::Error),
}

/// Configuration errors
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}")]
    #[diagnostic(
        code(registrar::config::not_found),
        help("Create a config file or use environment variables")
    )]
    NotFound { path: String },

    #[error("Invalid configuration")]
    #[diagnostic(
        code(registrar::config::invalid),
        help("Check configuration format and required fields")
    )]
    Invalid { field: String, reason: String },

    #[error("Failed to parse configuration")]
    #[diagnostic(
        code(registrar::config::parse_failed),
        help("Check TOML syntax and field types")
    )]
    ParseFailed {
        #[source]
        source: toml::de::Error,
    },
}

/// Course roster (CSV) errors
#[derive(Error, Debug, Diagnostic)]
pub enum RosterError {
    #[error("Invalid CSV provided")]
    #[diagnostic(
        code(registrar::roster::malformed),
        help("The roster must be comma-separated with a header row")
    )]
    Malformed {
        #[source]
        source: csv::Error,
    },

    #[error("The roster is empty")]
    #[diagnostic(code(registrar::roster::empty))]
    Empty,
}

/// Outbound content API errors
#[derive(Error, Debug, Diagnostic)]
pub enum ContentError {
    #[error("Content request to {endpoint} failed")]
    #[diagnostic(code(registrar::content::request_failed))]
    RequestFailed {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Type alias for Results in registrar
pub type Result<T> = std::result::Result<T, RegistrarError>;
