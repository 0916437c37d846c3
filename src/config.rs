use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::{env, path::Path};

/// Main configuration for registrar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord connection and guild layout
    pub discord: DiscordConfig,
    /// Guild role ids the bot needs to know about
    pub roles: RoleConfig,
    /// Redis record store configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,
    /// The guild this bot manages
    pub guild_id: u64,
    /// Category that class channels are created under
    pub class_category_id: u64,
    /// Command prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

/// Role ids used by the permission derivation and moderator checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    pub teacher: u64,
    pub teaching_assistant: u64,
    pub admin: u64,
    pub admin_utility: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                token: String::new(),
                guild_id: 0,
                class_category_id: 0,
                prefix: default_prefix(),
            },
            roles: RoleConfig {
                teacher: 0,
                teaching_assistant: 0,
                admin: 0,
                admin_utility: 0,
            },
            redis: RedisConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.is_empty() {
            return Err(ConfigError::Invalid {
                field: "discord.token".to_string(),
                reason: "Bot token cannot be empty".to_string(),
            }
            .into());
        }

        if self.discord.guild_id == 0 {
            return Err(ConfigError::Invalid {
                field: "discord.guild_id".to_string(),
                reason: "Guild id must be set".to_string(),
            }
            .into());
        }

        if self.discord.class_category_id == 0 {
            return Err(ConfigError::Invalid {
                field: "discord.class_category_id".to_string(),
                reason: "Class category id must be set".to_string(),
            }
            .into());
        }

        for (field, id) in [
            ("roles.teacher", self.roles.teacher),
            ("roles.teaching_assistant", self.roles.teaching_assistant),
            ("roles.admin", self.roles.admin),
            ("roles.admin_utility", self.roles.admin_utility),
        ] {
            if id == 0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "Role id must be set".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Load configuration from the config file and environment variables
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("REGISTRAR_CONFIG").unwrap_or_else(|_| "registrar.toml".to_string());

        if Path::new(&config_path).exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|_e| ConfigError::NotFound {
                    path: config_path.clone(),
                })?;
            let config: Config =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed { source: e })?;

            Ok(config.override_from_env())
        } else {
            Ok(Self::default().override_from_env())
        }
    }

    /// Override config values with environment variables
    fn override_from_env(mut self) -> Self {
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            self.discord.token = token;
        }
        if let Ok(id) = parse_env("GUILD_ID") {
            self.discord.guild_id = id;
        }
        if let Ok(id) = parse_env("CLASS_CATEGORY_ID") {
            self.discord.class_category_id = id;
        }
        if let Ok(prefix) = env::var("COMMAND_PREFIX") {
            self.discord.prefix = prefix;
        }

        if let Ok(id) = parse_env("TEACHER_ROLE_ID") {
            self.roles.teacher = id;
        }
        if let Ok(id) = parse_env("TEACHING_ASSISTANT_ROLE_ID") {
            self.roles.teaching_assistant = id;
        }
        if let Ok(id) = parse_env("ADMIN_ROLE_ID") {
            self.roles.admin = id;
        }
        if let Ok(id) = parse_env("ADMIN_UTILITY_ROLE_ID") {
            self.roles.admin_utility = id;
        }

        if let Ok(url) = env::var("REDIS_URL") {
            self.redis.url = url;
        }

        self
    }
}

fn parse_env(name: &str) -> std::result::Result<u64, ()> {
    env::var(name).map_err(|_| ())?.parse().map_err(|_| ())
}

/// Helper to load a dotenv file if it exists
pub fn load_dotenv() {
    if let Ok(path) = env::var("DOTENV_PATH") {
        dotenvy::from_path(&path).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.discord.token = "token".to_string();
        config.discord.guild_id = 478810581273673746;
        config.discord.class_category_id = 478815208035581978;
        config.roles.teacher = 1;
        config.roles.teaching_assistant = 2;
        config.roles.admin = 3;
        config.roles.admin_utility = 4;
        config
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let mut config = valid_config();
        config.discord.token = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unset_role() {
        let mut config = valid_config();
        config.roles.admin_utility = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            [discord]
            token = "abc"
            guild_id = 42
            class_category_id = 43

            [roles]
            teacher = 1
            teaching_assistant = 2
            admin = 3
            admin_utility = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.discord.prefix, "!");
        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.discord.guild_id, 42);
    }
}
