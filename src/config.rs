use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub path: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationSettings {
    pub page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            origins: vec!["*".to_owned()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("database.path", "trivia.db")?
        .set_default("pagination.page_size", 10)?
        .set_default("cors.origins", vec!["*"])?)
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    if settings.pagination.page_size == 0 {
        return Err(ConfigError::InvalidValue(
            "pagination.page_size must be at least 1".to_owned(),
        ));
    }
    Ok(settings)
}

/// Defaults, then an optional `trivia.toml`, then `TRIVIA__SECTION__KEY` variables.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    let builder = defaults()?
        .add_source(File::with_name("trivia").required(false))
        .add_source(
            Environment::with_prefix("TRIVIA")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("cors.origins")
                .try_parsing(true),
        );
    build(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_section() {
        let settings = build(defaults().unwrap()).unwrap();
        assert_eq!(settings.server.addr(), "0.0.0.0:8080");
        assert_eq!(settings.database.path, "trivia.db");
        assert_eq!(settings.pagination.page_size, 10);
        assert_eq!(settings.cors.origins, vec!["*".to_owned()]);
    }

    #[test]
    fn overrides_replace_defaults() {
        let builder = defaults()
            .unwrap()
            .set_override("server.port", 5000)
            .unwrap()
            .set_override("pagination.page_size", 25)
            .unwrap();
        let settings = build(builder).unwrap();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.pagination.page_size, 25);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let builder = defaults()
            .unwrap()
            .set_override("pagination.page_size", 0)
            .unwrap();
        assert!(matches!(build(builder), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let server = ServerSettings {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        };
        assert_eq!(server.addr(), "127.0.0.1:5000");
    }
}
