use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

pub static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub somana: String,
    pub r2d2: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const SOMANA_LEVEL: &str = "info";
    const R2D2_LEVEL: &str = "warn";

    fn default() -> Self {
        LoggingConfig {
            somana: Self::SOMANA_LEVEL.to_string(),
            r2d2: Self::R2D2_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        self.somana = Self::valid_level("somana", &self.somana, Self::SOMANA_LEVEL);
        self.r2d2 = Self::valid_level("r2d2", &self.r2d2, Self::R2D2_LEVEL);
    }

    fn valid_level(name: &str, level: &str, default: &str) -> String {
        let normalized = level.trim().to_ascii_lowercase();
        if Self::LOG_LEVELS.contains(&normalized.as_str()) {
            normalized
        } else {
            eprintln!(
                "Config error: {name} log level of '{level}' is invalid - using default of '{default}'"
            );
            default.to_owned()
        }
    }

    /// Builds the flexi_logger spec string, e.g. "somana=info, r2d2=warn"
    pub fn log_spec(&self) -> String {
        format!("somana={}, r2d2={}", self.somana, self.r2d2)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

impl ServerConfig {
    const ENVIRONMENTS: [&str; 2] = ["development", "production"];
    const ENV_PRODUCTION: &str = "production";

    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            environment: Self::ENV_PRODUCTION.to_owned(),
        }
    }

    /// Internal error text is only echoed to clients in development
    pub fn expose_errors(&self) -> bool {
        self.environment == "development"
    }

    fn ensure_valid(&mut self) {
        let str_original = self.environment.clone();
        self.environment = self.environment.trim().to_ascii_lowercase();
        if !Self::ENVIRONMENTS.contains(&self.environment.as_str()) {
            eprintln!(
                "Config error: environment of '{}' is invalid - using default of '{}'",
                str_original,
                Self::ENV_PRODUCTION
            );
            self.environment = Self::ENV_PRODUCTION.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Database file. When absent the file lives in the app's data directory.
    pub path: Option<String>,
}

impl DatabaseConfig {
    const DB_FILENAME: &str = "somana.db";

    fn default() -> Self {
        DatabaseConfig { path: None }
    }

    pub fn resolve_path(&self, data_dir: &Path) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(path),
            None => data_dir.join(Self::DB_FILENAME),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct QueryConfig {
    /// Page size applied when a list request carries no usable `limit`
    pub default_limit: u32,
    /// Ceiling the list endpoints clamp client-supplied limits to
    pub max_limit: u32,
    /// Reject unknown field names instead of passing them through
    pub strict_fields: bool,
}

impl QueryConfig {
    pub const DEFAULT_LIMIT: u32 = 100;
    pub const MAX_LIMIT: u32 = 1000;

    pub fn default() -> Self {
        QueryConfig {
            default_limit: Self::DEFAULT_LIMIT,
            max_limit: Self::MAX_LIMIT,
            strict_fields: true,
        }
    }

    fn ensure_valid(&mut self) {
        if self.default_limit == 0 {
            eprintln!(
                "Config error: default_limit of 0 is invalid - using default of '{}'",
                Self::DEFAULT_LIMIT
            );
            self.default_limit = Self::DEFAULT_LIMIT;
        }

        if self.max_limit < self.default_limit {
            eprintln!(
                "Config error: max_limit of '{}' is below default_limit - using '{}'",
                self.max_limit, self.default_limit
            );
            self.max_limit = self.default_limit;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub query: QueryConfig,
}

impl Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            query: QueryConfig::default(),
        }
    }

    /// Returns the loaded configuration, or the defaults if nothing was loaded
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::default)
    }

    /// Loads the configuration from a TOML file located in the app's data directory,
    /// overlaid with `SOMANA_` environment variables (e.g. `SOMANA_SERVER__PORT`).
    /// If the file is missing it is written with the defaults. If it fails to parse,
    /// defaults are used.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");
        let default_config = Config::default();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!(
                        "Failed to create configuration directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
            match toml::to_string_pretty(&default_config) {
                Ok(toml_string) => {
                    if let Err(e) = fs::write(&config_path, toml_string) {
                        eprintln!(
                            "Failed to write default config to {}: {}",
                            config_path.display(),
                            e
                        );
                    }
                }
                Err(_) => eprintln!("Failed to serialize default config."),
            }
        }

        Self::from_figment(Self::figment(&config_path), default_config)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("SOMANA_").split("__"))
    }

    fn from_figment(figment: Figment, default_config: Config) -> Self {
        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!("Could not load configuration: {err}. Using default configuration.");
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.server.ensure_valid();
        self.query.ensure_valid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_file_missing() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("config.toml");
            let config = Config::from_figment(Config::figment(&path), Config::default());
            assert_eq!(config, Config::default());
            assert_eq!(config.query.default_limit, 100);
            assert!(config.query.strict_fields);
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_overlay() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [server]
                host = "0.0.0.0"
                port = 3000
                environment = "Development"

                [query]
                default_limit = 10
                max_limit = 50
                strict_fields = false
                "#,
            )?;
            jail.set_env("SOMANA_SERVER__PORT", "4000");

            let path = jail.directory().join("config.toml");
            let config = Config::from_figment(Config::figment(&path), Config::default());

            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 4000);
            assert_eq!(config.server.environment, "development");
            assert!(config.server.expose_errors());
            assert_eq!(config.query.default_limit, 10);
            assert_eq!(config.query.max_limit, 50);
            assert!(!config.query.strict_fields);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_fall_back() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [logging]
                somana = "LOUD"
                r2d2 = " Debug "

                [server]
                environment = "staging"

                [query]
                default_limit = 0
                max_limit = 5
                "#,
            )?;

            let path = jail.directory().join("config.toml");
            let config = Config::from_figment(Config::figment(&path), Config::default());

            assert_eq!(config.logging.somana, "info");
            assert_eq!(config.logging.r2d2, "debug");
            assert_eq!(config.server.environment, "production");
            assert!(!config.server.expose_errors());
            assert_eq!(config.query.default_limit, 100);
            assert_eq!(config.query.max_limit, 100);
            Ok(())
        });
    }

    #[test]
    fn test_log_spec() {
        assert_eq!(LoggingConfig::default().log_spec(), "somana=info, r2d2=warn");
    }

    #[test]
    fn test_database_path_resolution() {
        let data_dir = Path::new("/tmp/somana-data");
        assert_eq!(
            DatabaseConfig::default().resolve_path(data_dir),
            data_dir.join("somana.db")
        );
        let explicit = DatabaseConfig {
            path: Some("/var/lib/somana/site.db".into()),
        };
        assert_eq!(
            explicit.resolve_path(data_dir),
            PathBuf::from("/var/lib/somana/site.db")
        );
    }
}
