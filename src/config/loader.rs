use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use super::{Config, ConfigRaw, defaults};
use crate::config::ConfigError;

const ENV_PREFIX: &str = "QUADSYNC_";
const DB_PASSWORD_ENV: &str = "QUADSYNC_DB_PASSWORD";

/// Load configuration with layered sources (lowest to highest priority):
/// typed defaults, `config.toml` in the working directory, the `--config`
/// file, then `QUADSYNC_` environment variables (`__` separates sections,
/// e.g. `QUADSYNC_INDEX__URL`).
pub fn load_configuration(custom_config_path: Option<&Path>) -> Result<Config, ConfigError> {
    let config: ConfigRaw = figment(custom_config_path)?
        .extract()
        .map_err(Box::new)?;

    tracing::info!("Configuration loaded successfully");

    config.resolve()
}

fn figment(custom_config_path: Option<&Path>) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(defaults::config()));

    // User overrides from config.toml
    if Path::new("config.toml").exists() {
        figment = figment.merge(Toml::file("config.toml"));
    }

    if let Some(config_path) = custom_config_path {
        if !config_path.exists() {
            return Err(ConfigError::MissingConfig(
                config_path.display().to_string(),
            ));
        }
        tracing::info!(path = %config_path.display(), "Loading custom config file");
        figment = figment.merge(Toml::file(config_path));
    }

    figment = figment.merge(
        Env::prefixed(ENV_PREFIX)
            .ignore(&["db_password"])
            .split("__"),
    );

    // Secret: the database password only ever comes from its own variable.
    if let Ok(password) = std::env::var(DB_PASSWORD_ENV) {
        figment = figment.merge(Serialized::default("repository.password", password));
    }

    Ok(figment)
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use quadsync_index::IndexBackendType;
    use quadsync_repository::DatabaseDriver;

    use super::*;

    #[test]
    fn files_and_environment_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [repository]
                driver = "mysql"
                host = "db.internal"

                [index]
                backend = "sparql"
                "#,
            )?;
            jail.create_file(
                "custom.toml",
                r#"
                [index]
                url = "http://index.internal:9999/blazegraph"
                "#,
            )?;
            jail.set_env("QUADSYNC_INDEX__MAX_CONCURRENT_OPERATIONS", "3");
            jail.set_env("QUADSYNC_DB_PASSWORD", "secret");

            let config = load_configuration(Some(Path::new("custom.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.repository.driver, DatabaseDriver::Mysql);
            assert_eq!(config.repository.password, "secret");
            assert_eq!(config.index.backend, IndexBackendType::Sparql);
            assert_eq!(config.index.url, "http://index.internal:9999/blazegraph");
            assert_eq!(config.index.max_concurrent_operations, 3);
            Ok(())
        });
    }

    #[test]
    fn mysql_without_password_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[repository]\ndriver = \"postgres\"\n")?;
            let result = load_configuration(None);
            assert!(matches!(result, Err(ConfigError::Repository(_))));
            Ok(())
        });
    }

    #[test]
    fn missing_custom_file_is_reported() {
        Jail::expect_with(|_| {
            let result = load_configuration(Some(Path::new("absent.toml")));
            assert!(matches!(result, Err(ConfigError::MissingConfig(_))));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[index]\nbogus = 1\n")?;
            assert!(matches!(
                load_configuration(None),
                Err(ConfigError::LoadError(_))
            ));
            Ok(())
        });
    }
}
