use crate::error::AppError;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TODOAPP_CONFIG_PATH";
pub const HOST_ENV_VAR: &str = "TODOAPP_HOST";
pub const PORT_ENV_VAR: &str = "TODOAPP_PORT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

/// Values supplied on the command line; they win over env and file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store_path: Option<PathBuf>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub store_path: PathBuf,
}

impl Settings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("todoapp")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("todoapp")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(host) = overrides.host.as_ref() {
        merged.host = Some(host.clone());
    }
    if let Some(port) = overrides.port {
        merged.port = Some(port);
    }
    if let Some(store_path) = overrides.store_path.as_ref() {
        merged.store_path = Some(store_path.clone());
    }
    merged
}

/// Resolves settings from the process environment.
pub fn resolve_settings(
    config: &Config,
    overrides: &ConfigOverrides,
) -> Result<Settings, AppError> {
    resolve_settings_with_env(config, overrides, |key| std::env::var(key).ok())
}

/// Precedence: overrides, then `env`, then `config`, then defaults.
pub fn resolve_settings_with_env<F>(
    config: &Config,
    overrides: &ConfigOverrides,
    env: F,
) -> Result<Settings, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let env_value = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let env_port = match env_value(PORT_ENV_VAR) {
        Some(raw) => Some(raw.trim().parse::<u16>().map_err(|err| {
            AppError::invalid_input(format!("{PORT_ENV_VAR} must be a port number: {err}"))
        })?),
        None => None,
    };

    let layered = Config {
        host: env_value(HOST_ENV_VAR).or_else(|| config.host.clone()),
        port: env_port.or(config.port),
        store_path: env_value(json_store::STORE_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| config.store_path.clone()),
    };
    let merged = merge_overrides(&layered, overrides);

    let store_path = match merged.store_path {
        Some(path) => path,
        None => json_store::store_path()?,
    };

    Ok(Settings {
        host: merged.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: merged.port.unwrap_or(DEFAULT_PORT),
        store_path,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_HOST, DEFAULT_PORT, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides, resolve_settings_with_env,
    };
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todoapp-{nanos}-{file_name}"))
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert_eq!(result.error.map(|err| err.code()), Some("invalid_data"));
    }

    #[test]
    fn load_config_reads_valid_file() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "host": "0.0.0.0",
            "port": 8080,
            "store_path": "/srv/todo/tasks.json"
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(loaded.port, Some(8080));
        assert_eq!(
            loaded.store_path,
            Some(PathBuf::from("/srv/todo/tasks.json"))
        );
    }

    #[test]
    fn merge_overrides_preserves_base_config() {
        let base = Config {
            host: Some("localhost".into()),
            port: Some(4000),
            store_path: None,
        };
        let overrides = ConfigOverrides {
            port: Some(5000),
            ..ConfigOverrides::default()
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(base.port, Some(4000));
        assert_eq!(merged.host.as_deref(), Some("localhost"));
        assert_eq!(merged.port, Some(5000));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            host: Some("localhost".into()),
            port: Some(4000),
            store_path: Some(PathBuf::from("tasks.json")),
        };

        assert_eq!(merge_overrides(&base, &ConfigOverrides::default()), base);
    }

    #[test]
    fn resolve_settings_falls_back_to_defaults() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/tasks.json")),
            ..Config::default()
        };

        let settings =
            resolve_settings_with_env(&config, &ConfigOverrides::default(), env_from(&[])).unwrap();

        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.bind_address(), "127.0.0.1:3001");
    }

    #[test]
    fn resolve_settings_layers_env_over_file_and_overrides_over_env() {
        let config = Config {
            host: Some("file-host".into()),
            port: Some(1000),
            store_path: Some(PathBuf::from("/file/tasks.json")),
        };
        let env = env_from(&[
            ("TODOAPP_HOST", "env-host"),
            ("TODOAPP_PORT", "2000"),
            ("TODOAPP_STORE_PATH", "/env/tasks.json"),
        ]);
        let overrides = ConfigOverrides {
            port: Some(3000),
            ..ConfigOverrides::default()
        };

        let settings = resolve_settings_with_env(&config, &overrides, env).unwrap();

        assert_eq!(settings.host, "env-host");
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.store_path, PathBuf::from("/env/tasks.json"));
    }

    #[test]
    fn resolve_settings_ignores_blank_env_values() {
        let config = Config {
            host: Some("file-host".into()),
            port: None,
            store_path: Some(PathBuf::from("/file/tasks.json")),
        };
        let env = env_from(&[("TODOAPP_HOST", "  "), ("TODOAPP_STORE_PATH", "")]);

        let settings =
            resolve_settings_with_env(&config, &ConfigOverrides::default(), env).unwrap();

        assert_eq!(settings.host, "file-host");
        assert_eq!(settings.store_path, PathBuf::from("/file/tasks.json"));
    }

    #[test]
    fn resolve_settings_rejects_bad_env_port() {
        let config = Config {
            store_path: Some(PathBuf::from("/tmp/tasks.json")),
            ..Config::default()
        };
        let env = env_from(&[("TODOAPP_PORT", "not-a-port")]);

        let err =
            resolve_settings_with_env(&config, &ConfigOverrides::default(), env).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
    }
}
