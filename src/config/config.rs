use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::de::Error as TomlError;

use crate::config;

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Contexts {
    pub(crate) contexts: HashMap<String, Config>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) current: bool,
    #[serde(skip_deserializing)]
    pub(crate) name: String,
    pub(crate) host: String,
    pub(crate) api: config::api::Api,
    #[serde(default)]
    pub(crate) stress: config::stress::Stress,
}

impl Config {
    pub(crate) fn get_api_url(&mut self) -> String {
        format!("{}://{}:{}", self.api.scheme, self.host, self.api.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            current: true,
            name: "default".to_string(),
            host: "0.0.0.0".to_string(),
            api: config::api::Api {
                scheme: "http".to_string(),
                port: 8080
            },
            stress: config::stress::Stress::default(),
        }
    }
}

pub(crate) fn get_config_dir() -> PathBuf {
    match env::var_os("HPA_STRESS_CONFIG_DIR") {
        Some(variable) => PathBuf::from(variable),
        None => {
            let home = env::var_os("HOME").unwrap_or_else(|| ".".into());
            Path::new(&home).join(".config").join("hpa-stress")
        }
    }
}

pub(crate) fn load_config(context_current: &str) -> Config {
    load_config_from(&get_config_dir(), context_current)
}

pub(crate) fn load_config_from(config_dir: &Path, context_current: &str) -> Config {
    let file = config_dir.join("config.toml");

    debug!("load config file {}", file.display());

    if let Ok(contents) = fs::read_to_string(&file) {
        let contexts: Result<Contexts, TomlError> = toml::from_str(&contents);

        match contexts {
            Ok(contexts) => {
                if let Some(config) = select_context(contexts, context_current) {
                    return config;
                }
            }
            Err(err) => {
                error!("Error while deserializing the TOML file : {}", err);
            }
        }
    }

    debug!("Switch to default configuration");

    Config::default()
}

fn select_context(contexts: Contexts, context_current: &str) -> Option<Config> {
    let mut fallback = None;

    for (context_name, mut config) in contexts.contexts {
        config.name = context_name.clone();

        if context_name == context_current {
            debug!("Switch to context {}", context_name);
            return Some(config);
        }

        if config.current && fallback.is_none() {
            fallback = Some(config);
        }
    }

    if let Some(config) = &fallback {
        debug!("Context {} not found, using current context {}", context_current, config.name);
    }

    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    const CONFIG: &str = r#"
[contexts.default]
current = true
host = "127.0.0.1"
[contexts.default.api]
port = 9000

[contexts.staging]
host = "10.0.0.5"
[contexts.staging.api]
scheme = "https"
port = 8443
[contexts.staging.stress]
memory_hold_seconds = 3
"#;

    fn write_config(contents: &str) -> TempDir {
        let dir = TempDir::new("hpa-stress").unwrap();
        fs::write(dir.path().join("config.toml"), contents).unwrap();
        dir
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new("hpa-stress").unwrap();

        let config = load_config_from(dir.path(), "default");

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.stress.memory_hold_seconds, 10);
        assert_eq!(config.stress.request_timeout_seconds, 330);
    }

    #[test]
    fn selects_named_context() {
        let dir = write_config(CONFIG);

        let mut config = load_config_from(dir.path(), "staging");

        assert_eq!(config.name, "staging");
        assert_eq!(config.get_api_url(), "https://10.0.0.5:8443");
        assert_eq!(config.stress.memory_hold_seconds, 3);
        assert_eq!(config.stress.request_timeout_seconds, 330);
    }

    #[test]
    fn unknown_context_falls_back_to_current() {
        let dir = write_config(CONFIG);

        let mut config = load_config_from(dir.path(), "production");

        assert_eq!(config.name, "default");
        assert_eq!(config.get_api_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn invalid_file_uses_defaults() {
        let dir = write_config("contexts = 12");

        let config = load_config_from(dir.path(), "default");

        assert_eq!(config.name, "default");
        assert_eq!(config.api.port, 8080);
    }
}
