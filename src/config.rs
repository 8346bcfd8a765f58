use crate::engine::Timing;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,
    pub locale: Option<String>,
    pub scripts_dir: Option<PathBuf>,
    pub send_delay_ms: Option<u64>,
    pub reveal_delay_ms: Option<u64>,
    pub color: Option<bool>,
}

impl Config {
    fn from_file(path: &Path) -> Result<Self, serde_yaml::Error> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Ok(Config::default()),
        };
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&content)
    }

    fn load(path: &Path) -> Self {
        match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                // The logger is not up yet when CONFIG is first touched.
                eprintln!("Ignoring malformed {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn timing(&self) -> Timing {
        let defaults = Timing::default();
        Timing {
            send_delay: self
                .send_delay_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or(defaults.send_delay),
            reveal_delay: self
                .reveal_delay_ms
                .map(std::time::Duration::from_millis)
                .unwrap_or(defaults.reveal_delay),
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::load(Path::new(CONFIG_FILE));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.yaml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.timing(), Timing::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "locale: es\nsend_delay_ms: 250\ncolor: false\n").unwrap();

        let config = Config::load(&path);
        assert_eq!(config.locale.as_deref(), Some("es"));
        assert_eq!(config.color, Some(false));
        assert_eq!(config.timing().send_delay, Duration::from_millis(250));
        assert_eq!(config.timing().reveal_delay, Duration::from_millis(800));
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "send_delay_ms: [not, a, number]\n").unwrap();
        assert!(Config::from_file(&path).is_err());
        assert_eq!(Config::load(&path), Config::default());
    }
}
