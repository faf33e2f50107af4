use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::authz::config::AuthzConfig;
use crate::logs::LogConfig;

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self) -> Result<()>;
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "LogConfig::default")]
    pub log: LogConfig,

    #[serde(default = "AuthzConfig::default")]
    pub authz: AuthzConfig,

    /// Message template overrides, e.g. `"errors.required" = "..."`.
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl CommonConfig for AppConfig {
    fn default() -> Self {
        Self {
            log: <LogConfig as CommonConfig>::default(),
            authz: <AuthzConfig as CommonConfig>::default(),
            messages: HashMap::new(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.log.complete().context("validate log config")?;
        self.authz.complete().context("validate authz config")?;
        for (key, template) in self.messages.iter() {
            if template.is_empty() {
                bail!("message '{key}' cannot be empty");
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Reads and parses the file without validating it, `None` when the
    /// file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(s) => {
                let cfg = toml::from_str(&s)
                    .with_context(|| format!("parse config file '{}' toml", path.display()))?;
                Ok(Some(cfg))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read config file '{}'", path.display())),
        }
    }

    /// `path` when given, else `$WALLABY_CONFIG`, else
    /// `~/.config/wallaby/wallaby.toml`.
    pub fn config_path(path: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = path {
            return Ok(PathBuf::from(expandenv("config", path)?));
        }
        if let Ok(path) = env::var("WALLABY_CONFIG") {
            return Ok(PathBuf::from(expandenv("WALLABY_CONFIG", path)?));
        }
        Ok(Self::home_dir()?
            .join(".config")
            .join("wallaby")
            .join("wallaby.toml"))
    }

    fn home_dir() -> Result<PathBuf> {
        let dir = env::var_os("HOME") // Unix/Linux/macOS
            .or_else(|| env::var_os("USERPROFILE")) // Windows
            .map(PathBuf::from);
        match dir {
            Some(dir) => Ok(dir),
            None => {
                bail!("could not determine home directory, please specify config path manually")
            }
        }
    }
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use std::env::temp_dir;

    use crate::logs::LogLevel;

    use super::*;

    fn load(path: &Path) -> AppConfig {
        let mut cfg = AppConfig::read(path).unwrap().unwrap();
        cfg.complete().unwrap();
        cfg
    }

    #[test]
    fn test_read() {
        let path = temp_dir().join("wallaby_test_load.toml");
        fs::write(
            &path,
            r#"
            [log]
            level = "debug"

            [authz]
            default_decision = "deny"

            [[authz.controllers]]
            name = "Admin::ApplicationController"

            [messages]
            "errors.required" = "%{subject} must be given"
            "#,
        )
        .unwrap();

        let cfg = load(&path);
        assert!(matches!(cfg.log.level, LogLevel::Debug));
        assert_eq!(cfg.authz.controllers.len(), 1);
        assert_eq!(
            cfg.messages.get("errors.required").map(String::as_str),
            Some("%{subject} must be given")
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_read_missing() {
        let path = temp_dir().join("wallaby_test_missing_config.toml");
        assert!(AppConfig::read(&path).unwrap().is_none());

        let mut cfg = <AppConfig as CommonConfig>::default();
        cfg.complete().unwrap();
        assert!(cfg.authz.controllers.is_empty());
        assert!(cfg.messages.is_empty());
    }

    #[test]
    fn test_config_path() {
        let path = AppConfig::config_path(Some("/etc/wallaby.toml")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/wallaby.toml"));
    }

    #[test]
    fn test_read_invalid() {
        let path = temp_dir().join("wallaby_test_read_invalid.toml");
        fs::write(&path, "[authz]\ndefault_decision = \"maybe\"\n").unwrap();
        let err = AppConfig::read(&path).unwrap_err();
        assert!(err.to_string().starts_with("parse config file"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_complete_rejects_empty_message() {
        let mut cfg = <AppConfig as CommonConfig>::default();
        cfg.messages
            .insert("errors.required".to_string(), String::new());
        assert!(cfg.complete().is_err());
    }
}
