//! Runtime configuration loaded from the process environment.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

pub const MODEL_PATH_VAR: &str = "HEALTHPREDICT_MODEL_PATH";
pub const SCALER_PATH_VAR: &str = "HEALTHPREDICT_SCALER_PATH";
pub const BIND_VAR: &str = "HEALTHPREDICT_BIND";
pub const LOG_VAR: &str = "HEALTHPREDICT_LOG";

/// Snapshot of configuration values consumed by the service.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub bind: String,
    pub log_filter: String,
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            model_path: PathBuf::from(env_or(MODEL_PATH_VAR, "health_model/HealthPredict.json")),
            scaler_path: PathBuf::from(env_or(SCALER_PATH_VAR, "health_model/HealthScaler.json")),
            bind: env_or(BIND_VAR, "0.0.0.0:5000"),
            log_filter: env_or(LOG_VAR, "info"),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind.trim().parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppCfg::from_lookup(|_| None);
        assert_eq!(cfg.model_path, PathBuf::from("health_model/HealthPredict.json"));
        assert_eq!(cfg.scaler_path, PathBuf::from("health_model/HealthScaler.json"));
        assert_eq!(cfg.bind_addr().unwrap(), "0.0.0.0:5000".parse().unwrap());
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (MODEL_PATH_VAR, "/srv/model.json"),
            (SCALER_PATH_VAR, "/srv/scaler.json"),
            (BIND_VAR, "127.0.0.1:8080"),
            (LOG_VAR, "debug"),
        ]
        .into_iter()
        .collect();
        let cfg = AppCfg::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(cfg.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(cfg.scaler_path, PathBuf::from("/srv/scaler.json"));
        assert_eq!(cfg.bind_addr().unwrap().port(), 8080);
        assert_eq!(cfg.log_filter, "debug");
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = AppCfg::from_lookup(|key| (key == BIND_VAR).then(|| "  ".to_string()));
        assert_eq!(cfg.bind, "0.0.0.0:5000");
    }

    #[test]
    fn malformed_bind_is_rejected() {
        let cfg = AppCfg::from_lookup(|key| (key == BIND_VAR).then(|| "localhost".to_string()));
        assert!(cfg.bind_addr().is_err());
    }
}
