use serde::Deserialize;

use crate::application::AppError;
use crate::domain::{CallerId, IntervalMs, IntervalPolicy};

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Applies to every channel without an override.
    pub global_interval_ms: i64,
    #[serde(default)]
    pub admin_allow_list: Vec<String>,
    /// SQLite url; overrides live in memory when unset.
    pub database_url: Option<String>,
    pub bind: Option<String>,
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        let raw = expand_env(raw);
        let cfg: Config = serde_yaml::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), AppError> {
        IntervalMs::try_from_i64(self.global_interval_ms)?;
        for entry in &self.admin_allow_list {
            if entry.trim().is_empty() {
                return Err(AppError::Config("admin_allow_list contains an empty entry".into()));
            }
            // left over from expand_env when the variable is not set
            if entry.contains("${") {
                return Err(AppError::Config(format!(
                    "admin_allow_list entry {entry} references an unset environment variable"
                )));
            }
        }
        Ok(())
    }

    pub fn policy(&self) -> Result<IntervalPolicy, AppError> {
        Ok(IntervalPolicy::new(IntervalMs::try_from_i64(
            self.global_interval_ms,
        )?))
    }

    pub fn admins(&self) -> Vec<CallerId> {
        self.admin_allow_list.iter().map(CallerId::new).collect()
    }

    pub fn bind_addr(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let cfg = Config::from_yaml(
            r#"
global_interval_ms: 1000
admin_allow_list: ["alice", "bob"]
database_url: "sqlite::memory:"
"#,
        )
        .unwrap();
        assert_eq!(cfg.policy().unwrap().global, IntervalMs::from_millis(1000));
        assert_eq!(cfg.admins().len(), 2);
        assert_eq!(cfg.bind_addr(), DEFAULT_BIND);
    }

    #[test]
    fn negative_global_interval_is_rejected() {
        let err = Config::from_yaml("global_interval_ms: -5\n").unwrap_err();
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn unexpanded_admin_placeholder_is_rejected() {
        let err = Config::from_yaml(
            r#"
global_interval_ms: 1000
admin_allow_list: ["${RATECONTROL_TEST_UNSET_ADMIN}"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("RATECONTROL_TEST_UNSET_ADMIN"));
    }

    #[test]
    fn blank_admin_entry_is_rejected() {
        assert!(Config::from_yaml("global_interval_ms: 0\nadmin_allow_list: [\"  \"]\n").is_err());
    }

    #[test]
    fn global_interval_is_required() {
        assert!(Config::from_yaml("admin_allow_list: []\n").is_err());
    }
}
