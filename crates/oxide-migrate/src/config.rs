//! Planner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::policy::ApplyPolicy;

/// How a [`MigrationPlanner`](crate::planner::MigrationPlanner) applies
/// migrations.
///
/// ```rust
/// use oxide_migrate::{ApplyPolicy, PlannerConfig};
///
/// let config = PlannerConfig::from_json(r#"{"policy": "all", "statement_timeout_ms": 5000}"#).unwrap();
/// assert_eq!(config.policy, ApplyPolicy::All);
/// assert!(config.ensure_schemas);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Most disruptive change allowed.
    pub policy: ApplyPolicy,
    /// Log statements instead of executing them.
    pub dry_run: bool,
    /// Create missing schemas before applying.
    pub ensure_schemas: bool,
    /// Per-statement timeout in milliseconds; no timeout when unset.
    pub statement_timeout_ms: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            policy: ApplyPolicy::CreateOrUpdate,
            dry_run: false,
            ensure_schemas: true,
            statement_timeout_ms: None,
        }
    }
}

impl PlannerConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Config`](crate::MigrateError::Config) for
    /// malformed JSON or an unknown policy.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the apply policy.
    #[must_use]
    pub const fn policy(mut self, policy: ApplyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables dry-run mode.
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Enables or disables schema creation.
    #[must_use]
    pub const fn ensure_schemas(mut self, enabled: bool) -> Self {
        self.ensure_schemas = enabled;
        self
    }

    /// Sets the per-statement timeout.
    #[must_use]
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The per-statement timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        match self.statement_timeout_ms {
            Some(ms) => Some(Duration::from_millis(ms)),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::from_json("{}").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.policy, ApplyPolicy::CreateOrUpdate);
        assert!(!config.dry_run);
        assert!(config.ensure_schemas);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder() {
        let config = PlannerConfig::default()
            .policy(ApplyPolicy::All)
            .dry_run(true)
            .ensure_schemas(false)
            .statement_timeout(Duration::from_secs(2));
        assert_eq!(config.statement_timeout_ms, Some(2000));
        assert_eq!(config.timeout(), Some(Duration::from_secs(2)));
        assert!(config.dry_run);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(PlannerConfig::from_json(r#"{"policy": "yolo"}"#).is_err());
    }
}
