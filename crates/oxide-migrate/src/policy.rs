//! Apply policies: which severities a run may apply.

use std::fmt;

use oxide_schema::Severity;
use serde::{Deserialize, Serialize};

/// The most disruptive change a migration run is allowed to make.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyPolicy {
    /// Apply nothing; any change is a violation.
    None,
    /// Only create missing tables.
    CreateOnly,
    /// Create tables and alter them in place; refuse rebuilds.
    #[default]
    CreateOrUpdate,
    /// Anything, including table rebuilds.
    All,
}

impl ApplyPolicy {
    /// Returns true if a delta of this severity may be applied.
    #[must_use]
    pub const fn permits(self, severity: Severity) -> bool {
        match (self, severity) {
            (_, Severity::None) | (Self::All, _) => true,
            (Self::None, _) => false,
            (Self::CreateOnly, s) => matches!(s, Severity::Create),
            (Self::CreateOrUpdate, s) => !matches!(s, Severity::Invalid),
        }
    }

    /// Returns the policy name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CreateOnly => "create_only",
            Self::CreateOrUpdate => "create_or_update",
            Self::All => "all",
        }
    }
}

impl fmt::Display for ApplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
