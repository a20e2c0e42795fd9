//! Access resolution configuration.

use serde::{Deserialize, Serialize};

/// How collected grants are combined into one effective level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Highest rank among the direct grants and every inheriting ancestor grant.
    #[default]
    HighestRank,
    /// Highest rank among the grants at the most specific level that has any.
    Nearest,
}

/// Settings for the access resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Ignore grants whose `expires_at` has passed.
    #[serde(default = "default_true")]
    pub honor_expiry: bool,
    /// Grant combination strategy.
    #[serde(default)]
    pub strategy: ResolutionStrategy,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            honor_expiry: true,
            strategy: ResolutionStrategy::default(),
        }
    }
}

fn default_true() -> bool {
    true
}
