//! # Deployment Environments
//!
//! An addon ships separate metadata and image sets per environment. The set
//! is closed: anything other than the three literals is a configuration
//! error, reported before the registry or filter are touched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The environment an addon is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Integration,
    #[default]
    Stage,
    Production,
}

impl Environment {
    /// All environments, in promotion order.
    pub const ALL: [Environment; 3] = [
        Environment::Integration,
        Environment::Stage,
        Environment::Production,
    ];

    /// The literal used on the command line and as the metadata directory
    /// name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Integration => "integration",
            Environment::Stage => "stage",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidEnvironment {
                value: s.to_string(),
            })
    }
}
