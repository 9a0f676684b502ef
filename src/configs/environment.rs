//! Active deployment environment.
//!
//! Resolution order: the `ENVIRONMENT` process variable, then the `--env`
//! command-line flag, then `development`. The first resolution wins for the
//! rest of the process.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Process variable consulted before the command line.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// Case-insensitive match against the two known names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" => Some(Environment::Development),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the active environment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentSource {
    ProcessEnv,
    CommandLine,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub environment: Environment,
    pub source: EnvironmentSource,
}

/// Pure resolution step. An unrecognized process value is ignored rather
/// than rejected.
pub fn resolve(process_value: Option<&str>, cli_flag: Option<Environment>) -> Resolved {
    if let Some(environment) = process_value.and_then(Environment::parse) {
        return Resolved { environment, source: EnvironmentSource::ProcessEnv };
    }
    if let Some(environment) = cli_flag {
        return Resolved { environment, source: EnvironmentSource::CommandLine };
    }
    Resolved {
        environment: Environment::default(),
        source: EnvironmentSource::Default,
    }
}

static ACTIVE: OnceLock<Resolved> = OnceLock::new();

/// Resolves and memoizes the environment. Later calls return the first
/// result and ignore their `cli_flag`.
pub fn init(cli_flag: Option<Environment>) -> Resolved {
    *ACTIVE.get_or_init(|| {
        let process_value = std::env::var(ENVIRONMENT_VAR).ok();
        resolve(process_value.as_deref(), cli_flag)
    })
}

pub fn current() -> Environment {
    init(None).environment
}
