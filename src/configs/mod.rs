use figment::{Figment, providers::{Env, Serialized}};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use crate::core::error::RpaError;

pub mod environment;
pub mod source;

pub use environment::Environment;
use source::EnvSettings;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppPaths {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub temp_folder: PathBuf,
    pub logs_folder: PathBuf,
    pub templates_folder: PathBuf,
}

impl AppPaths {
    /// Creates every configured folder that does not exist yet.
    pub fn ensure_all(&self) -> Result<(), RpaError> {
        for dir in [
            &self.input_folder,
            &self.output_folder,
            &self.temp_folder,
            &self.logs_folder,
            &self.templates_folder,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| {
                RpaError::ConfigError(format!("Cannot create folder {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }
}

/// Retry and timeout values are exposed to bots; nothing in the library
/// applies them.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSettings {
    pub retry_attempts: u32,
    pub timeout_seconds: u64,
    pub debug_mode: bool,
}

#[derive(Clone, Serialize)]
pub struct DbConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub schema: String,
}

impl DbConfig {
    /// `postgresql://{user}:{password}@{host}:{port}/{database}`, or `None`
    /// while the integration is disabled.
    pub fn connection_string(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        Some(format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        ))
    }
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"******")
            .field("schema", &self.schema)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailConfig {
    pub enabled: bool,
    pub send_to_real_recipients: bool,
    pub test_recipients: Vec<String>,
}

impl EmailConfig {
    /// Who a notification actually goes to under this policy.
    pub fn recipients(&self, real: &[String]) -> Vec<String> {
        if !self.enabled {
            Vec::new()
        } else if self.send_to_real_recipients {
            real.to_vec()
        } else {
            self.test_recipients.clone()
        }
    }
}

/// Immutable configuration snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub environment: Environment,
    pub bot_name: String,
    pub project: ProjectInfo,
    pub paths: AppPaths,
    pub processing: ProcessingSettings,
    pub database: DbConfig,
    pub email: EmailConfig,
}

impl Settings {
    /// PROCESS: profile defaults for the active environment merged with the
    /// process environment.
    pub fn load() -> Result<Self, RpaError> {
        let environment = environment::current();
        Self::from_figment(environment, Self::figment(environment))
    }

    /// Profile defaults, then `Env::raw()` restricted to the known keys, then
    /// the text keys again verbatim so values like `007` keep their spelling.
    pub fn figment(environment: Environment) -> Figment {
        Self::defaults(environment)
            .merge(Env::raw().only(source::KEYS))
            .merge(source::verbatim_env())
    }

    /// Profile defaults only. Tests merge their own providers on top.
    pub fn defaults(environment: Environment) -> Figment {
        Figment::new().merge(Serialized::defaults(EnvSettings::defaults(environment)))
    }

    pub fn from_figment(environment: Environment, figment: Figment) -> Result<Self, RpaError> {
        let raw: EnvSettings = figment
            .extract()
            .map_err(|e| RpaError::ConfigError(e.to_string()))?;
        Ok(Self::from_raw(environment, raw))
    }

    fn from_raw(environment: Environment, raw: EnvSettings) -> Self {
        let enabled = !raw.db_host.is_empty() && !raw.db_user.is_empty() && !raw.db_password.is_empty();
        let schema = if raw.db_schema.is_empty() {
            raw.project_name.clone()
        } else {
            raw.db_schema
        };

        Self {
            environment,
            bot_name: raw.bot_name,
            project: ProjectInfo {
                name: raw.project_name,
                version: raw.project_version,
                description: "RPA Automation Framework".to_string(),
            },
            paths: AppPaths {
                input_folder: raw.input_folder.into(),
                output_folder: raw.output_folder.into(),
                temp_folder: raw.temp_folder.into(),
                logs_folder: raw.logs_folder.into(),
                templates_folder: raw.templates_folder.into(),
            },
            processing: ProcessingSettings {
                retry_attempts: raw.app_retry_attempts,
                timeout_seconds: raw.app_timeout_seconds,
                debug_mode: raw.debug_mode,
            },
            database: DbConfig {
                enabled,
                host: raw.db_host,
                port: raw.db_port,
                database: raw.db_name,
                user: raw.db_user,
                password: raw.db_password,
                schema,
            },
            email: EmailConfig {
                enabled: raw.email_enabled,
                send_to_real_recipients: raw.email_send_to_real_recipients,
                test_recipients: raw.email_test_recipients,
            },
        }
    }

    pub fn logs_folder(&self) -> &Path {
        &self.paths.logs_folder
    }

    /// Startup banner. The password is never part of it.
    pub fn summary(&self) -> String {
        let rule = "=".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "RPA AUTOMATION - ENVIRONMENT: {}", self.environment.as_str().to_uppercase());
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Project: {} v{}", self.project.name, self.project.version);
        let _ = writeln!(out, "Bot: {}", self.bot_name);
        let _ = writeln!(out, "Debug: {}", if self.processing.debug_mode { "enabled" } else { "disabled" });
        let _ = writeln!(out, "Database: {}", if self.database.enabled { "configured" } else { "disabled" });
        if self.database.enabled {
            let _ = writeln!(out, "  - Host: {}", self.database.host);
            let _ = writeln!(out, "  - Database: {}", self.database.database);
            let _ = writeln!(out, "  - User: {}", self.database.user);
            let _ = writeln!(out, "  - Schema: {}", self.database.schema);
        }
        let _ = write!(out, "{rule}");
        out
    }
}
