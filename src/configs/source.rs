//! Flat view of the configuration keys as they appear in the process
//! environment, with per-environment defaults.
//!
//! `figment::providers::Env` parses values on its own (`5432` becomes an
//! integer, `true` a boolean, `a,b` may stay a string), so every field is read
//! through the lenient deserializers below instead of relying on exact types.

use figment::providers::Serialized;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::configs::environment::Environment;

/// Environment keys read by the settings provider, lowercase as figment
/// exposes them.
pub const KEYS: &[&str] = &[
    "project_name",
    "project_version",
    "bot_name",
    "input_folder",
    "output_folder",
    "temp_folder",
    "logs_folder",
    "templates_folder",
    "app_retry_attempts",
    "app_timeout_seconds",
    "debug_mode",
    "db_host",
    "db_port",
    "db_name",
    "db_user",
    "db_password",
    "db_schema",
    "email_enabled",
    "email_send_to_real_recipients",
    "email_test_recipients",
];

/// Keys holding free text. `Env` would turn `007` into `7` and `1.0` into `1`,
/// so these are also read verbatim and layered on top.
pub const TEXT_KEYS: &[&str] = &[
    "project_name",
    "project_version",
    "bot_name",
    "input_folder",
    "output_folder",
    "temp_folder",
    "logs_folder",
    "templates_folder",
    "db_host",
    "db_name",
    "db_user",
    "db_password",
    "db_schema",
    "email_test_recipients",
];

/// [`TEXT_KEYS`] exactly as the process environment spells them.
pub fn verbatim_env() -> Serialized<BTreeMap<String, String>> {
    verbatim(|key| std::env::var(key.to_uppercase()).ok())
}

/// [`TEXT_KEYS`] from `lookup`, unparsed. Keys it has no value for are left
/// out so lower layers still apply.
pub fn verbatim(lookup: impl Fn(&str) -> Option<String>) -> Serialized<BTreeMap<String, String>> {
    let values = TEXT_KEYS
        .iter()
        .filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
        .collect();
    Serialized::defaults(values)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSettings {
    #[serde(deserialize_with = "lenient::string")]
    pub project_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub project_version: String,
    #[serde(deserialize_with = "lenient::string")]
    pub bot_name: String,

    #[serde(deserialize_with = "lenient::string")]
    pub input_folder: String,
    #[serde(deserialize_with = "lenient::string")]
    pub output_folder: String,
    #[serde(deserialize_with = "lenient::string")]
    pub temp_folder: String,
    #[serde(deserialize_with = "lenient::string")]
    pub logs_folder: String,
    #[serde(deserialize_with = "lenient::string")]
    pub templates_folder: String,

    #[serde(deserialize_with = "lenient::number")]
    pub app_retry_attempts: u32,
    #[serde(deserialize_with = "lenient::number")]
    pub app_timeout_seconds: u64,
    #[serde(deserialize_with = "lenient::flag")]
    pub debug_mode: bool,

    #[serde(deserialize_with = "lenient::string")]
    pub db_host: String,
    #[serde(deserialize_with = "lenient::number")]
    pub db_port: u16,
    #[serde(deserialize_with = "lenient::string")]
    pub db_name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub db_user: String,
    #[serde(deserialize_with = "lenient::string")]
    pub db_password: String,
    /// Empty means "same as the project name".
    #[serde(deserialize_with = "lenient::string")]
    pub db_schema: String,

    #[serde(deserialize_with = "lenient::flag")]
    pub email_enabled: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub email_send_to_real_recipients: bool,
    #[serde(deserialize_with = "lenient::list")]
    pub email_test_recipients: Vec<String>,
}

impl EnvSettings {
    pub fn defaults(environment: Environment) -> Self {
        let base = Self {
            project_name: "rpa_automation".into(),
            project_version: "1.0.0".into(),
            bot_name: "Default Bot".into(),
            input_folder: "data/input".into(),
            output_folder: "data/output".into(),
            temp_folder: "data/temp".into(),
            logs_folder: "logs".into(),
            templates_folder: "templates".into(),
            app_retry_attempts: 3,
            app_timeout_seconds: 30,
            debug_mode: false,
            db_host: String::new(),
            db_port: 5432,
            db_name: "postgres".into(),
            db_user: String::new(),
            db_password: String::new(),
            db_schema: String::new(),
            email_enabled: true,
            email_send_to_real_recipients: true,
            email_test_recipients: Vec::new(),
        };

        match environment {
            Environment::Development => Self {
                app_retry_attempts: 5,
                app_timeout_seconds: 60,
                debug_mode: true,
                email_send_to_real_recipients: false,
                email_test_recipients: vec!["dev@example.com".into()],
                ..base
            },
            Environment::Production => base,
        }
    }
}

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
        List(Vec<Scalar>),
    }

    impl Scalar {
        fn into_text(self) -> String {
            match self {
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(n) => n.to_string(),
                Scalar::Float(f) => f.to_string(),
                Scalar::Text(s) => s,
                Scalar::List(items) => items
                    .into_iter()
                    .map(Scalar::into_text)
                    .collect::<Vec<_>>()
                    .join(","),
            }
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Scalar::deserialize(d)?.into_text())
    }

    /// `true`, `1` and `yes` (any case) are true; every other value is false.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Scalar::deserialize(d)? {
            Scalar::Bool(b) => b,
            Scalar::Int(n) => n == 1,
            other => matches!(
                other.into_text().trim().to_lowercase().as_str(),
                "true" | "1" | "yes"
            ),
        })
    }

    pub fn number<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        let raw = match Scalar::deserialize(d)? {
            Scalar::Int(n) => n,
            other => {
                let text = other.into_text();
                text.trim()
                    .parse::<i64>()
                    .map_err(|_| D::Error::custom(format!("expected an integer, got '{text}'")))?
            }
        };
        T::try_from(raw).map_err(|_| D::Error::custom(format!("integer {raw} is out of range")))
    }

    /// Comma-separated text or a sequence; blanks are dropped.
    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items = match Scalar::deserialize(d)? {
            Scalar::List(items) => items.into_iter().map(Scalar::into_text).collect::<Vec<_>>(),
            other => other.into_text().split(',').map(str::to_owned).collect(),
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_profile_overrides_processing_and_email() {
        let dev = EnvSettings::defaults(Environment::Development);
        assert_eq!(dev.app_retry_attempts, 5);
        assert_eq!(dev.app_timeout_seconds, 60);
        assert!(dev.debug_mode);
        assert!(!dev.email_send_to_real_recipients);
        assert_eq!(dev.email_test_recipients, vec!["dev@example.com"]);
    }

    #[test]
    fn production_profile_keeps_base_values() {
        let prod = EnvSettings::defaults(Environment::Production);
        assert_eq!(prod.app_retry_attempts, 3);
        assert_eq!(prod.app_timeout_seconds, 30);
        assert!(!prod.debug_mode);
        assert!(prod.db_user.is_empty());
    }

    #[test]
    fn verbatim_layer_keeps_numeric_looking_text() {
        use figment::Figment;

        let figment = Figment::new()
            .merge(Serialized::defaults(EnvSettings::defaults(Environment::Production)))
            .merge(verbatim(|key| match key {
                "db_password" => Some("007".to_string()),
                "project_version" => Some("1.0".to_string()),
                "db_port" => Some("9999".to_string()),
                _ => None,
            }));
        let raw: EnvSettings = figment.extract().unwrap();

        assert_eq!(raw.db_password, "007");
        assert_eq!(raw.project_version, "1.0");
        assert_eq!(raw.db_port, 5432, "non-text keys are not taken from this layer");
        assert_eq!(raw.db_user, "");
    }

    #[test]
    fn lenient_readers_accept_text_forms() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(deserialize_with = "lenient::flag")]
            on: bool,
            #[serde(deserialize_with = "lenient::number")]
            port: u16,
            #[serde(deserialize_with = "lenient::string")]
            password: String,
            #[serde(deserialize_with = "lenient::list")]
            to: Vec<String>,
        }

        let probe: Probe = serde_json::from_value(serde_json::json!({
            "on": "YES",
            "port": "6543",
            "password": 12345,
            "to": "a@x.io, ,b@y.io"
        }))
        .unwrap();

        assert!(probe.on);
        assert_eq!(probe.port, 6543);
        assert_eq!(probe.password, "12345");
        assert_eq!(probe.to, vec!["a@x.io", "b@y.io"]);
    }
}
