use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_role_key: String,
    pub jwt_secret: Option<String>,
}

// Keys stay out of logs
impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SupabaseSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Message(format!(
                "supabase.url must be an http(s) URL, got '{}'",
                self.url
            )));
        }
        if self.service_role_key.trim().is_empty() {
            return Err(ConfigError::Message("supabase.service_role_key is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    pub token_cache_ttl_secs: Option<u64>,
    pub token_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<usize>,
    pub max_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_age_weight")]
    pub age: f64,
    #[serde(default = "default_preference_weight")]
    pub preference: f64,
    #[serde(default = "default_personality_weight")]
    pub personality: f64,
    #[serde(default = "default_decline_penalty")]
    pub decline_penalty: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            location: default_location_weight(),
            age: default_age_weight(),
            preference: default_preference_weight(),
            personality: default_personality_weight(),
            decline_penalty: default_decline_penalty(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(w: &WeightsConfig) -> Self {
        Self {
            location: w.location,
            age: w.age,
            preference: w.preference,
            personality: w.personality,
            decline_penalty: w.decline_penalty,
        }
    }
}

fn default_location_weight() -> f64 { 0.35 }
fn default_age_weight() -> f64 { 0.30 }
fn default_preference_weight() -> f64 { 0.20 }
fn default_personality_weight() -> f64 { 0.15 }
fn default_decline_penalty() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

pub fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with MATCHMAKER_)
    /// 5. SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY, SUPABASE_JWT_SECRET
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCHMAKER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("MATCHMAKER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings, |var| std::env::var(var).ok())
    }

    /// Load configuration from a custom path
    ///
    /// The `SUPABASE_*` variables apply here too, exactly as in [`Settings::load`].
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_from_with(path, |var| std::env::var(var).ok())
    }

    fn load_from_with<P, F>(path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("MATCHMAKER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(settings, lookup)
    }

    fn finish<F>(layered: Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings: Settings = apply_supabase_env(layered, lookup)?.try_deserialize()?;
        settings.supabase.validate()?;
        Ok(settings)
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

/// Apply the conventional backend variables on top of the layered config
fn apply_supabase_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        ("supabase.url", "SUPABASE_URL"),
        ("supabase.service_role_key", "SUPABASE_SERVICE_ROLE_KEY"),
        ("supabase.jwt_secret", "SUPABASE_JWT_SECRET"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, var) in overrides {
        if let Some(value) = lookup(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.location, 0.35);
        assert_eq!(weights.age, 0.30);
        assert_eq!(weights.preference, 0.20);
        assert_eq!(weights.personality, 0.15);
        assert_eq!(weights.decline_penalty, 0.10);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_supabase_validation() {
        let mut supabase = SupabaseSettings {
            url: "https://project.supabase.co".to_string(),
            service_role_key: "key".to_string(),
            jwt_secret: None,
        };
        assert!(supabase.validate().is_ok());

        supabase.url = "project.supabase.co".to_string();
        assert!(supabase.validate().is_err());

        supabase.url = "https://project.supabase.co".to_string();
        supabase.service_role_key = " ".to_string();
        assert!(supabase.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let supabase = SupabaseSettings {
            url: "https://project.supabase.co".to_string(),
            service_role_key: "super-secret".to_string(),
            jwt_secret: Some("jwt-secret".to_string()),
        };
        let printed = format!("{:?}", supabase);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("jwt-secret"));
    }

    fn write_settings(contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("matchmaker-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_file() {
        let path = write_settings(
            r#"
[server]
host = "127.0.0.1"
port = 3000

[supabase]
url = "https://project.supabase.co"
service_role_key = "key"

[matching]
default_limit = 5

[scoring.weights]
location = 0.5
"#,
        );

        let settings = Settings::load_from_with(&path, |_| None).unwrap();

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.matching.default_limit, Some(5));
        assert_eq!(settings.scoring.weights.location, 0.5);
        assert_eq!(settings.scoring.weights.age, 0.30);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_load_from_applies_supabase_variables() {
        let path = write_settings(
            r#"
[server]
host = "127.0.0.1"
port = 3000

[supabase]
url = "not-a-url"
service_role_key = ""
"#,
        );

        let settings = Settings::load_from_with(&path, |var| match var {
            "SUPABASE_URL" => Some("https://env.supabase.co".to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("env-key".to_string()),
            "SUPABASE_JWT_SECRET" => Some("env-secret".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(settings.supabase.url, "https://env.supabase.co");
        assert_eq!(settings.supabase.service_role_key, "env-key");
        assert_eq!(settings.supabase.jwt_secret.as_deref(), Some("env-secret"));

        // Without the variables the file alone fails validation
        assert!(Settings::load_from_with(&path, |_| None).is_err());
    }
}
