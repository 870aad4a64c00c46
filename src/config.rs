//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config PATH`, else `$XDG_CONFIG_HOME/yafu/yafu.toml`
//! 3. Environment variables: `YAFU_*` prefix
//! 4. Command-line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DateFormat, DisplayOptions, Expiry, DEFAULT_FORMAT};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Default service root.
pub const DEFAULT_BASE_URL: &str = "http://pixelbanane.de/yafu";

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub db: Option<PathBuf>,
    pub base_url: Option<String>,
    pub date_format: Option<String>,
    pub format: Option<String>,
    pub hide: Option<bool>,
    pub expires: Option<Expiry>,
    pub utc: Option<bool>,
    pub email: Option<String>,
}

/// Unified configuration for yafu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Record store (default: ~/.config/yafu.db)
    pub db: PathBuf,
    /// Service root used for uploads
    pub base_url: String,
    /// strftime-style format for `date` and `expire_date`
    pub date_format: String,
    /// Output template for listings and upload feedback
    pub format: String,
    /// Hide uploads from the public list
    pub hide: bool,
    /// Retention class for uploads
    pub expires: Expiry,
    /// Render dates in UTC instead of local time
    pub utc: bool,
    /// Uploader contact sent with every upload
    pub email: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: default_db_path(),
            base_url: DEFAULT_BASE_URL.to_string(),
            date_format: DateFormat::DEFAULT.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            hide: true,
            expires: Expiry::default(),
            utc: false,
            email: None,
        }
    }
}

/// Get the default record store path (~/.config/yafu.db).
fn default_db_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("yafu.db"))
        .unwrap_or_else(|| PathBuf::from("~/.config/yafu.db"))
}

/// Get the XDG config directory for yafu.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "yafu").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("yafu.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay every specified field of `raw` onto self.
    fn merge_with(&self, raw: &RawSettings) -> Self {
        Self {
            db: raw.db.clone().unwrap_or_else(|| self.db.clone()),
            base_url: raw.base_url.clone().unwrap_or_else(|| self.base_url.clone()),
            date_format: raw
                .date_format
                .clone()
                .unwrap_or_else(|| self.date_format.clone()),
            format: raw.format.clone().unwrap_or_else(|| self.format.clone()),
            hide: raw.hide.unwrap_or(self.hide),
            expires: raw.expires.unwrap_or(self.expires),
            utc: raw.utc.unwrap_or(self.utc),
            email: raw.email.clone().or_else(|| self.email.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given.
    ///   Without it the global config is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        match config_file {
            Some(path) => {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        let raw = load_raw_settings(&global_path)?;
                        current = current.merge_with(&raw);
                    }
                }
            }
        }

        // 3. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.db = expand_path(&current.db);
        current.validate()?;

        Ok(current)
    }

    /// Apply YAFU_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        Self::apply_env(settings, Environment::with_prefix("YAFU"))
    }

    fn apply_env(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("db") {
            settings.db = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("base_url") {
            settings.base_url = val;
        }
        if let Ok(val) = config.get_string("date_format") {
            settings.date_format = val;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format = val;
        }
        if let Some(val) = env_bool(&config, "hide")? {
            settings.hide = val;
        }
        if let Ok(val) = config.get_string("expires") {
            settings.expires = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("YAFU_EXPIRES: {e}"),
            })?;
        }
        if let Some(val) = env_bool(&config, "utc")? {
            settings.utc = val;
        }
        if let Ok(val) = config.get_string("email") {
            settings.email = Some(val);
        }

        Ok(settings)
    }

    /// Reject settings that would only fail later, mid-listing.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        DateFormat::new(self.date_format.as_str())?;
        Ok(())
    }

    /// Display options for derived fields, optionally overriding the
    /// configured date format.
    pub fn display_options(
        &self,
        date_format: Option<&str>,
        utc: bool,
    ) -> Result<DisplayOptions, ApplicationError> {
        let date_format = DateFormat::new(date_format.unwrap_or(&self.date_format))?;
        Ok(DisplayOptions {
            date_format,
            utc: utc || self.utc,
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# yafu configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/yafu/yafu.toml (or --config PATH)
#   Env:  YAFU_* environment variables (YAFU_BASE_URL, YAFU_DB, ...)
#   Command-line flags

# Record store
# db = "~/.config/yafu.db"

# Service root used for uploads
# base_url = "http://pixelbanane.de/yafu"

# Retention for uploads: 30m, 1h, 6h, 1d, 3d, 1w, max
# expires = "1w"

# Hide uploads from the public list
# hide = true

# Contact address sent with uploads
# email = "me@example.org"

# Date format for $date and $expire_date
# date_format = "%Y-%m-%d %H:%M:%S"

# Render dates in UTC instead of local time
# utc = false

# Output template ($name or ${name}, $$ for a literal $)
# format = "$D  $u\n"
"#
        .to_string()
    }
}

/// Write the sample config to `path`, creating parent directories.
///
/// An existing file is never overwritten.
pub fn write_template(path: &Path) -> Result<(), ApplicationError> {
    if path.exists() {
        return Err(ApplicationError::Config {
            message: format!("{} already exists", path.display()),
        });
    }
    RealFileSystem
        .write_atomic(path, Settings::template().as_bytes())
        .map_err(|e| ApplicationError::Config {
            message: format!("write {}: {}", path.display(), e),
        })
}

/// A boolean `YAFU_*` variable; unset is `None`, unparsable is an error.
fn env_bool(config: &Config, key: &str) -> Result<Option<bool>, ApplicationError> {
    match config.get_bool(key) {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(ApplicationError::Config {
            message: format!("YAFU_{}: {}", key.to_uppercase(), e),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_defaults_when_created_then_match_service_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.expires, Expiry::OneWeek);
        assert!(settings.hide);
        assert!(settings.db.to_string_lossy().ends_with("yafu.db"));
        assert_eq!(settings.format, DEFAULT_FORMAT);
    }

    #[test]
    fn given_tilde_in_db_when_expanding_then_expands_to_home() {
        let expanded = expand_path(Path::new("~/records.db"));

        let home = std::env::var("HOME").expect("HOME should be set");
        let expanded = expanded.to_string_lossy();
        assert!(expanded.starts_with(&home), "db should start with home: {expanded}");
        assert!(!expanded.contains('~'));
    }

    #[test]
    fn given_partial_raw_settings_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let raw = RawSettings {
            base_url: Some("https://files.example.org".into()),
            expires: Some(Expiry::Max),
            hide: Some(false),
            ..Default::default()
        };

        let merged = base.merge_with(&raw);

        assert_eq!(merged.base_url, "https://files.example.org");
        assert_eq!(merged.expires, Expiry::Max);
        assert!(!merged.hide);
        assert_eq!(merged.date_format, base.date_format);
        assert_eq!(merged.db, base.db);
    }

    #[test]
    fn given_bad_date_format_when_validating_then_rejects() {
        let settings = Settings {
            date_format: "%Y %Q".into(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Domain(DomainError::InvalidDateFormat(_)))
        ));
    }

    #[test]
    fn given_override_when_building_display_options_then_prefers_it() {
        let settings = Settings::default();
        let options = settings.display_options(Some("%d.%m.%Y"), true).unwrap();
        assert_eq!(options.date_format.as_str(), "%d.%m.%Y");
        assert!(options.utc);
    }

    #[test]
    fn given_settings_when_rendering_toml_then_round_trips() {
        let settings = Settings {
            email: Some("me@example.org".into()),
            expires: Expiry::ThreeDays,
            ..Default::default()
        };
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("YAFU").source(Some(map))
    }

    #[test]
    fn given_env_overrides_when_applying_then_replace_settings() {
        let settings = Settings::apply_env(
            Settings::default(),
            env(&[("YAFU_HIDE", "false"), ("YAFU_UTC", "true"), ("YAFU_EXPIRES", "1d")]),
        )
        .unwrap();

        assert!(!settings.hide);
        assert!(settings.utc);
        assert_eq!(settings.expires, Expiry::OneDay);
    }

    #[rstest::rstest]
    #[case("YAFU_HIDE")]
    #[case("YAFU_UTC")]
    #[case("YAFU_EXPIRES")]
    fn given_unparsable_env_value_when_applying_then_reports_config_error(#[case] key: &str) {
        let result = Settings::apply_env(Settings::default(), env(&[(key, "maybe")]));

        assert!(
            matches!(result, Err(ApplicationError::Config { ref message }) if message.starts_with(key)),
            "{result:?}"
        );
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.base_url.is_none());
    }
}
