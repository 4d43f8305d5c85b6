// Environment variable overrides

use crate::{ConfigError, Result, SanitizerSettings};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::env;
use std::path::Path;

/// Applies `<PREFIX>_*` variables on top of loaded settings.
///
/// | Variable | Effect |
/// |----------|--------|
/// | `VELLUM_PROFILE` | `rich_text`, `strict` or `plain_text` |
/// | `VELLUM_MAX_INPUT_BYTES` | byte ceiling, empty for none |
/// | `VELLUM_OVERSIZE` | `reject` or `truncate` |
/// | `VELLUM_ALLOW_TAGS` | comma separated, added to the list |
/// | `VELLUM_DENY_TAGS` | comma separated, added to the list |
pub struct EnvOverrides {
    prefix: String,
}

impl EnvOverrides {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&self, settings: &mut SanitizerSettings) -> Result<()> {
        self.apply_from(settings, env::vars())
    }

    /// Apply overrides from any key/value source. Keys without the prefix
    /// are ignored.
    pub fn apply_from<I, K, V>(&self, settings: &mut SanitizerSettings, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(name) = key
                .as_ref()
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            let value = value.as_ref().trim();

            match name {
                "PROFILE" => settings.profile = parse_name(key.as_ref(), value)?,
                "MAX_INPUT_BYTES" => {
                    settings.max_input_bytes = if value.is_empty() {
                        None
                    } else {
                        Some(value.parse().map_err(|e| {
                            ConfigError::ParseError(format!("{}: {}", key.as_ref(), e))
                        })?)
                    };
                }
                "OVERSIZE" => settings.oversize = parse_name(key.as_ref(), value)?,
                "ALLOW_TAGS" => settings.allow_tags.extend(split_list(value)),
                "DENY_TAGS" => settings.deny_tags.extend(split_list(value)),
                _ => {}
            }
        }

        Ok(())
    }
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::new("VELLUM")
    }
}

/// Load a `.env` file into the process environment. Without a path a missing
/// `.env` in the working directory is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
    } else {
        dotenvy::dotenv().ok();
    }
    Ok(())
}

/// Parse a `snake_case` enum name the way settings files spell it. Dashes
/// and case are forgiven.
fn parse_name<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    let name = value.to_ascii_lowercase().replace('-', "_");
    serde_json::from_value(Value::String(name))
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", key, e)))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_sanitizer::{OversizePolicy, Profile};

    // Overrides are tested through `apply_from`; mutating the real process
    // environment is unsafe while other tests run.

    #[test]
    fn test_apply_overrides() {
        let mut settings = SanitizerSettings::default();
        EnvOverrides::default()
            .apply_from(
                &mut settings,
                [
                    ("VELLUM_PROFILE", "Plain-Text"),
                    ("VELLUM_MAX_INPUT_BYTES", "2048"),
                    ("VELLUM_OVERSIZE", "truncate"),
                    ("VELLUM_ALLOW_TAGS", "h2, ,h3"),
                    ("VELLUM_DENY_TAGS", "img"),
                ],
            )
            .unwrap();

        assert_eq!(settings.profile, Profile::PlainText);
        assert_eq!(settings.max_input_bytes, Some(2048));
        assert_eq!(settings.oversize, OversizePolicy::Truncate);
        assert_eq!(settings.allow_tags, vec!["h2", "h3"]);
        assert_eq!(settings.deny_tags, vec!["img"]);
    }

    #[test]
    fn test_other_prefixes_are_ignored() {
        let mut settings = SanitizerSettings::default();
        EnvOverrides::new("EDITOR")
            .apply_from(
                &mut settings,
                [("VELLUM_PROFILE", "strict"), ("EDITORX_PROFILE", "strict")],
            )
            .unwrap();
        assert_eq!(settings, SanitizerSettings::default());
    }

    #[test]
    fn test_invalid_values() {
        let overrides = EnvOverrides::default();
        let mut settings = SanitizerSettings::default();

        let err = overrides
            .apply_from(&mut settings, [("VELLUM_PROFILE", "permissive")])
            .unwrap_err();
        assert!(err.to_string().contains("permissive"));

        assert!(overrides
            .apply_from(&mut settings, [("VELLUM_MAX_INPUT_BYTES", "lots")])
            .is_err());
        assert!(overrides
            .apply_from(&mut settings, [("VELLUM_OVERSIZE", "drop")])
            .is_err());
    }

    #[test]
    fn test_accepts_every_serialized_name() {
        for profile in [Profile::RichText, Profile::Strict, Profile::PlainText] {
            let name = serde_json::to_value(profile).unwrap();
            let mut settings = SanitizerSettings::default();
            EnvOverrides::default()
                .apply_from(&mut settings, [("VELLUM_PROFILE", name.as_str().unwrap())])
                .unwrap();
            assert_eq!(settings.profile, profile);
        }

        for oversize in [OversizePolicy::Reject, OversizePolicy::Truncate] {
            let name = serde_json::to_value(oversize).unwrap();
            let mut settings = SanitizerSettings::default();
            EnvOverrides::default()
                .apply_from(&mut settings, [("VELLUM_OVERSIZE", name.as_str().unwrap())])
                .unwrap();
            assert_eq!(settings.oversize, oversize);
        }
    }

    #[test]
    fn test_empty_limit_clears_it() {
        let mut settings = SanitizerSettings {
            max_input_bytes: Some(10),
            ..Default::default()
        };
        EnvOverrides::default()
            .apply_from(&mut settings, [("VELLUM_MAX_INPUT_BYTES", "")])
            .unwrap();
        assert_eq!(settings.max_input_bytes, None);
    }

    #[test]
    fn test_missing_dotenv_file() {
        let result = load_dotenv(Some(Path::new("/nonexistent/vellum/.env")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
