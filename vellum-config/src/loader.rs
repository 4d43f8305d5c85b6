// Settings file loaders

use crate::env::EnvOverrides;
use crate::{ConfigError, Result, SanitizerSettings};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Json,
    Toml,
    /// `KEY=value` lines using the same `VELLUM_*` keys as the environment
    Env,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            "env" => Some(FileFormat::Env),
            _ => None,
        }
    }
}

/// Settings file loader
pub struct SettingsLoader {
    format: FileFormat,
}

impl SettingsLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension. A file named `.env` counts as
    /// the env format.
    pub fn auto(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.file_name().and_then(|s| s.to_str()) == Some(".env") {
            return Ok(Self::new(FileFormat::Env));
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat("no file extension".to_string()))?;

        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::UnsupportedFormat(ext.to_string()))?;

        Ok(Self::new(format))
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Load settings from file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SanitizerSettings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        self.parse(&content)
    }

    /// Parse settings from string
    pub fn parse(&self, content: &str) -> Result<SanitizerSettings> {
        match self.format {
            FileFormat::Json => self.from_value(self.parse_json(content)?),
            FileFormat::Toml => self.from_value(self.parse_toml(content)?),
            FileFormat::Env => self.parse_env(content),
        }
    }

    fn from_value(&self, value: Value) -> Result<SanitizerSettings> {
        serde_json::from_value(value)
            .map_err(|e| ConfigError::ParseError(format!("Invalid settings: {}", e)))
    }

    fn parse_json(&self, content: &str) -> Result<Value> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e)))
    }

    fn parse_toml(&self, content: &str) -> Result<Value> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;

        serde_json::to_value(toml_value)
            .map_err(|e| ConfigError::ParseError(format!("TOML to JSON conversion error: {}", e)))
    }

    fn parse_env(&self, content: &str) -> Result<SanitizerSettings> {
        let mut vars = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().trim_start_matches("export ").trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                vars.push((key.to_string(), value.to_string()));
            }
        }

        let mut settings = SanitizerSettings::default();
        EnvOverrides::default().apply_from(&mut settings, vars)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_sanitizer::{OversizePolicy, Profile};

    #[test]
    fn test_parse_json() {
        let loader = SettingsLoader::new(FileFormat::Json);
        let json = r#"{"profile": "strict", "allow_tags": ["h2"], "max_input_bytes": 4096}"#;

        let settings = loader.parse(json).unwrap();
        assert_eq!(settings.profile, Profile::Strict);
        assert_eq!(settings.allow_tags, vec!["h2"]);
        assert_eq!(settings.max_input_bytes, Some(4096));
    }

    #[test]
    fn test_parse_toml() {
        let loader = SettingsLoader::new(FileFormat::Toml);
        let toml = r#"
            profile = "rich_text"
            deny_tags = ["img"]
            oversize = "truncate"

            [allow_attributes]
            span = ["translate"]
        "#;

        let settings = loader.parse(toml).unwrap();
        assert_eq!(settings.profile, Profile::RichText);
        assert_eq!(settings.deny_tags, vec!["img"]);
        assert_eq!(settings.oversize, OversizePolicy::Truncate);
        assert_eq!(settings.allow_attributes["span"], vec!["translate"]);
    }

    #[test]
    fn test_parse_env() {
        let loader = SettingsLoader::new(FileFormat::Env);
        let env = r#"
            # Editor settings
            VELLUM_PROFILE=strict
            VELLUM_ALLOW_TAGS="h2, h3"
            export VELLUM_MAX_INPUT_BYTES=1024
            UNRELATED=1
        "#;

        let settings = loader.parse(env).unwrap();
        assert_eq!(settings.profile, Profile::Strict);
        assert_eq!(settings.allow_tags, vec!["h2", "h3"]);
        assert_eq!(settings.max_input_bytes, Some(1024));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let loader = SettingsLoader::new(FileFormat::Json);
        let err = loader.parse(r#"{"profle": "strict"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("env"), Some(FileFormat::Env));
        assert_eq!(FileFormat::from_extension("unknown"), None);

        assert_eq!(SettingsLoader::auto("conf/sanitizer.toml").unwrap().format(), FileFormat::Toml);
        assert_eq!(SettingsLoader::auto(".env").unwrap().format(), FileFormat::Env);
        assert!(matches!(
            SettingsLoader::auto("settings.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
