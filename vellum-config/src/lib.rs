// Sanitizer settings for the Vellum sanitizer

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{EnvOverrides, load_dotenv};
pub use error::{ConfigError, Result};
pub use loader::{FileFormat, SettingsLoader};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use vellum_log::debug;
use vellum_sanitizer::policy::GLOBAL;
use vellum_sanitizer::{HtmlSanitizer, InputLimit, OversizePolicy, Profile, SanitizerPolicy};

/// Sanitizer settings as they appear in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerSettings {
    /// Built-in policy to start from
    pub profile: Profile,
    /// Extra tags on top of the profile
    pub allow_tags: Vec<String>,
    /// Tags removed from the profile; wins over `allow_tags`
    pub deny_tags: Vec<String>,
    /// Extra attributes per tag, `*` for every tag
    pub allow_attributes: BTreeMap<String, Vec<String>>,
    pub max_input_bytes: Option<usize>,
    pub oversize: OversizePolicy,
}

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            profile: Profile::RichText,
            allow_tags: Vec::new(),
            deny_tags: Vec::new(),
            allow_attributes: BTreeMap::new(),
            max_input_bytes: None,
            oversize: OversizePolicy::Reject,
        }
    }
}

impl SanitizerSettings {
    /// Load settings from a file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        SettingsLoader::auto(path)?.load_file(path)
    }

    /// Defaults with `VELLUM_*` environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        EnvOverrides::default().apply_env(&mut settings)?;
        settings.validate()?;
        Ok(settings)
    }

    /// File (when given), then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        EnvOverrides::default().apply_env(&mut settings)?;
        settings.validate()?;

        debug!(
            target: "vellum::config",
            "loaded sanitizer settings: profile {:?}, {} extra tag(s), {} denied",
            settings.profile,
            settings.allow_tags.len(),
            settings.deny_tags.len()
        );
        Ok(settings)
    }

    /// Allow-list described by these settings
    pub fn policy(&self) -> SanitizerPolicy {
        let mut policy = SanitizerPolicy::from_profile(self.profile);
        for tag in &self.allow_tags {
            policy = policy.allow_tag(tag);
        }
        for (tag, attributes) in &self.allow_attributes {
            for attribute in attributes {
                policy = policy.allow_attribute(tag, attribute);
            }
        }
        for tag in &self.deny_tags {
            policy = policy.deny_tag(tag);
        }
        policy
    }

    pub fn input_limit(&self) -> Option<InputLimit> {
        self.max_input_bytes.map(|max_bytes| InputLimit {
            max_bytes,
            on_oversize: self.oversize,
        })
    }

    /// Validate and build a sanitizer
    pub fn build(&self) -> Result<HtmlSanitizer> {
        self.validate()?;
        let sanitizer = HtmlSanitizer::new(self.policy());
        Ok(match self.input_limit() {
            Some(limit) => sanitizer.with_input_limit(limit),
            None => sanitizer,
        })
    }
}

impl Validate for SanitizerSettings {
    fn validate(&self) -> Result<()> {
        for tag in &self.allow_tags {
            ConfigValidator::is_name(tag, "allow_tags")?;
            ConfigValidator::not_dangerous_tag(tag, "allow_tags")?;
        }
        for tag in &self.deny_tags {
            ConfigValidator::is_name(tag, "deny_tags")?;
        }
        for (tag, attributes) in &self.allow_attributes {
            if tag != GLOBAL {
                ConfigValidator::is_name(tag, "allow_attributes")?;
            }
            for attribute in attributes {
                ConfigValidator::is_name(attribute, "allow_attributes")?;
                ConfigValidator::not_event_handler(attribute, "allow_attributes")?;
            }
        }
        if let Some(max) = self.max_input_bytes {
            ConfigValidator::non_zero(max, "max_input_bytes")?;
        }
        Ok(())
    }
}
