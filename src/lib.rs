// Vellum - allow-list HTML sanitization for WYSIWYG editor content
//
// This library re-exports the sanitizer, its logging layer and (behind the
// `config` feature) file and environment driven settings.

// Re-export the sanitizer
pub use vellum_sanitizer::*;

// Re-export logging
pub use vellum_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use vellum_config as config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        DangerousContentDetector,
        HtmlSanitizer,
        InputLimit,
        OversizePolicy,
        Profile,
        SanitizeError,
        SanitizerPolicy,
        ThreatKind,
        contains_dangerous_content,
        remove_dangerous_patterns_only,
        sanitize_html,
    };

    #[cfg(feature = "config")]
    pub use crate::config::SanitizerSettings;
}
