//! Sanitizing editor content that arrives inside JSON documents.

use crate::error::Result;
use crate::sanitizer::HtmlSanitizer;
use serde_json::Value;

impl HtmlSanitizer {
    /// Recursively sanitize every string in a JSON value. Object keys are
    /// left untouched.
    pub fn sanitize_json(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                *s = self.sanitize(s);
            }
            Value::Array(arr) => {
                for item in arr.iter_mut() {
                    self.sanitize_json(item);
                }
            }
            Value::Object(obj) => {
                for (_key, val) in obj.iter_mut() {
                    self.sanitize_json(val);
                }
            }
            _ => {}
        }
    }

    /// Parse, sanitize and re-serialize a JSON document
    pub fn sanitize_json_str(&self, json: &str) -> Result<String> {
        let mut value: Value = serde_json::from_str(json)?;
        self.sanitize_json(&mut value);
        Ok(serde_json::to_string(&value)?)
    }
}
