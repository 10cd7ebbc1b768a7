//! Typed marker substitution for target manifest templates.
//!
//! Templates carry a fixed set of recognized markers. The context maps each
//! marker to its rendered value; after substitution the document is scanned
//! for any surviving marker, which is a defect reported as a template error
//! rather than silently shipped.

use std::path::Path;

use regex::Regex;

use crate::errors::ExportError;

/// Marker replaced by one inclusion statement per module, in list order.
pub const INCLUDE_FILES_MARKER: &str = "<!-- BUNDLE_INCLUDE_FILES -->";
/// Marker replaced by the runtime options blob.
pub const RUNTIME_OPTIONS_MARKER: &str = "<!-- BUNDLE_RUNTIME_OPTIONS -->";
/// Marker replaced by the project title.
pub const PROJECT_NAME_MARKER: &str = "BUNDLE_PROJECT_NAME";
/// Marker replaced by the reverse-DNS package identifier.
pub const PACKAGE_ID_MARKER: &str = "BUNDLE_PACKAGE_ID";
/// Marker replaced by the project version string.
pub const PROJECT_VERSION_MARKER: &str = "BUNDLE_PROJECT_VERSION";
/// Marker replaced by the requested screen orientation.
pub const ORIENTATION_MARKER: &str = "BUNDLE_ORIENTATION";

/// Mapping from marker to rendered value, applied to one template document.
#[derive(Debug, Default)]
pub struct SubstitutionContext {
  values: Vec<(&'static str, String)>,
}

impl SubstitutionContext {
  /// Empty context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind a marker to its rendered value.
  pub fn set(mut self, marker: &'static str, value: impl Into<String>) -> Self {
    self.values.push((marker, value.into()));
    self
  }

  /// Bind a marker only when a non-empty value is available. Markers left
  /// unbound surface as template errors if the document uses them.
  pub fn set_nonempty(self, marker: &'static str, value: &str) -> Self {
    if value.trim().is_empty() {
      self
    } else {
      self.set(marker, value)
    }
  }

  /// Substitute every bound marker in `document`, then fail on any marker
  /// still present. `path` identifies the template in error messages.
  pub fn apply(&self, document: &str, path: &Path) -> Result<String, ExportError> {
    let mut text = document.to_string();
    for (marker, value) in &self.values {
      text = text.replace(marker, value);
    }

    let leftover = Regex::new(r"BUNDLE_[A-Z][A-Z0-9_]*").expect("invalid marker regex");
    if let Some(found) = leftover.find(&text) {
      return Err(ExportError::Template {
        marker: found.as_str().to_string(),
        path: path.to_path_buf(),
      });
    }
    Ok(text)
  }
}

/// Escape a value for embedding in HTML text or attributes.
pub fn html_escape(value: &str) -> String {
  value
    .replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

/// Escape a value for embedding in XML text or attributes.
pub fn xml_escape(value: &str) -> String {
  html_escape(value).replace('\'', "&apos;")
}

/// Escape a value for embedding inside a JSON string literal.
pub fn json_escape(value: &str) -> String {
  let quoted = serde_json::to_string(value).expect("string serialization cannot fail");
  quoted[1..quoted.len() - 1].to_string()
}
