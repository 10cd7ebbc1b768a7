//! In-memory project description consumed by the export pipeline.
//!
//! The editor owns the full project model; the pipeline only reads the
//! subset described here and serializes it back out as the bundle's project
//! data file. Scene and external-source entries carry a content digest so
//! incremental previews can tell whether regeneration is needed without
//! invoking the code generator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ExportError;

/// Renderer family the exported bundle should ship.
///
/// Selecting a family includes its renderer modules as a whole unit and
/// excludes every module belonging to the other family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
  /// Hardware accelerated renderer.
  #[default]
  Webgl,
  /// Plain 2D canvas fallback renderer.
  Canvas,
}

/// Screen orientation requested by packaged targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
  /// Let the platform decide.
  #[default]
  Default,
  /// Lock to landscape.
  Landscape,
  /// Lock to portrait.
  Portrait,
}

impl Orientation {
  /// Token substituted into packaging manifests.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Default => "default",
      Self::Landscape => "landscape",
      Self::Portrait => "portrait",
    }
  }
}

/// One scene of the project, exported as an ordinal-named generated module.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
  /// Scene name shown in the editor and used as the initial-scene option.
  pub name: String,
  /// Fingerprint of the scene's event sheet, maintained by the editor.
  #[serde(default)]
  pub events_digest: u64,
  /// Serialized scene description handed to the runtime loader.
  #[serde(default)]
  pub data: serde_json::Value,
}

/// A source file authored outside the project, copied into the bundle.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSourceFile {
  /// Display name of the source file.
  pub name: String,
  /// Location of the file on disk before export.
  pub file: PathBuf,
}

/// Include files contributed by one enabled extension.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInclude {
  /// Extension name.
  pub name: String,
  /// Script files the extension needs, relative to the runtime root.
  #[serde(default)]
  pub include_files: Vec<String>,
}

/// One project resource (image, audio, font) referenced by scenes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
  /// Logical resource name referenced from scene data.
  pub name: String,
  /// Location of the resource before export. Rewritten to the bundled
  /// filename in the exported project data.
  pub file: PathBuf,
}

/// Project description handed to the exporter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  /// Project title, substituted into the bundle shell.
  pub name: String,
  /// Project version string.
  #[serde(default)]
  pub version: String,
  /// Reverse-DNS package identifier used by packaged targets.
  #[serde(default)]
  pub package_id: String,
  /// Requested screen orientation.
  #[serde(default)]
  pub orientation: Orientation,
  /// Renderer family to bundle.
  #[serde(default)]
  pub renderer: RendererBackend,
  /// Scenes in project order. Ordering drives ordinal module naming.
  #[serde(default)]
  pub scenes: Vec<Scene>,
  /// External source files to copy into the bundle.
  #[serde(default)]
  pub external_sources: Vec<ExternalSourceFile>,
  /// Enabled extensions and their include files.
  #[serde(default)]
  pub extensions: Vec<ExtensionInclude>,
  /// Resources referenced by the project.
  #[serde(default)]
  pub resources: Vec<ResourceEntry>,
}

impl Project {
  /// Check that the project is complete enough to export.
  pub fn validate(&self) -> Result<(), ExportError> {
    if self.name.trim().is_empty() {
      return Err(ExportError::configuration("project name is empty"));
    }
    if self.scenes.is_empty() {
      return Err(ExportError::configuration(format!(
        "project '{}' has no scenes to export",
        self.name
      )));
    }
    Ok(())
  }

  /// Clone of the project with resource files rewritten to their bundled
  /// filenames, for embedding into the exported project data.
  pub fn with_bundled_resources(
    &self,
    bundled: &std::collections::BTreeMap<String, String>,
  ) -> Self {
    let mut updated = self.clone();
    for resource in &mut updated.resources {
      if let Some(bundled_name) = bundled.get(&resource.name) {
        resource.file = PathBuf::from(bundled_name);
      }
    }
    updated
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  fn project_with_scene() -> Project {
    Project {
      name: "Asteroid Run".into(),
      version: "1.0.0".into(),
      package_id: "com.example.asteroidrun".into(),
      orientation: Orientation::Landscape,
      renderer: RendererBackend::Webgl,
      scenes: vec![Scene {
        name: "Menu".into(),
        events_digest: 7,
        data: serde_json::json!({"objects": []}),
      }],
      external_sources: Vec::new(),
      extensions: Vec::new(),
      resources: vec![ResourceEntry {
        name: "ship".into(),
        file: PathBuf::from("/art/ship.png"),
      }],
    }
  }

  #[test]
  fn validate_rejects_empty_name() {
    let mut project = project_with_scene();
    project.name = "  ".into();
    assert!(project.validate().is_err());
  }

  #[test]
  fn validate_rejects_project_without_scenes() {
    let mut project = project_with_scene();
    project.scenes.clear();
    let err = project.validate().unwrap_err();
    assert!(err.to_string().contains("no scenes"));
  }

  #[test]
  fn bundled_resources_rewrite_only_known_names() {
    let project = project_with_scene();
    let mut bundled = BTreeMap::new();
    bundled.insert("ship".to_string(), "ship.png".to_string());
    bundled.insert("unknown".to_string(), "other.png".to_string());

    let updated = project.with_bundled_resources(&bundled);
    assert_eq!(updated.resources[0].file, PathBuf::from("ship.png"));
  }

  #[test]
  fn project_round_trips_through_json() {
    let project = project_with_scene();
    let text = serde_json::to_string(&project).unwrap();
    let back: Project = serde_json::from_str(&text).unwrap();
    assert_eq!(back.name, project.name);
    assert_eq!(back.scenes.len(), 1);
    assert_eq!(back.orientation, Orientation::Landscape);
  }
}
