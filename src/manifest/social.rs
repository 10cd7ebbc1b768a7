//! Social-platform manifest.
//!
//! The bundle is flat at the output root; the platform manifest is a JSON
//! document declaring orientation and the project identity.

use std::path::Path;

use crate::errors::ExportError;
use crate::external::BundleFileSystem;
use crate::manifest::copy_support_files;
use crate::manifest::template::{
  json_escape, SubstitutionContext, ORIENTATION_MARKER, PROJECT_NAME_MARKER,
  PROJECT_VERSION_MARKER,
};
use crate::project::Project;

/// Platform manifest template, relative to the runtime root.
pub const SOCIAL_MANIFEST_TEMPLATE: &str = "templates/social/social-config.json";

/// Fixed supporting files copied verbatim next to the manifest.
pub const SOCIAL_SUPPORT_DIR: &str = "templates/social/support";

/// Name of the manifest written at the output root.
pub const SOCIAL_MANIFEST_FILE: &str = "social-config.json";

/// Write the platform manifest and supporting files for the social shell.
pub fn write_social_files(
  fs: &dyn BundleFileSystem,
  runtime_root: &Path,
  output_root: &Path,
  project: &Project,
) -> Result<(), ExportError> {
  let template_path = runtime_root.join(SOCIAL_MANIFEST_TEMPLATE);
  let template = fs.read_to_string(&template_path)?;

  let document = SubstitutionContext::new()
    .set(PROJECT_NAME_MARKER, json_escape(&project.name))
    .set_nonempty(PROJECT_VERSION_MARKER, &json_escape(&project.version))
    .set(ORIENTATION_MARKER, project.orientation.as_str())
    .apply(&template, &template_path)?;

  serde_json::from_str::<serde_json::Value>(&document).map_err(|err| {
    ExportError::configuration(format!(
      "platform manifest {} is not valid JSON after substitution: {}",
      template_path.display(),
      err
    ))
  })?;

  fs.write(&output_root.join(SOCIAL_MANIFEST_FILE), document.as_bytes())?;
  copy_support_files(fs, &runtime_root.join(SOCIAL_SUPPORT_DIR), output_root)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::external::DiskFileSystem;
  use crate::project::{Orientation, RendererBackend, Scene};
  use std::fs as stdfs;
  use tempfile::tempdir;

  #[test]
  fn writes_manifest_with_orientation() {
    let temp = tempdir().unwrap();
    let runtime_root = temp.path().join("runtime");
    let output_root = temp.path().join("out");
    let template_path = runtime_root.join(SOCIAL_MANIFEST_TEMPLATE);
    stdfs::create_dir_all(template_path.parent().unwrap()).unwrap();
    stdfs::write(
      &template_path,
      "{\n  \"name\": \"BUNDLE_PROJECT_NAME\",\n  \"orientation\": \"BUNDLE_ORIENTATION\"\n}\n",
    )
    .unwrap();

    let project = Project {
      name: "Asteroid Run".into(),
      version: String::new(),
      package_id: String::new(),
      orientation: Orientation::Portrait,
      renderer: RendererBackend::Webgl,
      scenes: vec![Scene {
        name: "Menu".into(),
        events_digest: 0,
        data: serde_json::Value::Null,
      }],
      external_sources: Vec::new(),
      extensions: Vec::new(),
      resources: Vec::new(),
    };

    write_social_files(&DiskFileSystem, &runtime_root, &output_root, &project).unwrap();

    let manifest = stdfs::read_to_string(output_root.join(SOCIAL_MANIFEST_FILE)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(parsed["orientation"], "portrait");
    assert_eq!(parsed["name"], "Asteroid Run");
  }
}
