//! Desktop-shell packaging descriptor.
//!
//! The runnable bundle lives under `app/`; the packaging descriptor is a
//! JSON document written at the output root, alongside the verbatim-copied
//! bootstrap files the desktop runtime expects.

use std::path::Path;

use crate::errors::ExportError;
use crate::external::BundleFileSystem;
use crate::manifest::copy_support_files;
use crate::manifest::template::{
  json_escape, SubstitutionContext, PACKAGE_ID_MARKER, PROJECT_NAME_MARKER,
  PROJECT_VERSION_MARKER,
};
use crate::project::Project;

/// Packaging descriptor template, relative to the runtime root.
pub const DESKTOP_PACKAGE_TEMPLATE: &str = "templates/desktop/package.json";

/// Fixed supporting files (bootstrap script, preload) copied verbatim.
pub const DESKTOP_SUPPORT_DIR: &str = "templates/desktop/support";

/// Name of the descriptor written at the output root.
pub const DESKTOP_PACKAGE_FILE: &str = "package.json";

/// Write the packaging descriptor and supporting files for the desktop shell.
pub fn write_desktop_files(
  fs: &dyn BundleFileSystem,
  runtime_root: &Path,
  output_root: &Path,
  project: &Project,
) -> Result<(), ExportError> {
  let template_path = runtime_root.join(DESKTOP_PACKAGE_TEMPLATE);
  let template = fs.read_to_string(&template_path)?;

  let document = SubstitutionContext::new()
    .set_nonempty(PACKAGE_ID_MARKER, &json_escape(&project.package_id))
    .set(PROJECT_NAME_MARKER, json_escape(&project.name))
    .set_nonempty(PROJECT_VERSION_MARKER, &json_escape(&project.version))
    .apply(&template, &template_path)?;

  serde_json::from_str::<serde_json::Value>(&document).map_err(|err| {
    ExportError::configuration(format!(
      "packaging descriptor {} is not valid JSON after substitution: {}",
      template_path.display(),
      err
    ))
  })?;

  fs.write(&output_root.join(DESKTOP_PACKAGE_FILE), document.as_bytes())?;
  copy_support_files(fs, &runtime_root.join(DESKTOP_SUPPORT_DIR), output_root)?;
  Ok(())
}
