//! Hybrid-mobile packaging descriptor.
//!
//! The runnable bundle lives under `www/`; the packaging descriptor is an
//! XML document written at the output root, generated from the runtime
//! distribution's template.

use std::path::Path;

use crate::errors::ExportError;
use crate::external::BundleFileSystem;
use crate::manifest::copy_support_files;
use crate::manifest::template::{
  xml_escape, SubstitutionContext, ORIENTATION_MARKER, PACKAGE_ID_MARKER, PROJECT_NAME_MARKER,
  PROJECT_VERSION_MARKER,
};
use crate::project::Project;

/// Packaging descriptor template, relative to the runtime root.
pub const MOBILE_CONFIG_TEMPLATE: &str = "templates/mobile/config.xml";

/// Fixed supporting files copied verbatim next to the descriptor.
pub const MOBILE_SUPPORT_DIR: &str = "templates/mobile/support";

/// Name of the descriptor written at the output root.
pub const MOBILE_CONFIG_FILE: &str = "config.xml";

/// Write the packaging descriptor and supporting files for the mobile shell.
pub fn write_mobile_files(
  fs: &dyn BundleFileSystem,
  runtime_root: &Path,
  output_root: &Path,
  project: &Project,
) -> Result<(), ExportError> {
  let template_path = runtime_root.join(MOBILE_CONFIG_TEMPLATE);
  let template = fs.read_to_string(&template_path)?;

  let document = SubstitutionContext::new()
    .set_nonempty(PACKAGE_ID_MARKER, &xml_escape(&project.package_id))
    .set(PROJECT_NAME_MARKER, xml_escape(&project.name))
    .set_nonempty(PROJECT_VERSION_MARKER, &xml_escape(&project.version))
    .set(ORIENTATION_MARKER, project.orientation.as_str())
    .apply(&template, &template_path)?;

  fs.write(&output_root.join(MOBILE_CONFIG_FILE), document.as_bytes())?;
  copy_support_files(fs, &runtime_root.join(MOBILE_SUPPORT_DIR), output_root)?;
  Ok(())
}
