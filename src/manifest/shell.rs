//! HTML shell generation shared by every target.

use std::path::Path;

use crate::errors::ExportError;
use crate::external::BundleFileSystem;
use crate::manifest::template::{
  html_escape, SubstitutionContext, INCLUDE_FILES_MARKER, PROJECT_NAME_MARKER,
  RUNTIME_OPTIONS_MARKER,
};
use crate::materialize::MaterializedModule;
use crate::project::Project;

/// Template for the bundle's entry document, relative to the runtime root.
pub const INDEX_TEMPLATE: &str = "templates/index.html";

/// Name of the entry document written into the bundle root.
pub const INDEX_FILE: &str = "index.html";

/// Name of the project data file the shell loads before the modules run.
pub const PROJECT_DATA_FILE: &str = "project-data.js";

/// Render one inclusion statement per module, in list order.
pub fn render_include_tags(modules: &[MaterializedModule]) -> String {
  modules
    .iter()
    .map(|module| format!("<script src=\"{}\"></script>", module.path))
    .collect::<Vec<_>>()
    .join("\n    ")
}

/// Load the shell template, substitute its markers and write the entry
/// document into the bundle root.
pub fn write_index_shell(
  fs: &dyn BundleFileSystem,
  runtime_root: &Path,
  bundle_root: &Path,
  project: &Project,
  modules: &[MaterializedModule],
  runtime_options: &serde_json::Value,
) -> Result<(), ExportError> {
  let template_path = runtime_root.join(INDEX_TEMPLATE);
  let template = fs.read_to_string(&template_path)?;

  let options_tag = format!(
    "<script>window.runtimeOptions = {};</script>",
    runtime_options
  );
  let document = SubstitutionContext::new()
    .set(INCLUDE_FILES_MARKER, render_include_tags(modules))
    .set(RUNTIME_OPTIONS_MARKER, options_tag)
    .set(PROJECT_NAME_MARKER, html_escape(&project.name))
    .apply(&template, &template_path)?;

  fs.write(&bundle_root.join(INDEX_FILE), document.as_bytes())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::external::DiskFileSystem;
  use crate::project::{Project, RendererBackend, Scene};
  use std::fs as stdfs;
  use tempfile::tempdir;

  fn project() -> Project {
    Project {
      name: "Cave & Cliff".into(),
      version: "0.3.0".into(),
      package_id: "com.example.cave".into(),
      orientation: Default::default(),
      renderer: RendererBackend::Webgl,
      scenes: vec![Scene {
        name: "Menu".into(),
        events_digest: 0,
        data: serde_json::Value::Null,
      }],
      external_sources: Vec::new(),
      extensions: Vec::new(),
      resources: Vec::new(),
    }
  }

  #[test]
  fn writes_shell_with_includes_in_order() {
    let temp = tempdir().unwrap();
    let runtime_root = temp.path().join("runtime");
    let bundle_root = temp.path().join("out");
    let template_path = runtime_root.join(INDEX_TEMPLATE);
    stdfs::create_dir_all(template_path.parent().unwrap()).unwrap();
    stdfs::write(
      &template_path,
      "<html><head><title>BUNDLE_PROJECT_NAME</title></head>\n<body>\n    <!-- BUNDLE_INCLUDE_FILES -->\n    <!-- BUNDLE_RUNTIME_OPTIONS -->\n</body></html>\n",
    )
    .unwrap();

    let modules = vec![
      MaterializedModule {
        path: "code0.js".into(),
        mergeable: true,
      },
      MaterializedModule {
        path: "code1.js".into(),
        mergeable: true,
      },
    ];
    let options = serde_json::json!({"initialScene": "Menu"});

    write_index_shell(
      &DiskFileSystem,
      &runtime_root,
      &bundle_root,
      &project(),
      &modules,
      &options,
    )
    .unwrap();

    let document = stdfs::read_to_string(bundle_root.join(INDEX_FILE)).unwrap();
    let first = document.find("code0.js").unwrap();
    let second = document.find("code1.js").unwrap();
    assert!(first < second);
    assert!(document.contains("Cave &amp; Cliff"));
    assert!(document.contains("\"initialScene\":\"Menu\""));
    assert!(!document.contains("BUNDLE_"));
  }

  #[test]
  fn missing_template_fails_with_its_path() {
    let temp = tempdir().unwrap();
    let err = write_index_shell(
      &DiskFileSystem,
      &temp.path().join("runtime"),
      &temp.path().join("out"),
      &project(),
      &[],
      &serde_json::json!({}),
    )
    .unwrap_err();
    assert!(err.to_string().contains("index.html"));
  }
}
