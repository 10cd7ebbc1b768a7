//! Trait seams for the pipeline's external collaborators.
//!
//! Editor hosts supply their own file system, code generator and minifier;
//! the disk-backed defaults here are what the CLI uses.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use same_file::is_same_file;

use crate::errors::ExportError;
use crate::project::Project;

/// File system operations the pipeline needs.
///
/// Every operation fails with the offending path and the OS-level error,
/// propagated up as an export failure.
pub trait BundleFileSystem {
  /// Whether a file or directory exists at `path`.
  fn exists(&self, path: &Path) -> bool;

  /// Read a file as bytes.
  fn read(&self, path: &Path) -> Result<Vec<u8>, ExportError>;

  /// Read a file as UTF-8 text.
  fn read_to_string(&self, path: &Path) -> Result<String, ExportError>;

  /// Write bytes to `path`, creating parent directories as needed.
  fn write(&self, path: &Path, contents: &[u8]) -> Result<(), ExportError>;

  /// Copy `from` to `to`, creating parent directories as needed.
  fn copy(&self, from: &Path, to: &Path) -> Result<(), ExportError>;

  /// List the entries of a directory, sorted by name.
  fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, ExportError>;
}

/// Generates executable module text for one scene of a project.
///
/// Invoked once per regenerated scene module; the error string is used
/// verbatim in the export failure.
pub trait SceneCodeGenerator {
  /// Produce the module text for the scene at `scene_index`.
  fn generate(&self, project: &Project, scene_index: usize) -> Result<String, String>;
}

/// Merges a run of module sources into a single artifact.
pub trait ScriptMerger {
  /// Merge the sources in order into one script.
  fn merge(&self, sources: &[String]) -> Result<String, String>;
}

/// Optional sink receiving coarse-grained materialization progress.
///
/// Absence of a sink does not change pipeline behavior.
pub trait ProgressSink {
  /// Called after each module is materialized.
  fn materialized(&self, completed: usize, total: usize);
}

/// [`BundleFileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl BundleFileSystem for DiskFileSystem {
  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }

  fn read(&self, path: &Path) -> Result<Vec<u8>, ExportError> {
    fs::read(path).map_err(|err| ExportError::io(path, err))
  }

  fn read_to_string(&self, path: &Path) -> Result<String, ExportError> {
    fs::read_to_string(path).map_err(|err| ExportError::io(path, err))
  }

  fn write(&self, path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|err| ExportError::io(parent, err))?;
    }
    fs::write(path, contents).map_err(|err| ExportError::io(path, err))
  }

  fn copy(&self, from: &Path, to: &Path) -> Result<(), ExportError> {
    if !from.exists() {
      return Err(ExportError::io(
        from,
        std::io::Error::new(ErrorKind::NotFound, "source file not found"),
      ));
    }
    if let Some(parent) = to.parent() {
      fs::create_dir_all(parent).map_err(|err| ExportError::io(parent, err))?;
    }

    if to.exists() {
      if is_same_file(from, to).map_err(|err| ExportError::io(to, err))? {
        return Ok(());
      }
      fs::remove_file(to).map_err(|err| ExportError::io(to, err))?;
    }

    match fs::hard_link(from, to) {
      Ok(()) => Ok(()),
      Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
      Err(_) => fs::copy(from, to)
        .map(|_| ())
        .map_err(|err| ExportError::io(to, err)),
    }
  }

  fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let entries = fs::read_dir(path).map_err(|err| ExportError::io(path, err))?;
    let mut paths = Vec::new();
    for entry in entries {
      let entry = entry.map_err(|err| ExportError::io(path, err))?;
      paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
  }
}

/// Default generator: emits a registration stub that hands the serialized
/// scene description to the runtime loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneDataGenerator;

impl SceneCodeGenerator for SceneDataGenerator {
  fn generate(&self, project: &Project, scene_index: usize) -> Result<String, String> {
    let scene = project
      .scenes
      .get(scene_index)
      .ok_or_else(|| format!("scene index {} out of range", scene_index))?;
    let name =
      serde_json::to_string(&scene.name).map_err(|err| err.to_string())?;
    let data =
      serde_json::to_string(&scene.data).map_err(|err| err.to_string())?;
    Ok(format!(
      "window.runtimeLoader.registerScene({}, {});\n",
      name, data
    ))
  }
}

/// Default merger: concatenates sources verbatim, one per line group.
///
/// Hosts wanting real minification plug in their own [`ScriptMerger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatMerger;

impl ScriptMerger for ConcatMerger {
  fn merge(&self, sources: &[String]) -> Result<String, String> {
    let mut merged = String::new();
    for source in sources {
      merged.push_str(source);
      if !source.ends_with('\n') {
        merged.push('\n');
      }
    }
    Ok(merged)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::Scene;
  use tempfile::tempdir;

  #[test]
  fn copy_reuses_existing_links() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("source/file.txt");
    let destination = temp.path().join("dest/file.txt");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, b"content").unwrap();

    let disk = DiskFileSystem;
    disk.copy(&source, &destination).unwrap();
    assert!(destination.exists());
    assert!(is_same_file(&source, &destination).unwrap());

    disk.copy(&source, &destination).unwrap();
    assert!(is_same_file(&source, &destination).unwrap());
  }

  #[test]
  fn copy_of_missing_source_names_the_source_path() {
    let temp = tempdir().unwrap();
    let disk = DiskFileSystem;
    let err = disk
      .copy(&temp.path().join("absent.js"), &temp.path().join("out.js"))
      .unwrap_err();
    assert!(err.to_string().contains("absent.js"));
  }

  #[test]
  fn write_creates_parent_directories() {
    let temp = tempdir().unwrap();
    let nested = temp.path().join("a/b/c.txt");
    DiskFileSystem.write(&nested, b"x").unwrap();
    assert_eq!(fs::read(&nested).unwrap(), b"x");
  }

  #[test]
  fn list_directory_is_sorted() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("b.js"), b"b").unwrap();
    fs::write(temp.path().join("a.js"), b"a").unwrap();

    let listed = DiskFileSystem.list_directory(temp.path()).unwrap();
    let names: Vec<String> = listed
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["a.js", "b.js"]);
  }

  #[test]
  fn scene_data_generator_embeds_name_and_data() {
    let project = Project {
      name: "P".into(),
      version: String::new(),
      package_id: String::new(),
      orientation: Default::default(),
      renderer: Default::default(),
      scenes: vec![Scene {
        name: "Menu".into(),
        events_digest: 0,
        data: serde_json::json!({"objects": ["ship"]}),
      }],
      external_sources: Vec::new(),
      extensions: Vec::new(),
      resources: Vec::new(),
    };

    let code = SceneDataGenerator.generate(&project, 0).unwrap();
    assert!(code.contains("registerScene(\"Menu\""));
    assert!(code.contains("\"ship\""));

    let err = SceneDataGenerator.generate(&project, 5).unwrap_err();
    assert!(err.contains("out of range"));
  }

  #[test]
  fn concat_merger_preserves_order() {
    let merged = ConcatMerger
      .merge(&["first();".to_string(), "second();\n".to_string()])
      .unwrap();
    assert_eq!(merged, "first();\nsecond();\n");
  }
}
