//! Export orchestrator sequencing the pipeline stages per request.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ExportError;
use crate::external::{BundleFileSystem, ProgressSink, SceneCodeGenerator, ScriptMerger};
use crate::hashes::FingerprintTracker;
use crate::manifest::desktop::write_desktop_files;
use crate::manifest::mobile::write_mobile_files;
use crate::manifest::shell::{write_index_shell, INDEX_FILE, PROJECT_DATA_FILE};
use crate::manifest::social::write_social_files;
use crate::materialize::{export_resources, materialize_modules, MaterializeContext};
use crate::options::{BundleTarget, ModuleFingerprints, PreviewExportOptions};
use crate::plan::{plan_modules, Capabilities};
use crate::project::Project;

/// Success value of an export: where the bundle is, the final module list
/// as materialized, and the fresh fingerprints to persist for the next
/// incremental export.
#[derive(Debug, Clone)]
pub struct ExportReport {
  /// Directory the export wrote into.
  pub output_root: PathBuf,
  /// Browsable/runnable entry point of the bundle.
  pub entry_point: PathBuf,
  /// Final module list, paths relative to the bundle root.
  pub modules: Vec<String>,
  /// Content fingerprints of the generated modules, keyed by module name.
  pub fresh_fingerprints: ModuleFingerprints,
}

/// Sequences plan, fingerprint tracking, materialization and manifest
/// generation for one export request, halting at the first failing stage.
pub struct Exporter<'a> {
  fs: &'a dyn BundleFileSystem,
  generator: &'a dyn SceneCodeGenerator,
  merger: &'a dyn ScriptMerger,
  runtime_root: PathBuf,
  code_output_dir: PathBuf,
  progress: Option<&'a dyn ProgressSink>,
}

impl<'a> Exporter<'a> {
  /// Exporter over the given collaborators. `runtime_root` holds the
  /// runtime distribution (static modules and manifest templates);
  /// `code_output_dir` caches generated code between incremental exports.
  pub fn new(
    fs: &'a dyn BundleFileSystem,
    generator: &'a dyn SceneCodeGenerator,
    merger: &'a dyn ScriptMerger,
    runtime_root: impl Into<PathBuf>,
    code_output_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      fs,
      generator,
      merger,
      runtime_root: runtime_root.into(),
      code_output_dir: code_output_dir.into(),
      progress: None,
    }
  }

  /// Attach a progress sink receiving coarse materialization updates.
  pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
    self.progress = Some(sink);
    self
  }

  /// Change the directory where generated code is cached.
  pub fn set_code_output_directory(&mut self, dir: impl Into<PathBuf>) {
    self.code_output_dir = dir.into();
  }

  /// Serialize the project configuration (not code) to a single data file,
  /// embedding the validated runtime options blob.
  pub fn export_project_data(
    &self,
    project: &Project,
    destination: &Path,
    runtime_options: &str,
  ) -> Result<(), ExportError> {
    project.validate()?;
    let options: serde_json::Value = serde_json::from_str(runtime_options).map_err(|err| {
      ExportError::configuration(format!("runtime options are not valid JSON: {}", err))
    })?;
    self.write_project_data(project, destination, &options)
  }

  /// Export a preview bundle, regenerating only what changed since the
  /// fingerprints in `options` were recorded.
  pub fn export_for_preview(
    &self,
    project: &Project,
    options: &PreviewExportOptions,
  ) -> Result<ExportReport, ExportError> {
    project.validate()?;
    let bundle_root = options.output_root.clone();
    let runtime_options = preview_runtime_options(project, options);

    if options.data_only {
      debug!(project = %project.name, "data-only preview export");
      self.write_project_data(
        project,
        &bundle_root.join(PROJECT_DATA_FILE),
        &runtime_options,
      )?;
      return Ok(ExportReport {
        entry_point: bundle_root.join(INDEX_FILE),
        output_root: bundle_root,
        modules: vec![PROJECT_DATA_FILE.to_string()],
        fresh_fingerprints: ModuleFingerprints::new(),
      });
    }

    info!(project = %project.name, output = %bundle_root.display(), "exporting preview bundle");

    let caps = Capabilities {
      renderer: project.renderer,
      debugger_client: options.debugger_endpoint.is_some(),
    };
    let plan = plan_modules(project, &caps)?;
    let tracker = FingerprintTracker::new(&options.prior_fingerprints, options.full_rebuild);
    let (modules, fresh) = materialize_modules(
      &plan,
      project,
      &tracker,
      &self.materialize_context(&bundle_root),
      false,
    )?;

    let bundled = export_resources(project, self.fs, &bundle_root)?;
    let updated = project.with_bundled_resources(&bundled);
    self.write_project_data(
      &updated,
      &bundle_root.join(PROJECT_DATA_FILE),
      &runtime_options,
    )?;

    write_index_shell(
      self.fs,
      &self.runtime_root,
      &bundle_root,
      project,
      &modules,
      &runtime_options,
    )?;

    info!(modules = modules.len(), "preview export complete");
    Ok(ExportReport {
      entry_point: bundle_root.join(INDEX_FILE),
      output_root: bundle_root,
      modules: modules.into_iter().map(|m| m.path).collect(),
      fresh_fingerprints: fresh,
    })
  }

  /// Export a packaged bundle for one of the supported targets.
  pub fn export_for_packaged_target(
    &self,
    target: BundleTarget,
    project: &Project,
    output_root: &Path,
    minify: bool,
  ) -> Result<ExportReport, ExportError> {
    project.validate()?;
    let bundle_root = match target.bundle_subdir() {
      Some(subdir) => output_root.join(subdir),
      None => output_root.to_path_buf(),
    };

    info!(
      project = %project.name,
      target = ?target,
      output = %output_root.display(),
      "exporting packaged bundle"
    );

    let caps = Capabilities {
      renderer: project.renderer,
      debugger_client: false,
    };
    let plan = plan_modules(project, &caps)?;
    let empty = ModuleFingerprints::new();
    let tracker = FingerprintTracker::new(&empty, true);
    let (modules, fresh) = materialize_modules(
      &plan,
      project,
      &tracker,
      &self.materialize_context(&bundle_root),
      minify,
    )?;

    let bundled = export_resources(project, self.fs, &bundle_root)?;
    let updated = project.with_bundled_resources(&bundled);
    let runtime_options = packaged_runtime_options(project);
    self.write_project_data(
      &updated,
      &bundle_root.join(PROJECT_DATA_FILE),
      &runtime_options,
    )?;

    write_index_shell(
      self.fs,
      &self.runtime_root,
      &bundle_root,
      project,
      &modules,
      &runtime_options,
    )?;

    match target {
      BundleTarget::Preview => {}
      BundleTarget::MobileShell => {
        write_mobile_files(self.fs, &self.runtime_root, output_root, project)?
      }
      BundleTarget::DesktopShell => {
        write_desktop_files(self.fs, &self.runtime_root, output_root, project)?
      }
      BundleTarget::SocialShell => {
        write_social_files(self.fs, &self.runtime_root, output_root, project)?
      }
    }

    info!(modules = modules.len(), "packaged export complete");
    Ok(ExportReport {
      output_root: output_root.to_path_buf(),
      entry_point: bundle_root.join(INDEX_FILE),
      modules: modules.into_iter().map(|m| m.path).collect(),
      fresh_fingerprints: fresh,
    })
  }

  fn materialize_context<'b>(&'b self, bundle_root: &'b Path) -> MaterializeContext<'b> {
    MaterializeContext {
      fs: self.fs,
      generator: self.generator,
      merger: self.merger,
      runtime_root: &self.runtime_root,
      code_output_dir: &self.code_output_dir,
      bundle_root,
      progress: self.progress,
    }
  }

  fn write_project_data(
    &self,
    project: &Project,
    destination: &Path,
    runtime_options: &serde_json::Value,
  ) -> Result<(), ExportError> {
    let data = serde_json::to_string(project).map_err(|err| {
      ExportError::configuration(format!("project serialization failed: {}", err))
    })?;
    let script = format!(
      "window.projectData = {};\nwindow.runtimeOptions = {};\n",
      data, runtime_options
    );
    self.fs.write(destination, script.as_bytes())
  }
}

fn preview_runtime_options(
  project: &Project,
  options: &PreviewExportOptions,
) -> serde_json::Value {
  let initial_scene = options
    .initial_scene
    .clone()
    .unwrap_or_else(|| project.scenes[0].name.clone());

  let mut value = serde_json::json!({
    "initialScene": initial_scene,
    "dataOnly": options.data_only,
  });
  if let Some(layout) = &options.initial_external_layout {
    value["initialExternalLayout"] = serde_json::Value::String(layout.clone());
  }
  if let Some(endpoint) = &options.debugger_endpoint {
    value["debugger"] = serde_json::json!({
      "address": endpoint.address,
      "port": endpoint.port,
    });
  }
  value
}

fn packaged_runtime_options(project: &Project) -> serde_json::Value {
  serde_json::json!({
    "initialScene": project.scenes[0].name,
    "dataOnly": false,
  })
}
