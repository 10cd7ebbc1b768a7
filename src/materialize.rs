//! Module materialization: resolving planned modules to bytes under the
//! output root, rewriting paths relative to the bundle, and collapsing
//! mergeable runs when minification is requested.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::errors::ExportError;
use crate::external::{BundleFileSystem, ProgressSink, SceneCodeGenerator, ScriptMerger};
use crate::hashes::FingerprintTracker;
use crate::options::ModuleFingerprints;
use crate::plan::{ModuleRole, ModuleSource, PlannedModule};
use crate::project::Project;

/// Name of the merged artifact produced when minification collapses a run.
pub const MERGED_MODULE_NAME: &str = "bundle.min.js";

/// One materialized entry of the final module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedModule {
  /// Path relative to the bundle root.
  pub path: String,
  /// Whether the module was eligible for merging.
  pub mergeable: bool,
}

/// Collaborators and directories used during materialization.
pub struct MaterializeContext<'a> {
  /// File system used for every read, write and copy.
  pub fs: &'a dyn BundleFileSystem,
  /// Generator invoked for scene-code modules.
  pub generator: &'a dyn SceneCodeGenerator,
  /// Merger invoked when minification collapses a run.
  pub merger: &'a dyn ScriptMerger,
  /// Root of the runtime distribution holding static module files.
  pub runtime_root: &'a Path,
  /// Cache directory where generated code is written before copying.
  pub code_output_dir: &'a Path,
  /// Bundle root that receives every materialized module.
  pub bundle_root: &'a Path,
  /// Optional progress sink.
  pub progress: Option<&'a dyn ProgressSink>,
}

/// Materialize every planned module under the bundle root.
///
/// Returns the final module list with paths rewritten relative to the bundle
/// root, and the fresh fingerprints of generated modules for the caller to
/// persist. Every planned module is accounted for in the result, either
/// directly or through the merged replacement.
pub fn materialize_modules(
  plan: &[PlannedModule],
  project: &Project,
  tracker: &FingerprintTracker<'_>,
  ctx: &MaterializeContext<'_>,
  minify: bool,
) -> Result<(Vec<MaterializedModule>, ModuleFingerprints), ExportError> {
  let mut materialized = Vec::with_capacity(plan.len());
  let mut fresh = ModuleFingerprints::new();
  let total = plan.len();

  for (index, module) in plan.iter().enumerate() {
    match (&module.source, module.role) {
      (ModuleSource::Generated, ModuleRole::SceneCode { scene_index }) => {
        let digest = materialize_scene_code(module, project, scene_index, tracker, ctx)?;
        fresh.insert(module.output_name.clone(), digest);
      }
      (ModuleSource::Generated, _) => {
        return Err(ExportError::configuration(format!(
          "module {} is generated but has no scene attached",
          module.output_name
        )));
      }
      (ModuleSource::RuntimeAsset(relative), _) => {
        let source = ctx.runtime_root.join(relative);
        ctx.fs.copy(&source, &ctx.bundle_root.join(&module.output_name))?;
      }
      (ModuleSource::External(absolute), _) => {
        ctx
          .fs
          .copy(absolute, &ctx.bundle_root.join(&module.output_name))?;
      }
    }

    materialized.push(MaterializedModule {
      path: module.output_name.clone(),
      mergeable: module.mergeable,
    });
    if let Some(progress) = ctx.progress {
      progress.materialized(index + 1, total);
    }
  }

  if minify {
    materialized = merge_first_run(materialized, ctx)?;
  }

  Ok((materialized, fresh))
}

fn materialize_scene_code(
  module: &PlannedModule,
  project: &Project,
  scene_index: usize,
  tracker: &FingerprintTracker<'_>,
  ctx: &MaterializeContext<'_>,
) -> Result<u64, ExportError> {
  let scene = project.scenes.get(scene_index).ok_or_else(|| {
    ExportError::configuration(format!(
      "module {} refers to scene index {} but the project has {} scenes",
      module.output_name,
      scene_index,
      project.scenes.len()
    ))
  })?;

  let cached = ctx.code_output_dir.join(&module.output_name);
  let reuse =
    !tracker.should_regenerate(&module.output_name, scene.events_digest) && ctx.fs.exists(&cached);

  if reuse {
    debug!(module = %module.output_name, "reusing cached scene code");
  } else {
    let code = ctx
      .generator
      .generate(project, scene_index)
      .map_err(|message| ExportError::Generation {
        module: module.output_name.clone(),
        message,
      })?;
    ctx.fs.write(&cached, code.as_bytes())?;
  }

  ctx
    .fs
    .copy(&cached, &ctx.bundle_root.join(&module.output_name))?;
  Ok(scene.events_digest)
}

/// Collapse the first contiguous run of mergeable modules into one merged
/// artifact. Modules separated from the run by a non-mergeable module keep
/// their position, so load-order interleaving is preserved. With no
/// mergeable module present this is a no-op.
fn merge_first_run(
  modules: Vec<MaterializedModule>,
  ctx: &MaterializeContext<'_>,
) -> Result<Vec<MaterializedModule>, ExportError> {
  let Some(start) = modules.iter().position(|m| m.mergeable) else {
    debug!("minification requested but no mergeable module is present");
    return Ok(modules);
  };
  let end = modules[start..]
    .iter()
    .position(|m| !m.mergeable)
    .map_or(modules.len(), |offset| start + offset);

  let mut sources = Vec::with_capacity(end - start);
  for module in &modules[start..end] {
    sources.push(ctx.fs.read_to_string(&ctx.bundle_root.join(&module.path))?);
  }

  let merged = ctx
    .merger
    .merge(&sources)
    .map_err(|message| ExportError::Tool {
      tool: "script merger".into(),
      message,
    })?;
  ctx
    .fs
    .write(&ctx.bundle_root.join(MERGED_MODULE_NAME), merged.as_bytes())?;

  debug!(
    merged = end - start,
    artifact = MERGED_MODULE_NAME,
    "collapsed mergeable module run"
  );

  let mut result = Vec::with_capacity(modules.len() - (end - start) + 1);
  result.extend(modules[..start].iter().cloned());
  result.push(MaterializedModule {
    path: MERGED_MODULE_NAME.to_string(),
    mergeable: false,
  });
  result.extend(modules[end..].iter().cloned());
  Ok(result)
}

/// Copy project resources into the bundle root, de-duplicating filename
/// collisions deterministically.
///
/// Returns the mapping from logical resource name to bundled filename, used
/// to rewrite references in the exported project data. Two resources backed
/// by the same source file share one bundled copy; two distinct sources with
/// the same filename get ordinal-suffixed names in resource order.
pub fn export_resources(
  project: &Project,
  fs: &dyn BundleFileSystem,
  bundle_root: &Path,
) -> Result<BTreeMap<String, String>, ExportError> {
  let mut assigned: Vec<(String, String)> = Vec::new();
  let mut by_source: BTreeMap<String, String> = BTreeMap::new();
  let mut taken: BTreeMap<String, String> = BTreeMap::new();

  for resource in &project.resources {
    let source_key = resource.file.to_string_lossy().into_owned();
    if let Some(existing) = by_source.get(&source_key) {
      assigned.push((resource.name.clone(), existing.clone()));
      continue;
    }

    let file_name = resource
      .file
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| {
        ExportError::configuration(format!(
          "resource '{}' has no file name in {}",
          resource.name,
          resource.file.display()
        ))
      })?;

    let bundled_name = disambiguate(&file_name, &source_key, &taken);
    fs.copy(&resource.file, &bundle_root.join(&bundled_name))?;

    taken.insert(bundled_name.clone(), source_key.clone());
    by_source.insert(source_key, bundled_name.clone());
    assigned.push((resource.name.clone(), bundled_name));
  }

  Ok(assigned.into_iter().collect())
}

fn disambiguate(
  file_name: &str,
  source_key: &str,
  taken: &BTreeMap<String, String>,
) -> String {
  match taken.get(file_name) {
    None => return file_name.to_string(),
    Some(owner) if owner == source_key => return file_name.to_string(),
    Some(_) => {}
  }

  let (stem, extension) = match file_name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
    _ => (file_name, None),
  };

  let mut counter = 2;
  loop {
    let candidate = match extension {
      Some(ext) => format!("{}-{}.{}", stem, counter, ext),
      None => format!("{}-{}", file_name, counter),
    };
    match taken.get(&candidate) {
      None => return candidate,
      Some(owner) if owner == source_key => return candidate,
      Some(_) => counter += 1,
    }
  }
}
