//! Module plan builder.
//!
//! Computes the complete, correctly ordered module list for an export before
//! any file is written. Inclusion is a declarative predicate over the module
//! role evaluated once per build, so toggling a capability can never leave
//! stale modules behind regardless of evaluation order.

use std::path::PathBuf;

use crate::errors::ExportError;
use crate::project::{Project, RendererBackend};

/// Runtime files shipped with every bundle, in load order.
const RUNTIME_CORE_FILES: &[&str] = &[
  "runtime/bootstrap.js",
  "runtime/runtime-game.js",
  "runtime/scene-stack.js",
  "runtime/input-manager.js",
  "runtime/asset-loader.js",
];

/// WebGL renderer family files.
const WEBGL_RENDERER_FILES: &[&str] = &[
  "runtime/webgl/webgl-renderer.js",
  "runtime/webgl/webgl-sprite.js",
];

/// Canvas renderer family files.
const CANVAS_RENDERER_FILES: &[&str] = &[
  "runtime/canvas/canvas-renderer.js",
  "runtime/canvas/canvas-sprite.js",
];

/// Debugger client, appended after every ordinal-named module.
const DEBUGGER_CLIENT_FILE: &str = "runtime/debugger-client.js";

/// Role tag identifying why a module is part of the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleRole {
  /// Core runtime file shipped with every bundle.
  RuntimeCore,
  /// Renderer backend file belonging to one renderer family.
  Renderer(RendererBackend),
  /// Include file contributed by an enabled extension.
  ExtensionCode,
  /// Generated code for one scene, named by scene ordinal.
  SceneCode {
    /// Index of the scene within the project.
    scene_index: usize,
  },
  /// External source file copied into the bundle, named by ordinal.
  ExternalSource {
    /// Index of the source file within the project.
    source_index: usize,
  },
  /// Debugger client connecting the preview to the editor.
  DebuggerClient,
}

/// Where a planned module's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
  /// Static file under the runtime root, copied verbatim.
  RuntimeAsset(PathBuf),
  /// File outside the runtime tree, copied verbatim.
  External(PathBuf),
  /// Produced by the scene code generator.
  Generated,
}

/// One entry of the ordered module plan.
#[derive(Debug, Clone)]
pub struct PlannedModule {
  /// Role tag driving inclusion and merge policy.
  pub role: ModuleRole,
  /// Source of the module's bytes.
  pub source: ModuleSource,
  /// File name the module takes under the output root.
  pub output_name: String,
  /// Whether the module may be collapsed into a merged artifact.
  pub mergeable: bool,
}

/// Capabilities requested for one export, evaluated as an inclusion
/// predicate over [`ModuleRole`].
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
  /// Renderer family to include; the other family is excluded entirely.
  pub renderer: RendererBackend,
  /// Whether the debugger client ships with the bundle.
  pub debugger_client: bool,
}

impl Capabilities {
  /// Decide whether a module with the given role belongs in the bundle.
  pub fn allows(&self, role: ModuleRole) -> bool {
    match role {
      ModuleRole::Renderer(family) => family == self.renderer,
      ModuleRole::DebuggerClient => self.debugger_client,
      _ => true,
    }
  }
}

/// Build the ordered module plan for a project.
///
/// Order is load order: runtime core, renderer, extension includes, scene
/// code by scene ordinal, external sources by ordinal, then the debugger
/// client. The debugger client comes last so its presence never shifts the
/// ordinal numbering of generated modules.
pub fn plan_modules(
  project: &Project,
  caps: &Capabilities,
) -> Result<Vec<PlannedModule>, ExportError> {
  project.validate()?;

  let mut candidates: Vec<PlannedModule> = Vec::new();

  for file in RUNTIME_CORE_FILES {
    candidates.push(runtime_asset(ModuleRole::RuntimeCore, file));
  }
  for file in WEBGL_RENDERER_FILES {
    candidates.push(runtime_asset(
      ModuleRole::Renderer(RendererBackend::Webgl),
      file,
    ));
  }
  for file in CANVAS_RENDERER_FILES {
    candidates.push(runtime_asset(
      ModuleRole::Renderer(RendererBackend::Canvas),
      file,
    ));
  }

  for extension in &project.extensions {
    for file in &extension.include_files {
      if file.trim().is_empty() {
        return Err(ExportError::configuration(format!(
          "extension '{}' lists an empty include file",
          extension.name
        )));
      }
      candidates.push(runtime_asset(ModuleRole::ExtensionCode, file));
    }
  }

  for (scene_index, _scene) in project.scenes.iter().enumerate() {
    candidates.push(PlannedModule {
      role: ModuleRole::SceneCode { scene_index },
      source: ModuleSource::Generated,
      output_name: scene_code_name(scene_index),
      mergeable: true,
    });
  }

  for (source_index, source) in project.external_sources.iter().enumerate() {
    if source.file.as_os_str().is_empty() {
      return Err(ExportError::configuration(format!(
        "external source '{}' has no file path",
        source.name
      )));
    }
    candidates.push(PlannedModule {
      role: ModuleRole::ExternalSource { source_index },
      source: ModuleSource::External(source.file.clone()),
      output_name: external_source_name(source_index),
      mergeable: false,
    });
  }

  candidates.push(PlannedModule {
    role: ModuleRole::DebuggerClient,
    source: ModuleSource::RuntimeAsset(PathBuf::from(DEBUGGER_CLIENT_FILE)),
    output_name: base_name(DEBUGGER_CLIENT_FILE),
    mergeable: false,
  });

  Ok(
    candidates
      .into_iter()
      .filter(|module| caps.allows(module.role))
      .collect(),
  )
}

/// Deterministic output name of the generated module for a scene ordinal.
pub fn scene_code_name(scene_index: usize) -> String {
  format!("code{}.js", scene_index)
}

/// Deterministic output name of an external source module.
pub fn external_source_name(source_index: usize) -> String {
  format!("ext-code{}.js", source_index)
}

fn runtime_asset(role: ModuleRole, file: &str) -> PlannedModule {
  PlannedModule {
    role,
    source: ModuleSource::RuntimeAsset(PathBuf::from(file)),
    output_name: base_name(file),
    mergeable: true,
  }
}

fn base_name(file: &str) -> String {
  file.rsplit('/').next().unwrap_or(file).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::project::{ExtensionInclude, ExternalSourceFile, Scene};

  fn two_scene_project() -> Project {
    Project {
      name: "Asteroid Run".into(),
      version: "1.0.0".into(),
      package_id: "com.example.asteroidrun".into(),
      orientation: Default::default(),
      renderer: RendererBackend::Webgl,
      scenes: vec![
        Scene {
          name: "Menu".into(),
          events_digest: 1,
          data: serde_json::Value::Null,
        },
        Scene {
          name: "Level 1".into(),
          events_digest: 2,
          data: serde_json::Value::Null,
        },
      ],
      external_sources: Vec::new(),
      extensions: Vec::new(),
      resources: Vec::new(),
    }
  }

  fn caps(renderer: RendererBackend, debugger_client: bool) -> Capabilities {
    Capabilities {
      renderer,
      debugger_client,
    }
  }

  #[test]
  fn plan_is_deterministic() {
    let project = two_scene_project();
    let first = plan_modules(&project, &caps(RendererBackend::Webgl, false)).unwrap();
    let second = plan_modules(&project, &caps(RendererBackend::Webgl, false)).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
      assert_eq!(a.output_name, b.output_name);
      assert_eq!(a.role, b.role);
    }
  }

  #[test]
  fn scene_modules_are_named_by_ordinal_in_project_order() {
    let project = two_scene_project();
    let plan = plan_modules(&project, &caps(RendererBackend::Webgl, false)).unwrap();

    let scene_names: Vec<&str> = plan
      .iter()
      .filter(|m| matches!(m.role, ModuleRole::SceneCode { .. }))
      .map(|m| m.output_name.as_str())
      .collect();
    assert_eq!(scene_names, vec!["code0.js", "code1.js"]);
  }

  #[test]
  fn selected_renderer_family_excludes_the_other_entirely() {
    let project = two_scene_project();
    let plan = plan_modules(&project, &caps(RendererBackend::Canvas, false)).unwrap();

    assert!(
      plan
        .iter()
        .all(|m| m.role != ModuleRole::Renderer(RendererBackend::Webgl))
    );
    assert!(
      plan
        .iter()
        .any(|m| m.role == ModuleRole::Renderer(RendererBackend::Canvas))
    );
  }

  #[test]
  fn debugger_absence_does_not_shift_ordinals() {
    let project = two_scene_project();
    let without = plan_modules(&project, &caps(RendererBackend::Webgl, false)).unwrap();
    let with = plan_modules(&project, &caps(RendererBackend::Webgl, true)).unwrap();

    let ordinals = |plan: &[PlannedModule]| -> Vec<String> {
      plan
        .iter()
        .filter(|m| matches!(m.role, ModuleRole::SceneCode { .. }))
        .map(|m| m.output_name.clone())
        .collect()
    };
    assert_eq!(ordinals(&without), ordinals(&with));

    assert!(without.iter().all(|m| m.role != ModuleRole::DebuggerClient));
    assert_eq!(
      with.last().map(|m| m.role),
      Some(ModuleRole::DebuggerClient)
    );
  }

  #[test]
  fn debugger_client_and_external_sources_are_not_mergeable() {
    let mut project = two_scene_project();
    project.external_sources.push(ExternalSourceFile {
      name: "analytics".into(),
      file: PathBuf::from("/src/analytics.js"),
    });

    let plan = plan_modules(&project, &caps(RendererBackend::Webgl, true)).unwrap();
    for module in &plan {
      match module.role {
        ModuleRole::DebuggerClient | ModuleRole::ExternalSource { .. } => {
          assert!(!module.mergeable)
        }
        _ => assert!(module.mergeable),
      }
    }
  }

  #[test]
  fn extension_includes_sit_between_renderer_and_scene_code() {
    let mut project = two_scene_project();
    project.extensions.push(ExtensionInclude {
      name: "physics".into(),
      include_files: vec!["extensions/physics/physics-tools.js".into()],
    });

    let plan = plan_modules(&project, &caps(RendererBackend::Webgl, false)).unwrap();
    let extension_pos = plan
      .iter()
      .position(|m| m.role == ModuleRole::ExtensionCode)
      .unwrap();
    let first_scene_pos = plan
      .iter()
      .position(|m| matches!(m.role, ModuleRole::SceneCode { .. }))
      .unwrap();
    let last_renderer_pos = plan
      .iter()
      .rposition(|m| matches!(m.role, ModuleRole::Renderer(_)))
      .unwrap();

    assert!(last_renderer_pos < extension_pos);
    assert!(extension_pos < first_scene_pos);
  }

  #[test]
  fn empty_project_is_rejected() {
    let mut project = two_scene_project();
    project.scenes.clear();
    assert!(plan_modules(&project, &caps(RendererBackend::Webgl, false)).is_err());
  }
}
