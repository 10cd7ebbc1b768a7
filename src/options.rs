//! Per-request export options.

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Prior content fingerprints keyed by module output name.
///
/// Owned by the caller: the pipeline never mutates a supplied map, it returns
/// a freshly built one in the export report for the caller to persist.
pub type ModuleFingerprints = BTreeMap<String, u64>;

/// Deployment shells an export can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleTarget {
  /// Browser-openable preview bundle.
  Preview,
  /// Hybrid-mobile packaging layout (`www/` bundle plus packaging descriptor).
  MobileShell,
  /// Desktop-runtime packaging layout (`app/` bundle plus descriptor).
  DesktopShell,
  /// Social-platform bundle with its platform manifest.
  SocialShell,
}

impl BundleTarget {
  /// Directory under the output root that receives the runnable bundle.
  pub fn bundle_subdir(&self) -> Option<&'static str> {
    match self {
      Self::Preview | Self::SocialShell => None,
      Self::MobileShell => Some("www"),
      Self::DesktopShell => Some("app"),
    }
  }
}

/// Debugger server the previewed bundle should reach out to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerEndpoint {
  /// Host address of the debugger server.
  pub address: String,
  /// TCP port the debugger server listens on.
  pub port: u16,
}

/// Options for a preview export, built fluently.
///
/// ```
/// use bundle_exporter::options::PreviewExportOptions;
///
/// let options = PreviewExportOptions::new("/tmp/preview")
///   .with_debugger("127.0.0.1", 3030)
///   .with_initial_scene("Menu");
/// assert!(options.debugger_endpoint.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct PreviewExportOptions {
  /// Directory that receives the preview bundle.
  pub output_root: PathBuf,
  /// Debugger server the preview should connect to, when set.
  pub debugger_endpoint: Option<DebuggerEndpoint>,
  /// Scene to run first instead of the project's first scene.
  pub initial_scene: Option<String>,
  /// External layout to instantiate in the initial scene at startup.
  pub initial_external_layout: Option<String>,
  /// Fingerprints recorded by the previous export of this project.
  pub prior_fingerprints: ModuleFingerprints,
  /// Regenerate every module regardless of fingerprints.
  pub full_rebuild: bool,
  /// Rewrite only the project data file, leaving modules untouched.
  pub data_only: bool,
}

impl PreviewExportOptions {
  /// Options for a full preview export into `output_root`.
  pub fn new(output_root: impl Into<PathBuf>) -> Self {
    Self {
      output_root: output_root.into(),
      debugger_endpoint: None,
      initial_scene: None,
      initial_external_layout: None,
      prior_fingerprints: ModuleFingerprints::new(),
      full_rebuild: false,
      data_only: false,
    }
  }

  /// Point the previewed bundle at a debugger server.
  pub fn with_debugger(mut self, address: impl Into<String>, port: u16) -> Self {
    self.debugger_endpoint = Some(DebuggerEndpoint {
      address: address.into(),
      port,
    });
    self
  }

  /// Run the named scene first.
  pub fn with_initial_scene(mut self, scene: impl Into<String>) -> Self {
    self.initial_scene = Some(scene.into());
    self
  }

  /// Instantiate the named external layout in the initial scene.
  pub fn with_initial_external_layout(mut self, layout: impl Into<String>) -> Self {
    self.initial_external_layout = Some(layout.into());
    self
  }

  /// Supply the fingerprint map captured from the previous export.
  pub fn with_prior_fingerprints(mut self, fingerprints: ModuleFingerprints) -> Self {
    self.prior_fingerprints = fingerprints;
    self
  }

  /// Record a single prior fingerprint for a module.
  pub fn with_fingerprint(mut self, module: impl Into<String>, digest: u64) -> Self {
    self.prior_fingerprints.insert(module.into(), digest);
    self
  }

  /// Force regeneration of every generated module.
  pub fn full_rebuild(mut self) -> Self {
    self.full_rebuild = true;
    self
  }

  /// Only rewrite the project data file.
  pub fn data_only(mut self) -> Self {
    self.data_only = true;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_accumulates_fingerprints() {
    let options = PreviewExportOptions::new("/tmp/p")
      .with_fingerprint("code0.js", 11)
      .with_fingerprint("code1.js", 22);
    assert_eq!(options.prior_fingerprints.get("code0.js"), Some(&11));
    assert_eq!(options.prior_fingerprints.get("code1.js"), Some(&22));
    assert!(!options.data_only);
  }

  #[test]
  fn packaged_targets_nest_their_bundles() {
    assert_eq!(BundleTarget::MobileShell.bundle_subdir(), Some("www"));
    assert_eq!(BundleTarget::DesktopShell.bundle_subdir(), Some("app"));
    assert_eq!(BundleTarget::Preview.bundle_subdir(), None);
    assert_eq!(BundleTarget::SocialShell.bundle_subdir(), None);
  }
}
