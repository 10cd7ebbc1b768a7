#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod errors;
pub mod exporter;
pub mod external;
pub mod hashes;
pub mod manifest;
pub mod materialize;
pub mod options;
pub mod plan;
pub mod project;

pub use errors::ExportError;
pub use exporter::{ExportReport, Exporter};
pub use external::{
  BundleFileSystem, ConcatMerger, DiskFileSystem, ProgressSink, SceneCodeGenerator,
  SceneDataGenerator, ScriptMerger,
};
pub use options::{BundleTarget, DebuggerEndpoint, ModuleFingerprints, PreviewExportOptions};
pub use plan::{Capabilities, ModuleRole, PlannedModule};
pub use project::{Project, RendererBackend};
