//! Error type shared by every stage of the export pipeline.

use std::path::PathBuf;

/// Errors that can abort an export. The orchestrator surfaces the first one
/// encountered and halts; partial output already written is left in place
/// because exports are idempotent and safe to re-run.
#[derive(Debug)]
pub enum ExportError {
  /// The export request or project description is malformed or incomplete.
  Configuration {
    /// Human readable description of what is missing or malformed.
    message: String,
  },
  /// A file system operation failed.
  Io {
    /// Path the failing operation was addressing.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The external code generator failed for a module.
  Generation {
    /// Output name of the module being generated.
    module: String,
    /// Description reported by the generator, passed through verbatim.
    message: String,
  },
  /// A template marker was left unresolved or could not be substituted.
  Template {
    /// The marker text at fault.
    marker: String,
    /// Template document the marker belongs to.
    path: PathBuf,
  },
  /// An external tool (script merger, packaging helper) failed.
  Tool {
    /// Name of the failing tool.
    tool: String,
    /// Description reported by the tool.
    message: String,
  },
}

impl ExportError {
  /// Build a [`ExportError::Configuration`] from any displayable message.
  pub fn configuration(message: impl Into<String>) -> Self {
    Self::Configuration {
      message: message.into(),
    }
  }

  /// Build an [`ExportError::Io`] for the given path.
  pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

impl std::fmt::Display for ExportError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Configuration { message } => {
        write!(f, "invalid export configuration: {}", message)
      }
      Self::Io { path, source } => {
        write!(f, "file system error at {}: {}", path.display(), source)
      }
      Self::Generation { module, message } => {
        write!(f, "failed to generate code for {}: {}", module, message)
      }
      Self::Template { marker, path } => {
        write!(
          f,
          "unresolved marker '{}' in template {}",
          marker,
          path.display()
        )
      }
      Self::Tool { tool, message } => {
        write!(f, "{} failed: {}", tool, message)
      }
    }
  }
}

impl std::error::Error for ExportError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn io_errors_carry_the_offending_path() {
    let err = ExportError::io(
      "/tmp/out/code0.js",
      std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("/tmp/out/code0.js"));
    assert!(rendered.contains("gone"));
  }

  #[test]
  fn template_errors_name_the_marker() {
    let err = ExportError::Template {
      marker: "BUNDLE_PACKAGE_ID".into(),
      path: PathBuf::from("config.xml"),
    };
    assert!(err.to_string().contains("BUNDLE_PACKAGE_ID"));
  }
}
