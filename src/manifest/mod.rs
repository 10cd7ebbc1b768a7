//! Target manifest generation broken into focused submodules.
//!
//! Every target shares the same substitution contract ([`template`]); the
//! per-target modules encode each shell's packaging descriptor and fixed
//! supporting files.

pub mod desktop;
pub mod mobile;
pub mod shell;
pub mod social;
pub mod template;

use std::path::Path;

use crate::errors::ExportError;
use crate::external::BundleFileSystem;

/// Copy the flat set of supporting files from a target's support directory
/// into the output root. A missing support directory is fine; targets
/// without extra files simply don't ship one.
pub(crate) fn copy_support_files(
  fs: &dyn BundleFileSystem,
  support_dir: &Path,
  output_root: &Path,
) -> Result<usize, ExportError> {
  if !fs.exists(support_dir) {
    return Ok(0);
  }

  let mut copied = 0;
  for entry in fs.list_directory(support_dir)? {
    let Some(file_name) = entry.file_name() else {
      continue;
    };
    fs.copy(&entry, &output_root.join(file_name))?;
    copied += 1;
  }
  Ok(copied)
}
