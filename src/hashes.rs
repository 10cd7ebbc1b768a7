//! Incremental fingerprint tracking for hot previews.
//!
//! The tracker has no store of its own: the caller supplies the prior map
//! recorded by the last export and persists the fresh map returned in the
//! export report. An absent entry means "treat as changed".

use crate::options::ModuleFingerprints;

/// Compares prior fingerprints against fresh ones to decide whether a
/// generated module must be regenerated.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintTracker<'a> {
  prior: &'a ModuleFingerprints,
  full_rebuild: bool,
}

impl<'a> FingerprintTracker<'a> {
  /// Tracker over the caller's prior map. With `full_rebuild` set, every
  /// module regenerates regardless of fingerprints.
  pub fn new(prior: &'a ModuleFingerprints, full_rebuild: bool) -> Self {
    Self {
      prior,
      full_rebuild,
    }
  }

  /// Returns `false` only when a prior fingerprint exists for `module` and
  /// equals `fresh`; any other case regenerates.
  pub fn should_regenerate(&self, module: &str, fresh: u64) -> bool {
    if self.full_rebuild {
      return true;
    }
    self.prior.get(module) != Some(&fresh)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matching_fingerprint_skips_regeneration() {
    let mut prior = ModuleFingerprints::new();
    prior.insert("code0.js".into(), 42);

    let tracker = FingerprintTracker::new(&prior, false);
    assert!(!tracker.should_regenerate("code0.js", 42));
  }

  #[test]
  fn missing_entry_regenerates() {
    let prior = ModuleFingerprints::new();
    let tracker = FingerprintTracker::new(&prior, false);
    assert!(tracker.should_regenerate("code0.js", 42));
  }

  #[test]
  fn differing_fingerprint_regenerates() {
    let mut prior = ModuleFingerprints::new();
    prior.insert("code0.js".into(), 41);

    let tracker = FingerprintTracker::new(&prior, false);
    assert!(tracker.should_regenerate("code0.js", 42));
  }

  #[test]
  fn full_rebuild_overrides_matching_fingerprints() {
    let mut prior = ModuleFingerprints::new();
    prior.insert("code0.js".into(), 42);

    let tracker = FingerprintTracker::new(&prior, true);
    assert!(tracker.should_regenerate("code0.js", 42));
  }
}
