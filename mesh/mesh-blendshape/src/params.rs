//! Conversion parameters.
//!
//! This module provides the [`ConvertParams`] struct describing where input
//! shapes are read from and where generated shapes are written.

use std::path::{Path, PathBuf};

/// Parameters for a conversion run.
///
/// The input directory may be accompanied by fallback locations. The first
/// one that exists is used.
///
/// # Examples
///
/// ```
/// use mesh_blendshape::ConvertParams;
///
/// let params = ConvertParams::new("faceshapes/raw", "targets/arkit")
///     .with_fallback_input_dir("/opt/makehuman/faceshapes/raw");
///
/// assert_eq!(params.fallback_input_dirs.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertParams {
    /// Preferred directory of input `.target` files.
    pub input_dir: PathBuf,
    /// Alternate input directories, tried in order.
    pub fallback_input_dirs: Vec<PathBuf>,
    /// Directory receiving generated `.target` files.
    pub output_dir: PathBuf,
}

impl ConvertParams {
    /// Creates parameters with no fallback input directories.
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            fallback_input_dirs: Vec::new(),
            output_dir: output_dir.into(),
        }
    }

    /// Adds a fallback input directory.
    #[must_use]
    pub fn with_fallback_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_input_dirs.push(dir.into());
        self
    }

    /// Replaces the fallback input directories.
    #[must_use]
    pub fn with_fallback_input_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.fallback_input_dirs = dirs;
        self
    }

    /// Input directories in the order they are tried.
    pub fn input_candidates(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.input_dir.as_path())
            .chain(self.fallback_input_dirs.iter().map(PathBuf::as_path))
    }

    /// The first candidate input directory that exists.
    ///
    /// Falls back to the primary directory when none exist, in which case
    /// loading yields no shapes.
    #[must_use]
    pub fn resolve_input_dir(&self) -> &Path {
        self.input_candidates()
            .find(|dir| dir.is_dir())
            .unwrap_or(self.input_dir.as_path())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_primary_wins_when_present() {
        let primary = tempdir().unwrap();
        let fallback = tempdir().unwrap();
        let params =
            ConvertParams::new(primary.path(), "out").with_fallback_input_dir(fallback.path());

        assert_eq!(params.resolve_input_dir(), primary.path());
    }

    #[test]
    fn test_first_existing_fallback_is_used() {
        let root = tempdir().unwrap();
        let fallback = tempdir().unwrap();
        let params = ConvertParams::new(root.path().join("missing"), "out")
            .with_fallback_input_dir(root.path().join("also-missing"))
            .with_fallback_input_dir(fallback.path());

        assert_eq!(params.resolve_input_dir(), fallback.path());
    }

    #[test]
    fn test_primary_returned_when_nothing_exists() {
        let root = tempdir().unwrap();
        let primary = root.path().join("missing");
        let params = ConvertParams::new(&primary, "out")
            .with_fallback_input_dirs(vec![root.path().join("gone")]);

        assert_eq!(params.resolve_input_dir(), primary.as_path());
        assert_eq!(params.input_candidates().count(), 2);
    }
}
