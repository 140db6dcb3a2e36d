//! Per-build context handed to pipeline hooks.

use std::path::{Path, PathBuf};

/// Paths supplied to hooks that run before SRPM construction.
///
/// Both paths are host-visible and transient; nothing in the context
/// persists across builds. The sources directory is absent for builds that
/// were started from a lone spec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrpmContext {
    spec: PathBuf,
    sources: Option<PathBuf>,
}

impl SrpmContext {
    /// Creates a context from the packaging spec path and the optional
    /// sources directory.
    #[must_use]
    pub fn new(spec: impl Into<PathBuf>, sources: Option<PathBuf>) -> Self {
        Self {
            spec: spec.into(),
            sources,
        }
    }

    /// Host-visible path of the spec file used for packaging.
    #[must_use]
    pub fn spec(&self) -> &Path {
        self.spec.as_path()
    }

    /// Host-visible path of the sources directory, when one was supplied.
    #[must_use]
    pub fn sources(&self) -> Option<&Path> {
        self.sources.as_deref()
    }
}
