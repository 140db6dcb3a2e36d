//! Named extension points of the build pipeline.

use serde::{Deserialize, Serialize};

/// A pipeline stage plugins can hook into.
///
/// Stage names cross the host configuration boundary, so the serde form is
/// the snake_case stage name used in config files.
///
/// # Example
///
/// ```
/// use kiln_hooks::PipelineStage;
///
/// assert_eq!(PipelineStage::PreSrpmBuild.as_str(), "pre_srpm_build");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Before the build root is populated for a build.
    PreBuild,
    /// After the binary build stage has finished.
    PostBuild,
    /// Immediately before SRPM construction.
    PreSrpmBuild,
    /// After SRPM construction has finished.
    PostSrpmBuild,
}

impl PipelineStage {
    /// Returns the canonical stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreBuild => "pre_build",
            Self::PostBuild => "post_build",
            Self::PreSrpmBuild => "pre_srpm_build",
            Self::PostSrpmBuild => "post_srpm_build",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
