//! The precondition gate deciding whether preprocessing runs at all.
//!
//! Six ordered checks, each a guard clause producing a benign
//! [`SkipReason`] when it fails. None of them fails the build; they only
//! decide that this build is not one the rewriter should touch. The
//! byte-identity check is the trust boundary: packaging must never proceed
//! from a spec file that silently differs from the one in the sources
//! checkout.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AutoreleaseError;
use crate::inspect::SpecInspector;

/// Why preprocessing was skipped for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No sources directory was supplied.
    SourcesUnset,
    /// The supplied sources path is not an existing directory.
    SourcesNotADirectory,
    /// The sources directory has no `.git` metadata directory.
    NotAGitCheckout,
    /// The sources directory has no file matching the spec file's name.
    SpecMissingFromSources,
    /// The packaging spec and the sources copy differ byte-for-byte.
    SpecMismatch,
    /// The spec file does not request automatic generation.
    AutoreleaseNotRequested,
}

impl SkipReason {
    /// The log line describing this skip.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SourcesUnset => "sources not specified, skipping autorelease preprocessing",
            Self::SourcesNotADirectory => {
                "sources is not a directory, skipping autorelease preprocessing"
            }
            Self::NotAGitCheckout => {
                "sources is not a git checkout, skipping autorelease preprocessing"
            }
            Self::SpecMissingFromSources => {
                "sources does not contain the spec file, skipping autorelease preprocessing"
            }
            Self::SpecMismatch => {
                "spec files inside and outside sources differ, skipping autorelease preprocessing"
            }
            Self::AutoreleaseNotRequested => {
                "spec file does not use autorelease, skipping autorelease preprocessing"
            }
        }
    }

    /// True for the one skip worth flagging: the two spec copies differ,
    /// which may indicate a packaging inconsistency rather than an
    /// expected opt-out.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::SpecMismatch)
    }
}

/// Outcome of evaluating the gate for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// All preconditions hold; carries the paths the runner needs.
    Proceed {
        /// Host-visible sources directory.
        sources: PathBuf,
        /// Host-visible path of the spec file inside the sources
        /// directory, the unrewritten input.
        sources_spec: PathBuf,
    },
    /// A precondition failed; preprocessing is skipped for this build.
    Skip(SkipReason),
}

/// Evaluates the precondition chain for one build.
///
/// Checks run in order and stop at the first failure. The comparison reads
/// both files whole; handles are closed on every path before returning.
///
/// # Errors
///
/// Returns [`AutoreleaseError::SpecRead`] when either spec copy cannot be
/// read for the byte comparison, and propagates inspector failures. Both
/// mean the environment changed after the existence checks passed.
pub fn evaluate(
    spec: &Path,
    sources: Option<&Path>,
    inspector: &dyn SpecInspector,
) -> Result<GateOutcome, AutoreleaseError> {
    let Some(sources_dir) = sources.filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(GateOutcome::Skip(SkipReason::SourcesUnset));
    };
    if !sources_dir.is_dir() {
        return Ok(GateOutcome::Skip(SkipReason::SourcesNotADirectory));
    }
    if !sources_dir.join(".git").is_dir() {
        return Ok(GateOutcome::Skip(SkipReason::NotAGitCheckout));
    }
    let Some(spec_name) = spec.file_name() else {
        return Ok(GateOutcome::Skip(SkipReason::SpecMissingFromSources));
    };
    let sources_spec = sources_dir.join(spec_name);
    if !sources_spec.is_file() {
        return Ok(GateOutcome::Skip(SkipReason::SpecMissingFromSources));
    }
    if read_spec(spec)? != read_spec(&sources_spec)? {
        return Ok(GateOutcome::Skip(SkipReason::SpecMismatch));
    }
    if !inspector.uses_autorelease(&sources_spec)? {
        return Ok(GateOutcome::Skip(SkipReason::AutoreleaseNotRequested));
    }
    Ok(GateOutcome::Proceed {
        sources: sources_dir.to_path_buf(),
        sources_spec,
    })
}

fn read_spec(path: &Path) -> Result<Vec<u8>, AutoreleaseError> {
    fs::read(path).map_err(|source| AutoreleaseError::SpecRead {
        path: path.to_path_buf(),
        source: Arc::new(source),
    })
}
