//! Domain errors raised by the autorelease plugin.
//!
//! Benign conditions (an unmet gate precondition) are not errors; they are
//! [`SkipReason`](crate::gate::SkipReason) values. Everything here is fatal
//! to the preprocessing step and propagates out of the hook callback, where
//! the pipeline turns it into a build failure. I/O errors are wrapped in
//! `Arc` so the enum stays cheap to move.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use kiln_buildroot::BuildRootError;
use kiln_hooks::HookError;

/// Errors arising from autorelease preprocessing.
#[derive(Debug, Error)]
pub enum AutoreleaseError {
    /// A plugin option is present but malformed.
    #[error("the '{key}' option must be a non-empty list of non-empty strings")]
    InvalidOptions {
        /// The offending options key.
        key: &'static str,
    },

    /// The hook registry rejected the plugin.
    #[error("failed to register the autorelease plugin: {source}")]
    Registration {
        /// Underlying registry error.
        #[source]
        source: HookError,
    },

    /// A spec file could not be read for the byte comparison.
    #[error("failed to read spec file {path}: {source}")]
    SpecRead {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The content inspector could not read a file earlier checks proved
    /// present; the environment changed mid-flight.
    #[error("failed to inspect spec file {path}: {source}")]
    Inspect {
        /// File that could not be inspected.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Installing the generator tool into the build root failed.
    #[error("failed to install generator packages {packages:?}: {source}")]
    Install {
        /// Packages that were requested.
        packages: Vec<String>,
        /// Underlying build-root error.
        #[source]
        source: BuildRootError,
    },

    /// The rewrite command could not be started or exited non-zero.
    #[error("spec rewrite command failed: {source}")]
    Execution {
        /// Underlying build-root error.
        #[source]
        source: BuildRootError,
    },

    /// A build-root operation outside install/execute failed, such as path
    /// re-rooting.
    #[error(transparent)]
    BuildRoot(#[from] BuildRootError),
}
