//! Domain errors raised by build-root operations.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while mapping paths into, or running work inside, a build
/// root.
#[derive(Debug, Clone, Error)]
pub enum BuildRootError {
    /// A host path was expected to live inside the build root but does not.
    #[error("path {path} is not inside the build root {root}")]
    PathOutsideRoot {
        /// Host-visible path that failed to re-root.
        path: PathBuf,
        /// Host-visible build-root directory.
        root: PathBuf,
    },

    /// A privilege switch was rejected by the build root's privilege model.
    #[error("privilege switch ({op}) failed: {message}")]
    Privilege {
        /// The operation that failed, `elevate` or `restore`.
        op: &'static str,
        /// Description of the underlying failure.
        message: String,
    },

    /// Package installation into the build root failed.
    #[error("failed to install {packages:?} into the build root: {message}")]
    Install {
        /// Packages that were requested.
        packages: Vec<String>,
        /// Description of the underlying failure.
        message: String,
    },

    /// The command could not be started inside the build root.
    #[error("failed to spawn '{program}' inside the build root: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The command started but exited with a non-zero status.
    #[error("'{program}' exited with status {status}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Process exit status, or -1 when terminated by a signal.
        status: i32,
    },
}
