//! The seam between pipeline code and the isolated build root.

use std::path::Path;

use crate::error::BuildRootError;
use crate::exec::ExecSpec;
use crate::identity::{Identity, PrivilegeBroker};

/// Handle to an isolated build root owned by the surrounding build system.
///
/// Pipeline stages and plugins never create or tear down the build root;
/// they receive a handle and call through it. The trait is object safe so
/// tests can substitute scripted doubles that record the calls they see.
pub trait BuildRoot {
    /// Host-visible path of the build root's filesystem root.
    fn root_dir(&self) -> &Path;

    /// The unprivileged identity build commands run as.
    fn build_identity(&self) -> &Identity;

    /// Broker for scoped elevation in this build root's privilege model.
    fn privileges(&self) -> &dyn PrivilegeBroker;

    /// Executes a command inside the build root as described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRootError::Spawn`] when the command cannot be started
    /// and [`BuildRootError::CommandFailed`] when it exits non-zero.
    fn execute(&self, spec: &ExecSpec) -> Result<(), BuildRootError>;

    /// Installs packages into the build root with its package manager.
    ///
    /// Callers must hold the elevated scope; installation is rejected by
    /// the underlying package manager otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRootError::Install`] when any package cannot be
    /// installed.
    fn install_packages(&self, packages: &[String]) -> Result<(), BuildRootError>;
}
