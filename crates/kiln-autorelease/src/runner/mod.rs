//! Construction and execution of the rewrite command inside the build root.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kiln_buildroot::{BuildRoot, ExecSpec, NetworkPolicy, chroot_path, with_elevated};

use crate::error::AutoreleaseError;
use crate::options::AutoreleaseOpts;

/// Tracing target for runner operations.
const RUNNER_TARGET: &str = "kiln_autorelease::runner";

/// Host-side build configuration the runner consumes.
///
/// These knobs belong to the build, not to the plugin: whether the RPM
/// build stage gets network access, which extra isolation arguments the
/// sandbox launcher receives, and whether command output is streamed into
/// the build log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    rpmbuild_networking: bool,
    #[serde(default)]
    isolation_args: Vec<String>,
    #[serde(default = "default_stream_output")]
    stream_output: bool,
}

const fn default_stream_output() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            rpmbuild_networking: false,
            isolation_args: Vec::new(),
            stream_output: true,
        }
    }
}

impl BuildConfig {
    /// Enables or disables network access for build commands.
    #[must_use]
    pub const fn with_networking(mut self, enabled: bool) -> Self {
        self.rpmbuild_networking = enabled;
        self
    }

    /// Sets the extra isolation arguments handed to the sandbox launcher.
    #[must_use]
    pub fn with_isolation_args(mut self, args: Vec<String>) -> Self {
        self.isolation_args = args;
        self
    }

    /// Controls whether command output is streamed into the build log.
    #[must_use]
    pub const fn with_streamed_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }

    /// True when build commands may reach the network.
    #[must_use]
    pub const fn rpmbuild_networking(&self) -> bool {
        self.rpmbuild_networking
    }

    /// Extra isolation arguments passed through unchanged.
    #[must_use]
    pub fn isolation_args(&self) -> &[String] {
        self.isolation_args.as_slice()
    }

    /// True when command output is streamed into the build log.
    #[must_use]
    pub const fn streams_output(&self) -> bool {
        self.stream_output
    }
}

/// Runs the external rewrite command inside a build root.
pub struct RewriteRunner<'a> {
    buildroot: &'a dyn BuildRoot,
    config: &'a BuildConfig,
}

impl<'a> RewriteRunner<'a> {
    /// Creates a runner over the given build root and host configuration.
    #[must_use]
    pub const fn new(buildroot: &'a dyn BuildRoot, config: &'a BuildConfig) -> Self {
        Self { buildroot, config }
    }

    /// Installs the generator tool if configured, then rewrites the
    /// packaging spec file in place.
    ///
    /// The command is the configured prefix followed by the chroot-visible
    /// input path (the sources copy, the unrewritten original) and the
    /// chroot-visible output path (the packaging spec, overwritten by the
    /// tool). It runs in the sources directory as the unprivileged build
    /// identity, with networking denied unless the host configuration
    /// enables it.
    ///
    /// # Errors
    ///
    /// Returns [`AutoreleaseError::Install`] when the generator cannot be
    /// installed, [`AutoreleaseError::Execution`] when the command fails,
    /// and [`kiln_buildroot::BuildRootError::PathOutsideRoot`] (wrapped
    /// transparently) when a supplied path does not live inside the build
    /// root.
    pub fn process_distgit(
        &self,
        opts: &AutoreleaseOpts,
        spec: &Path,
        sources: &Path,
        sources_spec: &Path,
    ) -> Result<(), AutoreleaseError> {
        let Some(cmd_base) = opts.cmd_base() else {
            debug!(
                target: RUNNER_TARGET,
                "no rewrite command configured, skipping autorelease preprocessing"
            );
            return Ok(());
        };
        let Some((program, base_args)) = cmd_base.split_first() else {
            return Err(AutoreleaseError::InvalidOptions { key: "cmd_base" });
        };

        let root = self.buildroot.root_dir();
        let chroot_spec = chroot_path(root, spec)?;
        let chroot_sources = chroot_path(root, sources)?;
        let chroot_sources_spec = chroot_path(root, sources_spec)?;

        if let Some(requires) = opts.requires().filter(|packages| !packages.is_empty()) {
            self.install_generator(requires)?;
        }

        let network = if self.config.rpmbuild_networking() {
            NetworkPolicy::Allow
        } else {
            NetworkPolicy::Deny
        };
        let command = ExecSpec::new(program)
            .args(base_args.iter().cloned())
            .arg(chroot_sources_spec.to_string_lossy().into_owned())
            .arg(chroot_spec.to_string_lossy().into_owned())
            .cwd(chroot_sources)
            .run_as(self.buildroot.build_identity().clone())
            .network(network)
            .isolation_args(self.config.isolation_args().iter().cloned())
            .stream_output(self.config.streams_output());

        debug!(
            target: RUNNER_TARGET,
            program = %program,
            "rewriting spec file inside the build root"
        );
        self.buildroot
            .execute(&command)
            .map_err(|source| AutoreleaseError::Execution { source })
    }

    /// Installs the generator packages under the elevated scope.
    fn install_generator(&self, requires: &[String]) -> Result<(), AutoreleaseError> {
        with_elevated(self.buildroot.privileges(), || {
            self.buildroot.install_packages(requires)
        })
        .map_err(|source| AutoreleaseError::Install {
            packages: requires.to_vec(),
            source,
        })
    }
}
