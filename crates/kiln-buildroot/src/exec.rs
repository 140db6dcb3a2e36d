//! Command descriptions executed inside a build root.

use std::path::PathBuf;

use crate::identity::Identity;

/// Network access policy applied to commands run inside the build root.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum NetworkPolicy {
    /// Run the command in a separate network namespace with no access.
    #[default]
    Deny,
    /// Permit network access for the command.
    Allow,
}

impl NetworkPolicy {
    /// Returns true when networking is blocked.
    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Deny)
    }
}

/// Declarative description of one command run inside the build root.
///
/// Arguments are handed to the process launcher verbatim; nothing is ever
/// interpreted by a shell. Paths in the description are chroot-visible, not
/// host-visible: callers translate with
/// [`chroot_path`](crate::chroot_path) first.
///
/// The defaults are restrictive where it matters: networking is denied
/// unless [`allow_networking`](Self::allow_networking) is called. Output is
/// streamed to the build log by default, matching what interactive builds
/// expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    identity: Option<Identity>,
    network: NetworkPolicy,
    isolation_args: Vec<String>,
    stream_output: bool,
}

impl ExecSpec {
    /// Creates a description for the given program with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            identity: None,
            network: NetworkPolicy::default(),
            isolation_args: Vec::new(),
            stream_output: true,
        }
    }

    /// Appends a single literal argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several literal arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the chroot-visible working directory.
    #[must_use]
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets the identity the command runs as.
    ///
    /// Without an identity the build root runs the command as whatever its
    /// default is; pipeline stages are expected to be explicit.
    #[must_use]
    pub fn run_as(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Permits network access for this command.
    #[must_use]
    pub const fn allow_networking(mut self) -> Self {
        self.network = NetworkPolicy::Allow;
        self
    }

    /// Sets the network policy directly.
    #[must_use]
    pub const fn network(mut self, policy: NetworkPolicy) -> Self {
        self.network = policy;
        self
    }

    /// Passes additional isolation arguments through to the sandbox
    /// launcher unchanged.
    #[must_use]
    pub fn isolation_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.isolation_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Controls whether command output is streamed to the build log.
    #[must_use]
    pub const fn stream_output(mut self, stream: bool) -> Self {
        self.stream_output = stream;
        self
    }

    /// Returns the program to execute.
    #[must_use]
    pub const fn program(&self) -> &str {
        self.program.as_str()
    }

    /// Returns the literal arguments following the program.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        self.args.as_slice()
    }

    /// Returns the chroot-visible working directory, if one was set.
    #[must_use]
    pub const fn working_dir(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    /// Returns the identity the command runs as, if one was set.
    #[must_use]
    pub const fn run_as_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Returns the network policy for the command.
    #[must_use]
    pub const fn network_policy(&self) -> NetworkPolicy {
        self.network
    }

    /// Returns the passthrough isolation arguments.
    #[must_use]
    pub fn extra_isolation_args(&self) -> &[String] {
        self.isolation_args.as_slice()
    }

    /// Returns true when output is streamed to the build log.
    #[must_use]
    pub const fn streams_output(&self) -> bool {
        self.stream_output
    }
}
