//! Identities and scoped privilege elevation inside a build root.
//!
//! Package installation needs uid/gid 0 in the build root's privilege
//! model, while build commands must run as the unprivileged build identity.
//! The [`ElevatedGuard`] makes the elevated window explicit: acquisition
//! cannot be skipped and restoration runs on every exit path, including
//! failures raised inside the scope.

use std::fmt;

use tracing::warn;

use crate::error::BuildRootError;

/// Tracing target for privilege transitions.
const IDENTITY_TARGET: &str = "kiln_buildroot::identity";

/// A uid/gid/user triple commands run as inside the build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    uid: u32,
    gid: u32,
    user: String,
}

impl Identity {
    /// Creates an identity from its numeric ids and account name.
    #[must_use]
    pub fn new(uid: u32, gid: u32, user: impl Into<String>) -> Self {
        Self {
            uid,
            gid,
            user: user.into(),
        }
    }

    /// The elevated identity in the build root's privilege model.
    #[must_use]
    pub fn elevated() -> Self {
        Self::new(0, 0, "root")
    }

    /// Returns the numeric user id.
    #[must_use]
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// Returns the numeric group id.
    #[must_use]
    pub const fn gid(&self) -> u32 {
        self.gid
    }

    /// Returns the account name.
    #[must_use]
    pub const fn user(&self) -> &str {
        self.user.as_str()
    }
}

/// Switches the calling process between the build root's unprivileged and
/// elevated identities.
///
/// Implementations must tolerate nested elevation: a second `elevate` while
/// already elevated is balanced by a matching `restore`, and only the
/// outermost `restore` drops the elevated identity.
pub trait PrivilegeBroker {
    /// Assumes the elevated identity (uid/gid 0).
    ///
    /// # Errors
    ///
    /// Returns [`BuildRootError::Privilege`] if the switch is rejected.
    fn elevate(&self) -> Result<(), BuildRootError>;

    /// Restores the identity that was active before the matching
    /// [`elevate`](Self::elevate) call.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRootError::Privilege`] if the switch is rejected or no
    /// elevation is active.
    fn restore(&self) -> Result<(), BuildRootError>;
}

/// Scope during which the calling process holds the elevated identity.
///
/// Dropping the guard restores the previous identity. A restoration failure
/// inside `drop` cannot be propagated, so it is logged instead; callers that
/// need to observe it can call [`PrivilegeBroker::restore`] directly.
#[must_use = "the elevated identity is restored when the guard is dropped"]
pub struct ElevatedGuard<'a> {
    broker: &'a dyn PrivilegeBroker,
}

impl fmt::Debug for ElevatedGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevatedGuard").finish_non_exhaustive()
    }
}

impl<'a> ElevatedGuard<'a> {
    /// Elevates through the broker and returns the guard keeping the scope
    /// open.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRootError::Privilege`] if elevation is rejected; no
    /// guard is created in that case.
    pub fn acquire(broker: &'a dyn PrivilegeBroker) -> Result<Self, BuildRootError> {
        broker.elevate()?;
        Ok(Self { broker })
    }
}

impl Drop for ElevatedGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.broker.restore() {
            warn!(
                target: IDENTITY_TARGET,
                error = %err,
                "failed to restore identity after elevated scope"
            );
        }
    }
}

/// Runs `op` with the elevated identity held for exactly its duration.
///
/// The previous identity is restored whether `op` succeeds or fails.
///
/// # Errors
///
/// Returns the elevation failure converted into `E`, or whatever `op`
/// returns.
pub fn with_elevated<T, E, F>(broker: &dyn PrivilegeBroker, op: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<BuildRootError>,
{
    let guard = ElevatedGuard::acquire(broker).map_err(E::from)?;
    let result = op();
    drop(guard);
    result
}

#[cfg(unix)]
mod host {
    use std::cell::Cell;

    use nix::unistd::{Gid, Uid, setegid, seteuid};

    use crate::error::BuildRootError;

    use super::PrivilegeBroker;

    /// Broker switching the effective credentials of the calling process.
    ///
    /// The process must hold a saved uid of 0 (the pipeline entry point is
    /// installed setuid or started by root and drops to the invoking user).
    /// Elevation is reference counted so nested scopes only switch
    /// credentials at the outermost boundary.
    #[derive(Debug)]
    pub struct HostPrivilegeBroker {
        unprivileged_uid: Uid,
        unprivileged_gid: Gid,
        depth: Cell<usize>,
    }

    impl HostPrivilegeBroker {
        /// Captures the current effective credentials as the identity to
        /// restore to.
        #[must_use]
        pub fn from_current() -> Self {
            Self {
                unprivileged_uid: nix::unistd::geteuid(),
                unprivileged_gid: nix::unistd::getegid(),
                depth: Cell::new(0),
            }
        }
    }

    impl PrivilegeBroker for HostPrivilegeBroker {
        fn elevate(&self) -> Result<(), BuildRootError> {
            if self.depth.get() == 0 {
                // The uid switch must come first: raising the gid requires
                // an effective uid of 0 unless the saved uid grants it.
                seteuid(Uid::from_raw(0)).map_err(|errno| BuildRootError::Privilege {
                    op: "elevate",
                    message: errno.to_string(),
                })?;
                if let Err(errno) = setegid(Gid::from_raw(0)) {
                    // Roll the uid back so a failed elevation leaves the
                    // process where it started.
                    drop(seteuid(self.unprivileged_uid));
                    return Err(BuildRootError::Privilege {
                        op: "elevate",
                        message: errno.to_string(),
                    });
                }
            }
            self.depth.set(self.depth.get() + 1);
            Ok(())
        }

        fn restore(&self) -> Result<(), BuildRootError> {
            let depth = self.depth.get();
            if depth == 0 {
                return Err(BuildRootError::Privilege {
                    op: "restore",
                    message: String::from("restore without a matching elevation"),
                });
            }
            if depth == 1 {
                // Drop the gid while still privileged, then the uid last.
                setegid(self.unprivileged_gid).map_err(|errno| BuildRootError::Privilege {
                    op: "restore",
                    message: errno.to_string(),
                })?;
                seteuid(self.unprivileged_uid).map_err(|errno| BuildRootError::Privilege {
                    op: "restore",
                    message: errno.to_string(),
                })?;
            }
            self.depth.set(depth - 1);
            Ok(())
        }
    }
}

#[cfg(unix)]
pub use host::HostPrivilegeBroker;
