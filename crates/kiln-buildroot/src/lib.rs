//! Build-root abstractions for the kiln packaging pipeline.
//!
//! The `kiln-buildroot` crate defines the seam between the packaging
//! pipeline and the isolated filesystem root (the chroot) that builds run
//! inside. The build root itself is owned by the surrounding build system;
//! plugins and pipeline stages only call into it through the [`BuildRoot`]
//! trait, which keeps them testable against scripted doubles.
//!
//! The crate is intentionally restrictive:
//! - Commands are described by an [`ExecSpec`] whose arguments are passed to
//!   the process launcher verbatim, never through a shell.
//! - Networking is disabled for executed commands unless explicitly enabled.
//! - Privilege elevation is only available through a scoped guard that
//!   restores the previous identity on every exit path, including failures
//!   raised inside the scope.
//!
//! Host-visible paths are translated into chroot-visible paths with
//! [`chroot_path`], which refuses paths outside the build root instead of
//! silently producing a wrong mapping.

mod buildroot;
mod error;
mod exec;
mod identity;
mod paths;

pub use buildroot::BuildRoot;
pub use error::BuildRootError;
pub use exec::{ExecSpec, NetworkPolicy};
#[cfg(unix)]
pub use identity::HostPrivilegeBroker;
pub use identity::{ElevatedGuard, Identity, PrivilegeBroker, with_elevated};
pub use paths::chroot_path;

#[cfg(test)]
mod tests;
