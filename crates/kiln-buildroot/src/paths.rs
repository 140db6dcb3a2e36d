//! Translation of host-visible paths into chroot-visible paths.

use std::path::{Path, PathBuf};

use crate::error::BuildRootError;

/// Re-roots a host-visible path at the build root, yielding the path the
/// same file has inside the chroot.
///
/// The prefix match is component-wise: a sibling of the root that merely
/// shares a string prefix (`/var/lib/kiln/root-fc41` next to
/// `/var/lib/kiln/root`) does not alias into the root. The root itself maps
/// to `/`.
///
/// # Errors
///
/// Returns [`BuildRootError::PathOutsideRoot`] when `host_path` is not
/// located under `root`. Callers treat this as a programming or environment
/// error; it is never silently truncated into a wrong chroot path.
pub fn chroot_path(root: &Path, host_path: &Path) -> Result<PathBuf, BuildRootError> {
    let relative = host_path
        .strip_prefix(root)
        .map_err(|_| BuildRootError::PathOutsideRoot {
            path: host_path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    Ok(Path::new("/").join(relative))
}
