//! Detection of the automatic-generation request inside a spec file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::AutoreleaseError;

/// Macros whose invocation opts a spec file into automatic generation.
const MAGIC_MACROS: [&str; 2] = ["autorelease", "autochangelog"];

/// Answers whether a spec file requests automatic release/changelog
/// generation.
///
/// The gate consumes this as its final check; everything before it has
/// already established that the file exists and matches the packaging
/// copy.
#[cfg_attr(test, mockall::automock)]
pub trait SpecInspector {
    /// Reports whether the spec file at `spec` requests automatic
    /// generation.
    ///
    /// # Errors
    ///
    /// Returns [`AutoreleaseError::Inspect`] when the file cannot be read.
    /// That is fatal rather than a skip: earlier checks proved the file
    /// present, so an unreadable file means the environment changed under
    /// the build.
    fn uses_autorelease(&self, spec: &Path) -> Result<bool, AutoreleaseError>;
}

/// Inspector that scans for the generator's magic macros.
///
/// This mirrors the detection the generator tool itself performs: a line
/// mentioning `%autorelease` (in the Release tag) or `%autochangelog` (in
/// the changelog section) opts the package in. Comment lines are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacroInspector;

impl SpecInspector for MacroInspector {
    fn uses_autorelease(&self, spec: &Path) -> Result<bool, AutoreleaseError> {
        let bytes = fs::read(spec).map_err(|source| AutoreleaseError::Inspect {
            path: spec.to_path_buf(),
            source: Arc::new(source),
        })?;
        // Spec files are near-universally UTF-8; lossy decoding keeps the
        // scan working on the rare legacy encoding.
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.lines().any(line_requests_autorelease))
    }
}

fn line_requests_autorelease(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return false;
    }
    MAGIC_MACROS.iter().any(|name| invokes_macro(trimmed, name))
}

/// True when `line` invokes `name` as `%name`, `%{name}` or `%{?name}`.
fn invokes_macro(line: &str, name: &str) -> bool {
    line.match_indices(name).any(|(idx, _)| {
        let prefix = line.get(..idx).unwrap_or_default();
        prefix.ends_with('%') || prefix.ends_with("%{") || prefix.ends_with("%{?")
    })
}
