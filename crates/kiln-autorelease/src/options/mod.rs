//! The plugin options block and its validation.
//!
//! Options arrive from the host's plugin configuration as a mapping. Only
//! two keys are recognised; the host injects additional bookkeeping keys
//! into every plugin's options block, so unknown keys are tolerated rather
//! than rejected.

use serde::{Deserialize, Serialize};

use crate::error::AutoreleaseError;

/// Options controlling the autorelease plugin.
///
/// Both keys are optional. A key that is present must be a non-empty list
/// of non-empty strings; [`validate`](Self::validate) rejects anything
/// else, naming the offending key. Validation runs once, when the plugin
/// registers, never per build.
///
/// # Example
///
/// ```
/// use kiln_autorelease::AutoreleaseOpts;
///
/// let opts = AutoreleaseOpts::default()
///     .with_requires(vec!["rpmautospec".into()])
///     .with_cmd_base(vec!["rpmautospec".into(), "process-distgit".into()]);
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoreleaseOpts {
    /// Packages installed into the build root before invocation.
    #[serde(default)]
    requires: Option<Vec<String>>,
    /// Leading arguments of the external rewrite command.
    #[serde(default)]
    cmd_base: Option<Vec<String>>,
}

impl AutoreleaseOpts {
    /// Sets the packages to install before invocation.
    #[must_use]
    pub fn with_requires(mut self, requires: Vec<String>) -> Self {
        self.requires = Some(requires);
        self
    }

    /// Sets the leading arguments of the rewrite command.
    #[must_use]
    pub fn with_cmd_base(mut self, cmd_base: Vec<String>) -> Self {
        self.cmd_base = Some(cmd_base);
        self
    }

    /// Checks that every present key is a non-empty list of non-empty
    /// strings.
    ///
    /// # Errors
    ///
    /// Returns [`AutoreleaseError::InvalidOptions`] naming the first
    /// malformed key.
    pub fn validate(&self) -> Result<(), AutoreleaseError> {
        check_list("requires", self.requires.as_deref())?;
        check_list("cmd_base", self.cmd_base.as_deref())?;
        Ok(())
    }

    /// Packages to install before invocation, when configured.
    #[must_use]
    pub fn requires(&self) -> Option<&[String]> {
        self.requires.as_deref()
    }

    /// Leading arguments of the rewrite command, when configured.
    #[must_use]
    pub fn cmd_base(&self) -> Option<&[String]> {
        self.cmd_base.as_deref()
    }
}

fn check_list(key: &'static str, value: Option<&[String]>) -> Result<(), AutoreleaseError> {
    let Some(entries) = value else {
        return Ok(());
    };
    if entries.is_empty() || entries.iter().any(|entry| entry.trim().is_empty()) {
        return Err(AutoreleaseError::InvalidOptions { key });
    }
    Ok(())
}
