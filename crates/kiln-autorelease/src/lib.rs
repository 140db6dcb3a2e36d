//! Automatic release and changelog preprocessing for the kiln pipeline.
//!
//! The autorelease plugin runs immediately before SRPM construction. When a
//! package opts into automatic release/changelog generation from its git
//! history, the plugin rewrites the packaging spec file in place by running
//! an external generator tool inside the build root, as the unprivileged
//! build identity and with networking disabled.
//!
//! Whether rewriting happens at all is decided by a six-check precondition
//! gate evaluated once per build; every unmet precondition is a benign,
//! logged skip, never a build failure. Once the gate passes, failures are
//! fatal: a generator tool that cannot be installed or exits non-zero
//! aborts the build step.
//!
//! # Wiring
//!
//! The surrounding build system owns the [`kiln_hooks::HookRegistry`] and
//! the build root; [`register`] validates the plugin options and attaches
//! the callback to the pre-SRPM-build stage.
//!
//! ```
//! use std::sync::Arc;
//!
//! use kiln_autorelease::{AutoreleaseOpts, BuildConfig, MacroInspector};
//! use kiln_hooks::HookRegistry;
//!
//! # fn wire(buildroot: Arc<dyn kiln_buildroot::BuildRoot>) {
//! let mut registry = HookRegistry::new();
//! let opts = AutoreleaseOpts::default()
//!     .with_requires(vec!["rpmautospec".into()])
//!     .with_cmd_base(vec!["rpmautospec".into(), "process-distgit".into()]);
//!
//! kiln_autorelease::register(
//!     &mut registry,
//!     opts,
//!     buildroot,
//!     BuildConfig::default(),
//!     Arc::new(MacroInspector),
//! )
//! .expect("valid options");
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod inspect;
pub mod options;
mod plugin;
pub mod runner;

pub use error::AutoreleaseError;
pub use gate::{GateOutcome, SkipReason};
pub use inspect::{MacroInspector, SpecInspector};
pub use options::AutoreleaseOpts;
pub use plugin::{PLUGIN_NAME, preprocess, register};
pub use runner::{BuildConfig, RewriteRunner};

#[cfg(test)]
mod tests;
