//! Registration and dispatch of pipeline hooks.

use std::collections::HashMap;

use tracing::debug;

use crate::context::SrpmContext;
use crate::error::HookError;
use crate::stage::PipelineStage;

/// Tracing target for hook dispatch.
const HOOKS_TARGET: &str = "kiln_hooks::registry";

/// Hook API version this pipeline speaks.
///
/// Plugins declare the version they target in their [`PluginDescriptor`];
/// registration rejects anything else rather than letting a stale plugin
/// run against changed stage semantics.
pub const API_VERSION: u32 = 1;

/// Callback fired when a stage runs.
///
/// The boxed error is treated by the pipeline as a fatal build-step
/// failure; benign conditions must be handled inside the hook.
pub type Hook = Box<dyn Fn(&SrpmContext) -> Result<(), Box<dyn std::error::Error + Send + Sync>>>;

/// Identity a plugin presents when registering hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    name: String,
    api_version: u32,
}

impl PluginDescriptor {
    /// Creates a descriptor for a plugin targeting the given API version.
    #[must_use]
    pub fn new(name: impl Into<String>, api_version: u32) -> Self {
        Self {
            name: name.into(),
            api_version,
        }
    }

    /// Returns the plugin name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the hook API version the plugin targets.
    #[must_use]
    pub const fn api_version(&self) -> u32 {
        self.api_version
    }
}

struct RegisteredHook {
    plugin: String,
    callback: Hook,
}

/// Registry of callbacks keyed by pipeline stage.
///
/// Hooks fire in registration order. The registry owns the callbacks; the
/// build system owns the registry and fires stages as the pipeline
/// advances.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<PipelineStage, Vec<RegisteredHook>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for a stage on behalf of a plugin.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidDescriptor`] when the plugin name is
    /// blank and [`HookError::IncompatibleApiVersion`] when the plugin
    /// targets a different hook API version.
    pub fn add_hook(
        &mut self,
        descriptor: &PluginDescriptor,
        stage: PipelineStage,
        callback: Hook,
    ) -> Result<(), HookError> {
        if descriptor.name().trim().is_empty() {
            return Err(HookError::InvalidDescriptor {
                message: String::from("plugin name must not be empty"),
            });
        }
        if descriptor.api_version() != API_VERSION {
            return Err(HookError::IncompatibleApiVersion {
                plugin: descriptor.name().to_owned(),
                declared: descriptor.api_version(),
                supported: API_VERSION,
            });
        }
        self.hooks.entry(stage).or_default().push(RegisteredHook {
            plugin: descriptor.name().to_owned(),
            callback,
        });
        Ok(())
    }

    /// Fires every hook registered for `stage`, in registration order.
    ///
    /// Dispatch stops at the first failing hook.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::HookFailed`] wrapping the first callback
    /// failure.
    pub fn fire(&self, stage: PipelineStage, context: &SrpmContext) -> Result<(), HookError> {
        let registered = self.hooks.get(&stage).map_or(&[][..], Vec::as_slice);
        debug!(
            target: HOOKS_TARGET,
            %stage,
            hooks = registered.len(),
            "firing pipeline stage"
        );
        for hook in registered {
            (hook.callback)(context).map_err(|source| HookError::HookFailed {
                plugin: hook.plugin.clone(),
                stage,
                source,
            })?;
        }
        Ok(())
    }

    /// Number of hooks registered for a stage.
    #[must_use]
    pub fn hook_count(&self, stage: PipelineStage) -> usize {
        self.hooks.get(&stage).map_or(0, Vec::len)
    }
}
