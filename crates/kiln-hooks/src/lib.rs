//! Pipeline stages and the hook registry for kiln plugins.
//!
//! The build pipeline exposes named extension points. A plugin registers a
//! callback for a [`PipelineStage`] through the [`HookRegistry`], declaring
//! its name and the hook API version it targets; the pipeline later fires
//! the stage with a [`SrpmContext`] describing the build. Hooks run in
//! registration order and the first failure aborts the stage, which the
//! pipeline treats as a fatal build-step failure.

mod context;
mod error;
mod registry;
mod stage;

pub use context::SrpmContext;
pub use error::HookError;
pub use registry::{API_VERSION, Hook, HookRegistry, PluginDescriptor};
pub use stage::PipelineStage;
