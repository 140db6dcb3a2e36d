//! Domain errors raised by hook registration and dispatch.

use thiserror::Error;

use crate::stage::PipelineStage;

/// Errors arising from the hook registry.
#[derive(Debug, Error)]
pub enum HookError {
    /// The plugin descriptor failed validation.
    #[error("invalid plugin descriptor: {message}")]
    InvalidDescriptor {
        /// Description of the validation failure.
        message: String,
    },

    /// The plugin targets a hook API version this pipeline does not speak.
    #[error(
        "plugin '{plugin}' targets hook API version {declared}, \
         this pipeline supports version {supported}"
    )]
    IncompatibleApiVersion {
        /// Plugin that attempted to register.
        plugin: String,
        /// API version the plugin declared.
        declared: u32,
        /// API version the registry supports.
        supported: u32,
    },

    /// A hook callback signalled failure; the stage is aborted.
    #[error("plugin '{plugin}' failed during {stage}: {source}")]
    HookFailed {
        /// Plugin whose callback failed.
        plugin: String,
        /// Stage that was being fired.
        stage: PipelineStage,
        /// Error the callback returned.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
