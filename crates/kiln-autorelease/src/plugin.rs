//! Plugin wiring: options validation and hook registration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use kiln_buildroot::BuildRoot;
use kiln_hooks::{HookRegistry, PipelineStage, PluginDescriptor, SrpmContext};

use crate::error::AutoreleaseError;
use crate::gate::{self, GateOutcome};
use crate::inspect::SpecInspector;
use crate::options::AutoreleaseOpts;
use crate::runner::{BuildConfig, RewriteRunner};

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "autorelease";

/// Tracing target for plugin lifecycle and gate decisions.
const PLUGIN_TARGET: &str = "kiln_autorelease::plugin";

/// Validates `opts` and registers the pre-SRPM-build callback.
///
/// Validation happens here, once, so a malformed options block fails the
/// pipeline's plugin initialisation rather than surfacing mid-build.
///
/// # Errors
///
/// Returns [`AutoreleaseError::InvalidOptions`] for a malformed options
/// block and [`AutoreleaseError::Registration`] when the hook registry
/// rejects the plugin.
pub fn register(
    registry: &mut HookRegistry,
    opts: AutoreleaseOpts,
    buildroot: Arc<dyn BuildRoot>,
    config: BuildConfig,
    inspector: Arc<dyn SpecInspector>,
) -> Result<(), AutoreleaseError> {
    opts.validate()?;
    let descriptor = PluginDescriptor::new(PLUGIN_NAME, kiln_hooks::API_VERSION);
    registry
        .add_hook(
            &descriptor,
            PipelineStage::PreSrpmBuild,
            Box::new(move |context: &SrpmContext| {
                preprocess(
                    buildroot.as_ref(),
                    &opts,
                    &config,
                    inspector.as_ref(),
                    context,
                )
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
            }),
        )
        .map_err(|source| AutoreleaseError::Registration { source })?;
    info!(target: PLUGIN_TARGET, "autorelease: initialised");
    Ok(())
}

/// One preprocessing pass: gate, then install and invoke when the gate
/// proceeds.
///
/// Every skip is benign and logged (the spec mismatch at warning severity,
/// the rest at debug); the build continues either way.
///
/// # Errors
///
/// Propagates gate read failures and every runner failure; all of them
/// abort the build step.
pub fn preprocess(
    buildroot: &dyn BuildRoot,
    opts: &AutoreleaseOpts,
    config: &BuildConfig,
    inspector: &dyn SpecInspector,
    context: &SrpmContext,
) -> Result<(), AutoreleaseError> {
    match gate::evaluate(context.spec(), context.sources(), inspector)? {
        GateOutcome::Skip(reason) => {
            if reason.is_warning() {
                warn!(target: PLUGIN_TARGET, "{}", reason.message());
            } else {
                debug!(target: PLUGIN_TARGET, "{}", reason.message());
            }
            Ok(())
        }
        GateOutcome::Proceed {
            sources,
            sources_spec,
        } => RewriteRunner::new(buildroot, config).process_distgit(
            opts,
            context.spec(),
            &sources,
            &sources_spec,
        ),
    }
}
