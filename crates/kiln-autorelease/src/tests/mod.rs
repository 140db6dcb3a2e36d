//! Crate-level end-to-end tests and shared doubles.
//!
//! The build root double records every call it sees, so the scenarios can
//! assert on ordering across the privilege scope, installation, and
//! execution.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use tempfile::TempDir;

use kiln_buildroot::{BuildRoot, BuildRootError, ExecSpec, Identity, NetworkPolicy, PrivilegeBroker};
use kiln_hooks::{HookError, HookRegistry, PipelineStage, SrpmContext};

use crate::error::AutoreleaseError;
use crate::inspect::MacroInspector;
use crate::options::AutoreleaseOpts;
use crate::runner::BuildConfig;
use crate::{preprocess, register};

/// One observable call into the build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Elevated,
    Restored,
    Install(Vec<String>),
    Execute(ExecSpec),
}

type EventLog = Rc<RefCell<Vec<Event>>>;

pub(crate) struct RecordingBroker {
    events: EventLog,
}

impl PrivilegeBroker for RecordingBroker {
    fn elevate(&self) -> Result<(), BuildRootError> {
        self.events.borrow_mut().push(Event::Elevated);
        Ok(())
    }

    fn restore(&self) -> Result<(), BuildRootError> {
        self.events.borrow_mut().push(Event::Restored);
        Ok(())
    }
}

/// Build-root double recording calls and failing on demand.
pub(crate) struct RecordingBuildRoot {
    root: PathBuf,
    identity: Identity,
    broker: RecordingBroker,
    events: EventLog,
    install_failure: Option<&'static str>,
    execute_status: Option<i32>,
}

impl RecordingBuildRoot {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        let events = EventLog::default();
        Self {
            root: root.into(),
            identity: Identity::new(1001, 135, "builder"),
            broker: RecordingBroker {
                events: Rc::clone(&events),
            },
            events,
            install_failure: None,
            execute_status: None,
        }
    }

    pub(crate) fn failing_install(mut self, message: &'static str) -> Self {
        self.install_failure = Some(message);
        self
    }

    pub(crate) fn failing_execution(mut self, status: i32) -> Self {
        self.execute_status = Some(status);
        self
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

impl BuildRoot for RecordingBuildRoot {
    fn root_dir(&self) -> &Path {
        self.root.as_path()
    }

    fn build_identity(&self) -> &Identity {
        &self.identity
    }

    fn privileges(&self) -> &dyn PrivilegeBroker {
        &self.broker
    }

    fn execute(&self, spec: &ExecSpec) -> Result<(), BuildRootError> {
        self.events.borrow_mut().push(Event::Execute(spec.clone()));
        self.execute_status.map_or(Ok(()), |status| {
            Err(BuildRootError::CommandFailed {
                program: spec.program().to_owned(),
                status,
            })
        })
    }

    fn install_packages(&self, packages: &[String]) -> Result<(), BuildRootError> {
        self.events
            .borrow_mut()
            .push(Event::Install(packages.to_vec()));
        self.install_failure.map_or(Ok(()), |message| {
            Err(BuildRootError::Install {
                packages: packages.to_vec(),
                message: message.to_owned(),
            })
        })
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

const SPEC_CONTENT: &str = "Name: pkg\nVersion: 1.0\nRelease: %autorelease\n\
                            %changelog\n%autochangelog\n";

/// A build root directory with a packaging spec and a git sources checkout.
struct BuildTree {
    tmp: TempDir,
    spec: PathBuf,
    sources: PathBuf,
}

impl BuildTree {
    fn complete() -> Self {
        let tmp = TempDir::new().expect("temp dir");
        let specs = tmp.path().join("builddir/build/SPECS");
        let sources = tmp.path().join("builddir/build/SOURCES/pkg");
        fs::create_dir_all(&specs).expect("create SPECS");
        fs::create_dir_all(sources.join(".git")).expect("create sources .git");
        let spec = specs.join("pkg.spec");
        fs::write(&spec, SPEC_CONTENT).expect("write packaging spec");
        fs::write(sources.join("pkg.spec"), SPEC_CONTENT).expect("write sources spec");
        Self { tmp, spec, sources }
    }

    fn root(&self) -> &Path {
        self.tmp.path()
    }

    fn context(&self) -> SrpmContext {
        SrpmContext::new(self.spec.clone(), Some(self.sources.clone()))
    }
}

fn generator_opts() -> AutoreleaseOpts {
    AutoreleaseOpts::default()
        .with_requires(vec![String::from("rpmautospec")])
        .with_cmd_base(vec![
            String::from("rpmautospec"),
            String::from("process-distgit"),
        ])
}

#[test]
fn full_scenario_installs_then_rewrites_with_chroot_paths() {
    let tree = BuildTree::complete();
    let buildroot = RecordingBuildRoot::new(tree.root());

    preprocess(
        &buildroot,
        &generator_opts(),
        &BuildConfig::default(),
        &MacroInspector,
        &tree.context(),
    )
    .expect("preprocessing succeeds");

    let events = buildroot.events();
    assert_eq!(events.len(), 4, "events: {events:?}");
    assert_eq!(events.first(), Some(&Event::Elevated));
    assert_eq!(
        events.get(1),
        Some(&Event::Install(vec![String::from("rpmautospec")]))
    );
    assert_eq!(events.get(2), Some(&Event::Restored));
    let Some(Event::Execute(command)) = events.get(3) else {
        panic!("expected an execution, got {events:?}");
    };
    assert_eq!(command.program(), "rpmautospec");
    assert_eq!(
        command.arguments(),
        &[
            "process-distgit",
            "/builddir/build/SOURCES/pkg/pkg.spec",
            "/builddir/build/SPECS/pkg.spec",
        ]
    );
    assert_eq!(
        command.working_dir(),
        Some(&PathBuf::from("/builddir/build/SOURCES/pkg"))
    );
    assert_eq!(
        command.run_as_identity(),
        Some(&Identity::new(1001, 135, "builder"))
    );
    assert_eq!(command.network_policy(), NetworkPolicy::Deny);
    assert!(command.streams_output());
}

#[test]
fn a_one_byte_spec_difference_runs_nothing() {
    let tree = BuildTree::complete();
    let mut tampered = String::from(SPEC_CONTENT);
    tampered.push(' ');
    fs::write(tree.sources.join("pkg.spec"), tampered).expect("tamper sources spec");
    let buildroot = RecordingBuildRoot::new(tree.root());

    preprocess(
        &buildroot,
        &generator_opts(),
        &BuildConfig::default(),
        &MacroInspector,
        &tree.context(),
    )
    .expect("a mismatch is a benign skip");
    assert!(buildroot.events().is_empty(), "no install, no execution");
}

#[test]
fn absent_sources_run_nothing_and_raise_nothing() {
    let tree = BuildTree::complete();
    let buildroot = RecordingBuildRoot::new(tree.root());
    let context = SrpmContext::new(tree.spec.clone(), None);

    preprocess(
        &buildroot,
        &generator_opts(),
        &BuildConfig::default(),
        &MacroInspector,
        &context,
    )
    .expect("absent sources are a benign skip");
    assert!(buildroot.events().is_empty());
}

#[test]
fn install_failure_prevents_the_rewrite_and_restores_identity() {
    let tree = BuildTree::complete();
    let buildroot = RecordingBuildRoot::new(tree.root()).failing_install("mirror unreachable");

    let err = preprocess(
        &buildroot,
        &generator_opts(),
        &BuildConfig::default(),
        &MacroInspector,
        &tree.context(),
    )
    .expect_err("installation failure is fatal");
    assert!(matches!(err, AutoreleaseError::Install { .. }));

    let events = buildroot.events();
    assert_eq!(
        events,
        vec![
            Event::Elevated,
            Event::Install(vec![String::from("rpmautospec")]),
            Event::Restored,
        ],
        "identity must be restored and the rewrite must not run"
    );
}

#[test]
fn a_non_zero_exit_is_fatal() {
    let tree = BuildTree::complete();
    let buildroot = RecordingBuildRoot::new(tree.root()).failing_execution(70);

    let err = preprocess(
        &buildroot,
        &generator_opts(),
        &BuildConfig::default(),
        &MacroInspector,
        &tree.context(),
    )
    .expect_err("a failing rewrite command is fatal");
    match err {
        AutoreleaseError::Execution { source } => {
            assert!(matches!(
                source,
                BuildRootError::CommandFailed { status: 70, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn register_attaches_the_pre_srpm_build_hook() {
    let tree = BuildTree::complete();
    let buildroot = Arc::new(RecordingBuildRoot::new(tree.root()));
    let mut registry = HookRegistry::new();

    register(
        &mut registry,
        generator_opts(),
        Arc::clone(&buildroot) as Arc<dyn BuildRoot>,
        BuildConfig::default(),
        Arc::new(MacroInspector),
    )
    .expect("registration succeeds");
    assert_eq!(registry.hook_count(PipelineStage::PreSrpmBuild), 1);

    registry
        .fire(PipelineStage::PreSrpmBuild, &tree.context())
        .expect("stage fires cleanly");
    assert_eq!(buildroot.events().len(), 4);
}

#[test]
fn register_rejects_malformed_options_before_any_build() {
    let mut registry = HookRegistry::new();
    let tree = BuildTree::complete();
    let err = register(
        &mut registry,
        AutoreleaseOpts::default().with_requires(vec![]),
        Arc::new(RecordingBuildRoot::new(tree.root())) as Arc<dyn BuildRoot>,
        BuildConfig::default(),
        Arc::new(MacroInspector),
    )
    .expect_err("empty requires must fail");
    assert!(matches!(err, AutoreleaseError::InvalidOptions { key: "requires" }));
    assert_eq!(registry.hook_count(PipelineStage::PreSrpmBuild), 0);
}

#[test]
fn hook_failures_reach_the_pipeline_as_fatal_stage_errors() {
    let tree = BuildTree::complete();
    let buildroot = Arc::new(RecordingBuildRoot::new(tree.root()).failing_execution(1));
    let mut registry = HookRegistry::new();

    register(
        &mut registry,
        generator_opts(),
        buildroot as Arc<dyn BuildRoot>,
        BuildConfig::default(),
        Arc::new(MacroInspector),
    )
    .expect("registration succeeds");

    let err = registry
        .fire(PipelineStage::PreSrpmBuild, &tree.context())
        .expect_err("the stage must fail");
    assert!(matches!(err, HookError::HookFailed { .. }));
}
