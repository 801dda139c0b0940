//! Orchestration of full validation runs.
//!
//! A [`GraphValidationTest`] owns one session: the suite, the environment,
//! the target components, the templates, and the shared seams (registry,
//! transport, compiled model). [`GraphValidationTest::run`] expands the
//! (template, target) matrix into independent runs, executes them with a
//! bounded fan-out, and folds the results into a [`ValidationReport`].
//! Dropping the future returned by `run` aborts in-flight runs; only runs
//! that reached a terminal state appear in a report.

use std::sync::Arc;

use onehop_biolink::BiolinkModel;
use tokio::task::JoinSet;

use crate::asset::{AssetCatalog, AssetError, TestAsset};
use crate::registry::{
    component_infores, ComponentRegistry, ComponentRole, StaticRegistry, TestEnvironment,
    ARS_COMPONENT,
};
use crate::report::{format_results, ReportError, ValidationReport};
use crate::run::{ResolvedTarget, RunSettings, TestCaseRun, TestSuite};
use crate::templates::QueryTemplate;
use crate::transport::Transport;
use crate::trapi::normalize_trapi_version;

/// Fan-out limit applied when none is configured.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Construction-time misuse and collection failures.
///
/// Everything that goes wrong inside a run is recorded as messages on that
/// run; only these conditions surface as hard errors to the caller.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The template set was empty.
    #[error("at least one query template is required")]
    NoTemplates,
    /// The component set was empty.
    #[error("at least one target component is required")]
    NoTargets,
    /// A spawned run could not be joined.
    #[error("failed to join a test case run")]
    Join(#[from] tokio::task::JoinError),
    /// The collected runs could not be folded into a report.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One validation session over a deployed Translator stack.
pub struct GraphValidationTest {
    suite: TestSuite,
    environment: TestEnvironment,
    components: Vec<String>,
    templates: Vec<QueryTemplate>,
    trapi_version: String,
    biolink_version: String,
    runner_settings: Vec<String>,
    concurrency: usize,
    model: &'static BiolinkModel,
    catalog: AssetCatalog,
    registry: Arc<dyn ComponentRegistry>,
    transport: Arc<dyn Transport>,
}

impl GraphValidationTest {
    /// Creates a session with the default matrix: every template against
    /// the ARS, at the compiled model's version and the default TRAPI
    /// version.
    #[must_use]
    pub fn new(
        suite: TestSuite,
        environment: TestEnvironment,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let model = BiolinkModel::compiled();
        Self {
            suite,
            environment,
            components: vec![ARS_COMPONENT.to_string()],
            templates: QueryTemplate::ALL.to_vec(),
            trapi_version: normalize_trapi_version(None),
            biolink_version: model.version.to_string(),
            runner_settings: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            model,
            catalog: AssetCatalog::new(model),
            registry: Arc::new(StaticRegistry),
            transport,
        }
    }

    /// Replaces the target components.
    #[must_use]
    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = components;
        self
    }

    /// Replaces the template set.
    #[must_use]
    pub fn with_templates(mut self, templates: Vec<QueryTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// Overrides the expected TRAPI version; accepts bare or `v`-prefixed
    /// forms.
    #[must_use]
    pub fn with_trapi_version(mut self, version: &str) -> Self {
        self.trapi_version = normalize_trapi_version(Some(version));
        self
    }

    /// Overrides the expected Biolink model version.
    #[must_use]
    pub fn with_biolink_version(mut self, version: impl Into<String>) -> Self {
        self.biolink_version = version.into();
        self
    }

    /// Sets runner directives applied to every generated query.
    #[must_use]
    pub fn with_runner_settings(mut self, settings: Vec<String>) -> Self {
        self.runner_settings = settings;
        self
    }

    /// Sets the fan-out limit; a limit below one is raised to one.
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Substitutes the component registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn ComponentRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Builds a statement through this session's catalog, numbering it
    /// within the session.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] when the predicate or either category does
    /// not resolve in the compiled Biolink slice.
    pub fn build_test_asset(
        &self,
        subject_id: &str,
        subject_category: &str,
        predicate: &str,
        object_id: &str,
        object_category: &str,
    ) -> Result<TestAsset, AssetError> {
        self.catalog.build_asset(
            subject_id,
            subject_category,
            predicate,
            object_id,
            object_category,
        )
    }

    async fn resolve_targets(&self) -> Vec<ResolvedTarget> {
        let mut targets = Vec::with_capacity(self.components.len());
        for name in &self.components {
            let endpoint = if name == ARS_COMPONENT {
                Some(self.environment.ars_endpoint())
            } else {
                let infores = component_infores(name);
                let resolved = match self
                    .registry
                    .resolve(ComponentRole::Ara, &infores, self.environment)
                    .await
                {
                    Some(metadata) => Some(metadata),
                    None => {
                        self.registry
                            .resolve(ComponentRole::Kp, &infores, self.environment)
                            .await
                    }
                };
                if resolved.is_none() {
                    tracing::warn!(
                        component = %name,
                        environment = %self.environment,
                        "component did not resolve to an endpoint"
                    );
                }
                resolved.map(|metadata| metadata.url)
            };
            targets.push(ResolvedTarget {
                name: name.clone(),
                endpoint,
            });
        }
        targets
    }

    /// Runs the full (template, target) matrix for one asset.
    ///
    /// Runs execute independently: a fatal failure inside one never
    /// prevents collection of the others. The report is assembled only
    /// after every run reaches a terminal state, and every requested
    /// target appears in it, resolved or not.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] when the template or component set is
    /// empty, when a spawned run cannot be joined, or when a collected
    /// message carries an unknown severity segment.
    pub async fn run(&self, asset: &TestAsset) -> Result<ValidationReport, OrchestratorError> {
        if self.templates.is_empty() {
            return Err(OrchestratorError::NoTemplates);
        }
        if self.components.is_empty() {
            return Err(OrchestratorError::NoTargets);
        }

        let targets = self.resolve_targets().await;
        let asset = Arc::new(asset.clone());
        let settings = RunSettings {
            suite: self.suite,
            environment: self.environment,
            trapi_version: self.trapi_version.clone(),
            biolink_version: self.biolink_version.clone(),
            runner_settings: self.runner_settings.clone(),
        };

        let mut pending = Vec::with_capacity(self.templates.len() * targets.len());
        for template in &self.templates {
            for target in &targets {
                pending.push(TestCaseRun::new(
                    Arc::clone(&asset),
                    *template,
                    target.clone(),
                    settings.clone(),
                    self.model,
                ));
            }
        }
        tracing::info!(
            asset = %asset.id,
            templates = self.templates.len(),
            targets = targets.len(),
            suite = %self.suite,
            "expanded validation matrix"
        );

        let mut queue = pending.into_iter().enumerate();
        let mut tasks = JoinSet::new();
        let mut finished = Vec::new();
        loop {
            while tasks.len() < self.concurrency {
                let Some((index, mut run)) = queue.next() else {
                    break;
                };
                let transport = Arc::clone(&self.transport);
                tasks.spawn(async move {
                    run.run_test_case(transport.as_ref()).await;
                    (index, run)
                });
            }
            let Some(joined) = tasks.join_next().await else {
                break;
            };
            finished.push(joined?);
        }

        // Matrix order, not completion order, so reports diff cleanly.
        finished.sort_by_key(|(index, _)| *index);
        let runs: Vec<TestCaseRun> = finished.into_iter().map(|(_, run)| run).collect();
        Ok(format_results(&runs)?)
    }
}
