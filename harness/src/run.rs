//! Test case runs.
//!
//! A [`TestCaseRun`] binds one asset, one template, and one resolved target,
//! and owns everything that happens to that combination: query construction,
//! preflight validation, dispatch, and response checks. Every failure inside
//! [`TestCaseRun::run_test_case`] becomes a message on the run's log rather
//! than an error crossing the run boundary, so the orchestrator can always
//! collect a result from every run it started.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use onehop_biolink::BiolinkModel;
use serde_json::Value;

use crate::asset::TestAsset;
use crate::messages::{codes, MessageLog, Severity, ValidationMessage};
use crate::registry::TestEnvironment;
use crate::templates::{apply_runner_settings, QueryTemplate, TemplateOutcome};
use crate::transport::Transport;
use crate::trapi::{
    check_response_versions, edge_recovered_in_response, is_empty_response, validate_component,
    TrapiComponent,
};

const SUCCESS_STATUS: u16 = 200;

/// Validation suite applied to a successful exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestSuite {
    /// Check that the original statement is recoverable from the response.
    OneHop,
    /// Check the response's structure against the TRAPI standard.
    StandardsValidation,
}

impl TestSuite {
    /// Short name used on the command line and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestSuite::OneHop => "one-hop",
            TestSuite::StandardsValidation => "standards",
        }
    }
}

impl fmt::Display for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a suite name is not recognized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown suite {name:?} (expected one-hop or standards)")]
pub struct UnknownSuiteError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for TestSuite {
    type Err = UnknownSuiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-hop" | "one_hop" => Ok(TestSuite::OneHop),
            "standards" => Ok(TestSuite::StandardsValidation),
            _ => Err(UnknownSuiteError {
                name: s.to_string(),
            }),
        }
    }
}

/// Execution state of a run.
///
/// The lifecycle is `Created` to `BuildingQuery`, then either through
/// `Dispatched` and `Validating` to `Done`, or directly to `Skipped` or
/// `FailedBuild` when the query never leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Constructed, not yet executed.
    Created,
    /// Generating and validating the query.
    BuildingQuery,
    /// The query is on the wire.
    Dispatched,
    /// A response arrived and is being checked.
    Validating,
    /// Execution finished; the message log is final.
    Done,
    /// The run was never dispatched.
    Skipped,
    /// The query could not be built or failed preflight validation.
    FailedBuild,
}

impl RunState {
    /// Whether this state ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Done | RunState::Skipped | RunState::FailedBuild
        )
    }
}

/// A named target and the endpoint it resolved to, when it resolved at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Component name as requested.
    pub name: String,
    /// Base URL of the component's TRAPI service, absent when the registry
    /// had no deployment for the requested environment.
    pub endpoint: Option<String>,
}

/// Session-level settings shared by every run of one validation test.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Suite applied after a successful exchange.
    pub suite: TestSuite,
    /// Deployment tier the run targets.
    pub environment: TestEnvironment,
    /// Normalized TRAPI version the run expects, e.g. `"v1.5.0"`.
    pub trapi_version: String,
    /// Biolink model version the run expects, e.g. `"4.1.6"`.
    pub biolink_version: String,
    /// Runner directives applied to every generated query.
    pub runner_settings: Vec<String>,
}

/// One (asset, template, target) execution.
#[derive(Debug)]
pub struct TestCaseRun {
    asset: Arc<TestAsset>,
    template: QueryTemplate,
    target: ResolvedTarget,
    settings: RunSettings,
    model: &'static BiolinkModel,
    state: RunState,
    messages: MessageLog,
    trapi_request: Option<Value>,
    trapi_response: Option<Value>,
}

impl TestCaseRun {
    /// Creates a run in the [`RunState::Created`] state.
    #[must_use]
    pub fn new(
        asset: Arc<TestAsset>,
        template: QueryTemplate,
        target: ResolvedTarget,
        settings: RunSettings,
        model: &'static BiolinkModel,
    ) -> Self {
        Self {
            asset,
            template,
            target,
            settings,
            model,
            state: RunState::Created,
            messages: MessageLog::new(),
            trapi_request: None,
            trapi_response: None,
        }
    }

    /// Composite id of this run, stable across invocations for the same
    /// asset/template pairing.
    #[must_use]
    pub fn test_case_id(&self) -> String {
        format!("{}-{}", self.asset.id, self.template.name())
    }

    /// Composite identifier of the expected edge, used when the response
    /// fails to recover it.
    #[must_use]
    pub fn edge_identifier(&self) -> String {
        format!(
            "{}|({}#{})-[{}]->({}#{})",
            self.asset.id,
            self.asset.subject_id,
            self.asset.subject_category,
            self.asset.predicate_id,
            self.asset.object_id,
            self.asset.object_category
        )
    }

    /// The asset this run re-derives.
    #[must_use]
    pub fn asset(&self) -> &TestAsset {
        &self.asset
    }

    /// The template bound to this run.
    #[must_use]
    pub fn template(&self) -> QueryTemplate {
        self.template
    }

    /// The target this run dispatches to.
    #[must_use]
    pub fn target(&self) -> &ResolvedTarget {
        &self.target
    }

    /// Current execution state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Messages recorded so far, in the order they were reported.
    #[must_use]
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Appends a finding to this run's log.
    pub fn report(&mut self, message: ValidationMessage) {
        self.messages.report(message);
    }

    /// The query as dispatched, retained for debugging.
    #[must_use]
    pub fn trapi_request(&self) -> Option<&Value> {
        self.trapi_request.as_ref()
    }

    /// The response body as received, retained for debugging.
    #[must_use]
    pub fn trapi_response(&self) -> Option<&Value> {
        self.trapi_response.as_ref()
    }

    /// Executes this run to a terminal state.
    ///
    /// The pipeline stops at the first condition that makes further checks
    /// meaningless: an unresolved target, a template that cannot produce a
    /// query, a query that fails preflight validation, a non-success status,
    /// or an empty body. Whatever happens, the outcome is recorded on the
    /// run's own message log and the call returns normally.
    pub async fn run_test_case(&mut self, transport: &dyn Transport) {
        let Some(endpoint) = self.target.endpoint.clone() else {
            let reason = format!(
                "no endpoint resolved for {} in the {} environment",
                self.target.name, self.settings.environment
            );
            tracing::info!(
                test_case = %self.test_case_id(),
                target = %self.target.name,
                "target unresolved; run skipped"
            );
            let message = ValidationMessage::new(codes::TEST_SKIPPED)
                .with_identifier(self.target.name.clone())
                .with_extra("reason", Value::String(reason));
            self.messages.report(message);
            self.state = RunState::Skipped;
            return;
        };

        self.state = RunState::BuildingQuery;
        let generated = match self.template.generate(&self.asset, self.model) {
            TemplateOutcome::Query(generated) => generated,
            TemplateOutcome::Skip { context, reason } => {
                let message = contextual_message(codes::TEST_SKIPPED, &context, reason);
                self.messages.report(message);
                self.state = RunState::Skipped;
                return;
            }
            TemplateOutcome::Invalid { context, reason } => {
                tracing::error!(
                    test_case = %self.test_case_id(),
                    reason = %reason,
                    "template could not build a query"
                );
                let message = contextual_message(codes::REQUEST_INVALID, &context, reason);
                self.messages.report(message);
                self.state = RunState::FailedBuild;
                return;
            }
        };

        let mut request = generated.request;
        apply_runner_settings(&mut request, &self.settings.runner_settings);

        let mut preflight = MessageLog::new();
        validate_component(&request, TrapiComponent::Query, &mut preflight);
        let malformed = preflight
            .max_severity()
            .is_some_and(|severity| severity >= Severity::Error);
        self.messages.merge(preflight);
        self.trapi_request = Some(request.clone());
        if malformed {
            tracing::warn!(
                test_case = %self.test_case_id(),
                "query failed preflight validation; not dispatched"
            );
            self.state = RunState::FailedBuild;
            return;
        }

        self.state = RunState::Dispatched;
        let call = transport.execute(&endpoint, &request).await;
        self.trapi_response = call.body.clone();

        if call.status != SUCCESS_STATUS {
            let message = ValidationMessage::new(codes::UNEXPECTED_HTTP_CODE)
                .with_identifier(call.status.to_string());
            self.messages.report(message);
            self.state = RunState::Done;
            return;
        }
        if is_empty_response(call.body.as_ref()) {
            self.messages
                .report(ValidationMessage::new(codes::RESPONSE_EMPTY));
            self.state = RunState::Done;
            return;
        }

        self.state = RunState::Validating;
        if let Some(response) = &call.body {
            check_response_versions(
                response,
                &self.settings.trapi_version,
                &self.settings.biolink_version,
                &mut self.messages,
            );
            match self.settings.suite {
                TestSuite::OneHop => {
                    // Recovery is judged against the asset as built, not the
                    // template's transformed query.
                    if !edge_recovered_in_response(&self.asset, response) {
                        let identifier = self.edge_identifier();
                        self.messages.report(
                            ValidationMessage::new(codes::MISSING_EXPECTED_EDGE)
                                .with_identifier(identifier),
                        );
                    }
                }
                TestSuite::StandardsValidation => {
                    validate_component(response, TrapiComponent::Response, &mut self.messages);
                }
            }
        }
        self.state = RunState::Done;
    }
}

/// Builds a message from a template's pipe-delimited failure context. The
/// part before the pipe names the template and lands in `context`; the part
/// after it is the identifier.
fn contextual_message(code: &str, context: &str, reason: String) -> ValidationMessage {
    let mut message = ValidationMessage::new(code).with_extra("reason", Value::String(reason));
    match context.split_once('|') {
        Some((template, identifier)) => {
            message = message.with_context(template).with_identifier(identifier);
        }
        None => {
            message = message.with_context(context);
        }
    }
    message
}
