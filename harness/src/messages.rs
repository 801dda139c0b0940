//! Validation messages: severity taxonomy, message records, and the per-run
//! message log.
//!
//! Every finding a run produces is a [`ValidationMessage`] whose dotted code
//! begins with its severity (`"error.trapi.response.empty"`). Codes are
//! parsed when the final report is assembled, so a malformed code surfaces
//! as a reporting error instead of being silently misfiled.

use std::collections::BTreeMap;

use serde::Serialize;

/// Severity of a validation message, lowest first.
///
/// `Skipped` marks runs that never dispatched; `Info` through `Critical`
/// rank findings from dispatched runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The test case was not executed.
    Skipped,
    /// Informational finding.
    Info,
    /// Non-blocking irregularity.
    Warning,
    /// The service response failed validation.
    Error,
    /// The test case could not be meaningfully executed at all.
    Critical,
}

impl Severity {
    /// Every severity, lowest first.
    pub const ALL: [Severity; 5] = [
        Severity::Skipped,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Returns the code segment naming this severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Skipped => "skipped",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    /// Parses the severity from a full dotted message code.
    ///
    /// # Errors
    ///
    /// Returns [`MessageCodeError`] when the code's first dotted segment is
    /// not a recognized severity.
    pub fn from_code(code: &str) -> Result<Severity, MessageCodeError> {
        let head = code.split('.').next().unwrap_or_default();
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == head)
            .ok_or_else(|| MessageCodeError {
                code: code.to_string(),
            })
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a message code does not begin with a severity segment.
#[derive(Debug, Clone, thiserror::Error)]
#[error("message code {code:?} does not begin with a severity segment")]
pub struct MessageCodeError {
    /// The offending code.
    pub code: String,
}

/// A single validation finding.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationMessage {
    /// Dotted message code; the first segment is the severity.
    pub code: String,
    /// The entity the finding is about (a CURIE, status code, node key).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Where in the test case the finding arose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Additional free-form attributes, flattened into the message object.
    #[serde(flatten)]
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl ValidationMessage {
    /// Creates a message with the given code and no attributes.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            identifier: None,
            context: None,
            extras: BTreeMap::new(),
        }
    }

    /// Sets the identifier attribute.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the context attribute.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds a free-form attribute.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Parses this message's severity from its code.
    ///
    /// # Errors
    ///
    /// Returns [`MessageCodeError`] when the code's first dotted segment is
    /// not a recognized severity.
    pub fn severity(&self) -> Result<Severity, MessageCodeError> {
        Severity::from_code(&self.code)
    }
}

/// Ordered log of the messages one run has produced.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<ValidationMessage>,
}

impl MessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the log.
    pub fn report(&mut self, message: ValidationMessage) {
        self.messages.push(message);
    }

    /// Moves every message from another log into this one.
    pub fn merge(&mut self, other: MessageLog) {
        self.messages.extend(other.messages);
    }

    /// All messages in the order they were reported.
    #[must_use]
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Returns true when at least one message has been reported.
    #[must_use]
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Highest severity reported so far. Messages with unparseable codes
    /// are ignored here; the reporter rejects them when the final report
    /// is assembled.
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.messages
            .iter()
            .filter_map(|message| message.severity().ok())
            .max()
    }

    /// Critical messages, grouped by code.
    #[must_use]
    pub fn get_critical(&self) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        self.by_severity(Severity::Critical)
    }

    /// Error messages, grouped by code.
    #[must_use]
    pub fn get_errors(&self) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        self.by_severity(Severity::Error)
    }

    /// Warning messages, grouped by code.
    #[must_use]
    pub fn get_warnings(&self) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        self.by_severity(Severity::Warning)
    }

    /// Informational messages, grouped by code.
    #[must_use]
    pub fn get_info(&self) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        self.by_severity(Severity::Info)
    }

    /// Skip messages, grouped by code.
    #[must_use]
    pub fn get_skipped(&self) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        self.by_severity(Severity::Skipped)
    }

    fn by_severity(&self, severity: Severity) -> BTreeMap<&str, Vec<&ValidationMessage>> {
        let mut grouped: BTreeMap<&str, Vec<&ValidationMessage>> = BTreeMap::new();
        for message in &self.messages {
            if message.severity().ok() == Some(severity) {
                grouped.entry(&message.code).or_default().push(message);
            }
        }
        grouped
    }
}

/// Message codes the harness emits.
pub mod codes {
    /// The generated query was not a valid TRAPI request.
    pub const REQUEST_INVALID: &str = "critical.trapi.request.invalid";
    /// The request carries no `message` object.
    pub const REQUEST_MESSAGE_MISSING: &str = "critical.trapi.request.message.missing";
    /// The request message carries no query graph.
    pub const REQUEST_QUERY_GRAPH_MISSING: &str = "critical.trapi.request.query_graph.missing";
    /// The query graph has no nodes.
    pub const REQUEST_NODES_EMPTY: &str = "error.trapi.request.nodes.empty";
    /// The query graph has no edges.
    pub const REQUEST_EDGES_EMPTY: &str = "error.trapi.request.edges.empty";
    /// A query edge references a node key that is not defined.
    pub const REQUEST_EDGE_UNKNOWN_NODE: &str = "error.trapi.request.edge.unknown_node";
    /// A query node's `ids` is not a list of identifiers.
    pub const REQUEST_NODE_IDS_INVALID: &str = "error.trapi.request.node.ids.invalid";
    /// A query node's `categories` is not a list of CURIEs.
    pub const REQUEST_NODE_CATEGORIES_INVALID: &str =
        "error.trapi.request.node.categories.invalid";
    /// A query edge's `predicates` is not a list of predicate CURIEs.
    pub const REQUEST_EDGE_PREDICATES_INVALID: &str =
        "error.trapi.request.edge.predicates.invalid";

    /// The service answered with a non-200 HTTP status.
    pub const UNEXPECTED_HTTP_CODE: &str = "critical.trapi.response.unexpected_http_code";
    /// The response body was missing or empty.
    pub const RESPONSE_EMPTY: &str = "error.trapi.response.empty";
    /// The response carries no `message` object.
    pub const RESPONSE_MESSAGE_MISSING: &str = "critical.trapi.response.message.missing";
    /// The response message carries no knowledge graph.
    pub const RESPONSE_KNOWLEDGE_GRAPH_MISSING: &str =
        "error.trapi.response.knowledge_graph.missing";
    /// A knowledge-graph edge references a node that is not present.
    pub const RESPONSE_DANGLING_EDGE: &str = "error.trapi.response.knowledge_graph.dangling_edge";
    /// The response message carries no results list.
    pub const RESPONSE_RESULTS_MISSING: &str = "error.trapi.response.results.missing";
    /// A result carries no node bindings.
    pub const RESPONSE_NODE_BINDINGS_MISSING: &str =
        "error.trapi.response.result.node_bindings.missing";
    /// The statement under test was not recoverable from the response.
    pub const MISSING_EXPECTED_EDGE: &str =
        "error.trapi.response.knowledge_graph.missing_expected_edge";

    /// The response does not declare its TRAPI schema version.
    pub const SCHEMA_VERSION_MISSING: &str = "warning.trapi.response.schema_version.missing";
    /// The declared TRAPI schema version differs from the configured one.
    pub const SCHEMA_VERSION_MISMATCH: &str = "warning.trapi.response.schema_version.mismatch";
    /// The response does not declare its Biolink Model version.
    pub const BIOLINK_VERSION_MISSING: &str = "warning.trapi.response.biolink_version.missing";
    /// The declared Biolink Model version differs from the configured one.
    pub const BIOLINK_VERSION_MISMATCH: &str = "warning.trapi.response.biolink_version.mismatch";

    /// The test case was skipped before dispatch.
    pub const TEST_SKIPPED: &str = "skipped.test";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering_is_ascending() {
        assert!(Severity::Skipped < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);
    }

    #[test]
    fn severity_parses_from_codes() -> Result<(), MessageCodeError> {
        assert_eq!(
            Severity::from_code(codes::REQUEST_INVALID)?,
            Severity::Critical
        );
        assert_eq!(Severity::from_code(codes::RESPONSE_EMPTY)?, Severity::Error);
        assert_eq!(
            Severity::from_code(codes::SCHEMA_VERSION_MISSING)?,
            Severity::Warning
        );
        assert_eq!(Severity::from_code("info.compliant")?, Severity::Info);
        assert_eq!(Severity::from_code(codes::TEST_SKIPPED)?, Severity::Skipped);
        Ok(())
    }

    #[test]
    fn unknown_severity_segment_is_rejected() {
        assert!(Severity::from_code("fatal.trapi.response").is_err());
        assert!(Severity::from_code("").is_err());
    }

    #[test]
    fn every_declared_code_parses() -> Result<(), MessageCodeError> {
        for code in [
            codes::REQUEST_INVALID,
            codes::REQUEST_MESSAGE_MISSING,
            codes::REQUEST_QUERY_GRAPH_MISSING,
            codes::REQUEST_NODES_EMPTY,
            codes::REQUEST_EDGES_EMPTY,
            codes::REQUEST_EDGE_UNKNOWN_NODE,
            codes::REQUEST_NODE_IDS_INVALID,
            codes::REQUEST_NODE_CATEGORIES_INVALID,
            codes::REQUEST_EDGE_PREDICATES_INVALID,
            codes::UNEXPECTED_HTTP_CODE,
            codes::RESPONSE_EMPTY,
            codes::RESPONSE_MESSAGE_MISSING,
            codes::RESPONSE_KNOWLEDGE_GRAPH_MISSING,
            codes::RESPONSE_DANGLING_EDGE,
            codes::RESPONSE_RESULTS_MISSING,
            codes::RESPONSE_NODE_BINDINGS_MISSING,
            codes::MISSING_EXPECTED_EDGE,
            codes::SCHEMA_VERSION_MISSING,
            codes::SCHEMA_VERSION_MISMATCH,
            codes::BIOLINK_VERSION_MISSING,
            codes::BIOLINK_VERSION_MISMATCH,
            codes::TEST_SKIPPED,
        ] {
            Severity::from_code(code)?;
        }
        Ok(())
    }

    #[test]
    fn log_groups_messages_by_severity_and_code() {
        let mut log = MessageLog::new();
        log.report(ValidationMessage::new("info.compliant"));
        log.report(
            ValidationMessage::new(codes::REQUEST_INVALID)
                .with_identifier("biolink:treats")
                .with_context("inverse_by_new_subject"),
        );
        log.report(ValidationMessage::new(codes::RESPONSE_EMPTY));
        log.report(ValidationMessage::new(codes::RESPONSE_EMPTY));

        assert_eq!(log.get_info().len(), 1);
        assert_eq!(log.get_critical().len(), 1);
        let errors = log.get_errors();
        assert_eq!(
            errors.get(codes::RESPONSE_EMPTY).map(Vec::len),
            Some(2)
        );
        assert!(log.get_skipped().is_empty());
        assert_eq!(log.max_severity(), Some(Severity::Critical));
    }

    #[test]
    fn empty_log_has_no_severity() {
        let log = MessageLog::new();
        assert!(!log.has_messages());
        assert_eq!(log.max_severity(), None);
    }

    #[test]
    fn merge_preserves_report_order() {
        let mut first = MessageLog::new();
        first.report(ValidationMessage::new(codes::SCHEMA_VERSION_MISSING));
        let mut second = MessageLog::new();
        second.report(ValidationMessage::new(codes::RESPONSE_EMPTY));
        first.merge(second);
        let order: Vec<&str> = first
            .messages()
            .iter()
            .map(|message| message.code.as_str())
            .collect();
        assert_eq!(
            order,
            vec![codes::SCHEMA_VERSION_MISSING, codes::RESPONSE_EMPTY]
        );
    }

    #[test]
    fn message_serialization_omits_absent_attributes() -> Result<(), serde_json::Error> {
        let bare = serde_json::to_value(ValidationMessage::new(codes::RESPONSE_EMPTY))?;
        assert_eq!(bare, serde_json::json!({ "code": "error.trapi.response.empty" }));

        let full = serde_json::to_value(
            ValidationMessage::new(codes::UNEXPECTED_HTTP_CODE)
                .with_identifier("500")
                .with_extra("reason", serde_json::json!("internal server error")),
        )?;
        assert_eq!(
            full,
            serde_json::json!({
                "code": "critical.trapi.response.unexpected_http_code",
                "identifier": "500",
                "reason": "internal server error",
            })
        );
        Ok(())
    }
}
