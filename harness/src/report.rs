//! Report assembly.
//!
//! The reporter folds completed runs into the nested mapping consumed by
//! downstream automation: test-case id, then target name, then a status
//! plus the run's messages grouped by severity. Severity is re-derived
//! from each message code here, so a malformed code surfaces as a report
//! error instead of a silently mislabeled finding.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::messages::{MessageCodeError, Severity, ValidationMessage};
use crate::run::{RunState, TestCaseRun};

/// Overall status of one (test case, target) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CaseStatus {
    /// The run dispatched and recorded no findings.
    Passed,
    /// The run was never dispatched.
    Skipped,
    /// Advisory findings only.
    Info,
    /// Non-fatal anomalies were found.
    Warning,
    /// Expected data was not found.
    Error,
    /// The exchange itself could not be trusted.
    Critical,
}

impl CaseStatus {
    /// Uppercase label as it appears in serialized reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "PASSED",
            CaseStatus::Skipped => "SKIPPED",
            CaseStatus::Info => "INFO",
            CaseStatus::Warning => "WARNING",
            CaseStatus::Error => "ERROR",
            CaseStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for CaseStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Skipped => CaseStatus::Skipped,
            Severity::Info => CaseStatus::Info,
            Severity::Warning => CaseStatus::Warning,
            Severity::Error => CaseStatus::Error,
            Severity::Critical => CaseStatus::Critical,
        }
    }
}

/// Status and findings for one target of one test case.
#[derive(Debug, Clone, Serialize)]
pub struct TargetResult {
    /// Highest-severity label present, or `PASSED`.
    pub status: CaseStatus,
    /// Messages grouped under their severity name.
    pub messages: BTreeMap<String, Vec<ValidationMessage>>,
}

/// Error raised when report assembly fails.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A message code's first segment was not a recognized severity.
    #[error(transparent)]
    InvalidCode(#[from] MessageCodeError),
}

/// Nested mapping of test-case id to target name to result.
///
/// Serializes transparently as the mapping itself. Keys are sorted, so two
/// reports over the same runs serialize identically.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    results: BTreeMap<String, BTreeMap<String, TargetResult>>,
}

impl ValidationReport {
    /// The full nested mapping.
    #[must_use]
    pub fn results(&self) -> &BTreeMap<String, BTreeMap<String, TargetResult>> {
        &self.results
    }

    /// Looks up one (test case, target) result.
    #[must_use]
    pub fn target(&self, test_case_id: &str, target: &str) -> Option<&TargetResult> {
        self.results
            .get(test_case_id)
            .and_then(|targets| targets.get(target))
    }

    /// Number of test cases present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the report holds no test cases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The worst status present across every pair.
    #[must_use]
    pub fn worst_status(&self) -> Option<CaseStatus> {
        self.results
            .values()
            .flat_map(|targets| targets.values())
            .map(|result| result.status)
            .max()
    }

    /// Whether any pair reached `ERROR` or `CRITICAL`.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.worst_status()
            .is_some_and(|status| status >= CaseStatus::Error)
    }
}

/// Folds completed runs into the report mapping.
///
/// Each pair's status is the highest severity among its messages, `PASSED`
/// for a dispatched run that recorded nothing, and `SKIPPED` for a run
/// that never dispatched. The nesting is the same no matter how many
/// targets were requested.
///
/// # Errors
///
/// Returns [`ReportError`] when any message's code carries an unknown
/// severity segment.
pub fn format_results(runs: &[TestCaseRun]) -> Result<ValidationReport, ReportError> {
    let mut results: BTreeMap<String, BTreeMap<String, TargetResult>> = BTreeMap::new();
    for run in runs {
        let mut grouped: BTreeMap<String, Vec<ValidationMessage>> = BTreeMap::new();
        let mut worst: Option<Severity> = None;
        for message in run.messages().messages() {
            let severity = message.severity()?;
            worst = worst.max(Some(severity));
            grouped
                .entry(severity.as_str().to_string())
                .or_default()
                .push(message.clone());
        }
        let status = match run.state() {
            RunState::Created | RunState::Skipped => CaseStatus::Skipped,
            _ => worst.map_or(CaseStatus::Passed, CaseStatus::from),
        };
        results.entry(run.test_case_id()).or_default().insert(
            run.target().name.clone(),
            TargetResult {
                status,
                messages: grouped,
            },
        );
    }
    Ok(ValidationReport { results })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use onehop_biolink::BiolinkModel;
    use serde_json::{json, Value};

    use super::*;
    use crate::asset::fixtures::treats_asset;
    use crate::registry::TestEnvironment;
    use crate::run::{ResolvedTarget, RunSettings, TestSuite};
    use crate::templates::QueryTemplate;
    use crate::transport::testing::CannedTransport;
    use crate::trapi::fixtures::response_with_edge;

    fn settings() -> RunSettings {
        RunSettings {
            suite: TestSuite::OneHop,
            environment: TestEnvironment::Ci,
            trapi_version: "v1.5.0".to_string(),
            biolink_version: "4.1.6".to_string(),
            runner_settings: Vec::new(),
        }
    }

    fn run_against(endpoint: Option<&str>) -> TestCaseRun {
        TestCaseRun::new(
            Arc::new(treats_asset()),
            QueryTemplate::BySubject,
            ResolvedTarget {
                name: "ars".to_string(),
                endpoint: endpoint.map(str::to_string),
            },
            settings(),
            BiolinkModel::compiled(),
        )
    }

    #[tokio::test]
    async fn dispatched_runs_without_findings_pass() -> Result<(), ReportError> {
        let transport =
            CannedTransport::returning(200, Some(response_with_edge(&treats_asset())));
        let mut run = run_against(Some("http://localhost/trapi"));
        run.run_test_case(&transport).await;
        let report = format_results(std::slice::from_ref(&run))?;
        let result = report.target("TestAsset:00001-by_subject", "ars");
        assert_eq!(result.map(|r| r.status), Some(CaseStatus::Passed));
        assert!(result.is_some_and(|r| r.messages.is_empty()));
        assert!(!report.has_failures());
        Ok(())
    }

    #[test]
    fn never_dispatched_runs_are_skipped() -> Result<(), ReportError> {
        let created = run_against(Some("http://localhost/trapi"));
        let report = format_results(std::slice::from_ref(&created))?;
        let result = report.target(&created.test_case_id(), "ars");
        assert_eq!(result.map(|r| r.status), Some(CaseStatus::Skipped));
        Ok(())
    }

    #[tokio::test]
    async fn unresolved_targets_report_skipped_with_their_reason() -> Result<(), ReportError> {
        let transport = CannedTransport::returning(200, None);
        let mut run = run_against(None);
        run.run_test_case(&transport).await;
        let report = format_results(std::slice::from_ref(&run))?;
        let result = report.target("TestAsset:00001-by_subject", "ars");
        assert_eq!(result.map(|r| r.status), Some(CaseStatus::Skipped));
        let skipped = result.and_then(|r| r.messages.get("skipped"));
        assert!(skipped.is_some_and(|messages| !messages.is_empty()));
        assert!(!report.has_failures());
        Ok(())
    }

    #[tokio::test]
    async fn status_tracks_the_highest_severity() -> Result<(), ReportError> {
        let transport = CannedTransport::returning(500, None);
        let mut critical = run_against(Some("http://localhost/trapi"));
        critical.run_test_case(&transport).await;

        let transport = CannedTransport::returning(200, Some(Value::Null));
        let mut error = TestCaseRun::new(
            Arc::new(treats_asset()),
            QueryTemplate::BySubject,
            ResolvedTarget {
                name: "arax".to_string(),
                endpoint: Some("http://localhost/trapi".to_string()),
            },
            settings(),
            BiolinkModel::compiled(),
        );
        error.run_test_case(&transport).await;

        let report = format_results(&[critical, error])?;
        assert_eq!(report.len(), 1);
        let targets = report.results().get("TestAsset:00001-by_subject");
        assert_eq!(targets.map(BTreeMap::len), Some(2));
        assert_eq!(report.worst_status(), Some(CaseStatus::Critical));
        assert!(report.has_failures());
        Ok(())
    }

    #[tokio::test]
    async fn warnings_do_not_count_as_failures() -> Result<(), ReportError> {
        let mut response = response_with_edge(&treats_asset());
        response["biolink_version"] = json!("3.5.0");
        let transport = CannedTransport::returning(200, Some(response));
        let mut run = run_against(Some("http://localhost/trapi"));
        run.run_test_case(&transport).await;
        let report = format_results(std::slice::from_ref(&run))?;
        assert_eq!(report.worst_status(), Some(CaseStatus::Warning));
        assert!(!report.has_failures());
        let result = report.target("TestAsset:00001-by_subject", "ars");
        let warnings = result.and_then(|r| r.messages.get("warning"));
        assert!(warnings.is_some_and(|messages| messages.len() == 1));
        Ok(())
    }

    #[tokio::test]
    async fn single_targets_keep_the_nested_shape() -> Result<(), Box<dyn std::error::Error>> {
        let transport =
            CannedTransport::returning(200, Some(response_with_edge(&treats_asset())));
        let mut run = run_against(Some("http://localhost/trapi"));
        run.run_test_case(&transport).await;
        let report = format_results(std::slice::from_ref(&run))?;
        let serialized = serde_json::to_value(&report)?;
        assert_eq!(
            serialized,
            json!({
                "TestAsset:00001-by_subject": {
                    "ars": { "status": "PASSED", "messages": {} }
                }
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn formatting_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let transport = CannedTransport::returning(500, None);
        let mut run = run_against(Some("http://localhost/trapi"));
        run.run_test_case(&transport).await;
        let runs = [run];
        let first = serde_json::to_string(&format_results(&runs)?)?;
        let second = serde_json::to_string(&format_results(&runs)?)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn unknown_severity_segments_fail_at_report_time() {
        let mut run = run_against(Some("http://localhost/trapi"));
        run.report(ValidationMessage::new("fatal.case.of.typo"));
        assert!(format_results(std::slice::from_ref(&run)).is_err());
    }

    #[test]
    fn statuses_rank_in_severity_order() {
        assert!(CaseStatus::Passed < CaseStatus::Skipped);
        assert!(CaseStatus::Skipped < CaseStatus::Info);
        assert!(CaseStatus::Info < CaseStatus::Warning);
        assert!(CaseStatus::Warning < CaseStatus::Error);
        assert!(CaseStatus::Error < CaseStatus::Critical);
        assert_eq!(CaseStatus::from(Severity::Critical), CaseStatus::Critical);
    }
}
