//! One-hop validation harness for Translator knowledge-graph services.
//!
//! Given one curated statement (subject, predicate, object), the harness
//! re-derives it through a battery of query templates against deployed
//! TRAPI services and reports, per template and per target, whether the
//! statement came back. Failures are graded findings rather than errors:
//! everything that goes wrong inside a test case lands in its message log
//! and the caller always receives a complete report.
//!
//! # Module Map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `asset` | Statements under test and the session catalog |
//! | `templates` | The seven one-hop query shapes |
//! | `trapi` | TRAPI payload validation and edge recovery |
//! | `transport` | HTTP dispatch seam |
//! | `registry` | Environments and component endpoint resolution |
//! | `run` | Per-case state machine and execution pipeline |
//! | `orchestrator` | Matrix expansion and concurrent execution |
//! | `report` | Status ranking and report assembly |
//! | `messages` | Severity taxonomy and the message vocabulary |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use onehop_harness::{GraphValidationTest, ReqwestTransport, TestEnvironment, TestSuite};
//!
//! # async fn validate() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(ReqwestTransport::new()?);
//! let validation = GraphValidationTest::new(TestSuite::OneHop, TestEnvironment::Ci, transport);
//! let asset = validation.build_test_asset(
//!     "MONDO:0005301",
//!     "biolink:Disease",
//!     "biolink:treats",
//!     "PUBCHEM.COMPOUND:107970",
//!     "biolink:SmallMolecule",
//! )?;
//! let report = validation.run(&asset).await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! assert!(!report.has_failures());
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod asset;
pub mod messages;
pub mod orchestrator;
pub mod registry;
pub mod report;
pub mod run;
pub mod templates;
pub mod trapi;
pub mod transport;

pub use asset::{AssetCatalog, AssetError, TestAsset};
pub use messages::{MessageCodeError, MessageLog, Severity, ValidationMessage};
pub use orchestrator::{GraphValidationTest, OrchestratorError, DEFAULT_CONCURRENCY};
pub use registry::{
    ComponentRegistry, ComponentRole, EndpointMetadata, StaticRegistry, TestEnvironment,
};
pub use report::{CaseStatus, ReportError, TargetResult, ValidationReport};
pub use run::{ResolvedTarget, RunState, RunSettings, TestCaseRun, TestSuite};
pub use templates::QueryTemplate;
pub use transport::{ReqwestTransport, Transport, TrapiCall};
