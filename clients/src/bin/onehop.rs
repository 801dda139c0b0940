//! `onehop` validates that a curated statement is recoverable from deployed
//! TRAPI services.
//!
//! The runner builds one test asset from the given subject, predicate, and
//! object, expands it through the one-hop query templates against the
//! requested components, and prints the resulting report as JSON.
//!
//! **Usage:**
//! ```text
//! onehop [--environment <tier>] [--components <names>] \
//!        [--subject-id <curie>] [--predicate <curie>] [--object-id <curie>]
//! ```
//!
//! Exits non-zero if any test case reports error or critical findings.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::process;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use onehop_harness::{
    GraphValidationTest, ReqwestTransport, TestEnvironment, TestSuite, DEFAULT_CONCURRENCY,
};

/// Run a one-hop validation against deployed TRAPI services.
#[derive(Parser)]
#[command(
    name = "onehop",
    about = "Validate that a statement is recoverable from TRAPI services"
)]
struct Args {
    /// Deployment tier to validate: dev, ci, test, or prod.
    #[arg(long, default_value = "ci")]
    environment: TestEnvironment,

    /// Target components, comma-delimited, by short name or infores
    /// identifier (default: the ARS).
    #[arg(long, value_delimiter = ',', default_value = "ars")]
    components: Vec<String>,

    /// Subject identifier (CURIE).
    #[arg(long, default_value = "MONDO:0005301")]
    subject_id: String,

    /// Subject category.
    #[arg(long, default_value = "biolink:Disease")]
    subject_category: String,

    /// Predicate, as a CURIE or a plain name.
    #[arg(long, default_value = "biolink:treats")]
    predicate: String,

    /// Object identifier (CURIE).
    #[arg(long, default_value = "PUBCHEM.COMPOUND:107970")]
    object_id: String,

    /// Object category.
    #[arg(long, default_value = "biolink:SmallMolecule")]
    object_category: String,

    /// Expected TRAPI version; bare and v-prefixed forms are accepted.
    #[arg(long)]
    trapi_version: Option<String>,

    /// Expected Biolink model version.
    #[arg(long)]
    biolink_version: Option<String>,

    /// Validation suite: one-hop or standards.
    #[arg(long, default_value = "one-hop")]
    suite: TestSuite,

    /// Mark query edges as answerable by inference.
    #[arg(long)]
    inferred: bool,

    /// Maximum number of test cases in flight at once.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Log level: error, warn, info, debug, or trace.
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .init();

    let transport = Arc::new(ReqwestTransport::new()?);
    let mut validation = GraphValidationTest::new(args.suite, args.environment, transport)
        .with_components(args.components)
        .with_concurrency(args.concurrency);
    if let Some(version) = &args.trapi_version {
        validation = validation.with_trapi_version(version);
    }
    if let Some(version) = args.biolink_version {
        validation = validation.with_biolink_version(version);
    }
    if args.inferred {
        validation = validation.with_runner_settings(vec!["inferred".to_string()]);
    }

    let asset = validation.build_test_asset(
        &args.subject_id,
        &args.subject_category,
        &args.predicate,
        &args.object_id,
        &args.object_category,
    )?;
    tracing::info!(
        asset = %asset.id,
        subject = %asset.subject_id,
        predicate = %asset.predicate_id,
        object = %asset.object_id,
        environment = %args.environment,
        suite = %args.suite,
        "running validation"
    );

    let report = validation.run(&asset).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.has_failures() {
        eprintln!("Validation FAILED: error or critical findings were reported.");
        process::exit(1);
    }
    Ok(())
}
