//! Compact Biolink Model slice encoded as typed Rust data.
//!
//! The `onehop-biolink` crate carries the part of the Biolink Model that
//! one-hop knowledge-graph validation needs: node categories with their
//! identifier prefixes and parents, and association predicates with their
//! parents, inverses, and symmetry flags. Lookups accept CURIEs, bare
//! element names, or human-readable spaced names.
//!
//! # Entry Point
//!
//! ```
//! let model = onehop_biolink::BiolinkModel::compiled();
//! assert!(model.is_predicate("biolink:treats"));
//! assert_eq!(
//!     model.inverse_predicate("treats"),
//!     Some("biolink:treated_by"),
//! );
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod model;
pub mod release;

pub use model::{
    category_curie, element_name, predicate_curie, BiolinkModel, CategoryDefinition,
    PredicateDefinition, BIOLINK_PREFIX,
};

impl BiolinkModel {
    /// Returns the compiled model release, built once per process.
    ///
    /// The compiled tables are immutable after construction and safe to
    /// share by reference across threads.
    #[must_use]
    pub fn compiled() -> &'static BiolinkModel {
        static MODEL: std::sync::OnceLock<BiolinkModel> = std::sync::OnceLock::new();
        MODEL.get_or_init(release::release)
    }
}
