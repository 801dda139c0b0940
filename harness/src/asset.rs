//! Statements under test and the session-scoped asset builder.

use std::sync::atomic::{AtomicUsize, Ordering};

use onehop_biolink::{category_curie, element_name, predicate_curie, BiolinkModel};

/// Errors raised while building a test asset.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssetError {
    /// The predicate does not resolve in the compiled Biolink slice.
    #[error("unknown predicate: {0}")]
    UnknownPredicate(String),
    /// A node category does not resolve in the compiled Biolink slice.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// One subject-predicate-object statement under test.
///
/// Assets are immutable once built; every test-case run against an asset
/// sees the same statement regardless of how its template transforms the
/// query.
#[derive(Debug, Clone)]
pub struct TestAsset {
    /// Opaque asset identifier (`"TestAsset:00001"`).
    pub id: String,
    /// Subject node CURIE (e.g. `"MONDO:0005301"`).
    pub subject_id: String,
    /// Subject category CURIE (e.g. `"biolink:Disease"`).
    pub subject_category: String,
    /// Predicate CURIE (e.g. `"biolink:treats"`).
    pub predicate_id: String,
    /// Bare predicate name (`predicate_id` without the `biolink:` prefix).
    pub predicate_name: String,
    /// Object node CURIE.
    pub object_id: String,
    /// Object category CURIE.
    pub object_category: String,
    /// Optional expected-output classification (e.g. `"TopAnswer"`).
    pub expected_output: Option<String>,
}

/// Builds [`TestAsset`]s for one validation session.
///
/// The identifier counter lives here, so concurrent sessions never share
/// or race on identifiers: each catalog numbers its assets from 1.
#[derive(Debug)]
pub struct AssetCatalog {
    model: &'static BiolinkModel,
    next_id: AtomicUsize,
}

impl AssetCatalog {
    /// Creates a catalog whose first asset will be `TestAsset:00001`.
    #[must_use]
    pub fn new(model: &'static BiolinkModel) -> Self {
        Self {
            model,
            next_id: AtomicUsize::new(1),
        }
    }

    /// Returns the next asset identifier, zero-padded to five digits.
    #[must_use]
    pub fn next_asset_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("TestAsset:{n:0>5}")
    }

    /// Builds a statement under test.
    ///
    /// Category and predicate names are normalized to CURIE form before
    /// validation, so `"small molecule"` and `"biolink:SmallMolecule"` are
    /// interchangeable.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] when the predicate or either category does
    /// not resolve in the compiled Biolink slice.
    pub fn build_asset(
        &self,
        subject_id: &str,
        subject_category: &str,
        predicate: &str,
        object_id: &str,
        object_category: &str,
    ) -> Result<TestAsset, AssetError> {
        let subject_category = self.resolve_category(subject_category)?;
        let object_category = self.resolve_category(object_category)?;

        let predicate_id = predicate_curie(predicate);
        if !self.model.is_predicate(&predicate_id) {
            return Err(AssetError::UnknownPredicate(predicate.to_string()));
        }
        let predicate_name = element_name(&predicate_id).to_string();

        self.check_identifier_prefix(subject_id, &subject_category);
        self.check_identifier_prefix(object_id, &object_category);

        Ok(TestAsset {
            id: self.next_asset_id(),
            subject_id: subject_id.to_string(),
            subject_category,
            predicate_id,
            predicate_name,
            object_id: object_id.to_string(),
            object_category,
            expected_output: None,
        })
    }

    fn resolve_category(&self, name: &str) -> Result<String, AssetError> {
        let curie = category_curie(name);
        if self.model.is_category(&curie) {
            Ok(curie)
        } else {
            Err(AssetError::UnknownCategory(name.to_string()))
        }
    }

    fn check_identifier_prefix(&self, identifier: &str, category: &str) {
        let matches = self
            .model
            .category(category)
            .is_some_and(|c| c.matches_identifier(identifier));
        if !matches {
            tracing::warn!(
                identifier,
                category,
                "identifier prefix is not registered for the category"
            );
        }
    }
}
