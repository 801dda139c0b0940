//! Core Biolink Model types.
//!
//! These types represent a compact slice of the Biolink Model as typed Rust
//! data: node categories and association predicates, each carrying the
//! hierarchy, inverse, and identifier-prefix information the validation
//! harness needs. The top-level entry point is
//! [`BiolinkModel::compiled()`](crate::BiolinkModel::compiled).

/// The CURIE prefix shared by every Biolink element.
pub const BIOLINK_PREFIX: &str = "biolink:";

/// A node category (Biolink class definition).
#[derive(Debug, Clone)]
pub struct CategoryDefinition {
    /// CURIE of the category (e.g. `"biolink:Disease"`).
    pub curie: &'static str,
    /// CURIE of the parent category, or `None` for the hierarchy root.
    pub parent: Option<&'static str>,
    /// Identifier prefixes conventionally used for instances of this
    /// category, most preferred first (e.g. `"MONDO"` for diseases).
    pub id_prefixes: &'static [&'static str],
}

impl CategoryDefinition {
    /// Returns true when the identifier's CURIE prefix is registered for
    /// this category. Categories with no registered prefixes accept any
    /// identifier.
    #[must_use]
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        if self.id_prefixes.is_empty() {
            return true;
        }
        match identifier.split_once(':') {
            Some((prefix, _)) => self.id_prefixes.contains(&prefix),
            None => false,
        }
    }
}

/// An association predicate (Biolink slot definition).
#[derive(Debug, Clone)]
pub struct PredicateDefinition {
    /// CURIE of the predicate (e.g. `"biolink:treats"`).
    pub curie: &'static str,
    /// CURIE of the parent predicate, or `None` for the hierarchy root.
    pub parent: Option<&'static str>,
    /// CURIE of the declared inverse predicate, if any.
    pub inverse: Option<&'static str>,
    /// Whether the predicate is symmetric. Symmetric predicates are their
    /// own inverse.
    pub symmetric: bool,
}

/// A compiled Biolink Model release.
#[derive(Debug)]
pub struct BiolinkModel {
    /// Model release version (e.g. `"4.1.6"`).
    pub version: &'static str,
    /// All node categories, hierarchy roots first.
    pub categories: Vec<CategoryDefinition>,
    /// All association predicates, hierarchy roots first.
    pub predicates: Vec<PredicateDefinition>,
}

impl BiolinkModel {
    /// Looks up a category by name or CURIE. Accepts `"biolink:SmallMolecule"`,
    /// `"SmallMolecule"`, or the human-readable `"small molecule"`.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryDefinition> {
        let curie = category_curie(name);
        self.categories.iter().find(|c| c.curie == curie)
    }

    /// Looks up a predicate by name or CURIE. Accepts `"biolink:treats"`,
    /// `"treats"`, or a spaced form such as `"interacts with"`.
    #[must_use]
    pub fn predicate(&self, name: &str) -> Option<&PredicateDefinition> {
        let curie = predicate_curie(name);
        self.predicates.iter().find(|p| p.curie == curie)
    }

    /// Returns true when the name resolves to a known category.
    #[must_use]
    pub fn is_category(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    /// Returns true when the name resolves to a known predicate.
    #[must_use]
    pub fn is_predicate(&self, name: &str) -> bool {
        self.predicate(name).is_some()
    }

    /// Returns the parent category CURIE, or `None` when the category is
    /// unknown or already the hierarchy root.
    #[must_use]
    pub fn parent_category(&self, name: &str) -> Option<&'static str> {
        self.category(name).and_then(|c| c.parent)
    }

    /// Returns the parent predicate CURIE, or `None` when the predicate is
    /// unknown or already the hierarchy root.
    #[must_use]
    pub fn parent_predicate(&self, name: &str) -> Option<&'static str> {
        self.predicate(name).and_then(|p| p.parent)
    }

    /// Returns the inverse predicate CURIE. Symmetric predicates invert to
    /// themselves; `None` means the predicate is unknown or has no usable
    /// inverse.
    #[must_use]
    pub fn inverse_predicate(&self, name: &str) -> Option<&'static str> {
        let predicate = self.predicate(name)?;
        if predicate.symmetric {
            Some(predicate.curie)
        } else {
            predicate.inverse
        }
    }

    /// Returns the total number of categories in the release.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Returns the total number of predicates in the release.
    #[must_use]
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }
}

/// Normalizes a category name to CURIE form.
///
/// `"small molecule"`, `"small_molecule"`, and `"SmallMolecule"` all
/// normalize to `"biolink:SmallMolecule"`. An existing `biolink:` prefix is
/// preserved.
#[must_use]
pub fn category_curie(name: &str) -> String {
    let bare = name.trim().trim_start_matches(BIOLINK_PREFIX);
    let mut out = String::with_capacity(bare.len());
    for word in bare.split(|c: char| c == ' ' || c == '_') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    format!("{BIOLINK_PREFIX}{out}")
}

/// Normalizes a predicate name to CURIE form.
///
/// `"treats"`, `"Treats"`, and `"interacts with"` normalize to
/// `"biolink:treats"` and `"biolink:interacts_with"` respectively.
#[must_use]
pub fn predicate_curie(name: &str) -> String {
    let bare = name.trim().trim_start_matches(BIOLINK_PREFIX);
    let snake = bare.replace(' ', "_").to_lowercase();
    format!("{BIOLINK_PREFIX}{snake}")
}

/// Strips the `biolink:` prefix from an element CURIE, yielding the bare
/// element name (`"biolink:treats"` → `"treats"`).
#[must_use]
pub fn element_name(curie: &str) -> &str {
    curie.trim_start_matches(BIOLINK_PREFIX)
}
