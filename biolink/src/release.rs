//! Biolink Model release tables.
//!
//! A hand-curated slice of the Biolink Model covering the categories and
//! predicates exercised by Translator one-hop validation. The slice keeps
//! the published hierarchy and inverse declarations for every element it
//! includes; elements outside the slice are simply unknown to the model.

use crate::model::{BiolinkModel, CategoryDefinition, PredicateDefinition};

/// Model release version encoded by these tables.
pub const MODEL_VERSION: &str = "4.1.6";

/// Returns the compiled release.
#[must_use]
pub fn release() -> BiolinkModel {
    BiolinkModel {
        version: MODEL_VERSION,
        categories: categories(),
        predicates: predicates(),
    }
}

fn categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition {
            curie: "biolink:NamedThing",
            parent: None,
            id_prefixes: &[],
        },
        CategoryDefinition {
            curie: "biolink:BiologicalEntity",
            parent: Some("biolink:NamedThing"),
            id_prefixes: &[],
        },
        // Chemical branch
        CategoryDefinition {
            curie: "biolink:ChemicalEntity",
            parent: Some("biolink:NamedThing"),
            id_prefixes: &["CHEBI", "UNII", "PUBCHEM.COMPOUND", "INCHIKEY"],
        },
        CategoryDefinition {
            curie: "biolink:MolecularEntity",
            parent: Some("biolink:ChemicalEntity"),
            id_prefixes: &["CHEBI", "PUBCHEM.COMPOUND", "INCHIKEY"],
        },
        CategoryDefinition {
            curie: "biolink:SmallMolecule",
            parent: Some("biolink:MolecularEntity"),
            id_prefixes: &["CHEBI", "PUBCHEM.COMPOUND", "DRUGBANK", "INCHIKEY", "UNII"],
        },
        CategoryDefinition {
            curie: "biolink:Drug",
            parent: Some("biolink:ChemicalEntity"),
            id_prefixes: &["RXCUI", "NDC", "DRUGBANK", "UNII"],
        },
        // Disease and phenotype branch
        CategoryDefinition {
            curie: "biolink:DiseaseOrPhenotypicFeature",
            parent: Some("biolink:BiologicalEntity"),
            id_prefixes: &["MONDO", "HP"],
        },
        CategoryDefinition {
            curie: "biolink:Disease",
            parent: Some("biolink:DiseaseOrPhenotypicFeature"),
            id_prefixes: &["MONDO", "DOID", "OMIM", "MESH", "NCIT"],
        },
        CategoryDefinition {
            curie: "biolink:PhenotypicFeature",
            parent: Some("biolink:DiseaseOrPhenotypicFeature"),
            id_prefixes: &["HP", "EFO", "NCIT"],
        },
        // Gene and gene-product branch
        CategoryDefinition {
            curie: "biolink:Gene",
            parent: Some("biolink:BiologicalEntity"),
            id_prefixes: &["NCBIGene", "ENSEMBL", "HGNC", "MGI"],
        },
        CategoryDefinition {
            curie: "biolink:Protein",
            parent: Some("biolink:BiologicalEntity"),
            id_prefixes: &["UniProtKB", "PR", "ENSEMBL"],
        },
        // Anatomy
        CategoryDefinition {
            curie: "biolink:AnatomicalEntity",
            parent: Some("biolink:BiologicalEntity"),
            id_prefixes: &["UBERON"],
        },
        CategoryDefinition {
            curie: "biolink:Cell",
            parent: Some("biolink:AnatomicalEntity"),
            id_prefixes: &["CL"],
        },
        // Processes
        CategoryDefinition {
            curie: "biolink:BiologicalProcessOrActivity",
            parent: Some("biolink:BiologicalEntity"),
            id_prefixes: &["GO", "REACT"],
        },
        CategoryDefinition {
            curie: "biolink:Pathway",
            parent: Some("biolink:BiologicalProcessOrActivity"),
            id_prefixes: &["GO", "REACT"],
        },
    ]
}

fn predicates() -> Vec<PredicateDefinition> {
    vec![
        PredicateDefinition {
            curie: "biolink:related_to",
            parent: None,
            inverse: None,
            symmetric: true,
        },
        // Causal and effect slots
        PredicateDefinition {
            curie: "biolink:affects",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:affected_by"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:affected_by",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:affects"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:treats",
            parent: Some("biolink:affects"),
            inverse: Some("biolink:treated_by"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:treated_by",
            parent: Some("biolink:affected_by"),
            inverse: Some("biolink:treats"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:contributes_to",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:contribution_from"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:contribution_from",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:contributes_to"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:causes",
            parent: Some("biolink:contributes_to"),
            inverse: Some("biolink:caused_by"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:caused_by",
            parent: Some("biolink:contribution_from"),
            inverse: Some("biolink:causes"),
            symmetric: false,
        },
        // Interaction slots
        PredicateDefinition {
            curie: "biolink:interacts_with",
            parent: Some("biolink:related_to"),
            inverse: None,
            symmetric: true,
        },
        PredicateDefinition {
            curie: "biolink:physically_interacts_with",
            parent: Some("biolink:interacts_with"),
            inverse: None,
            symmetric: true,
        },
        PredicateDefinition {
            curie: "biolink:directly_physically_interacts_with",
            parent: Some("biolink:physically_interacts_with"),
            inverse: None,
            symmetric: true,
        },
        // Phenotype and condition slots
        PredicateDefinition {
            curie: "biolink:has_phenotype",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:phenotype_of"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:phenotype_of",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:has_phenotype"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:gene_associated_with_condition",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:condition_associated_with_gene"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:condition_associated_with_gene",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:gene_associated_with_condition"),
            symmetric: false,
        },
        // Hierarchy slots
        PredicateDefinition {
            curie: "biolink:subclass_of",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:superclass_of"),
            symmetric: false,
        },
        PredicateDefinition {
            curie: "biolink:superclass_of",
            parent: Some("biolink:related_to"),
            inverse: Some("biolink:subclass_of"),
            symmetric: false,
        },
    ]
}
