//! Query templates: the structurally distinct one-hop queries derived from
//! a single statement.
//!
//! Each template either anchors one end of the statement and opens the
//! other, or generalizes an element (category, predicate) before anchoring.
//! Generation is pure: the same asset and model always produce the same
//! query, and the asset is never mutated.

use serde_json::{json, Value};

use onehop_biolink::BiolinkModel;

use crate::asset::TestAsset;

/// Query-graph node key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QNode {
    /// The `"a"` node (statement subject position).
    A,
    /// The `"b"` node (statement object position).
    B,
}

impl QNode {
    /// Returns the node key used in the query graph.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QNode::A => "a",
            QNode::B => "b",
        }
    }
}

/// Which end of the original statement a recovered answer corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeElement {
    /// The statement subject.
    Subject,
    /// The statement object.
    Object,
}

/// Where the expected answer must appear in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerLocation {
    /// Which statement end is expected back.
    pub element: EdgeElement,
    /// Which query-graph node the answer binds to.
    pub qnode: QNode,
}

/// A well-formed query plus the location its answer must appear at.
#[derive(Debug, Clone)]
pub struct GeneratedQuery {
    /// The TRAPI request body.
    pub request: Value,
    /// Expected answer location.
    pub location: AnswerLocation,
}

/// Outcome of applying a template to an asset.
#[derive(Debug, Clone)]
pub enum TemplateOutcome {
    /// A query was generated and should be dispatched.
    Query(GeneratedQuery),
    /// The template does not apply to this asset. The context string is
    /// pipe-delimited: `"{template_name}|{identifier}"`.
    Skip {
        /// Pipe-delimited template/identifier context.
        context: String,
        /// Human-readable reason.
        reason: String,
    },
    /// The template could not build a valid query. Same context format as
    /// [`TemplateOutcome::Skip`]; the run translates this into a
    /// `critical.trapi.request.invalid` message.
    Invalid {
        /// Pipe-delimited template/identifier context.
        context: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// The seven one-hop query templates, in canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryTemplate {
    /// Anchor the known subject, open object.
    BySubject,
    /// Anchor the known object, open subject.
    ByObject,
    /// Swap roles through the predicate's inverse; the original object
    /// becomes the new anchored subject.
    InverseByNewSubject,
    /// Anchor the subject under its parent category.
    RaiseSubjectEntity,
    /// Anchor the object under its parent category.
    RaiseObjectEntity,
    /// Anchor the subject, open the object under its parent category.
    RaiseObjectBySubject,
    /// Anchor the subject, querying through the parent predicate.
    RaisePredicateBySubject,
}

impl QueryTemplate {
    /// Every template, in canonical order.
    pub const ALL: [QueryTemplate; 7] = [
        QueryTemplate::BySubject,
        QueryTemplate::ByObject,
        QueryTemplate::InverseByNewSubject,
        QueryTemplate::RaiseSubjectEntity,
        QueryTemplate::RaiseObjectEntity,
        QueryTemplate::RaiseObjectBySubject,
        QueryTemplate::RaisePredicateBySubject,
    ];

    /// Returns the template name used in composite test-case ids.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            QueryTemplate::BySubject => "by_subject",
            QueryTemplate::ByObject => "by_object",
            QueryTemplate::InverseByNewSubject => "inverse_by_new_subject",
            QueryTemplate::RaiseSubjectEntity => "raise_subject_entity",
            QueryTemplate::RaiseObjectEntity => "raise_object_entity",
            QueryTemplate::RaiseObjectBySubject => "raise_object_by_subject",
            QueryTemplate::RaisePredicateBySubject => "raise_predicate_by_subject",
        }
    }

    /// Generates the TRAPI query for an asset, or explains why it cannot.
    #[must_use]
    pub fn generate(self, asset: &TestAsset, model: &BiolinkModel) -> TemplateOutcome {
        match self {
            QueryTemplate::BySubject => query(
                one_hop_request(
                    Some(&asset.subject_id),
                    &asset.subject_category,
                    &asset.predicate_id,
                    None,
                    &asset.object_category,
                ),
                EdgeElement::Object,
                QNode::B,
            ),
            QueryTemplate::ByObject => query(
                one_hop_request(
                    None,
                    &asset.subject_category,
                    &asset.predicate_id,
                    Some(&asset.object_id),
                    &asset.object_category,
                ),
                EdgeElement::Subject,
                QNode::A,
            ),
            QueryTemplate::InverseByNewSubject => {
                let Some(inverse) = model.inverse_predicate(&asset.predicate_id) else {
                    return TemplateOutcome::Invalid {
                        context: self.piped_context(&asset.predicate_id),
                        reason: format!("predicate {} has no inverse", asset.predicate_id),
                    };
                };
                // Roles swap: the original object is pinned as the new
                // subject, and the original subject is expected back at "b".
                query(
                    one_hop_request(
                        Some(&asset.object_id),
                        &asset.object_category,
                        inverse,
                        None,
                        &asset.subject_category,
                    ),
                    EdgeElement::Subject,
                    QNode::B,
                )
            }
            QueryTemplate::RaiseSubjectEntity => {
                let Some(parent) = model.parent_category(&asset.subject_category) else {
                    return self.skip_no_parent_category(&asset.subject_category);
                };
                query(
                    one_hop_request(
                        Some(&asset.subject_id),
                        parent,
                        &asset.predicate_id,
                        None,
                        &asset.object_category,
                    ),
                    EdgeElement::Object,
                    QNode::B,
                )
            }
            QueryTemplate::RaiseObjectEntity => {
                let Some(parent) = model.parent_category(&asset.object_category) else {
                    return self.skip_no_parent_category(&asset.object_category);
                };
                query(
                    one_hop_request(
                        None,
                        &asset.subject_category,
                        &asset.predicate_id,
                        Some(&asset.object_id),
                        parent,
                    ),
                    EdgeElement::Subject,
                    QNode::A,
                )
            }
            QueryTemplate::RaiseObjectBySubject => {
                let Some(parent) = model.parent_category(&asset.object_category) else {
                    return self.skip_no_parent_category(&asset.object_category);
                };
                query(
                    one_hop_request(
                        Some(&asset.subject_id),
                        &asset.subject_category,
                        &asset.predicate_id,
                        None,
                        parent,
                    ),
                    EdgeElement::Object,
                    QNode::B,
                )
            }
            QueryTemplate::RaisePredicateBySubject => {
                if !model.is_predicate(&asset.predicate_id) {
                    return TemplateOutcome::Invalid {
                        context: self.piped_context(&asset.predicate_id),
                        reason: format!("unknown predicate {}", asset.predicate_id),
                    };
                }
                let Some(parent) = model.parent_predicate(&asset.predicate_id) else {
                    return TemplateOutcome::Skip {
                        context: self.piped_context(&asset.predicate_id),
                        reason: format!(
                            "predicate {} is already the most general",
                            asset.predicate_id
                        ),
                    };
                };
                query(
                    one_hop_request(
                        Some(&asset.subject_id),
                        &asset.subject_category,
                        parent,
                        None,
                        &asset.object_category,
                    ),
                    EdgeElement::Object,
                    QNode::B,
                )
            }
        }
    }

    fn piped_context(self, identifier: &str) -> String {
        format!("{}|{}", self.name(), identifier)
    }

    fn skip_no_parent_category(self, category: &str) -> TemplateOutcome {
        TemplateOutcome::Skip {
            context: self.piped_context(category),
            reason: format!("category {category} has no broader category"),
        }
    }
}

fn query(request: Value, element: EdgeElement, qnode: QNode) -> TemplateOutcome {
    TemplateOutcome::Query(GeneratedQuery {
        request,
        location: AnswerLocation { element, qnode },
    })
}

/// Builds the canonical one-hop query graph. Node `"a"` takes the subject
/// role and `"b"` the object role; a pinned end carries an `ids` list.
#[must_use]
pub fn one_hop_request(
    subject_id: Option<&str>,
    subject_category: &str,
    predicate: &str,
    object_id: Option<&str>,
    object_category: &str,
) -> Value {
    let mut request = json!({
        "message": {
            "query_graph": {
                "nodes": {
                    "a": { "categories": [subject_category] },
                    "b": { "categories": [object_category] }
                },
                "edges": {
                    "ab": {
                        "subject": "a",
                        "object": "b",
                        "predicates": [predicate]
                    }
                }
            },
            "knowledge_graph": { "nodes": {}, "edges": {} },
            "results": []
        }
    });
    if let Some(id) = subject_id {
        request["message"]["query_graph"]["nodes"]["a"]["ids"] = json!([id]);
    }
    if let Some(id) = object_id {
        request["message"]["query_graph"]["nodes"]["b"]["ids"] = json!([id]);
    }
    request
}

/// Applies session runner directives to a generated query. The only
/// recognized directive is `"inferred"`, which marks every query edge as
/// answerable by inference.
pub fn apply_runner_settings(request: &mut Value, settings: &[String]) {
    let inferred = settings
        .iter()
        .any(|setting| setting.eq_ignore_ascii_case("inferred"));
    if !inferred {
        return;
    }
    let edges = request
        .pointer_mut("/message/query_graph/edges")
        .and_then(Value::as_object_mut);
    if let Some(edges) = edges {
        for edge in edges.values_mut() {
            if let Some(edge) = edge.as_object_mut() {
                edge.insert("knowledge_type".to_string(), json!("inferred"));
            }
        }
    }
}
