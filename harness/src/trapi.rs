//! TRAPI protocol glue: version handling, structural component validation,
//! and the statement-recoverable check.
//!
//! The structural checks here are deliberately shallow. They confirm that a
//! payload has the shape the harness is about to rely on, with a fixed code
//! vocabulary, and leave deep schema conformance to the services' own
//! tooling.

use serde_json::Value;

use crate::asset::TestAsset;
use crate::messages::{codes, MessageLog, ValidationMessage};

/// TRAPI version assumed when no override is configured.
pub const DEFAULT_TRAPI_VERSION: &str = "1.5.0";

/// Normalizes a TRAPI version to its `v`-prefixed form (`"1.4.2"` becomes
/// `"v1.4.2"`). `None` yields the default version.
#[must_use]
pub fn normalize_trapi_version(requested: Option<&str>) -> String {
    let version = requested.unwrap_or(DEFAULT_TRAPI_VERSION).trim();
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

/// Which side of the TRAPI exchange a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapiComponent {
    /// An outgoing query.
    Query,
    /// A service response.
    Response,
}

/// Validates the structural shape of a TRAPI component, appending one
/// message per defect found.
pub fn validate_component(payload: &Value, component: TrapiComponent, log: &mut MessageLog) {
    let Some(message) = payload.get("message").and_then(Value::as_object) else {
        let code = match component {
            TrapiComponent::Query => codes::REQUEST_MESSAGE_MISSING,
            TrapiComponent::Response => codes::RESPONSE_MESSAGE_MISSING,
        };
        log.report(ValidationMessage::new(code));
        return;
    };
    match component {
        TrapiComponent::Query => validate_query_graph(message, log),
        TrapiComponent::Response => validate_response_message(message, log),
    }
}

fn validate_query_graph(message: &serde_json::Map<String, Value>, log: &mut MessageLog) {
    let Some(query_graph) = message.get("query_graph").and_then(Value::as_object) else {
        log.report(ValidationMessage::new(codes::REQUEST_QUERY_GRAPH_MISSING));
        return;
    };

    let nodes = query_graph.get("nodes").and_then(Value::as_object);
    match nodes {
        Some(nodes) if !nodes.is_empty() => {
            for (key, node) in nodes {
                if node.get("ids").is_some_and(|ids| !is_string_list(ids)) {
                    log.report(
                        ValidationMessage::new(codes::REQUEST_NODE_IDS_INVALID)
                            .with_identifier(key),
                    );
                }
                if node
                    .get("categories")
                    .is_some_and(|categories| !is_curie_list(categories))
                {
                    log.report(
                        ValidationMessage::new(codes::REQUEST_NODE_CATEGORIES_INVALID)
                            .with_identifier(key),
                    );
                }
            }
        }
        _ => log.report(ValidationMessage::new(codes::REQUEST_NODES_EMPTY)),
    }

    match query_graph.get("edges").and_then(Value::as_object) {
        Some(edges) if !edges.is_empty() => {
            for (key, edge) in edges {
                for endpoint in ["subject", "object"] {
                    let bound = edge
                        .get(endpoint)
                        .and_then(Value::as_str)
                        .is_some_and(|node_key| {
                            nodes.is_some_and(|nodes| nodes.contains_key(node_key))
                        });
                    if !bound {
                        log.report(
                            ValidationMessage::new(codes::REQUEST_EDGE_UNKNOWN_NODE)
                                .with_identifier(key)
                                .with_context(endpoint),
                        );
                    }
                }
                if edge
                    .get("predicates")
                    .is_some_and(|predicates| !is_curie_list(predicates))
                {
                    log.report(
                        ValidationMessage::new(codes::REQUEST_EDGE_PREDICATES_INVALID)
                            .with_identifier(key),
                    );
                }
            }
        }
        _ => log.report(ValidationMessage::new(codes::REQUEST_EDGES_EMPTY)),
    }
}

fn validate_response_message(message: &serde_json::Map<String, Value>, log: &mut MessageLog) {
    match message.get("knowledge_graph").and_then(Value::as_object) {
        Some(graph) => {
            let nodes = graph.get("nodes").and_then(Value::as_object);
            if let Some(edges) = graph.get("edges").and_then(Value::as_object) {
                for (key, edge) in edges {
                    let intact = ["subject", "object"].into_iter().all(|endpoint| {
                        edge.get(endpoint).and_then(Value::as_str).is_some_and(|id| {
                            nodes.is_some_and(|nodes| nodes.contains_key(id))
                        })
                    });
                    if !intact {
                        log.report(
                            ValidationMessage::new(codes::RESPONSE_DANGLING_EDGE)
                                .with_identifier(key),
                        );
                    }
                }
            }
        }
        None => log.report(ValidationMessage::new(codes::RESPONSE_KNOWLEDGE_GRAPH_MISSING)),
    }

    match message.get("results").and_then(Value::as_array) {
        Some(results) => {
            for (index, result) in results.iter().enumerate() {
                let has_bindings = result
                    .get("node_bindings")
                    .and_then(Value::as_object)
                    .is_some_and(|bindings| !bindings.is_empty());
                if !has_bindings {
                    log.report(
                        ValidationMessage::new(codes::RESPONSE_NODE_BINDINGS_MISSING)
                            .with_identifier(index.to_string()),
                    );
                }
            }
        }
        None => log.report(ValidationMessage::new(codes::RESPONSE_RESULTS_MISSING)),
    }
}

fn is_string_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| {
        !items.is_empty()
            && items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| !s.is_empty()))
    })
}

fn is_curie_list(value: &Value) -> bool {
    value.as_array().is_some_and(|items| {
        !items.is_empty()
            && items
                .iter()
                .all(|item| item.as_str().is_some_and(|s| s.contains(':')))
    })
}

/// Returns true when a response body is missing or carries nothing.
#[must_use]
pub fn is_empty_response(body: Option<&Value>) -> bool {
    match body {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Cross-checks the version tags a response declares against the versions
/// the run was configured with. Missing or diverging tags are warnings.
pub fn check_response_versions(
    response: &Value,
    trapi_version: &str,
    biolink_version: &str,
    log: &mut MessageLog,
) {
    match response.get("schema_version").and_then(Value::as_str) {
        None => log.report(ValidationMessage::new(codes::SCHEMA_VERSION_MISSING)),
        Some(declared) => {
            if normalize_trapi_version(Some(declared)) == trapi_version {
                tracing::debug!(declared, "response TRAPI version matches the run");
            } else {
                log.report(
                    ValidationMessage::new(codes::SCHEMA_VERSION_MISMATCH)
                        .with_identifier(declared)
                        .with_extra("expected", Value::String(trapi_version.to_string())),
                );
            }
        }
    }
    match response.get("biolink_version").and_then(Value::as_str) {
        None => log.report(ValidationMessage::new(codes::BIOLINK_VERSION_MISSING)),
        Some(declared) => {
            if declared != biolink_version {
                log.report(
                    ValidationMessage::new(codes::BIOLINK_VERSION_MISMATCH)
                        .with_identifier(declared)
                        .with_extra("expected", Value::String(biolink_version.to_string())),
                );
            }
        }
    }
}

/// Checks whether the original statement is recoverable from a response.
///
/// The contract is strict: the knowledge graph must contain both endpoint
/// nodes and an edge matching the untransformed triple exactly, and at
/// least one result must bind both endpoint identifiers in its node
/// bindings. Query transformations (inverses, raised categories) never
/// loosen this check; recovery is always judged against the statement as
/// built.
#[must_use]
pub fn edge_recovered_in_response(asset: &TestAsset, response: &Value) -> bool {
    recovered(asset, response).unwrap_or(false)
}

fn recovered(asset: &TestAsset, response: &Value) -> Option<bool> {
    let message = response.get("message")?.as_object()?;
    let graph = message.get("knowledge_graph")?.as_object()?;

    let nodes = graph.get("nodes")?.as_object()?;
    if !nodes.contains_key(&asset.subject_id) || !nodes.contains_key(&asset.object_id) {
        return Some(false);
    }

    let edges = graph.get("edges")?.as_object()?;
    let edge_present = edges.values().any(|edge| {
        edge.get("subject").and_then(Value::as_str) == Some(asset.subject_id.as_str())
            && edge.get("predicate").and_then(Value::as_str) == Some(asset.predicate_id.as_str())
            && edge.get("object").and_then(Value::as_str) == Some(asset.object_id.as_str())
    });
    if !edge_present {
        return Some(false);
    }

    let results = message.get("results")?.as_array()?;
    let bound = results.iter().any(|result| {
        let Some(bindings) = result.get("node_bindings").and_then(Value::as_object) else {
            return false;
        };
        let ids: Vec<&str> = bindings
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|binding| binding.get("id").and_then(Value::as_str))
            .collect();
        ids.contains(&asset.subject_id.as_str()) && ids.contains(&asset.object_id.as_str())
    });
    Some(bound)
}


#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::asset::fixtures::treats_asset;
    use crate::templates::QueryTemplate;
    use onehop_biolink::BiolinkModel;

    #[test]
    fn version_normalization() {
        assert_eq!(normalize_trapi_version(Some("1.4.2")), "v1.4.2");
        assert_eq!(normalize_trapi_version(Some("v1.4.2")), "v1.4.2");
        assert_eq!(normalize_trapi_version(None), "v1.5.0");
    }

    #[test]
    fn generated_queries_validate_cleanly() {
        let asset = treats_asset();
        let model = BiolinkModel::compiled();
        for template in QueryTemplate::ALL {
            if let crate::templates::TemplateOutcome::Query(generated) =
                template.generate(&asset, model)
            {
                let mut log = MessageLog::new();
                validate_component(&generated.request, TrapiComponent::Query, &mut log);
                assert!(
                    !log.has_messages(),
                    "{} produced an invalid query: {:?}",
                    template.name(),
                    log.messages()
                );
            }
        }
    }

    #[test]
    fn request_without_message_is_critical() {
        let mut log = MessageLog::new();
        validate_component(&json!({}), TrapiComponent::Query, &mut log);
        assert_eq!(log.get_critical().len(), 1);
        assert!(log
            .get_critical()
            .contains_key(codes::REQUEST_MESSAGE_MISSING));
    }

    #[test]
    fn request_with_empty_graph_sections_is_flagged() {
        let mut log = MessageLog::new();
        validate_component(
            &json!({ "message": { "query_graph": { "nodes": {}, "edges": {} } } }),
            TrapiComponent::Query,
            &mut log,
        );
        let errors = log.get_errors();
        assert!(errors.contains_key(codes::REQUEST_NODES_EMPTY));
        assert!(errors.contains_key(codes::REQUEST_EDGES_EMPTY));
    }

    #[test]
    fn dangling_edge_endpoints_are_flagged() {
        let mut log = MessageLog::new();
        validate_component(
            &json!({
                "message": {
                    "query_graph": {
                        "nodes": { "a": { "categories": ["biolink:Disease"] } },
                        "edges": {
                            "ab": { "subject": "a", "object": "missing", "predicates": ["biolink:treats"] }
                        }
                    }
                }
            }),
            TrapiComponent::Query,
            &mut log,
        );
        let errors = log.get_errors();
        assert!(errors.contains_key(codes::REQUEST_EDGE_UNKNOWN_NODE));
    }

    #[test]
    fn bare_predicate_names_are_not_curies() {
        let mut log = MessageLog::new();
        validate_component(
            &json!({
                "message": {
                    "query_graph": {
                        "nodes": {
                            "a": { "ids": ["MONDO:0005301"] },
                            "b": {}
                        },
                        "edges": {
                            "ab": { "subject": "a", "object": "b", "predicates": ["treats"] }
                        }
                    }
                }
            }),
            TrapiComponent::Query,
            &mut log,
        );
        assert!(log
            .get_errors()
            .contains_key(codes::REQUEST_EDGE_PREDICATES_INVALID));
    }

    #[test]
    fn response_fixture_validates_cleanly() {
        let mut log = MessageLog::new();
        validate_component(
            &fixtures::response_with_edge(&treats_asset()),
            TrapiComponent::Response,
            &mut log,
        );
        assert!(!log.has_messages(), "{:?}", log.messages());
    }

    #[test]
    fn response_with_dangling_kg_edge_is_flagged() {
        let mut log = MessageLog::new();
        validate_component(
            &json!({
                "message": {
                    "knowledge_graph": {
                        "nodes": { "MONDO:0005301": {} },
                        "edges": {
                            "e01": {
                                "subject": "MONDO:0005301",
                                "predicate": "biolink:treats",
                                "object": "CHEBI:0000001"
                            }
                        }
                    },
                    "results": []
                }
            }),
            TrapiComponent::Response,
            &mut log,
        );
        assert!(log.get_errors().contains_key(codes::RESPONSE_DANGLING_EDGE));
    }

    #[test]
    fn empty_response_detection() {
        assert!(is_empty_response(None));
        assert!(is_empty_response(Some(&Value::Null)));
        assert!(is_empty_response(Some(&json!({}))));
        assert!(!is_empty_response(Some(&json!({ "message": {} }))));
    }

    #[test]
    fn missing_version_tags_warn() {
        let mut log = MessageLog::new();
        check_response_versions(&json!({ "message": {} }), "v1.5.0", "4.1.6", &mut log);
        let warnings = log.get_warnings();
        assert!(warnings.contains_key(codes::SCHEMA_VERSION_MISSING));
        assert!(warnings.contains_key(codes::BIOLINK_VERSION_MISSING));
    }

    #[test]
    fn matching_versions_do_not_warn() {
        let mut log = MessageLog::new();
        check_response_versions(
            &json!({ "schema_version": "1.5.0", "biolink_version": "4.1.6" }),
            "v1.5.0",
            "4.1.6",
            &mut log,
        );
        assert!(!log.has_messages());
    }

    #[test]
    fn diverging_versions_warn_with_the_declared_value() {
        let mut log = MessageLog::new();
        check_response_versions(
            &json!({ "schema_version": "1.4.0", "biolink_version": "3.5.0" }),
            "v1.5.0",
            "4.1.6",
            &mut log,
        );
        let warnings = log.get_warnings();
        assert!(warnings.contains_key(codes::SCHEMA_VERSION_MISMATCH));
        assert!(warnings.contains_key(codes::BIOLINK_VERSION_MISMATCH));
    }

    #[test]
    fn statement_is_recovered_from_a_complete_response() {
        let asset = treats_asset();
        let response = fixtures::response_with_edge(&asset);
        assert!(edge_recovered_in_response(&asset, &response));
    }

    #[test]
    fn recovery_requires_the_exact_predicate() {
        let asset = treats_asset();
        let mut response = fixtures::response_with_edge(&asset);
        response["message"]["knowledge_graph"]["edges"]["e01"]["predicate"] =
            json!("biolink:affects");
        assert!(!edge_recovered_in_response(&asset, &response));
    }

    #[test]
    fn recovery_requires_a_result_binding_both_endpoints() {
        let asset = treats_asset();
        let mut response = fixtures::response_with_edge(&asset);
        response["message"]["results"] = json!([
            { "node_bindings": { "b": [{ "id": asset.object_id }] } }
        ]);
        assert!(!edge_recovered_in_response(&asset, &response));
    }

    #[test]
    fn recovery_fails_without_a_knowledge_graph() {
        let asset = treats_asset();
        assert!(!edge_recovered_in_response(
            &asset,
            &json!({ "message": { "results": [] } })
        ));
    }
}
