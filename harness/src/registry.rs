//! Deployment environments and component endpoint resolution.
//!
//! Targets are named by their `infores` identifier. The [`ComponentRegistry`]
//! trait is the lookup seam: the bundled [`StaticRegistry`] resolves the
//! known Translator deployments, and tests substitute their own registry to
//! point runs at local mock services.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

/// Reserved component name that routes queries through the ARS rather than
/// an individual service.
pub const ARS_COMPONENT: &str = "ars";

/// Deployment tier a validation run targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestEnvironment {
    /// Development tier.
    Dev,
    /// Continuous-integration tier.
    Ci,
    /// Pre-production test tier.
    Test,
    /// Production tier.
    Prod,
}

impl TestEnvironment {
    /// All environments, ordered from development to production.
    pub const ALL: [TestEnvironment; 4] = [
        TestEnvironment::Dev,
        TestEnvironment::Ci,
        TestEnvironment::Test,
        TestEnvironment::Prod,
    ];

    /// Short lowercase name used in hostnames and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TestEnvironment::Dev => "dev",
            TestEnvironment::Ci => "ci",
            TestEnvironment::Test => "test",
            TestEnvironment::Prod => "prod",
        }
    }

    /// Base URL of the Autonomous Relay System in this environment.
    #[must_use]
    pub fn ars_endpoint(&self) -> String {
        format!("https://{}.transltr.io/ars/api", self.as_str())
    }
}

impl fmt::Display for TestEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an environment name is not recognized.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown environment {name:?} (expected dev, ci, test, or prod)")]
pub struct UnknownEnvironmentError {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for TestEnvironment {
    type Err = UnknownEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(TestEnvironment::Dev),
            "ci" => Ok(TestEnvironment::Ci),
            "test" => Ok(TestEnvironment::Test),
            "prod" => Ok(TestEnvironment::Prod),
            _ => Err(UnknownEnvironmentError {
                name: s.to_string(),
            }),
        }
    }
}

/// Role a component plays in the Translator stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    /// Autonomous relay agent: answers arbitrary one-hop queries by
    /// delegating to knowledge providers.
    Ara,
    /// Knowledge provider: serves edges from its own sources.
    Kp,
}

impl ComponentRole {
    /// Uppercase role label used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentRole::Ara => "ARA",
            ComponentRole::Kp => "KP",
        }
    }
}

/// Maps a short component name to its `infores` identifier.
///
/// Names already carrying the `infores:` prefix are passed through. Unknown
/// names fall back to the name itself, prefixed.
#[must_use]
pub fn component_infores(name: &str) -> String {
    if name.starts_with("infores:") {
        return name.to_string();
    }
    let suffix = match name {
        "arax" => "arax",
        "aragorn" => "aragorn",
        "bte" => "biothings-explorer",
        "improving" => "improving-agent",
        "molepro" => "molepro",
        other => other,
    };
    format!("infores:{suffix}")
}

/// Resolved endpoint for one component in one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMetadata {
    /// Base URL of the component's TRAPI service.
    pub url: String,
    /// The component's `infores` identifier.
    pub infores: String,
}

/// Resolves component endpoints per environment.
///
/// Resolution is infallible by contract: a component with no deployment in
/// the requested environment resolves to `None`, and the caller records the
/// target as skipped rather than failing the run.
#[async_trait]
pub trait ComponentRegistry: Send + Sync {
    /// Looks up the endpoint for `infores` in `environment`.
    async fn resolve(
        &self,
        role: ComponentRole,
        infores: &str,
        environment: TestEnvironment,
    ) -> Option<EndpointMetadata>;
}

struct Deployment {
    infores: &'static str,
    role: ComponentRole,
    host: &'static str,
    path: &'static str,
}

const DEPLOYMENTS: &[Deployment] = &[
    Deployment {
        infores: "arax",
        role: ComponentRole::Ara,
        host: "arax",
        path: "/api/arax/v1.4",
    },
    Deployment {
        infores: "aragorn",
        role: ComponentRole::Ara,
        host: "aragorn",
        path: "/aragorn",
    },
    Deployment {
        infores: "biothings-explorer",
        role: ComponentRole::Ara,
        host: "bte",
        path: "/v1",
    },
    Deployment {
        infores: "improving-agent",
        role: ComponentRole::Ara,
        host: "ia",
        path: "/api/v1.4",
    },
    Deployment {
        infores: "molepro",
        role: ComponentRole::Kp,
        host: "molepro-trapi",
        path: "/molepro/trapi/v1.5",
    },
];

/// Registry over the fixed set of known Translator deployments.
///
/// Production services live at `https://{host}.transltr.io`; every other
/// environment inserts its tier into the hostname.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRegistry;

#[async_trait]
impl ComponentRegistry for StaticRegistry {
    async fn resolve(
        &self,
        role: ComponentRole,
        infores: &str,
        environment: TestEnvironment,
    ) -> Option<EndpointMetadata> {
        let bare = infores.strip_prefix("infores:").unwrap_or(infores);
        let deployment = DEPLOYMENTS
            .iter()
            .find(|d| d.role == role && d.infores == bare)?;
        let url = match environment {
            TestEnvironment::Prod => {
                format!("https://{}.transltr.io{}", deployment.host, deployment.path)
            }
            tier => format!(
                "https://{}.{}.transltr.io{}",
                deployment.host,
                tier.as_str(),
                deployment.path
            ),
        };
        Some(EndpointMetadata {
            url,
            infores: format!("infores:{}", deployment.infores),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environments_parse_from_their_names() {
        for environment in TestEnvironment::ALL {
            let parsed = environment.as_str().parse::<TestEnvironment>();
            assert_eq!(parsed.ok(), Some(environment));
        }
        assert!("staging".parse::<TestEnvironment>().is_err());
        assert_eq!(
            " Prod ".parse::<TestEnvironment>().ok(),
            Some(TestEnvironment::Prod)
        );
    }

    #[test]
    fn ars_endpoints_follow_the_environment() {
        assert_eq!(
            TestEnvironment::Ci.ars_endpoint(),
            "https://ci.transltr.io/ars/api"
        );
        assert_eq!(
            TestEnvironment::Prod.ars_endpoint(),
            "https://prod.transltr.io/ars/api"
        );
    }

    #[test]
    fn short_names_map_to_infores_identifiers() {
        assert_eq!(component_infores("arax"), "infores:arax");
        assert_eq!(component_infores("bte"), "infores:biothings-explorer");
        assert_eq!(component_infores("improving"), "infores:improving-agent");
        assert_eq!(component_infores("molepro"), "infores:molepro");
        assert_eq!(component_infores("unregistered"), "infores:unregistered");
        assert_eq!(component_infores("infores:aragorn"), "infores:aragorn");
    }

    #[tokio::test]
    async fn production_hosts_omit_the_tier() {
        let registry = StaticRegistry;
        let resolved = registry
            .resolve(ComponentRole::Ara, "infores:arax", TestEnvironment::Prod)
            .await;
        assert_eq!(
            resolved.map(|m| m.url),
            Some("https://arax.transltr.io/api/arax/v1.4".to_string())
        );
    }

    #[tokio::test]
    async fn non_production_hosts_carry_the_tier() {
        let registry = StaticRegistry;
        let resolved = registry
            .resolve(
                ComponentRole::Ara,
                "infores:biothings-explorer",
                TestEnvironment::Test,
            )
            .await;
        assert_eq!(
            resolved.map(|m| m.url),
            Some("https://bte.test.transltr.io/v1".to_string())
        );
    }

    #[tokio::test]
    async fn lookup_accepts_bare_identifiers() {
        let registry = StaticRegistry;
        let resolved = registry
            .resolve(ComponentRole::Kp, "molepro", TestEnvironment::Ci)
            .await;
        assert_eq!(
            resolved.map(|m| m.infores),
            Some("infores:molepro".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_components_resolve_to_none() {
        let registry = StaticRegistry;
        let resolved = registry
            .resolve(
                ComponentRole::Ara,
                "infores:unregistered",
                TestEnvironment::Dev,
            )
            .await;
        assert!(resolved.is_none());
        let wrong_role = registry
            .resolve(ComponentRole::Kp, "infores:arax", TestEnvironment::Dev)
            .await;
        assert!(wrong_role.is_none());
    }
}
