//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up the matching endpoint for a request
//! - Build the upstream URL: base URL + upstream prefix + remaining path + query
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest matching prefix selects the service
//! - Explicit NotFound rather than silent default; nothing is sent upstream
//!   for an unknown path

use std::fmt;

use axum::http::{Method, Uri};

use crate::catalog::ConfigurationKind;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::routing::matcher::PathParams;
use crate::routing::table::{service_routes, Action, Endpoint, ServiceRoute};
use crate::upstream::Backend;

/// Where a matched request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    /// Forward to an upstream service at this exact URI.
    Upstream { backend: Backend, uri: Uri },
    /// Serve from the static configuration catalog.
    Catalog(ConfigurationKind),
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTarget::Upstream { backend, uri } => write!(f, "{} {}", backend.label(), uri),
            RouteTarget::Catalog(kind) => write!(f, "catalog:{kind}"),
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct ResolvedRoute<'a> {
    pub endpoint: &'a Endpoint,
    pub target: RouteTarget,
}

/// Immutable route table built once at startup.
#[derive(Debug)]
pub struct Router {
    services: Vec<ServiceRoute>,
    data_collector_url: String,
    script_generator_url: String,
    static_catalog: bool,
}

impl Router {
    /// Compile the route table from a validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut services = service_routes(config);
        // Longest prefix first so the first match is the longest match.
        services.sort_by_key(|s| std::cmp::Reverse(s.matcher.prefix().len()));

        Self {
            services,
            data_collector_url: config.upstreams.data_collector_url.trim_end_matches('/').to_string(),
            script_generator_url: config
                .upstreams
                .script_generator_url
                .trim_end_matches('/')
                .to_string(),
            static_catalog: config.catalog.static_dir.is_some(),
        }
    }

    /// Resolve a request to an endpoint and target.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<ResolvedRoute<'_>, GatewayError> {
        let path = normalize(path);

        let (service, rest) = self
            .services
            .iter()
            .find_map(|s| s.matcher.strip(path).map(|rest| (s, rest)))
            .ok_or_else(|| GatewayError::NotFound(format!("No route for {path}")))?;

        let mut allowed = Vec::new();
        let mut matched: Option<(&Endpoint, PathParams<'_>)> = None;
        for endpoint in &service.endpoints {
            if let Some(params) = endpoint.pattern.match_path(path) {
                if endpoint.method == *method {
                    matched = Some((endpoint, params));
                    break;
                }
                if !allowed.contains(&endpoint.method) {
                    allowed.push(endpoint.method.clone());
                }
            }
        }

        let (endpoint, params) = match matched {
            Some(m) => m,
            None if !allowed.is_empty() => {
                return Err(GatewayError::MethodNotAllowed {
                    method: method.clone(),
                    path: path.to_string(),
                    allowed,
                })
            }
            None => return Err(GatewayError::NotFound(format!("No route for {path}"))),
        };

        for (name, value) in params {
            if value == "." || value == ".." {
                return Err(GatewayError::Validation(format!("Invalid {name}: '{value}'")));
            }
        }

        let target = match endpoint.action {
            Action::Catalog(kind) if self.static_catalog => RouteTarget::Catalog(kind),
            Action::Catalog(_) | Action::Forward => RouteTarget::Upstream {
                backend: service.backend,
                uri: self.upstream_uri(service, rest, query)?,
            },
        };

        Ok(ResolvedRoute { endpoint, target })
    }

    fn upstream_uri(
        &self,
        service: &ServiceRoute,
        rest: &str,
        query: Option<&str>,
    ) -> Result<Uri, GatewayError> {
        let base = match service.backend {
            Backend::DataCollector => &self.data_collector_url,
            Backend::ScriptGenerator => &self.script_generator_url,
        };

        let mut url = format!("{base}{}{rest}", service.upstream_prefix);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        Uri::try_from(url.as_str())
            .map_err(|e| GatewayError::Internal(format!("invalid upstream URI '{url}': {e}")))
    }
}

/// Ignore a single trailing slash.
fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}
