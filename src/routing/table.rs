//! The gateway's endpoint list.
//!
//! Each service prefix owns a group of endpoints. Endpoints declare the verb
//! they accept, how their body is checked before forwarding, and whether
//! they are plain forwards or catalog lookups.

use axum::http::Method;

use crate::catalog::ConfigurationKind;
use crate::config::GatewayConfig;
use crate::routing::matcher::{PathPattern, PathPrefixMatcher};
use crate::upstream::Backend;

/// A default filled into a JSON body when the field is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonDefault {
    Str(&'static str),
    Int(i64),
}

/// Field rules for a JSON body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonRule {
    /// Fields that must be present, non-null and non-empty.
    pub required: &'static [&'static str],
    /// Fields filled in when absent.
    pub defaults: &'static [(&'static str, JsonDefault)],
}

/// How an endpoint's request body is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyRule {
    /// Body is forwarded as-is (GET routes).
    Passthrough,
    /// Buffered, validated JSON object.
    Json(JsonRule),
    /// `multipart/form-data`, streamed without buffering.
    Multipart,
}

/// What the gateway does once an endpoint matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward to the service that owns the prefix.
    Forward,
    /// Configuration lookup; served from the static catalog when one is loaded.
    Catalog(ConfigurationKind),
}

/// A single declared endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Route identifier for logging/metrics.
    pub name: &'static str,
    pub method: Method,
    pub pattern: PathPattern,
    pub body: BodyRule,
    pub action: Action,
}

impl Endpoint {
    fn new(name: &'static str, method: Method, pattern: &'static str, body: BodyRule) -> Self {
        Self {
            name,
            method,
            pattern: PathPattern::parse(pattern),
            body,
            action: Action::Forward,
        }
    }

    fn catalog(name: &'static str, pattern: &'static str, kind: ConfigurationKind) -> Self {
        Self {
            action: Action::Catalog(kind),
            ..Self::new(name, Method::GET, pattern, BodyRule::Passthrough)
        }
    }
}

/// A route prefix and the upstream it maps to.
#[derive(Debug, Clone)]
pub struct ServiceRoute {
    pub matcher: PathPrefixMatcher,
    pub backend: Backend,
    /// Replaces the route prefix in the upstream URL.
    pub upstream_prefix: String,
    /// Sorted most specific first.
    pub endpoints: Vec<Endpoint>,
}

impl ServiceRoute {
    fn new(
        prefix: &'static str,
        backend: Backend,
        upstream_prefix: impl Into<String>,
        mut endpoints: Vec<Endpoint>,
    ) -> Self {
        endpoints.sort_by_key(|e| std::cmp::Reverse(e.pattern.specificity()));
        Self {
            matcher: PathPrefixMatcher::new(prefix),
            backend,
            upstream_prefix: upstream_prefix.into(),
            endpoints,
        }
    }
}

const WIKIPEDIA: JsonRule = JsonRule {
    required: &["url"],
    defaults: &[],
};

const SUBMIT_SCRIPT: JsonRule = JsonRule {
    required: &["content"],
    defaults: &[],
};

const CREATE_SCRIPT: JsonRule = JsonRule {
    required: &[
        "content",
        "script_type",
        "language",
        "voice_id",
        "style_description",
    ],
    defaults: &[
        ("target_audience", JsonDefault::Str("general")),
        ("duration_seconds", JsonDefault::Int(300)),
        ("tone", JsonDefault::Str("informative")),
    ],
};

/// Build the service routes for a configuration.
pub fn service_routes(config: &GatewayConfig) -> Vec<ServiceRoute> {
    use ConfigurationKind::*;

    vec![
        ServiceRoute::new(
            "/api/collections",
            Backend::DataCollector,
            "/api/collections",
            vec![
                Endpoint::new(
                    "upload_file",
                    Method::POST,
                    "/api/collections/upload-file",
                    BodyRule::Multipart,
                ),
                Endpoint::new(
                    "process_wikipedia",
                    Method::POST,
                    "/api/collections/wikipedia",
                    BodyRule::Json(WIKIPEDIA),
                ),
                Endpoint::new(
                    "submit_script",
                    Method::POST,
                    "/api/collections/script",
                    BodyRule::Json(SUBMIT_SCRIPT),
                ),
                Endpoint::new(
                    "list_collections",
                    Method::GET,
                    "/api/collections",
                    BodyRule::Passthrough,
                ),
                Endpoint::new(
                    "get_collection",
                    Method::GET,
                    "/api/collections/{collection_id}",
                    BodyRule::Passthrough,
                ),
            ],
        ),
        ServiceRoute::new(
            "/api/scripts",
            Backend::ScriptGenerator,
            config.upstreams.script_generator_path_prefix.trim_end_matches('/'),
            vec![
                Endpoint::new(
                    "create_script",
                    Method::POST,
                    "/api/scripts",
                    BodyRule::Json(CREATE_SCRIPT),
                ),
                Endpoint::new(
                    "get_script_status",
                    Method::GET,
                    "/api/scripts/{script_id}/status",
                    BodyRule::Passthrough,
                ),
                Endpoint::new(
                    "get_script",
                    Method::GET,
                    "/api/scripts/{script_id}",
                    BodyRule::Passthrough,
                ),
            ],
        ),
        ServiceRoute::new(
            "/api/configurations",
            Backend::DataCollector,
            "/api/configurations",
            vec![
                Endpoint::catalog("list_styles", "/api/configurations/styles", Styles),
                Endpoint::catalog("list_languages", "/api/configurations/languages", Languages),
                Endpoint::catalog("list_voices", "/api/configurations/voices", Voices),
                Endpoint::catalog(
                    "list_visual_styles",
                    "/api/configurations/visual-styles",
                    VisualStyles,
                ),
                Endpoint::catalog(
                    "list_target_audiences",
                    "/api/configurations/target-audiences",
                    TargetAudiences,
                ),
                Endpoint::catalog("list_durations", "/api/configurations/durations", Durations),
            ],
        ),
    ]
}
