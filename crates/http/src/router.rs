//! Router builder for the bookshelf HTTP server

use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use bookshelf_kernel::ModuleRegistry;

use crate::error::AppError;

/// Path a module is mounted under: `{base_path}/{module_name}`
pub fn mount_path(base_path: &str, module_name: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() || base.starts_with('/') {
        format!("{}/{}", base, module_name)
    } else {
        format!("/{}/{}", base, module_name)
    }
}

/// Builder for constructing the main HTTP router.
///
/// Middleware is recorded and applied in [`RouterBuilder::build`] so that it
/// wraps every route regardless of the order the builder methods are called.
pub struct RouterBuilder {
    router: Router,
    base_path: String,
    tracing: bool,
    cors: bool,
    request_id: bool,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            base_path: String::new(),
            tracing: false,
            cors: false,
            request_id: false,
        }
    }

    /// Prefix applied to every module mount path
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `{base_path}/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let path = mount_path(&self.base_path, module_name);
        self.router = self.router.nest(&path, module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }

    /// Add request ID middleware; the id is echoed on the response
    pub fn with_request_id(mut self) -> Self {
        self.request_id = true;
        self
    }

    /// Serve the merged OpenAPI document and Swagger UI
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = openapi_document(registry, &self.base_path);

        // Deserialize our JSON spec into a proper utoipa OpenApi object
        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "merged OpenAPI document is invalid; serving a stub");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Bookshelf API")
                            .version("1.0.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi_obj),
        );

        // Also serve the raw JSON spec for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        let mut router = self
            .router
            .fallback(|| async { AppError::not_found("Not Found") });

        if self.tracing {
            router = router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            );
        }

        if self.request_id {
            // Set must wrap propagate so the id exists before it is copied out.
            router = router
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        }

        if self.cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge the base document with every module's OpenAPI fragment.
pub fn openapi_document(registry: &ModuleRegistry, base_path: &str) -> Value {
    let mut openapi_spec = json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Bookshelf API",
            "version": "1.0.0",
            "description": "Book catalog REST API"
        },
        "paths": {},
        "components": {
            "schemas": {}
        }
    });

    openapi_spec["components"]["schemas"]["ErrorResponse"] = json!({
        "type": "object",
        "properties": {
            "error": {
                "type": "object",
                "properties": {
                    "message": {
                        "oneOf": [
                            { "type": "string" },
                            { "type": "array", "items": { "type": "string" } }
                        ]
                    },
                    "status": {
                        "type": "integer"
                    }
                },
                "required": ["message", "status"]
            }
        },
        "required": ["error"]
    });

    openapi_spec["paths"]["/healthz"] = json!({
        "get": {
            "summary": "Health check",
            "responses": {
                "200": {
                    "description": "OK",
                    "content": {
                        "text/plain": {
                            "schema": {
                                "type": "string"
                            }
                        }
                    }
                }
            }
        }
    });

    for module in registry.modules() {
        let Some(module_spec) = module.openapi() else {
            continue;
        };
        let prefix = mount_path(base_path, module.name());

        if let Some(paths) = module_spec.get("paths").and_then(Value::as_object) {
            for (path, path_item) in paths {
                // "/" is the module root itself
                let full_path = if path == "/" {
                    prefix.clone()
                } else {
                    format!("{}{}", prefix, path)
                };
                openapi_spec["paths"][full_path] = path_item.clone();
            }
        }

        if let Some(schemas) = module_spec
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        {
            for (schema_name, schema_def) in schemas {
                openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
            }
        }
    }

    openapi_spec
}

/// Request ID generator producing time-ordered UUIDs
#[derive(Clone)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct ShelfModule;

    #[async_trait::async_trait]
    impl bookshelf_kernel::Module for ShelfModule {
        fn name(&self) -> &'static str {
            "shelves"
        }

        fn routes(&self) -> Router {
            Router::new().route("/", get(|| async { "shelves" }))
        }

        fn openapi(&self) -> Option<Value> {
            Some(json!({
                "paths": {
                    "/": { "get": { "responses": { "200": { "description": "OK" } } } },
                    "/{id}": { "get": { "responses": { "200": { "description": "OK" } } } }
                },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    fn registry() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(ShelfModule));
        registry
    }

    async fn get_path(router: Router, path: &str) -> axum::response::Response {
        router
            .oneshot(
                axum::http::Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[test]
    fn mount_path_normalizes_base() {
        assert_eq!(mount_path("", "books"), "/books");
        assert_eq!(mount_path("/api", "books"), "/api/books");
        assert_eq!(mount_path("/api/", "books"), "/api/books");
        assert_eq!(mount_path("api", "books"), "/api/books");
    }

    #[tokio::test]
    async fn module_is_mounted_under_base_path() {
        let router = RouterBuilder::new()
            .with_base_path("/api")
            .mount_module("shelves", Router::new().route("/", get(|| async { "module" })))
            .build();

        let response = get_path(router, "/api/shelves").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"module");
    }

    #[tokio::test]
    async fn unknown_path_gets_error_envelope() {
        let router = RouterBuilder::new().build();

        let response = get_path(router, "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": {"message": "Not Found", "status": 404}}));
    }

    #[tokio::test]
    async fn middleware_applies_to_routes_added_later() {
        let router = RouterBuilder::new()
            .with_tracing()
            .with_cors()
            .with_request_id()
            .route("/health", get(|| async { "ok" }))
            .build();

        let response = get_path(router, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_document_prefixes_module_paths() {
        let document = openapi_document(&registry(), "");

        assert!(document["paths"]["/healthz"].is_object());
        assert!(document["paths"]["/shelves"].is_object());
        assert!(document["paths"]["/shelves/{id}"].is_object());
        assert!(document["components"]["schemas"]["Shelf"].is_object());
        assert!(document["components"]["schemas"]["ErrorResponse"].is_object());
    }

    #[tokio::test]
    async fn openapi_json_is_served() {
        let router = RouterBuilder::new().with_openapi(&registry()).build();

        let response = get_path(router, "/docs/openapi.json").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
