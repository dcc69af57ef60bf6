//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auth_routes, cart_routes, mpesa_routes, mpesa_webhook_routes, order_admin_routes,
    order_routes, product_admin_routes, product_public_routes, seed_routes,
};
use super::middleware::{
    auth_middleware, rate_limit_auth_middleware, rate_limit_middleware, require_admin,
    require_customer,
};
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let auth = auth_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_auth_middleware,
    ));

    let public = Router::new()
        .merge(product_public_routes())
        .merge(mpesa_webhook_routes());

    // Layers run bottom-up: rate limit, then token, then role.
    let customer = Router::new()
        .merge(cart_routes())
        .merge(order_routes())
        .merge(mpesa_routes())
        .route_layer(middleware::from_fn(require_customer))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let admin = Router::new()
        .merge(product_admin_routes())
        .merge(order_admin_routes())
        .merge(seed_routes())
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/api/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(auth)
        .merge(public)
        .merge(customer)
        .merge(admin)
        .layer(cors_layer(&state.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `*` allows any origin; otherwise only the listed, parseable origins.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Database and Redis connectivity
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result(state.database.ping().await);
    let redis = ServiceStatus::from_result(state.cache.ping().await);

    let all_healthy = database.is_healthy() && redis.is_healthy();
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if all_healthy { "healthy" } else { "degraded" },
            services: ServiceHealth { database, redis },
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request};
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;

    use crate::errors::AppError;
    use crate::infra::{Database, MockCacheStore};
    use crate::services::{
        Claims, MockAuthService, MockCartService, MockOrderService, MockPaymentService,
        MockProductService, MockSeedService,
    };

    struct Mocks {
        auth: MockAuthService,
        products: MockProductService,
        carts: MockCartService,
        cache: MockCacheStore,
    }

    impl Mocks {
        fn new() -> Self {
            let mut cache = MockCacheStore::new();
            cache
                .expect_check_rate_limit()
                .returning(|_, _, _| Ok((1, true)));
            cache.expect_ping().returning(|| Ok(()));

            Self {
                auth: MockAuthService::new(),
                products: MockProductService::new(),
                carts: MockCartService::new(),
                cache,
            }
        }

        fn token_for(mut self, role: &'static str) -> Self {
            self.auth.expect_verify_token().returning(move |_| {
                Ok(Claims {
                    sub: 7,
                    email: "someone@example.com".into(),
                    role: role.into(),
                    exp: i64::MAX,
                    iat: 0,
                })
            });
            self
        }

        fn router(self, origins: &[&str]) -> Router {
            create_router(AppState {
                auth_service: Arc::new(self.auth),
                product_service: Arc::new(self.products),
                cart_service: Arc::new(self.carts),
                order_service: Arc::new(MockOrderService::new()),
                payment_service: Arc::new(MockPaymentService::new()),
                seed_service: Arc::new(MockSeedService::new()),
                cache: Arc::new(self.cache),
                database: Arc::new(Database::from_connection(DatabaseConnection::default())),
                cors_allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            })
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn authed(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, "Bearer token")
            .body(Body::empty())
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_product_renders_envelope() {
        let mut mocks = Mocks::new();
        mocks
            .products
            .expect_find_by_id()
            .returning(|_| Err(AppError::not_found("Product")));

        let response = mocks
            .router(&["*"])
            .oneshot(get("/v1/api/product/4a8c1f0e-55a3-4a89-9a0b-1f5d8f7e2c11"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json(response).await;
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_customer_routes_need_a_token() {
        let response = Mocks::new()
            .router(&["*"])
            .oneshot(get("/v1/api/orders"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_roles_do_not_overlap() {
        let response = Mocks::new()
            .token_for("admin")
            .router(&["*"])
            .oneshot(authed("GET", "/v1/api/cart"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = Mocks::new()
            .token_for("customer")
            .router(&["*"])
            .oneshot(authed("POST", "/v1/api/seed/all"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_customer_reaches_cart_handler() {
        let mut mocks = Mocks::new().token_for("customer");
        mocks
            .carts
            .expect_get_cart()
            .withf(|user_id| *user_id == 7)
            .returning(|user_id| Ok(crate::domain::CartResponse::empty(user_id)));

        let response = mocks
            .router(&["*"])
            .oneshot(authed("GET", "/v1/api/cart"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-RateLimit-Limit"));
        let body = json(response).await;
        assert_eq!(body["data"]["user_id"], 7);
        assert_eq!(body["data"]["total"], "0.00");
    }

    #[tokio::test]
    async fn test_health_reports_database_outage() {
        let response = Mocks::new()
            .router(&["*"])
            .oneshot(get("/api/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json(response).await;
        assert_eq!(body["services"]["database"]["status"], "unhealthy");
        assert_eq!(body["services"]["redis"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_cors_echoes_listed_origin_only() {
        let router = Mocks::new().router(&["http://shop.test", "not a valid\norigin"]);

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://shop.test")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://shop.test"
        );

        let request = Request::builder()
            .uri("/api/health")
            .header(header::ORIGIN, "http://evil.test")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert!(!response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
