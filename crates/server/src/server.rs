use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use tokio::time::Instant;

use std::{future::Future, sync::Arc, time::Duration};

use crate::{admin, credits, health, products, recommendation::Recommender, users};
use engine::Engine;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub recommender: Arc<Recommender>,
    /// Budget of every command; passed to the engine as its deadline.
    pub request_timeout: Duration,
}

impl ServerState {
    pub fn new(engine: Engine, recommender: Recommender, request_timeout: Duration) -> Self {
        Self {
            engine: Arc::new(engine),
            recommender: Arc::new(recommender),
            request_timeout,
        }
    }

    pub(crate) fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }
}

/// Log every request and echo (or assign) its `x-request-id`.
async fn request_log(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    let started = std::time::Instant::now();
    let mut response = next.run(request).await;
    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        %method,
        %path,
        status = status.as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request served"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/credits/purchase", post(credits::purchase))
        .route("/credits/packages", get(credits::list_packages))
        .route("/credits/packages/{id}", get(credits::get_package))
        .route("/products", get(products::list))
        .route("/products/search", get(products::search))
        .route("/products/redeem", post(products::redeem))
        .route("/users/{id}", get(users::get))
        .route("/users/{id}/purchases", get(users::purchases))
        .route("/users/{id}/redemptions", get(users::redemptions))
        .route("/ai/recommendation", post(crate::recommendation::recommend))
        .route("/admin/categories", post(admin::category_new))
        .route("/admin/packages", post(admin::package_new))
        .route("/admin/packages/{id}", put(admin::package_update))
        .route("/admin/products", post(admin::product_new))
        .route("/admin/products/{id}", put(admin::product_update))
        .route(
            "/admin/products/{id}/offer-status",
            put(admin::product_offer_status),
        )
        .layer(middleware::from_fn(request_log))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn run_with_listener<F>(
    state: ServerState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener, std::future::pending()).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
