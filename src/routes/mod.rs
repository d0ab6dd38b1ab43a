// HTTP routes under /api/v1

mod http;

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::MonitorError;
use crate::models::DurationCatalog;
use crate::query::{QueryEngine, RankingReducer};
use crate::store::MetricsStore;
use crate::sysinfo_repo::HostProbe;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: QueryEngine,
    pub(crate) reducer: RankingReducer,
    pub(crate) probe: Arc<dyn HostProbe>,
    pub(crate) catalog: Arc<DurationCatalog>,
    pub(crate) config: AppConfig,
}

impl AppState {
    pub(crate) fn deadline(&self) -> Duration {
        Duration::from_secs(self.config.server.query_timeout_secs)
    }
}

pub fn app(store: Arc<dyn MetricsStore>, probe: Arc<dyn HostProbe>, config: AppConfig) -> Router {
    let state = AppState {
        engine: QueryEngine::new(store.clone()),
        reducer: RankingReducer::new(store, config.monitoring.process_rank_cap),
        probe,
        catalog: Arc::new(config.catalog()),
        config,
    };
    let cors = cors_layer(&state.config.server.cors_origins);
    Router::new()
        .route("/api/v1/monitor", get(http::monitor_columns_handler)) // GET /api/v1/monitor
        .route("/api/v1/monitor/json", get(http::monitor_rows_handler)) // GET /api/v1/monitor/json
        .route("/api/v1/monitor/durations", get(http::durations_handler))
        .route(
            "/api/v1/monitor/metrics-interval",
            get(http::metrics_interval_handler),
        )
        .route("/api/v1/monitor/process-cpu", get(http::process_cpu_handler))
        .route("/api/v1/misc/version", get(http::version_handler))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods([Method::GET]);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

impl IntoResponse for MonitorError {
    fn into_response(self) -> Response {
        let status = match &self {
            MonitorError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            MonitorError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MonitorError::Probe(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MonitorError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        };
        if status.is_server_error() {
            tracing::warn!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
