use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::api::action::{healthz, index, stress};
use crate::api::counter::RequestCounter;
use crate::config::config::Config;
use crate::metrics::{HostMetricsProvider, SysinfoHostMetrics};
use crate::stress::LoadGenerator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) metrics: Arc<dyn HostMetricsProvider>,
    pub(crate) generator: LoadGenerator,
    pub(crate) requests: Arc<RequestCounter>,
}

impl AppState {
    pub(crate) fn new(metrics: Arc<dyn HostMetricsProvider>, generator: LoadGenerator) -> Self {
        AppState {
            metrics,
            generator,
            requests: Arc::new(RequestCounter::new()),
        }
    }
}

pub(crate) fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/stress", get(stress))
        .route("/stress.php", get(stress))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(HandleErrorLayer::new(|error: BoxError| async move {
                    if error.is::<tower::timeout::error::Elapsed>() {
                        Ok(StatusCode::REQUEST_TIMEOUT)
                    } else {
                        Err((
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Unhandled internal error: {}", error),
                        ))
                    }
                }))
                .timeout(request_timeout)
                .into_inner(),
        )
        .with_state(state)
}

pub(crate) async fn start(mut configuration: Config) -> std::io::Result<()> {
    info!("Starting server on {}", configuration.get_api_url());

    let generator = LoadGenerator::new(Duration::from_secs(configuration.stress.memory_hold_seconds));
    let state = AppState::new(Arc::new(SysinfoHostMetrics), generator);
    let request_timeout = configuration.stress.request_timeout();
    if request_timeout.as_secs() > configuration.stress.request_timeout_seconds {
        warn!(
            "request_timeout_seconds {} is shorter than the longest stress run, using {}s",
            configuration.stress.request_timeout_seconds,
            request_timeout.as_secs()
        );
    }
    let app = router(state, request_timeout);

    let listener = TcpListener::bind((configuration.host.as_str(), configuration.api.port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::metrics::tests::FixedHostMetrics;

    pub(crate) const TEST_MEMORY_HOLD: Duration = Duration::from_secs(1);

    pub(crate) fn new_test_state() -> AppState {
        AppState::new(
            Arc::new(FixedHostMetrics),
            LoadGenerator::new(TEST_MEMORY_HOLD),
        )
    }

    pub(crate) fn new_test_app() -> Router {
        router(new_test_state(), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = axum_test::TestServer::new(new_test_app()).unwrap();

        let response = server.get("/deployments").await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn slow_requests_time_out() {
        let server = axum_test::TestServer::new(router(new_test_state(), Duration::from_secs(1))).unwrap();

        let response = server.get("/stress?duration=5").await;

        assert_eq!(response.status_code(), StatusCode::REQUEST_TIMEOUT);
    }
}
