use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use chrono::{Local, SecondsFormat};
use http::request::Parts;
use url::form_urlencoded::parse;

use crate::api::dto::stress::{Action, ActionOutcome, StressRequest, StressResponse};
use crate::api::server::AppState;
use crate::metrics;
use crate::serializer::PrettyJson;

/// Raw query string values. Nothing is validated here, a repeated key keeps
/// its last value.
#[derive(Debug, Default, Clone)]
pub(crate) struct QueryParameters {
    cpu: Option<String>,
    duration: Option<String>,
    memory: Option<String>,
    action: Option<String>,
}

impl QueryParameters {
    pub(crate) fn to_request(&self) -> StressRequest {
        StressRequest::from_raw(
            self.cpu.as_deref(),
            self.duration.as_deref(),
            self.memory.as_deref(),
            self.action.as_deref(),
        )
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for QueryParameters
    where
        S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or("");
        let mut parameters = QueryParameters::default();

        for (key, value) in parse(query.as_bytes()).into_owned() {
            match key.as_str() {
                "cpu" => parameters.cpu = Some(value),
                "duration" => parameters.duration = Some(value),
                "memory" => parameters.memory = Some(value),
                "action" => parameters.action = Some(value),
                _ => {}
            }
        }

        Ok(parameters)
    }
}

pub(crate) async fn stress(
    State(state): State<AppState>,
    query_parameters: QueryParameters,
) -> PrettyJson<StressResponse> {
    let request = query_parameters.to_request();
    let hostname = state.metrics.hostname().unwrap_or_default();
    let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

    let outcome = match request.action {
        Action::Health => ActionOutcome::Health {
            status: "healthy".to_string(),
            uptime: state.metrics.uptime_seconds(),
        },
        Action::Info => ActionOutcome::Info {
            system_info: metrics::collect(state.metrics.as_ref()),
        },
        Action::Stress => run_stress(&state, &request).await,
    };

    PrettyJson(StressResponse {
        hostname,
        timestamp,
        action: request.action,
        parameters: request.parameters(),
        outcome,
    })
}

async fn run_stress(state: &AppState, request: &StressRequest) -> ActionOutcome {
    let mut message = format!(
        "Starting load test: {} CPU cores for {}s",
        request.cpu_cores, request.duration_seconds
    );
    if request.memory_megabytes > 0 {
        message.push_str(&format!(" + {}MB memory", request.memory_megabytes));
    }

    info!("{}", message);

    let start = Instant::now();
    let run = state
        .generator
        .run_blocking(
            request.cpu_cores,
            Duration::from_secs(u64::from(request.duration_seconds)),
            request.memory_megabytes,
        )
        .await;

    let execution_time = match run {
        Ok(report) => {
            debug!(
                "Load test burned {} batches, memory held: {}",
                report.cpu_batches, report.memory_held
            );
            report.execution_time
        }
        Err(err) => {
            error!("Load test interrupted: {}", err);
            start.elapsed().as_secs()
        }
    };

    info!("Load test completed in {}s", execution_time);

    ActionOutcome::Stress {
        message,
        execution_time,
        status: "completed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum_test::TestServer;
    use http::StatusCode;
    use serde_json::Value;

    use crate::api::dto::stress::{Action, ActionOutcome, StressRequest};
    use crate::api::server::tests::{new_test_app, new_test_state};
    use super::run_stress;

    #[tokio::test]
    async fn health_is_immediate() {
        let server = TestServer::new(new_test_app()).unwrap();
        let start = Instant::now();

        let response = server
            .get("/stress?action=health&duration=300&memory=500")
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["action"], "health");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["uptime"], 1234.56);
        assert_eq!(body["hostname"], "hpa-test-7d9f8");
        assert!(body.get("execution_time").is_none());
    }

    #[tokio::test]
    async fn echoed_parameters_are_clamped() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server
            .get("/stress?action=health&cpu=9&duration=1&memory=9999")
            .await;

        let body = response.json::<Value>();
        assert_eq!(body["parameters"]["cpu_cores"], 8);
        assert_eq!(body["parameters"]["duration"], 5);
        assert_eq!(body["parameters"]["memory_mb"], 500);
    }

    #[tokio::test]
    async fn malformed_parameters_fall_back_to_defaults() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server
            .get("/stress?action=health&cpu=abc&duration=abc&memory=lots")
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["parameters"]["cpu_cores"], 1);
        assert_eq!(body["parameters"]["duration"], 30);
        assert_eq!(body["parameters"]["memory_mb"], 0);
    }

    #[tokio::test]
    async fn info_reports_system_snapshot() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server.get("/stress?action=info").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        let system_info = &body["system_info"];
        assert_eq!(body["action"], "info");
        assert_eq!(system_info["cpu_core_count"], 4);
        assert_eq!(system_info["memory_total_mb"], 7962);
        assert_eq!(system_info["process_memory_limit"], "512M");

        let load_average = system_info["load_average"].as_array().unwrap();
        assert_eq!(load_average.len(), 3);
        assert!(load_average.iter().all(|load| load.as_f64().unwrap() >= 0.0));
    }

    #[tokio::test]
    async fn responses_are_pretty_printed_json() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server.get("/stress?action=health").await;

        let content_type = response.header("content-type");
        assert_eq!(content_type.to_str().unwrap(), "application/json");
        assert!(response.text().starts_with("{\n  \""));
    }

    #[tokio::test]
    async fn stress_blocks_for_the_requested_duration() {
        let server = TestServer::new(new_test_app()).unwrap();
        let start = Instant::now();

        let response = server.get("/stress?action=stress&cpu=2&duration=5").await;

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(response.status_code(), StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["status"], "completed");
        assert!(body["execution_time"].as_u64().unwrap() >= 5);
        assert_eq!(body["message"], "Starting load test: 2 CPU cores for 5s");
    }

    #[tokio::test]
    async fn stress_with_memory_holds_then_completes() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server.get("/stress.php?duration=5&memory=10").await;

        let body = response.json::<Value>();
        assert_eq!(body["action"], "stress");
        assert_eq!(body["status"], "completed");
        assert_eq!(body["parameters"]["memory_mb"], 10);
        assert!(body["execution_time"].as_u64().unwrap() >= 6);
        assert_eq!(
            body["message"],
            "Starting load test: 1 CPU cores for 5s + 10MB memory"
        );
    }

    #[tokio::test]
    async fn unknown_action_runs_stress() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server.get("/stress?action=foo&duration=5").await;

        let body = response.json::<Value>();
        assert_eq!(body["action"], "stress");
        assert_eq!(body["status"], "completed");
        assert!(body["execution_time"].as_u64().unwrap() >= 5);
        assert!(body.get("system_info").is_none());
    }

    #[tokio::test]
    async fn allocation_failure_still_reports_completed() {
        let state = new_test_state();
        let request = StressRequest {
            cpu_cores: 1,
            duration_seconds: 0,
            memory_megabytes: u32::MAX,
            action: Action::Stress,
        };

        let outcome = run_stress(&state, &request).await;

        match outcome {
            ActionOutcome::Stress { status, execution_time, .. } => {
                assert_eq!(status, "completed");
                assert!(execution_time < 5);
            }
            other => panic!("expected a stress outcome, got {:?}", other),
        }
    }
}
