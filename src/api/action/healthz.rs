use serde::Serialize;

use crate::serializer::PrettyJson;

/// Body of the liveness probe.
#[derive(Debug, Serialize)]
pub(crate) struct Liveness {
    state: &'static str,
    version: &'static str,
}

/// Answers as soon as the server accepts requests, even while stress runs
/// are holding every worker busy.
pub(crate) async fn healthz() -> PrettyJson<Liveness> {
    PrettyJson(Liveness {
        state: "UP",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use http::StatusCode;
    use serde_json::Value;

    use crate::api::server::tests::new_test_app;

    #[tokio::test]
    async fn liveness_is_up() {
        let server = TestServer::new(new_test_app()).unwrap();

        let response = server.get("/healthz").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.header("content-type").to_str().unwrap(),
            "application/json"
        );

        let body = response.json::<Value>();
        assert_eq!(body["state"], "UP");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn liveness_answers_during_a_stress_run() {
        let server = TestServer::new(new_test_app()).unwrap();

        let (stress, liveness) = tokio::join!(
            async { server.get("/stress?duration=5").await },
            async {
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                let start = std::time::Instant::now();
                let response = server.get("/healthz").await;
                (response, start.elapsed())
            }
        );

        let (response, elapsed) = liveness;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(elapsed < std::time::Duration::from_secs(2));
        assert_eq!(stress.status_code(), StatusCode::OK);
    }
}
