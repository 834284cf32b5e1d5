pub mod health;
mod index;
mod metrics;

use axum::{
    routing::get,
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::landing_page))
        .route("/metrics", get(metrics::scrape))
        .route("/health", get(health::health_check))
}

#[cfg(test)]
mod tests {
    use axum::body::{
        to_bytes,
        Body,
    };
    use axum::http::{
        header,
        Request,
        StatusCode,
    };
    use jenkins_exporter_core::{
        Collector,
        JenkinsConfig,
    };
    use mockito::Matcher;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::health::HealthResponse;

    fn app_for(url: &str) -> Router {
        let config = JenkinsConfig {
            url: url.to_string(),
            ..Default::default()
        };
        let collector = Collector::from_config(&config).unwrap();
        router().with_state(AppState::new(collector))
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_scrape() {
        let mut server = mockito::Server::new_async().await;
        let jobs = serde_json::json!({"jobs": [{
            "_class": "org.jenkinsci.plugins.workflow.job.WorkflowJob",
            "fullName": "deploy",
            "url": format!("{}/job/deploy/", server.url()),
            "builds": [{"url": format!("{}/job/deploy/1/", server.url())}],
            "lastBuild": {"number": 1, "duration": 4000, "timestamp": 1700000000000u64, "actions": []}
        }]});
        let _root = server
            .mock("GET", "/api/json")
            .match_query(Matcher::Regex("tree=".to_string()))
            .with_status(200)
            .with_body(jobs.to_string())
            .create_async()
            .await;
        let _build = server
            .mock("GET", "/job/deploy/1/api/json")
            .with_status(200)
            .with_body(r#"{"result": "SUCCESS", "number": 1}"#)
            .create_async()
            .await;

        let (status, content_type, body) = get_body(app_for(&server.url()), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert!(body.contains("jenkins_job_last_build{jobname=\"deploy\"} 1\n"));
        assert!(body.contains("jenkins_job_last_build_duration_seconds{jobname=\"deploy\"} 4\n"));
        assert!(body.contains("jenkins_runs_successful_total{jobname=\"deploy\"} 1\n"));
        assert!(!body.contains("jenkins_runs_failed_total"));
        assert!(body.contains("jenkins_collector_collect_seconds_count 1\n"));
    }

    #[tokio::test]
    async fn test_failed_scrape_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let (status, _, body) = get_body(app_for(&server.url()), "/metrics").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("failed with status: 500"));
        assert!(!body.contains("jenkins_job_"));
    }

    #[tokio::test]
    async fn test_health_reports_last_scrape() {
        let mut server = mockito::Server::new_async().await;
        let _root = server
            .mock("GET", "/api/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"jobs": []}"#)
            .create_async()
            .await;
        let app = app_for(&server.url());

        let (status, _, body) = get_body(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.target, server.url());
        assert!(health.last_scrape.is_none());

        let (status, _, _) = get_body(app.clone(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = get_body(app, "/health").await;
        let health: HealthResponse = serde_json::from_str(&body).unwrap();
        let last = health.last_scrape.unwrap();
        assert_eq!(last.jobs, 0);
        assert!(last.duration_seconds >= 0.0);
    }

    #[tokio::test]
    async fn test_landing_page_links_metrics() {
        let (status, content_type, body) = get_body(app_for("http://jenkins:8080"), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert!(body.contains("<a href=\"/metrics\">"));
        assert!(body.contains("http://jenkins:8080"));
    }
}
