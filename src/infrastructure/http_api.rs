// HTTP implementation of the dashboard API
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::dashboard_api::DashboardApi;
use crate::domain::error::{DashboardError, Result};

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Network(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::Network(format!("GET {}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Server {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                DashboardError::MalformedData(format!("GET {}: {}", path, e))
            } else {
                DashboardError::Network(format!("GET {}: {}", path, e))
            }
        })
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_widgets(&self) -> Result<Value> {
        self.get_json("/dashboard/widgets", &[]).await
    }

    async fn fetch_charts(&self, period_days: u32) -> Result<Value> {
        self.get_json("/dashboard/charts", &[("period", period_days.to_string())])
            .await
    }

    async fn fetch_live_tracking(&self) -> Result<Value> {
        self.get_json("/live-tracking", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/api/dashboard/widgets",
                get(|| async { Json(json!({ "widgets": {}, "cache_status": "live" })) }),
            )
            .route(
                "/api/dashboard/charts",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    Json(json!({ "charts": {}, "period": params.get("period") }))
                }),
            )
            .route(
                "/api/live-tracking",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "tracker offline") }),
            )
    }

    #[tokio::test]
    async fn test_fetch_widgets() {
        let base = serve(backend()).await;
        let api = HttpDashboardApi::new(&base, Duration::from_secs(5)).unwrap();

        let payload = api.fetch_widgets().await.unwrap();
        assert_eq!(payload["cache_status"], "live");
    }

    #[tokio::test]
    async fn test_fetch_charts_sends_period() {
        let base = serve(backend()).await;
        let api = HttpDashboardApi::new(&base, Duration::from_secs(5)).unwrap();

        let payload = api.fetch_charts(14).await.unwrap();
        assert_eq!(payload["period"], "14");
    }

    #[tokio::test]
    async fn test_non_success_is_server_error() {
        let base = serve(backend()).await;
        let api = HttpDashboardApi::new(&base, Duration::from_secs(5)).unwrap();

        let err = api.fetch_live_tracking().await.unwrap_err();
        assert_eq!(
            err,
            DashboardError::Server {
                status: 503,
                body: "tracker offline".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_body_is_malformed() {
        let router = Router::new().route("/dashboard/widgets", get(|| async { "<html>oops</html>" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let api = HttpDashboardApi::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

        let err = api.fetch_widgets().await.unwrap_err();
        assert!(matches!(err, DashboardError::MalformedData(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Bind then drop to get a port nobody is listening on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpDashboardApi::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = api.fetch_widgets().await.unwrap_err();
        assert!(matches!(err, DashboardError::Network(_)));
    }
}
