//! In-process fake token endpoint for tests.

use std::sync::{Arc, Mutex};

use axum::{http::StatusCode, routing::post, Json, Router};

pub(crate) struct TokenServer {
    pub url: String,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl TokenServer {
    /// Serve `body` with `status` for every POST to `/v1/oauth/token`.
    pub async fn spawn(status: u16, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let status = StatusCode::from_u16(status).expect("valid status");
        let body = body.to_string();

        let app = Router::new().route(
            "/v1/oauth/token",
            post(move |Json(request): Json<serde_json::Value>| {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                async move {
                    recorded.lock().expect("lock").push(request);
                    (status, body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            url: format!("http://{}/v1/oauth/token", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().expect("lock").clone()
    }
}

/// URL on a port that nothing listens on.
pub(crate) fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1/oauth/token", port)
}
