//! Shared test harness for integration tests.
//!
//! [`TestHarness::with_server`] builds a memory-backed [`AppContext`] and
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use ps_core::config::Config;
use ps_server::context::AppContext;
use ps_server::router::build_router;
use reqwest::multipart::{Form, Part};

/// Test harness wrapping a running server and its [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestHarness {
    /// Start a server with default configuration and an in-memory store.
    pub async fn with_server() -> Self {
        Self::with_server_config(Config::default()).await
    }

    /// Start a server with a custom configuration on a random port.
    pub async fn with_server_config(config: Config) -> Self {
        let static_dir = config.server.static_dir.clone();
        let ctx = AppContext::from_config(config).expect("failed to build context");
        let app = build_router(ctx.clone(), static_dir);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            addr,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a file to `/images` and return the response.
    pub async fn upload(&self, file_name: &str, data: Vec<u8>) -> reqwest::Response {
        let form = Form::new().part("file", Part::bytes(data).file_name(file_name.to_string()));
        self.client
            .post(self.url("/images"))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }

    /// PATCH `/images/{key}` with new content.
    pub async fn replace(&self, key: &str, data: Vec<u8>) -> reqwest::Response {
        let form = Form::new().part("file", Part::bytes(data).file_name("replacement"));
        self.client
            .patch(self.url(&format!("/images/{key}")))
            .multipart(form)
            .send()
            .await
            .expect("patch request failed")
    }

    pub async fn delete(&self, key: &str) -> reqwest::Response {
        self.client
            .delete(self.url(&format!("/images/{key}")))
            .send()
            .await
            .expect("delete request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed")
    }

    /// Fetch `/api/images` as JSON.
    pub async fn list_json(&self) -> Vec<serde_json::Value> {
        self.get("/api/images")
            .await
            .json()
            .await
            .expect("list response is not JSON")
    }
}
