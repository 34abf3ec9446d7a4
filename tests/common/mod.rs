//! Shared utilities for integration and load testing.

use std::time::Duration;

use room_occupancy::config::{OccupancyConfig, RoomSeed, TokenConfig};
use room_occupancy::lifecycle::{self, Shutdown};
use serde_json::Value;

pub const TOKEN: &str = "desk-token";
pub const SUBJECT: &str = "desk-1";

/// A running service bound to an ephemeral port.
pub struct TestServer {
    pub base: String,
    pub client: reqwest::Client,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(TOKEN)
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(TOKEN)
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(TOKEN)
    }

    /// Id of the seeded room called `name`.
    pub async fn room_id(&self, name: &str) -> String {
        let rooms: Value = self.get("/rooms").send().await.unwrap().json().await.unwrap();
        rooms
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["name"] == name)
            .map(|r| r["id"].as_str().unwrap().to_string())
            .unwrap_or_else(|| panic!("room {name} not seeded"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn config_with_rooms(rooms: &[(&str, u32)]) -> OccupancyConfig {
    let mut config = OccupancyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.auth.tokens.push(TokenConfig {
        token: TOKEN.to_string(),
        subject: SUBJECT.to_string(),
        email: Some("desk@example.com".to_string()),
    });
    config.rooms = rooms
        .iter()
        .map(|(name, capacity)| RoomSeed {
            name: name.to_string(),
            capacity: *capacity,
        })
        .collect();
    config
}

/// Start the full service on an ephemeral port.
pub async fn start_server(config: OccupancyConfig) -> TestServer {
    let server = lifecycle::start(&config).await.unwrap();
    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    TestServer {
        base: format!("http://{}", addr),
        client,
        shutdown,
    }
}

/// A syntactically valid 11-digit national id, distinct per `n`.
#[allow(dead_code)]
pub fn cpf(n: u32) -> String {
    format!("{:011}", 10_000_000_000u64 + u64::from(n))
}
