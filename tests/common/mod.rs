//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use idea_vault::config::VaultConfig;
use idea_vault::http::HttpServer;
use idea_vault::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub const TEST_PASSWORD: &str = "test-secret";

/// A running vault instance bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub data_file: PathBuf,
    // Keeps the config update channel open for the server's reload task.
    _config_tx: mpsc::UnboundedSender<VaultConfig>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
        std::fs::remove_file(&self.data_file).unwrap_or_default();
    }
}

/// Baseline configuration for tests: temp data file, known password,
/// metrics off.
pub fn test_config() -> VaultConfig {
    let data_file = std::env::temp_dir().join(format!("idea-vault-test-{}.json", uuid::Uuid::new_v4()));

    let mut config = VaultConfig::default();
    config.auth.admin_password = TEST_PASSWORD.to_string();
    config.store.data_file = data_file.to_string_lossy().into_owned();
    config.observability.metrics_enabled = false;
    config
}

/// Spawn a real server on 127.0.0.1:0 and wait until it accepts requests.
pub async fn spawn_server(config: VaultConfig) -> TestServer {
    let data_file = PathBuf::from(&config.store.data_file);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (config_tx, config_updates) = mpsc::unbounded_channel();

    let server = HttpServer::new(config).expect("server should build");
    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    TestServer {
        addr,
        shutdown,
        data_file,
        _config_tx: config_tx,
    }
}

/// Client without proxying or connection pooling surprises.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Log in and return the session `Cookie` header value.
#[allow(dead_code)]
pub async fn login(client: &reqwest::Client, server: &TestServer) -> String {
    let res = client
        .post(server.url("/api/login"))
        .json(&serde_json::json!({ "password": TEST_PASSWORD }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(res.status(), 200, "login should succeed");

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .expect("login should set a cookie")
        .to_str()
        .unwrap();

    // "idea-vault-auth=true; HttpOnly; ..." → "idea-vault-auth=true"
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}
