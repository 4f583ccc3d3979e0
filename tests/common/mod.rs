use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Fixed admin credentials injected into the spawned server so auth tests
/// are deterministic regardless of the host environment.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "integration-secret";
const JWT_SECRET: &str = "integration-test-jwt-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/realty-api");
        cmd.env("REALTY_API_PORT", port.to_string())
            .env("ADMIN_USERNAME", ADMIN_USERNAME)
            .env("ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env("JWT_SECRET", JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the rest of the environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Whether the suite can run at all. The server refuses to start without a
/// database, so tests skip themselves when DATABASE_URL is absent.
pub fn database_configured() -> bool {
    if std::env::var("DATABASE_URL").is_ok() {
        return true;
    }
    eprintln!("skipping: DATABASE_URL not set");
    false
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Log in with the fixed admin credentials and return the bearer token.
pub async fn admin_token(server: &TestServer) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/login", server.base_url))
        .json(&serde_json::json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await?;

    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    body["token"]
        .as_str()
        .map(|s| s.to_string())
        .context("login response missing token")
}

/// Create a listing through the API and return the response body.
pub async fn create_listing(
    server: &TestServer,
    token: &str,
    payload: serde_json::Value,
) -> Result<serde_json::Value> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/properties", server.base_url))
        .header("x-auth-token", token)
        .json(&payload)
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create failed: {} body: {}",
        res.status(),
        res.text().await.unwrap_or_default()
    );

    Ok(res.json::<serde_json::Value>().await?)
}
