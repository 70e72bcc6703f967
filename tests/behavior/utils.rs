use assert_cmd::prelude::*;
use async_trait::async_trait;
use gdrive_model::drive::DriveClient;
use gdrive_model::drive::auth::{Authorizer, Credential};
use gdrive_model::drive::service::HttpDriveService;
use gdrive_model::error::{OAuthSnafu, Result};
use libtest_mimic::{Failed, Trial};
use rand::prelude::*;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use uuid::Uuid;
use wiremock::{MockServer, Request};

pub const TEST_ACCESS_TOKEN: &str = "test-access-token";
pub const TEST_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

pub static TEST_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

/// Authorizer double that counts calls and either hands out a fixed token or fails.
pub struct FakeAuthorizer {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeAuthorizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for FakeAuthorizer {
    async fn authorize(&self) -> Result<Credential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return OAuthSnafu {
                reason: "consent refused",
            }
            .fail();
        }
        Ok(Credential::new(TEST_ACCESS_TOKEN, None))
    }
}

/// A mock Drive API plus a client wired to it through the real HTTP transport.
pub struct DriveHarness {
    pub server: MockServer,
    pub authorizer: Arc<FakeAuthorizer>,
    pub client: DriveClient,
}

impl DriveHarness {
    pub async fn start() -> Self {
        Self::with_authorizer(FakeAuthorizer::new()).await
    }

    pub async fn with_failing_auth() -> Self {
        Self::with_authorizer(FakeAuthorizer::failing()).await
    }

    async fn with_authorizer(authorizer: FakeAuthorizer) -> Self {
        let server = MockServer::start().await;
        let authorizer = Arc::new(authorizer);
        let service = Arc::new(HttpDriveService::new(reqwest::Client::new(), server.uri()));
        let client = DriveClient::with_parts(authorizer.clone(), service);
        Self {
            server,
            authorizer,
            client,
        }
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

/// Get the absolute path to a file under `tests/data/`.
pub fn get_test_data_path(file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(file_name)
}

/// Whether `haystack` contains `needle` as a contiguous byte sequence.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Write a Google "installed" client secret whose endpoints point at `base_url`.
pub fn write_client_secret(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("client_secret.json");
    let secret = serde_json::json!({
        "installed": {
            "client_id": "test-client-id",
            "client_secret": "test-client-secret",
            "auth_uri": format!("{base_url}/o/oauth2/auth"),
            "token_uri": format!("{base_url}/token"),
            "redirect_uris": ["http://localhost"]
        }
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&secret).unwrap()).unwrap();
    path
}

/// Write a token file expiring `expires_in_secs` from now (negative for an expired token).
pub fn write_token(dir: &Path, file_name: &str, access_token: &str, expires_in_secs: i64) {
    let expiry = chrono::Utc::now() + chrono::TimeDelta::seconds(expires_in_secs);
    let token = serde_json::json!({
        "access_token": access_token,
        "refresh_token": "test-refresh-token",
        "token_type": "Bearer",
        "scope": TEST_SCOPE,
        "expiry_date": expiry.timestamp_millis()
    });
    std::fs::write(dir.join(file_name), serde_json::to_vec(&token).unwrap()).unwrap();
}

pub struct Fixture {
    pub paths: std::sync::Mutex<Vec<PathBuf>>,
}

impl Fixture {
    pub const fn new() -> Self {
        Self {
            paths: std::sync::Mutex::new(vec![]),
        }
    }

    /// Create a fresh temporary directory that is removed after the run.
    pub fn new_dir(&self) -> PathBuf {
        let dir = env::temp_dir().join(format!("gdrive-model-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        self.paths.lock().unwrap().push(dir.clone());
        dir
    }

    pub fn new_file_id(&self) -> String {
        format!("file-{}", Uuid::new_v4().simple())
    }

    pub fn new_payload(&self, range: std::ops::Range<usize>) -> Vec<u8> {
        let mut rng = rand::rng();
        let size = rng.random_range(range);
        let mut content = vec![0; size];
        rng.fill_bytes(&mut content);
        content
    }

    pub fn cleanup(&self) {
        let paths: Vec<_> = std::mem::take(self.paths.lock().unwrap().as_mut());
        for path in paths {
            let _ = std::fs::remove_dir_all(path);
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub static TEST_FIXTURE: Fixture = Fixture::new();

pub fn build_async_trial<F, Fut>(name: &str, f: F) -> Trial
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send,
{
    let handle = TEST_RUNTIME.handle().clone();

    Trial::test(format!("behavior::{name}"), move || {
        handle
            .block_on(f())
            .map_err(|err| Failed::from(err.to_string()))
    })
}

#[macro_export]
macro_rules! async_trials {
    ($($test:ident),* $(,)?) => {
        vec![$(build_async_trial(stringify!($test), $test),)*]
    };
}

/// Create a base gdrive-model Command with clean environment and logging configured
pub fn gdrive_cmd() -> Command {
    let mut cmd = Command::cargo_bin("gdrive-model").unwrap();
    cmd.env_clear().env("RUST_LOG", "info");
    cmd
}

/// A command with every required configuration variable set, rooted at `dir`.
/// The API endpoint points at a closed local port so nothing leaves the machine.
pub fn configured_cmd(dir: &Path) -> Command {
    let mut cmd = gdrive_cmd();
    cmd.env("GDRIVE_SCOPES", TEST_SCOPE)
        .env("GDRIVE_TOKEN_FILE", "token.json")
        .env("GDRIVE_TOKEN_DIR", dir.join("tokens"))
        .env("GDRIVE_CLIENT_SECRET_FILE", dir.join("client_secret.json"))
        .env("GDRIVE_API_URL", "http://127.0.0.1:9");
    cmd
}
