#![allow(dead_code)]

use once_cell::sync::OnceCell;
use plango_client::{ApiClient, ProfileDraft, RegisterForm};
use plango_stub::StubState;
use plango_types::LoginResponse;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Test logging, quiet unless `TEST_LOG` or `RUST_LOG` asks for more.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// Starts a fresh stub backend and a client with an empty in-memory session.
pub async fn start() -> (StubState, ApiClient) {
    init_logging();
    let stub = StubState::new();
    let addr = plango_stub::spawn(stub.clone())
        .await
        .expect("stub server should bind");
    let client = ApiClient::in_memory(&format!("http://{addr}")).expect("valid base url");
    (stub, client)
}

/// Another client against the same backend, with its own session.
pub fn second_client(client: &ApiClient) -> ApiClient {
    ApiClient::in_memory(client.base_url()).expect("valid base url")
}

pub async fn register(client: &ApiClient, email: &str) -> LoginResponse {
    let request = RegisterForm {
        name: "Traveller".into(),
        email: email.into(),
        password: "secret123".into(),
        confirm_password: "secret123".into(),
    }
    .validate()
    .expect("valid registration form");

    client
        .auth()
        .register(&request)
        .await
        .expect("registration should succeed")
}

pub fn profile(name: &str) -> ProfileDraft {
    ProfileDraft {
        name: name.into(),
        ..Default::default()
    }
}
