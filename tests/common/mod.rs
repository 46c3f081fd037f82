use serde_json::{Value, json};
use squadhours::api;
use squadhours::application_port::SignupInput;
use squadhours::infra_memory::{MemoryCacheStore, MemoryResetNotifier, MemoryStore};
use squadhours::server::{Backends, Server};
use squadhours::settings::Settings;
use std::sync::Arc;
use warp::http::StatusCode;

pub const PASSWORD: &str = "correct horse";

/// A fully assembled server on the in-memory backends.
pub struct TestHarness {
    pub server: Arc<Server>,
    #[allow(dead_code)]
    pub store: Arc<MemoryStore>,
    #[allow(dead_code)]
    pub cache_store: Arc<MemoryCacheStore>,
    #[allow(dead_code)]
    pub notifier: Arc<MemoryResetNotifier>,
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "integration-test-secret".to_string();
    settings.auth.password_hash_memory_kib = 1024;
    settings.auth.password_hash_iterations = 1;
    settings.cache.reconnect_interval_secs = 0;
    settings
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_cache(MemoryCacheStore::new()).await
    }

    /// A server whose cache backend refuses every connection.
    #[allow(dead_code)]
    pub async fn without_cache() -> Self {
        let cache_store = MemoryCacheStore::new();
        cache_store.set_available(false);
        Self::with_cache(cache_store).await
    }

    async fn with_cache(cache_store: MemoryCacheStore) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cache_store = Arc::new(cache_store);
        let notifier = Arc::new(MemoryResetNotifier::new());
        let backends = Backends::in_memory(store.clone(), cache_store.clone(), notifier.clone());
        let server = Server::assemble(&test_settings(), backends).await.unwrap();
        Self {
            server: Arc::new(server),
            store,
            cache_store,
            notifier,
        }
    }

    pub async fn create_user(&self, email: &str) {
        self.server
            .auth_service
            .create_user(SignupInput {
                email: email.to_string(),
                name: "Test User".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
    }

    /// Log in and return the session payload (`data` of the envelope).
    pub async fn login(&self, email: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }

    /// Create a user, log in and return the access token.
    #[allow(dead_code)]
    pub async fn access_token(&self) -> String {
        self.create_user("owner@example.com").await;
        let session = self.login("owner@example.com").await;
        session["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.reply(&api::routes(self.server.clone())).await;
        let status = response.status();
        let body = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
        (status, body)
    }

    #[allow(dead_code)]
    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", path, Some(token), None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(token), Some(body)).await
    }
}

#[allow(dead_code)]
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
