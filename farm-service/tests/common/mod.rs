#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use axum::body::Body;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use farm_service::domain::farmer::errors::FarmerError;
use farm_service::domain::farmer::models::Farmer;
use farm_service::domain::farmer::models::FarmerId;
use farm_service::domain::farmer::ports::FarmerRepository;
use farm_service::domain::farmer::service::FarmerService;
use farm_service::inbound::http::router::create_router;
use farm_service::outbound::telemetry::ThingSpeakClient;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Farmer store kept in memory; the uniqueness check and insert share one lock.
#[derive(Default)]
pub struct InMemoryFarmerRepository {
    farmers: Mutex<Vec<Farmer>>,
}

impl InMemoryFarmerRepository {
    pub fn snapshot(&self) -> Vec<Farmer> {
        self.farmers.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.farmers.lock().unwrap().len()
    }
}

#[async_trait]
impl FarmerRepository for InMemoryFarmerRepository {
    async fn create(&self, farmer: Farmer) -> Result<Farmer, FarmerError> {
        let mut farmers = self.farmers.lock().unwrap();

        if let Some(existing) = farmers
            .iter()
            .find(|f| f.username == farmer.username || f.email == farmer.email)
        {
            return Err(FarmerError::DuplicateIdentity(
                existing.username.as_str().to_string(),
            ));
        }

        farmers.push(farmer.clone());
        Ok(farmer)
    }

    async fn find_by_id(&self, id: &FarmerId) -> Result<Option<Farmer>, FarmerError> {
        let farmers = self.farmers.lock().unwrap();
        Ok(farmers.iter().find(|f| f.id == *id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Farmer>, FarmerError> {
        let farmers = self.farmers.lock().unwrap();
        Ok(farmers
            .iter()
            .find(|f| f.username.as_str() == identifier || f.email.as_str() == identifier)
            .cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<Farmer>, FarmerError> {
        let farmers = self.farmers.lock().unwrap();
        Ok(farmers
            .iter()
            .find(|f| f.username.as_str() == username || f.email.as_str() == email)
            .cloned())
    }

    async fn count(&self) -> Result<u64, FarmerError> {
        Ok(self.len() as u64)
    }
}

/// Test application driven in-process through the real router
pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryFarmerRepository>,
    pub authenticator: Arc<Authenticator>,
    pub thingspeak: MockServer,
}

impl TestApp {
    /// App whose ThingSpeak client points at a fresh stub server
    pub async fn spawn() -> Self {
        let thingspeak = MockServer::start().await;
        let base_url = thingspeak.uri();
        Self::build(thingspeak, &base_url, Duration::from_secs(2))
    }

    /// App whose ThingSpeak client points at `base_url` with the given timeout
    pub async fn with_thingspeak_at(base_url: &str, timeout: Duration) -> Self {
        let thingspeak = MockServer::start().await;
        Self::build(thingspeak, base_url, timeout)
    }

    fn build(thingspeak: MockServer, base_url: &str, timeout: Duration) -> Self {
        let hasher = PasswordHasher::with_params(8 * 1024, 1, 1).expect("valid argon2 params");
        let authenticator = Arc::new(Authenticator::with_hasher(JWT_SECRET, hasher));
        let repository = Arc::new(InMemoryFarmerRepository::default());
        let telemetry = Arc::new(
            ThingSpeakClient::with_timeout(base_url, timeout).expect("valid telemetry base url"),
        );

        let farmer_service = Arc::new(FarmerService::new(
            Arc::clone(&repository),
            telemetry,
            Arc::clone(&authenticator),
            1,
        ));

        Self {
            router: create_router(farmer_service, Arc::clone(&authenticator)),
            repository,
            authenticator,
            thingspeak,
        }
    }

    /// Send a request and return the status plus the body (JSON, or a JSON string for text).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        (status, body)
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, None, Some(body)).await
    }

    pub async fn get_authenticated(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, Some(&format!("Bearer {token}")), None)
            .await
    }

    /// Register a farmer and log in, returning the session token.
    pub async fn register_and_login(&self, signup: Value) -> String {
        let (status, _) = self.post_json("/signup", signup.clone()).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .post_json(
                "/login",
                serde_json::json!({
                    "username": signup["username"],
                    "password": signup["password"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"].as_str().unwrap().to_string()
    }
}
