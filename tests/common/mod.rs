#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use matricula::matricula_auth::{Role, create_access_token};
use matricula::matricula_config::{
    CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, SchoolConfig,
};
use matricula::matricula_core::{BcryptHasher, PasswordHasher};
use matricula::matricula_db::{MemoryStore, Store};
use matricula::matricula_models::{NewStaff, StaffAccount};
use matricula::notifications::RecordingGateway;
use matricula::router::init_router;
use matricula::state::{AppState, login_limiter};

pub const ADMISSIONS_INBOX: &str = "admissions@nalandaschool.edu";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notifier: RecordingGateway,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
    }
}

fn email_config() -> EmailConfig {
    EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@nalandaschool.edu".to_string(),
        from_name: "Nalanda School".to_string(),
        admissions_email: ADMISSIONS_INBOX.to_string(),
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_rate_limit(RateLimitConfig::disabled())
}

pub fn setup_test_app_with_rate_limit(rate_limit_config: RateLimitConfig) -> TestApp {
    // Lowest bcrypt cost keeps the suite fast
    setup_test_app_with(rate_limit_config, Arc::new(BcryptHasher::new(4)))
}

/// App backed by the in-memory store and a recording notifier.
pub fn setup_test_app_with(
    rate_limit_config: RateLimitConfig,
    hasher: Arc<dyn PasswordHasher>,
) -> TestApp {
    let notifier = RecordingGateway::new();
    let state = AppState {
        store: Arc::new(MemoryStore::new()),
        notifier: Arc::new(notifier.clone()),
        hasher,
        jwt_config: jwt_config(),
        email_config: email_config(),
        school_config: SchoolConfig::default(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        login_limiter: login_limiter(&rate_limit_config),
        rate_limit_config,
        metrics_handle: None,
    };

    TestApp {
        router: init_router(state.clone()),
        state,
        notifier,
    }
}

impl TestApp {
    pub async fn seed_staff(&self, email: &str, password: &str, role: Role) -> StaffAccount {
        let password_hash = self.state.hasher.hash(password).unwrap();
        self.state
            .store
            .insert_staff(&NewStaff {
                first_name: "Test".to_string(),
                last_name: "Staff".to_string(),
                email: email.to_string(),
                role,
                password_hash,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, staff: &StaffAccount) -> String {
        create_access_token(
            staff.id.into_inner(),
            &staff.email,
            staff.role,
            &self.state.jwt_config,
        )
        .unwrap()
    }

    pub async fn admin_token(&self) -> String {
        let admin = self
            .seed_staff("admin@nalandaschool.edu", "admin123", Role::Admin)
            .await;
        self.token_for(&admin)
    }

    pub async fn teacher_token(&self) -> String {
        let teacher = self
            .seed_staff("teacher@nalandaschool.edu", "teacher123", Role::Teacher)
            .await;
        self.token_for(&teacher)
    }

    /// Sends a JSON request and returns the status with the decoded body
    /// (`Value::Null` when empty).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_headers(method, uri, token, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        self.send(build_request(method, uri, token, body, headers)).await
    }

    /// Like [`TestApp::request_with_headers`], as seen from the `peer`
    /// socket address.
    pub async fn request_from(
        &self,
        peer: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut request = build_request(method, uri, None, body, headers);
        let peer: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn submit(&self, parent_email: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/admission/apply",
                None,
                Some(application_body(parent_email)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    /// Id of the application with the given number, looked up as staff.
    pub async fn application_id(&self, token: &str, application_number: &str) -> String {
        let (_, list) = self
            .request("GET", "/api/admission/applications", Some(token), None)
            .await;
        list.as_array()
            .unwrap()
            .iter()
            .find(|app| app["applicationNumber"] == application_number)
            .map(|app| app["id"].as_str().unwrap().to_string())
            .unwrap()
    }

    /// Submits an application and returns its id.
    pub async fn submit_and_find(&self, token: &str, parent_email: &str) -> String {
        let submitted = self.submit(parent_email).await;
        let number = submitted["applicationNumber"].as_str().unwrap().to_string();
        self.application_id(token, &number).await
    }

    pub async fn approve_full(&self, token: &str, id: &str, roll_number: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/admission/applications/{}/approve-full", id),
            Some(token),
            Some(approve_full_body(roll_number)),
        )
        .await
    }

    pub async fn login(&self, identifier: &str, secret: &str, role: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "identifier": identifier, "secret": secret, "role": role })),
        )
        .await
    }
}

fn build_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn application_body(parent_email: &str) -> Value {
    json!({
        "studentInfo": {
            "firstName": "Rahul",
            "lastName": "Sharma",
            "dateOfBirth": "2015-05-15",
            "gender": "male",
            "class": "5th",
            "previousSchool": "Little Flowers Primary"
        },
        "parentInfo": {
            "fatherName": "Suresh Sharma",
            "motherName": "Priya Sharma",
            "email": parent_email,
            "phone": "+91 98765 43210",
            "occupation": "Engineer",
            "address": {
                "street": "12 MG Road",
                "city": "Bengaluru",
                "state": "Karnataka",
                "zipCode": "560001"
            }
        }
    })
}

pub fn approve_full_body(roll_number: &str) -> Value {
    json!({
        "rollNumber": roll_number,
        "class": "5th",
        "section": "A",
        "studentPassword": "student123",
        "parentPassword": "parent123"
    })
}

pub fn quick_add_body(roll_number: &str, parent_email: &str) -> Value {
    json!({
        "firstName": "Ananya",
        "lastName": "Iyer",
        "rollNumber": roll_number,
        "class": "3rd",
        "section": "B",
        "parentName": "Karthik Iyer",
        "parentEmail": parent_email,
        "parentPhone": "+91 90000 11111",
        "studentPassword": "student123",
        "parentPassword": "parent123"
    })
}
