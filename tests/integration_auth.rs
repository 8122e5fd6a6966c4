mod common;

use axum::http::StatusCode;
use serde_json::json;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use matricula::matricula_auth::{Role, verify_token};
use matricula::matricula_config::RateLimitConfig;
use matricula::matricula_core::{AppError, BcryptHasher, PasswordHasher};

use common::{
    TestApp, jwt_config, setup_test_app, setup_test_app_with, setup_test_app_with_rate_limit,
};

/// Bcrypt at the lowest cost, counting how often a password is checked.
#[derive(Default)]
struct CountingHasher {
    checks: AtomicUsize,
}

impl CountingHasher {
    fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for CountingHasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        BcryptHasher::new(4).hash(password)
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, AppError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        BcryptHasher::new(4).verify(password, digest)
    }

    fn verify_dummy(&self, password: &str) {
        self.checks.fetch_add(1, Ordering::SeqCst);
        BcryptHasher::new(4).verify_dummy(password);
    }
}

/// Admin token plus one fully approved application, roll number 501.
async fn enrolled_app() -> (TestApp, String) {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;
    let (status, _) = app.approve_full(&admin, &id, "501").await;
    assert_eq!(status, StatusCode::OK);
    (app, admin)
}

#[tokio::test]
async fn test_staff_login_issues_role_token() {
    let app = setup_test_app();
    app.seed_staff("admin@nalandaschool.edu", "admin123", Role::Admin)
        .await;

    let (status, body) = app
        .login("Admin@NalandaSchool.edu", "admin123", "admin")
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["email"], "admin@nalandaschool.edu");

    let claims = verify_token(body["token"].as_str().unwrap(), &jwt_config()).unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.email, "admin@nalandaschool.edu");
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn test_staff_login_requires_matching_role() {
    let app = setup_test_app();
    app.seed_staff("teacher@nalandaschool.edu", "teacher123", Role::Teacher)
        .await;

    let (status, _) = app
        .login("teacher@nalandaschool.edu", "teacher123", "admin")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .login("teacher@nalandaschool.edu", "teacher123", "teacher")
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup_test_app();
    app.seed_staff("admin@nalandaschool.edu", "admin123", Role::Admin)
        .await;

    let (unknown_status, unknown_body) = app
        .login("nobody@nalandaschool.edu", "admin123", "admin")
        .await;
    let (wrong_status, wrong_body) = app
        .login("admin@nalandaschool.edu", "wrong-password", "admin")
        .await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_body, json!({ "error": "Invalid credentials" }));
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_unknown_account_costs_a_password_check() {
    let hasher = Arc::new(CountingHasher::default());
    let app = setup_test_app_with(RateLimitConfig::disabled(), hasher.clone());
    app.seed_staff("admin@nalandaschool.edu", "admin123", Role::Admin)
        .await;

    app.login("nobody@nalandaschool.edu", "admin123", "admin")
        .await;
    assert_eq!(hasher.checks(), 1);

    app.login("admin@nalandaschool.edu", "wrong-password", "admin")
        .await;
    assert_eq!(hasher.checks(), 2);

    app.login("999", "student123", "student").await;
    assert_eq!(hasher.checks(), 3);
}

#[tokio::test]
async fn test_student_login_by_roll_number_or_email() {
    let (app, _) = enrolled_app().await;

    let (status, body) = app.login("501", "student123", "student").await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["user"]["rollNumber"], "501");
    assert_eq!(body["user"]["name"], "Rahul Sharma");

    let (status, _) = app
        .login("501@nalandaschool.edu", "student123", "student")
        .await;
    assert_eq!(status, StatusCode::OK);

    // The parent password does not open the student account
    let (status, _) = app.login("501", "parent123", "student").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_parent_login_by_email_or_child_roll_number() {
    let (app, _) = enrolled_app().await;

    let (status, by_email) = app
        .login("suresh@example.com", "parent123", "parent")
        .await;
    assert_eq!(status, StatusCode::OK, "{}", by_email);
    assert_eq!(by_email["user"]["children"], json!(["501"]));

    let (status, by_child) = app.login("501", "parent123", "parent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_child["user"]["id"], by_email["user"]["id"]);
}

#[tokio::test]
async fn test_inactive_student_cannot_login() {
    let (app, admin) = enrolled_app().await;

    let (_, students) = app
        .request("GET", "/api/admin/students", Some(&admin), None)
        .await;
    let student_id = students[0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/admin/students/{}", student_id),
            Some(&admin),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.login("501", "student123", "student").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_requires_identifier_and_secret() {
    let app = setup_test_app();

    let (status, body) = app
        .request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "identifier": "", "secret": "", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_me_resolves_profile() {
    let (app, _) = enrolled_app().await;

    let (_, login) = app
        .login("suresh@example.com", "parent123", "parent")
        .await;
    let token = login["token"].as_str().unwrap();

    let (status, body) = app.request("GET", "/api/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "parent");
    assert_eq!(body["email"], "suresh@example.com");
    assert_eq!(body["children"], json!(["501"]));

    let (status, _) = app.request("GET", "/api/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/me", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_token_cannot_reach_admin_routes() {
    let (app, _) = enrolled_app().await;

    let (_, login) = app.login("501", "student123", "student").await;
    let token = login["token"].as_str().unwrap();

    let (status, _) = app
        .request("GET", "/api/admission/applications", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request("GET", "/api/admin/students", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        login_per_second: 1,
        login_burst_size: 1,
        trust_forwarded_for: false,
    }
}

fn wrong_login() -> serde_json::Value {
    json!({ "identifier": "a@example.com", "secret": "x", "role": "admin" })
}

#[tokio::test]
async fn test_login_rate_limit_exceeded() {
    let app = setup_test_app_with_rate_limit(strict_rate_limit_config());

    let (status, _) = app
        .request_from("192.168.1.100:40000", "POST", "/api/login", Some(wrong_login()), &[])
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request_from("192.168.1.100:40001", "POST", "/api/login", Some(wrong_login()), &[])
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());

    // Other clients keep their own budget
    let (status, _) = app
        .request_from("10.0.0.2:40000", "POST", "/api/login", Some(wrong_login()), &[])
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_budget() {
    let mut config = strict_rate_limit_config();
    config.login_burst_size = 2;
    let app = setup_test_app_with_rate_limit(config);
    app.seed_staff("admin@nalandaschool.edu", "admin123", Role::Admin)
        .await;

    let mut throttled = 0;
    for i in 0..20 {
        let spoofed = format!("198.51.100.{}", i);
        let (status, _) = app
            .request_from(
                "192.168.1.100:40000",
                "POST",
                "/api/login",
                Some(json!({
                    "identifier": "admin@nalandaschool.edu",
                    "secret": format!("guess-{}", i),
                    "role": "admin"
                })),
                &[("x-forwarded-for", spoofed.as_str())],
            )
            .await;
        if status == StatusCode::TOO_MANY_REQUESTS {
            throttled += 1;
        }
    }

    assert!(throttled >= 17, "only {} of 20 guesses throttled", throttled);
}

#[tokio::test]
async fn test_trusted_proxy_keys_on_forwarded_for() {
    let mut config = strict_rate_limit_config();
    config.trust_forwarded_for = true;
    let app = setup_test_app_with_rate_limit(config);
    let proxy = "10.0.0.1:443";

    let (status, _) = app
        .request_from(
            proxy,
            "POST",
            "/api/login",
            Some(wrong_login()),
            &[("x-forwarded-for", "203.0.113.5")],
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request_from(
            proxy,
            "POST",
            "/api/login",
            Some(wrong_login()),
            &[("x-forwarded-for", "203.0.113.5")],
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = app
        .request_from(
            proxy,
            "POST",
            "/api/login",
            Some(wrong_login()),
            &[("x-forwarded-for", "203.0.113.6")],
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rate_limit_does_not_touch_other_routes() {
    let app = setup_test_app_with_rate_limit(strict_rate_limit_config());

    for _ in 0..3 {
        let (status, _) = app
            .request_from("192.168.1.100:40000", "GET", "/health", None, &[])
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
