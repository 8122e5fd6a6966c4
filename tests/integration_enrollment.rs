mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tokio::task::JoinSet;
use tower::ServiceExt;

use common::{approve_full_body, setup_test_app};

#[tokio::test]
async fn test_full_approval_provisions_linked_accounts() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "Suresh@Example.com").await;

    let (status, body) = app.approve_full(&admin, &id, "501").await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let application = &body["application"];
    let student = &body["student"];
    let parent = &body["parent"];

    assert_eq!(application["status"], "approved");
    assert_eq!(application["assignedRollNumber"], "501");
    assert_eq!(application["assignedClass"], "5th");
    assert_eq!(application["assignedSection"], "A");
    assert!(application["admissionDate"].is_string());

    assert_eq!(student["rollNumber"], "501");
    assert_eq!(student["personalInfo"]["email"], "501@nalandaschool.edu");
    assert_eq!(student["academicInfo"]["class"], "5th");
    assert_eq!(student["parentInfo"]["parentId"], parent["id"]);
    assert!(student["admissionNumber"].as_str().unwrap().starts_with("ADM"));
    assert!(student.get("passwordHash").is_none());

    assert_eq!(parent["email"], "suresh@example.com");
    assert_eq!(parent["firstName"], "Suresh");
    assert_eq!(parent["lastName"], "Sharma");
    assert_eq!(parent["children"].as_array().unwrap().len(), 1);
    assert_eq!(parent["children"][0]["rollNumber"], "501");
    assert_eq!(parent["children"][0]["studentId"], student["id"]);

    let confirmed = app.notifier.sent_to("suresh@example.com");
    assert_eq!(confirmed.len(), 1);
    assert!(confirmed[0].subject.contains("501"));
}

#[tokio::test]
async fn test_full_approval_twice_conflicts() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    let (status, _) = app.approve_full(&admin, &id, "501").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.approve_full(&admin, &id, "502").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "approved");

    let (_, students) = app
        .request("GET", "/api/admin/students", Some(&admin), None)
        .await;
    assert_eq!(students.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_roll_number_leaves_no_trace() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let first = app.submit_and_find(&admin, "first@example.com").await;
    let second = app.submit_and_find(&admin, "second@example.com").await;

    let (status, _) = app.approve_full(&admin, &first, "501").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.approve_full(&admin, &second, "501").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["field"], "rollNumber");

    let (_, application) = app
        .request(
            "GET",
            &format!("/api/admission/applications/{}", second),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(application["status"], "pending");
    assert!(application["assignedRollNumber"].is_null());

    let (status, _) = app.login("second@example.com", "parent123", "parent").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_child_joins_existing_parent() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let first = app.submit_and_find(&admin, "suresh@example.com").await;
    let second = app.submit_and_find(&admin, "suresh@example.com").await;

    let (_, first_body) = app.approve_full(&admin, &first, "501").await;
    let (status, second_body) = app.approve_full(&admin, &second, "502").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(first_body["parent"]["id"], second_body["parent"]["id"]);
    let children = second_body["parent"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_ne!(
        first_body["student"]["admissionNumber"],
        second_body["student"]["admissionNumber"]
    );
}

#[tokio::test]
async fn test_simple_then_full_approval_provisions_once() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/admission/applications/{}/approve", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.approve_full(&admin, &id, "501").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"]["assignedRollNumber"], "501");

    let (status, _) = app.approve_full(&admin, &id, "502").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_application_cannot_be_fully_approved() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    app.request(
        "POST",
        &format!("/api/admission/applications/{}/reject", id),
        Some(&admin),
        Some(json!({ "remarks": "Incomplete documents" })),
    )
    .await;

    let (status, body) = app.approve_full(&admin, &id, "501").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "rejected");
}

#[tokio::test]
async fn test_full_approval_validates_body() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/admission/applications/{}/approve-full", id),
            Some(&admin),
            Some(json!({
                "rollNumber": "",
                "class": "5th",
                "section": "A",
                "studentPassword": "123",
                "parentPassword": "parent123"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"rollNumber"));
    assert!(fields.contains(&"studentPassword"));
}

#[tokio::test]
async fn test_full_approval_of_unknown_application_is_not_found() {
    let app = setup_test_app();
    let admin = app.admin_token().await;

    let (status, _) = app
        .approve_full(&admin, &uuid::Uuid::new_v4().to_string(), "501")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_full_approvals_provision_once() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    let mut tasks = JoinSet::new();
    for roll_number in ["601", "602", "603", "604"] {
        let router = app.router.clone();
        let uri = format!("/api/admission/applications/{}/approve-full", id);
        let token = admin.clone();
        tasks.spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&approve_full_body(roll_number)).unwrap(),
                ))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        });
    }

    let statuses = tasks.join_all().await;
    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflicts = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 3);

    let (_, students) = app
        .request("GET", "/api/admin/students", Some(&admin), None)
        .await;
    assert_eq!(students.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_roll_number_must_be_alphanumeric() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let id = app.submit_and_find(&admin, "suresh@example.com").await;

    for roll_number in ["a@b.com", "5 A", "5-A"] {
        let (status, body) = app.approve_full(&admin, &id, roll_number).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", roll_number);
        assert_eq!(body["errors"][0]["field"], "rollNumber");
    }

    let (status, _) = app.approve_full(&admin, &id, "5A01").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_roll_numbers_differing_in_case_conflict() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let first = app.submit_and_find(&admin, "first@example.com").await;
    let second = app.submit_and_find(&admin, "second@example.com").await;

    let (status, _) = app.approve_full(&admin, &first, "A1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.approve_full(&admin, &second, "a1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["field"], "rollNumber");
}
