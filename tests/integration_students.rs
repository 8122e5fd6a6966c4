mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tokio::task::JoinSet;
use tower::ServiceExt;

use common::{TestApp, quick_add_body, setup_test_app};

async fn quick_add(app: &TestApp, token: &str, roll_number: &str, parent_email: &str) -> Value {
    let (status, body) = app
        .request(
            "POST",
            "/api/admin/students",
            Some(token),
            Some(quick_add_body(roll_number, parent_email)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn test_quick_add_creates_student_and_parent() {
    let app = setup_test_app();
    let admin = app.admin_token().await;

    let body = quick_add(&app, &admin, "301", " Karthik@Example.com ").await;

    assert_eq!(body["student"]["rollNumber"], "301");
    assert_eq!(body["student"]["academicInfo"]["class"], "3rd");
    assert_eq!(body["student"]["academicInfo"]["section"], "B");
    assert_eq!(body["student"]["parentInfo"]["parentEmail"], "karthik@example.com");
    assert_eq!(body["parent"]["email"], "karthik@example.com");
    assert_eq!(body["parent"]["firstName"], "Karthik");
    assert_eq!(body["student"]["parentInfo"]["parentId"], body["parent"]["id"]);

    let (status, _) = app.login("301", "student123", "student").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_quick_add_defaults_parent_name() {
    let app = setup_test_app();
    let admin = app.admin_token().await;

    let mut body = quick_add_body("302", "guardian@example.com");
    body.as_object_mut().unwrap().remove("parentName");
    let (status, response) = app
        .request("POST", "/api/admin/students", Some(&admin), Some(body))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response["parent"]["firstName"], "Parent");
}

#[tokio::test]
async fn test_quick_add_explicit_admission_number_must_be_unique() {
    let app = setup_test_app();
    let admin = app.admin_token().await;

    let mut first = quick_add_body("303", "a@example.com");
    first["admissionNumber"] = json!("NS-2026-17");
    let (status, body) = app
        .request("POST", "/api/admin/students", Some(&admin), Some(first))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student"]["admissionNumber"], "NS-2026-17");

    let mut second = quick_add_body("304", "b@example.com");
    second["admissionNumber"] = json!("NS-2026-17");
    let (status, body) = app
        .request("POST", "/api/admin/students", Some(&admin), Some(second))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["field"], "admissionNumber");
}

#[tokio::test]
async fn test_quick_add_rejects_taken_roll_number() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    quick_add(&app, &admin, "305", "a@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/students",
            Some(&admin),
            Some(quick_add_body("305", "b@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["field"], "rollNumber");
}

#[tokio::test]
async fn test_teacher_reads_but_cannot_write() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let teacher = app.teacher_token().await;
    let created = quick_add(&app, &admin, "306", "a@example.com").await;
    let id = created["student"]["id"].as_str().unwrap();

    let (status, list) = app
        .request("GET", "/api/admin/students", Some(&teacher), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/admin/students/{}", id),
            Some(&teacher),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/students",
            Some(&teacher),
            Some(quick_add_body("307", "b@example.com")),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/admin/students/{}", id),
            Some(&teacher),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_keeps_roll_and_admission_numbers() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let created = quick_add(&app, &admin, "308", "a@example.com").await;
    let id = created["student"]["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            Some(json!({
                "class": "4th",
                "section": "C",
                "rollNumber": "999",
                "admissionNumber": "HACKED",
                "totalFees": 12000.0,
                "feePayments": [
                    { "date": "2026-07-01", "amount": 5000.0, "method": "upi" }
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["academicInfo"]["class"], "4th");
    assert_eq!(body["academicInfo"]["section"], "C");
    assert_eq!(body["rollNumber"], "308");
    assert_eq!(body["admissionNumber"], created["student"]["admissionNumber"]);
    assert_eq!(body["fees"]["paidAmount"], 5000.0);
    assert_eq!(body["fees"]["pendingAmount"], 7000.0);
}

#[tokio::test]
async fn test_attendance_and_marks_recompute_totals() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let created = quick_add(&app, &admin, "309", "a@example.com").await;
    let id = created["student"]["id"].as_str().unwrap();

    for (date, status) in [
        ("2026-07-01", "present"),
        ("2026-07-02", "late"),
        ("2026-07-03", "half-day"),
        ("2026-07-04", "absent"),
    ] {
        let (code, _) = app
            .request(
                "POST",
                &format!("/api/admin/students/{}/attendance", id),
                Some(&admin),
                Some(json!({ "date": date, "status": status })),
            )
            .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (_, student) = app
        .request(
            "GET",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(student["attendance"]["totalDays"], 4);
    assert_eq!(student["attendance"]["presentDays"], 2.5);
    assert_eq!(student["attendance"]["percentage"], 62.5);

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/admin/students/{}/marks", id),
            Some(&admin),
            Some(json!({
                "subject": "Mathematics",
                "subjectCode": "MATH",
                "examType": "mid-term",
                "marks": 92.0,
                "totalMarks": 100.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marks"]["subjects"][0]["grade"], "A+");
    assert_eq!(body["marks"]["overallPercentage"], 92.0);
    assert_eq!(body["marks"]["overallGrade"], "A+");

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/admin/students/{}/marks", id),
            Some(&admin),
            Some(json!({
                "subject": "Science",
                "examType": "final",
                "marks": 120.0,
                "totalMarks": 100.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "marks");
}

#[tokio::test]
async fn test_delete_removes_child_from_parent() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let first = quick_add(&app, &admin, "310", "shared@example.com").await;
    quick_add(&app, &admin, "311", "shared@example.com").await;
    let id = first["student"]["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            "DELETE",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deleted successfully");

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, login) = app
        .login("shared@example.com", "parent123", "parent")
        .await;
    assert_eq!(login["user"]["children"], json!(["311"]));

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_orphans_lists_only_unlinked_students() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    quick_add(&app, &admin, "312", "a@example.com").await;

    let (status, orphans) = app
        .request("GET", "/api/admin/students/orphans", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(orphans.as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_edits_are_all_kept() {
    let app = setup_test_app();
    let admin = app.admin_token().await;
    let created = quick_add(&app, &admin, "313", "a@example.com").await;
    let id = created["student"]["id"].as_str().unwrap().to_string();

    let mut edits: Vec<(String, Value)> = (1..=20)
        .map(|day| {
            (
                format!("/api/admin/students/{}/attendance", id),
                json!({ "date": format!("2026-07-{:02}", day), "status": "present" }),
            )
        })
        .collect();
    edits.push((
        format!("/api/admin/students/{}/marks", id),
        json!({
            "subject": "Mathematics",
            "examType": "unit-test",
            "marks": 18.0,
            "totalMarks": 20.0
        }),
    ));

    let mut tasks = JoinSet::new();
    for (uri, body) in edits {
        let router = app.router.clone();
        let token = admin.clone();
        tasks.spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        });
    }
    {
        let router = app.router.clone();
        let token = admin.clone();
        let uri = format!("/api/admin/students/{}", id);
        tasks.spawn(async move {
            let request = Request::builder()
                .method("PUT")
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "phone": "+91 91234 56789" })).unwrap(),
                ))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        });
    }

    for status in tasks.join_all().await {
        assert_eq!(status, StatusCode::OK);
    }

    let (_, student) = app
        .request(
            "GET",
            &format!("/api/admin/students/{}", id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(student["attendance"]["totalDays"], 20);
    assert_eq!(student["attendance"]["presentDays"], 20.0);
    assert_eq!(student["marks"]["subjects"][0]["name"], "Mathematics");
    assert_eq!(student["personalInfo"]["phone"], "+91 91234 56789");
}
