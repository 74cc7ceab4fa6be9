use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use http_body_util::BodyExt;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use behalysis_server::{app, config::Config, images::ImageStore, migrator::Migrator};

struct TestApp {
    router: Router,
    images_dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let mut opts = sea_orm::ConnectOptions::new("sqlite::memory:");
    // A pooled in-memory sqlite would give every connection its own database
    opts.max_connections(1);
    let db = sea_orm::Database::connect(opts)
        .await
        .expect("sqlite connect");
    Migrator::up(&db, None).await.expect("migrations");

    let images_dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        images_dir: images_dir.path().to_path_buf(),
        max_image_size_bytes: 2 * 1024 * 1024,
    };
    let images = ImageStore::new(&config);

    TestApp {
        router: app(db, images),
        images_dir,
    }
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get_raw(&self, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, bytes.to_vec())
    }
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 16]);
    bytes
}

fn png_b64() -> String {
    BASE64.encode(png_bytes())
}

fn sample_report_body() -> Value {
    json!({
        "class_id": 12345678,
        "school_id": 87654321,
        "class_index": "8-E",
        "lesson_time": "09:30:00",
        "lesson_date": "2026-02-15",
        "students_count": 2,
        "students": [
            {"student_id": 11112222, "name": "Alice", "image": png_b64(), "attention": 80}
        ],
        "unrecognized_students": [
            {"image": png_b64(), "attention": 60}
        ]
    })
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let (status, body) = app.request("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ── School CRUD ────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_school_create_is_a_conflict() {
    let app = spawn_app().await;

    let (status, _) = app
        .request("POST", "/schools", Some(json!({"id": 10000001, "name": "Alpha"})))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request("POST", "/schools", Some(json!({"id": 10000001, "name": "Beta"})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Original row untouched
    let (status, body) = app.request("GET", "/schools/10000001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alpha");
}

#[tokio::test]
async fn ids_outside_eight_digit_range_are_rejected() {
    let app = spawn_app().await;

    for bad_id in [1234567, 100000000] {
        let (status, _) = app
            .request("POST", "/schools", Some(json!({"id": bad_id})))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "id {bad_id}");
    }
}

#[tokio::test]
async fn school_crud_round_trip() {
    let app = spawn_app().await;

    app.request("POST", "/schools", Some(json!({"id": 10000001, "name": "Alpha"})))
        .await;

    let (status, body) = app
        .request("PUT", "/schools/10000001", Some(json!({"name": "Renamed"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    let (status, body) = app.request("GET", "/schools", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.request("DELETE", "/schools/10000001", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/schools/10000001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_school_cascades_to_dependents() {
    let app = spawn_app().await;

    let (status, _) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.request("DELETE", "/schools/87654321", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/classes/12345678", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.request("GET", "/students/11112222", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app.request("GET", "/lesson-reports", None).await;
    assert_eq!(body["total"], 0);
}

// ── Students & classes ─────────────────────────────────────────────────

#[tokio::test]
async fn student_crud_with_class_filter() {
    let app = spawn_app().await;

    app.request("POST", "/schools", Some(json!({"id": 10000001})))
        .await;
    app.request(
        "POST",
        "/classes",
        Some(json!({"id": 20000001, "school_id": 10000001, "class_index": "7-B"})),
    )
    .await;
    app.request(
        "POST",
        "/classes",
        Some(json!({"id": 20000002, "school_id": 10000001, "class_index": "7-C"})),
    )
    .await;

    let (status, _) = app
        .request(
            "POST",
            "/students",
            Some(json!({"id": 30000001, "class_id": 20000001, "full_name": "Bob"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(
            "POST",
            "/students",
            Some(json!({"id": 30000001, "class_id": 20000001})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app
        .request("GET", "/students?class_id=20000001", None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = app
        .request("GET", "/students?class_id=20000002", None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (_, body) = app
        .request(
            "PUT",
            "/students/30000001",
            Some(json!({"full_name": "Robert"})),
        )
        .await;
    assert_eq!(body["full_name"], "Robert");

    let (_, body) = app.request("GET", "/classes?school_id=10000001", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// ── Lesson report intake ───────────────────────────────────────────────

#[tokio::test]
async fn report_intake_computes_aggregates_and_provisions_stubs() {
    let app = spawn_app().await;

    let (status, body) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(body["avg_attention"].as_f64().unwrap(), 70.0);
    assert_eq!(body["avg_inattention"].as_f64().unwrap(), 30.0);
    assert_eq!(body["students_count"], 2);
    assert_eq!(body["class_index"], "8-E");
    assert_eq!(body["lesson_date"], "2026-02-15");

    let students = body["students"].as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["attention"], 80);
    assert_eq!(students[0]["inattention"], 20);
    let unrecognized = body["unrecognized_students"].as_array().unwrap();
    assert_eq!(unrecognized.len(), 1);
    assert_eq!(unrecognized[0]["attention"], 60);
    assert_eq!(unrecognized[0]["inattention"], 40);

    // Parent stubs got provisioned
    let (status, school) = app.request("GET", "/schools/87654321", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(school["name"].is_null());
    let (status, class) = app.request("GET", "/classes/12345678", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(class["class_index"], "8-E");
    let (status, student) = app.request("GET", "/students/11112222", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(student["full_name"], "Alice");
}

#[tokio::test]
async fn created_report_round_trips_through_fetch() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = app
        .request("GET", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["lesson_time"], created["lesson_time"]);
    assert_eq!(fetched["avg_attention"], created["avg_attention"]);
    assert_eq!(
        fetched["students"].as_array().unwrap().len(),
        created["students"].as_array().unwrap().len()
    );
    assert_eq!(
        fetched["unrecognized_students"].as_array().unwrap().len(),
        created["unrecognized_students"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn stored_images_are_served_back() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let image_url = created["students"][0]["image_url"].as_str().unwrap();
    let id = created["id"].as_str().unwrap();
    assert!(image_url.starts_with(&format!("/images/{id}/")));
    assert!(image_url.ends_with(".png"));

    let (status, content_type, bytes) = app.get_raw(image_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(bytes, png_bytes());

    let (status, _, _) = app
        .get_raw(&format!("/images/{id}/missing.png"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn count_mismatch_is_rejected_before_any_mutation() {
    let app = spawn_app().await;

    let mut body = sample_report_body();
    body["students_count"] = json!(99);
    let (status, _) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was provisioned or inserted
    let (_, list) = app.request("GET", "/lesson-reports", None).await;
    assert_eq!(list["total"], 0);
    let (status, _) = app.request("GET", "/schools/87654321", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attention_out_of_range_is_rejected() {
    let app = spawn_app().await;

    for attention in [0, 101] {
        let mut body = sample_report_body();
        body["students"][0]["attention"] = json!(attention);
        let (status, _) = app.request("POST", "/lesson-reports", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "attention {attention}");
    }
}

#[tokio::test]
async fn malformed_image_rolls_back_the_whole_submission() {
    let app = spawn_app().await;

    let mut body = sample_report_body();
    body["unrecognized_students"][0]["image"] = json!("not&&base64##");
    let (status, _) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Transaction rollback: no report, and even the provisioned school
    // stub is gone
    let (_, list) = app.request("GET", "/lesson-reports", None).await;
    assert_eq!(list["total"], 0);
    let (status, _) = app.request("GET", "/schools/87654321", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Files written before the failure were swept with the report dir
    let leftover = std::fs::read_dir(app.images_dir.path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn oversized_image_is_rejected_as_payload_too_large() {
    let app = spawn_app().await;

    let mut big = png_bytes();
    big.resize(2 * 1024 * 1024 + 1, 0);
    let mut body = sample_report_body();
    body["students"][0]["image"] = json!(BASE64.encode(&big));

    let (status, _) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn empty_entry_sets_leave_averages_at_zero() {
    let app = spawn_app().await;

    let body = json!({
        "class_id": 12345678,
        "school_id": 87654321,
        "class_index": "8-E",
        "lesson_time": "10:00:00",
        "students_count": 0,
        "students": [],
        "unrecognized_students": []
    });
    let (status, created) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["avg_attention"].as_f64().unwrap(), 0.0);
    assert_eq!(created["avg_inattention"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn missing_lesson_date_defaults_to_today() {
    let app = spawn_app().await;

    let mut body = sample_report_body();
    body.as_object_mut().unwrap().remove("lesson_date");
    let (status, created) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(created["lesson_date"], today);
}

// ── Listing / latest ───────────────────────────────────────────────────

async fn create_report(app: &TestApp, class_id: i64, school_id: i64, date: &str) -> Value {
    let body = json!({
        "class_id": class_id,
        "school_id": school_id,
        "class_index": "8-E",
        "lesson_time": "09:00:00",
        "lesson_date": date,
        "students_count": 0,
        "students": [],
        "unrecognized_students": []
    });
    let (status, created) = app.request("POST", "/lesson-reports", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created
}

#[tokio::test]
async fn listing_supports_filters_and_pagination() {
    let app = spawn_app().await;

    create_report(&app, 12345678, 87654321, "2026-02-10").await;
    create_report(&app, 12345678, 87654321, "2026-02-12").await;
    create_report(&app, 23456789, 76543210, "2026-02-14").await;

    let (status, body) = app.request("GET", "/lesson-reports", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 0);
    // Summaries carry no nested entries
    assert!(body["items"][0].get("students").is_none());

    let (_, body) = app
        .request("GET", "/lesson-reports?school_id=87654321", None)
        .await;
    assert_eq!(body["total"], 2);

    let (_, body) = app
        .request("GET", "/lesson-reports?class_id=23456789", None)
        .await;
    assert_eq!(body["total"], 1);

    let (_, body) = app
        .request(
            "GET",
            "/lesson-reports?date_from=2026-02-11&date_to=2026-02-13",
            None,
        )
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["lesson_date"], "2026-02-12");

    let (_, body) = app
        .request("GET", "/lesson-reports?limit=2&offset=2", None)
        .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn latest_for_class_returns_most_recent_report() {
    let app = spawn_app().await;

    create_report(&app, 12345678, 87654321, "2026-02-15").await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_report(&app, 12345678, 87654321, "2026-02-16").await;

    let (status, body) = app
        .request("GET", "/classes/12345678/lesson-reports/latest", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lesson_date"], "2026-02-16");

    let (status, body) = app
        .request("GET", "/classes/23456789/lesson-reports/latest", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "No lesson reports found for class 23456789"
    );
}

// ── Update / delete ────────────────────────────────────────────────────

#[tokio::test]
async fn scalar_update_leaves_entries_untouched() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/lesson-reports/{id}"),
            Some(json!({"class_index": "9-A"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["class_index"], "9-A");
    assert_eq!(updated["students"].as_array().unwrap().len(), 1);
    assert_eq!(updated["unrecognized_students"].as_array().unwrap().len(), 1);
    assert_eq!(updated["avg_attention"].as_f64().unwrap(), 70.0);
}

#[tokio::test]
async fn update_with_students_replaces_entries_and_images() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let id = created["id"].as_str().unwrap();

    let report_dir = app.images_dir.path().join(id);
    assert_eq!(std::fs::read_dir(&report_dir).unwrap().count(), 2);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/lesson-reports/{id}"),
            Some(json!({
                "students_count": 1,
                "students": [
                    {"student_id": 33334444, "image": png_b64(), "attention": 50}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["students"].as_array().unwrap().len(), 1);
    assert_eq!(updated["unrecognized_students"].as_array().unwrap().len(), 0);
    assert_eq!(updated["avg_attention"].as_f64().unwrap(), 50.0);
    assert_eq!(updated["avg_inattention"].as_f64().unwrap(), 50.0);

    // Old images replaced wholesale
    assert_eq!(std::fs::read_dir(&report_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn update_count_mismatch_is_rejected() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = app
        .request(
            "PUT",
            &format!("/lesson-reports/{id}"),
            Some(json!({
                "students_count": 5,
                "students": [
                    {"student_id": 33334444, "image": png_b64(), "attention": 50}
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Entries unchanged
    let (_, fetched) = app
        .request("GET", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(fetched["students"].as_array().unwrap().len(), 1);
    assert_eq!(fetched["unrecognized_students"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delete_removes_rows_and_image_directory() {
    let app = spawn_app().await;

    let (_, created) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    let id = created["id"].as_str().unwrap();
    let report_dir = app.images_dir.path().join(id);
    assert!(report_dir.is_dir());

    let (status, _) = app
        .request("DELETE", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!report_dir.exists());

    let (status, _) = app
        .request("GET", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_report_id_is_not_found() {
    let app = spawn_app().await;
    let id = uuid::Uuid::new_v4();

    let (status, _) = app
        .request("GET", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/lesson-reports/{id}"),
            Some(json!({"class_index": "1-A"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request("DELETE", &format!("/lesson-reports/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_submissions_reuse_provisioned_stubs() {
    let app = spawn_app().await;

    let (status, _) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .request("POST", "/lesson-reports", Some(sample_report_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, schools) = app.request("GET", "/schools", None).await;
    assert_eq!(schools.as_array().unwrap().len(), 1);
    let (_, students) = app
        .request("GET", "/students?class_id=12345678", None)
        .await;
    assert_eq!(students.as_array().unwrap().len(), 1);
    let (_, reports) = app.request("GET", "/lesson-reports", None).await;
    assert_eq!(reports["total"], 2);
}
