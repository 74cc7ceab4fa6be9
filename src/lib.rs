pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod images;
pub mod migrator;
pub mod services;
pub mod telemetry;

pub use sea_orm;

use axum::{routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::images::ImageStore;

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(json!({ "status": "ok" }))
}

pub fn app(db: DatabaseConnection, images: ImageStore) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/schools",
            get(api::schools::list_schools).post(api::schools::create_school),
        )
        .route(
            "/schools/:school_id",
            get(api::schools::get_school)
                .put(api::schools::update_school)
                .delete(api::schools::delete_school),
        )
        .route(
            "/classes",
            get(api::classes::list_classes).post(api::classes::create_class),
        )
        .route(
            "/classes/:class_id",
            get(api::classes::get_class)
                .put(api::classes::update_class)
                .delete(api::classes::delete_class),
        )
        .route(
            "/classes/:class_id/lesson-reports/latest",
            get(api::lesson_reports::get_latest_report_for_class),
        )
        .route(
            "/students",
            get(api::students::list_students).post(api::students::create_student),
        )
        .route(
            "/students/:student_id",
            get(api::students::get_student)
                .put(api::students::update_student)
                .delete(api::students::delete_student),
        )
        .route(
            "/lesson-reports",
            get(api::lesson_reports::list_lesson_reports)
                .post(api::lesson_reports::create_lesson_report),
        )
        .route(
            "/lesson-reports/:report_id",
            get(api::lesson_reports::get_lesson_report)
                .put(api::lesson_reports::update_lesson_report)
                .delete(api::lesson_reports::delete_lesson_report),
        )
        .route("/images/:report_id/:filename", get(api::images::get_image))
        .layer(Extension(db))
        .layer(Extension(images))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    tracing::info_span!(
                        "request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        matched_path,
                    )
                },
            ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(20 * 1024 * 1024))
}
