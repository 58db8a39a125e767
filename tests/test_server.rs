//! Integration test: Server endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use diabetes_predictor::server::{create_router, AppState, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const POSITIVE: &str = "Patient has Diabetes";
const NEGATIVE: &str = "Patient doesn't have Diabetes";

fn test_app() -> axum::Router {
    let predictor = common::trained_predictor(25);
    let state = Arc::new(AppState::new(ServerConfig::default(), predictor));
    create_router(state)
}

async fn post_predict(app: axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_root_serves_html() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Diabetes Prediction"));
    assert!(html.contains("/predict"));
    for field in ["Pregnancies", "Glucose", "BloodPressure", "SkinThickness", "Insulin", "BMI", "DiabetesPedigreeFunction", "Age"] {
        assert!(html.contains(&format!("name=\"{}\"", field)), "form lacks {}", field);
    }
}

#[tokio::test]
async fn test_prediction_is_one_of_two_literals() {
    // Values between the fixture's negative and positive ranges, with
    // decimals and a zero in a zero-as-missing column
    let borderline = json!({
        "Pregnancies": 3,
        "Glucose": 127.5,
        "BloodPressure": 0,
        "SkinThickness": 22,
        "Insulin": 94.2,
        "BMI": 30.1,
        "DiabetesPedigreeFunction": 0.45,
        "Age": 37
    });
    let (status, body) = post_predict(test_app(), borderline.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    let prediction = body["prediction"].as_str().unwrap();
    assert!(prediction == POSITIVE || prediction == NEGATIVE);
    assert_eq!(body.as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_known_positive_record() {
    let (status, body) = post_predict(test_app(), common::known_positive_json().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], POSITIVE);
}

#[tokio::test]
async fn test_clearly_negative_record() {
    let (status, body) = post_predict(test_app(), common::clearly_negative_json().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], NEGATIVE);
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let mut request = common::known_positive_json();
    request.as_object_mut().unwrap().remove("Age");

    let (status, body) = post_predict(test_app(), request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("Age"));
}

#[tokio::test]
async fn test_non_numeric_field_is_bad_request() {
    let mut request = common::known_positive_json();
    request["Glucose"] = json!("high");

    let (status, body) = post_predict(test_app(), request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Glucose"));
}

#[tokio::test]
async fn test_extra_field_is_bad_request() {
    let mut request = common::known_positive_json();
    request["Weight"] = json!(70);

    let (status, body) = post_predict(test_app(), request.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Weight"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (status, body) = post_predict(test_app(), "{\"Glucose\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_non_object_body_is_bad_request() {
    let (status, _) = post_predict(test_app(), "[6, 148, 72, 35, 0, 33.6, 0.627, 50]".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_form_strings_match_numbers() {
    let as_strings = json!({
        "Pregnancies": "6",
        "Glucose": "148",
        "BloodPressure": "72",
        "SkinThickness": "35",
        "Insulin": "0",
        "BMI": "33.6",
        "DiabetesPedigreeFunction": "0.627",
        "Age": "50"
    });

    let app = test_app();
    let (_, from_numbers) = post_predict(app.clone(), common::known_positive_json().to_string()).await;
    let (status, from_strings) = post_predict(app, as_strings.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(from_numbers, from_strings);
}

#[tokio::test]
async fn test_key_order_does_not_matter() {
    let reversed = r#"{"Age": 24, "DiabetesPedigreeFunction": 0.351, "BMI": 22.1, "Insulin": 0,
        "SkinThickness": 29, "BloodPressure": 66, "Glucose": 85, "Pregnancies": 1}"#;

    let app = test_app();
    let (_, canonical) = post_predict(app.clone(), common::clearly_negative_json().to_string()).await;
    let (status, shuffled) = post_predict(app, reversed.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(canonical, shuffled);
}

#[tokio::test]
async fn test_repeated_request_is_idempotent() {
    let app = test_app();
    let body = common::known_positive_json().to_string();

    let (_, first) = post_predict(app.clone(), body.clone()).await;
    let (_, second) = post_predict(app, body).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"]["n_trees"], 25);
    assert_eq!(body["model"]["feature_names"][5], "BMI");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().starts_with("Not found"));
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], true);
}
