use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    domain::{Dependents, Education, Gender, PropertyArea, YesNo},
    error::{ErrorKind, CONNECTION_FAILED_MESSAGE, INVALID_CSV_MESSAGE},
    protocol::Decision,
};
use tokio::net::TcpListener;

use super::*;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Healthy,
    Failing,
    Garbled,
}

#[derive(Debug, Clone)]
struct ReceivedUpload {
    field: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Clone)]
struct ServiceState {
    behavior: Behavior,
    predict_bodies: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
}

fn failure_or_garbage(behavior: Behavior, message: &str) -> Response {
    match behavior {
        Behavior::Garbled => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": message})),
        )
            .into_response(),
    }
}

async fn handle_predict(State(state): State<ServiceState>, Json(body): Json<Value>) -> Response {
    state.predict_bodies.lock().expect("lock").push(body);
    if state.behavior != Behavior::Healthy {
        return failure_or_garbage(state.behavior, "Model not loaded");
    }
    Json(json!({
        "success": true,
        "data": {"prediction": "Approved", "probability": 0.82, "confidence": 0.91}
    }))
    .into_response()
}

async fn handle_predict_batch(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Response {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let received = ReceivedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: Vec::new(),
        };
        let bytes = field.bytes().await.expect("field bytes");
        state.uploads.lock().expect("lock").push(ReceivedUpload {
            bytes: bytes.to_vec(),
            ..received
        });
    }
    if state.behavior != Behavior::Healthy {
        return failure_or_garbage(state.behavior, "No file uploaded");
    }
    Json(json!({
        "success": true,
        "total": 3,
        "predictions": [
            {"loan_id": "LP001002", "prediction": "Approved", "probability": 0.81, "confidence": 0.62},
            {"loan_id": "LP001003", "prediction": "Rejected", "probability": 0.23, "confidence": 0.54},
            {"loan_id": 2, "prediction": "Error", "error": "could not convert string to float"}
        ]
    }))
    .into_response()
}

async fn handle_model_info(State(state): State<ServiceState>) -> Response {
    if state.behavior != Behavior::Healthy {
        return failure_or_garbage(state.behavior, "Model not loaded");
    }
    Json(json!({
        "success": true,
        "metrics": {
            "model_name": "Random Forest",
            "accuracy": 0.8211,
            "roc_auc": 0.7712,
            "confusion_matrix": [[18, 25], [2, 78]],
            "feature_importance": [
                {"feature": "Credit_History", "importance": 0.31},
                {"feature": "ApplicantIncome", "importance": 0.17}
            ]
        }
    }))
    .into_response()
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "model_loaded": true}))
}

async fn handle_feature_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "features": ["Gender", "Married", "Credit_History"],
        "total_features": 3
    }))
}

async fn spawn_service(behavior: Behavior) -> Result<(String, ServiceState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServiceState {
        behavior,
        predict_bodies: Arc::new(Mutex::new(Vec::new())),
        uploads: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route(PREDICT_PATH, post(handle_predict))
        .route(PREDICT_BATCH_PATH, post(handle_predict_batch))
        .route(MODEL_INFO_PATH, get(handle_model_info))
        .route(HEALTH_PATH, get(handle_health))
        .route(FEATURE_INFO_PATH, get(handle_feature_info))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/"), state))
}

/// Address that was bound once and then released, so nothing is listening.
async fn closed_port_url() -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

fn sample_application() -> ApplicationInput {
    ApplicationInput {
        gender: Gender::Female,
        married: YesNo::No,
        dependents: Dependents::ThreeOrMore,
        education: Education::NotGraduate,
        self_employed: YesNo::Yes,
        applicant_income: 5000.0,
        coapplicant_income: 0.0,
        loan_amount: 150.0,
        loan_amount_term: 360.0,
        credit_history: 1.0,
        property_area: PropertyArea::Semiurban,
    }
}

fn sample_csv() -> CsvUpload {
    CsvUpload::new(
        "applicants.csv",
        Some(CSV_MIME_TYPE.to_string()),
        "Loan_ID,Gender,Married\nLP001002,Male,No\n",
    )
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let client = PredictionClient::new("http://localhost:5000/");
    assert_eq!(client.base_url(), "http://localhost:5000");
    assert_eq!(
        client.endpoint(PREDICT_PATH),
        "http://localhost:5000/api/predict"
    );
}

#[tokio::test]
async fn predict_posts_service_field_names() {
    let (url, state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let result = client
        .submit_application(&sample_application())
        .await
        .expect("prediction");

    assert_eq!(result.prediction, Decision::Approved);
    assert_eq!(result.probability, 0.82);
    assert_eq!(result.confidence, 0.91);

    let bodies = state.predict_bodies.lock().expect("lock").clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        bodies[0],
        json!({
            "Gender": "Female",
            "Married": "No",
            "Dependents": "3+",
            "Education": "Not Graduate",
            "Self_Employed": "Yes",
            "ApplicantIncome": 5000.0,
            "CoapplicantIncome": 0.0,
            "LoanAmount": 150.0,
            "Loan_Amount_Term": 360.0,
            "Credit_History": 1.0,
            "Property_Area": "Semiurban"
        })
    );
}

#[tokio::test]
async fn service_error_message_is_propagated() {
    let (url, _state) = spawn_service(Behavior::Failing).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let err = client
        .submit_application(&sample_application())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, ErrorKind::Service);
    assert_eq!(err.message, "Model not loaded");

    let err = client.fetch_model_metrics().await.expect_err("must fail");
    assert_eq!(err.message, "Model not loaded");
}

#[tokio::test]
async fn non_json_body_is_an_unexpected_response() {
    let (url, _state) = spawn_service(Behavior::Garbled).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let err = client
        .submit_application(&sample_application())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, ErrorKind::Service);
    assert_eq!(err.message, UNEXPECTED_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn unreachable_service_is_a_connection_error() {
    let client = PredictionClient::new(closed_port_url().await.expect("closed port"));

    let err = client
        .submit_application(&sample_application())
        .await
        .expect_err("must fail");
    assert_eq!(err.kind, ErrorKind::Connection);
    assert_eq!(err.message, CONNECTION_FAILED_MESSAGE);

    let err = client.submit_batch(&sample_csv()).await.expect_err("must fail");
    assert_eq!(err.kind, ErrorKind::Connection);
}

#[tokio::test]
async fn batch_uploads_csv_under_file_field() {
    let (url, state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let result = client.submit_batch(&sample_csv()).await.expect("batch");

    assert_eq!(result.total, 3);
    assert_eq!(result.predictions.len(), 3);
    assert_eq!(result.predictions[2].loan_id, "2");
    assert_eq!(
        result.predictions[2].prediction,
        Decision::Other("Error".to_string())
    );

    let uploads = state.uploads.lock().expect("lock").clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, BATCH_FILE_FIELD);
    assert_eq!(uploads[0].file_name.as_deref(), Some("applicants.csv"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("text/csv"));
    assert_eq!(uploads[0].bytes, sample_csv().bytes);
}

#[tokio::test]
async fn non_csv_upload_never_reaches_the_service() {
    let (url, state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);
    let upload = CsvUpload::new("applicants.xlsx", None, vec![0x50, 0x4b, 0x03, 0x04]);

    let err = client.submit_batch(&upload).await.expect_err("must fail");

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, INVALID_CSV_MESSAGE);
    assert!(state.uploads.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn model_info_decodes_partial_metrics() {
    let (url, _state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let metrics = client.fetch_model_metrics().await.expect("metrics");

    assert_eq!(metrics.model_name.as_deref(), Some("Random Forest"));
    assert!(metrics.classification_report.is_none());
    assert_eq!(metrics.confusion_matrix, Some(vec![vec![18, 25], vec![2, 78]]));
    let view = DashboardView::from_metrics(&metrics);
    assert!(view.classification.is_none());
    assert_eq!(view.top_features.map(|rows| rows.len()), Some(2));
}

#[tokio::test]
async fn health_and_feature_info_are_decoded() {
    let (url, _state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);

    let health = client.health().await.expect("health");
    assert_eq!(health.status, "healthy");
    assert!(health.model_loaded);

    let info = client.feature_info().await.expect("feature info");
    assert_eq!(info.total_features, 3);
    assert_eq!(info.features[2], "Credit_History");
}

#[tokio::test]
async fn controllers_drive_the_http_client() {
    let (url, _state) = spawn_service(Behavior::Healthy).await.expect("spawn server");
    let client = PredictionClient::new(url);
    let mut shell = ViewShell::new();

    shell.form.draft.applicant_income = "5000".to_string();
    shell.form.draft.loan_amount = "150".to_string();
    shell.form.submit(&client).await;
    assert!(shell.form.result().is_some());

    shell.activate(Tab::BatchPrediction);
    shell.batch.select_file(Some(sample_csv()));
    shell.batch.submit(&client).await;
    let summary = shell.batch.summary().expect("summary");
    assert_eq!((summary.approved, summary.rejected), (1, 1));

    shell.activate(Tab::ModelDashboard);
    shell.dashboard.load(&client).await;
    assert!(shell.dashboard.view().is_some());
}
