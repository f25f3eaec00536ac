use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::ApplicationInput,
    error::{ApiResult, ClientError},
    protocol::{
        BatchResponse, BatchResult, FeatureInfo, FeatureInfoResponse, HealthStatus,
        ModelInfoResponse, ModelMetrics, PredictResponse, PredictionResult,
    },
};
use tracing::{debug, info, warn};

pub mod batch;
pub mod config;
pub mod dashboard;
pub mod form;
pub mod format;
mod inflight;
pub mod shell;
pub mod upload;

pub use batch::{BatchController, BatchState, BatchSummary};
pub use config::ClientSettings;
pub use dashboard::{DashboardController, DashboardState, DashboardView};
pub use form::{FormController, FormDraft, FormField, FormState};
pub use inflight::RequestTicket;
pub use shell::{Tab, ViewShell};
pub use upload::{CsvUpload, CSV_MIME_TYPE};

pub const MODEL_INFO_PATH: &str = "/api/model-info";
pub const PREDICT_PATH: &str = "/api/predict";
pub const PREDICT_BATCH_PATH: &str = "/predict-batch";
pub const HEALTH_PATH: &str = "/api/health";
pub const FEATURE_INFO_PATH: &str = "/api/feature-info";
pub const BATCH_FILE_FIELD: &str = "file";
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from the prediction service";

/// Remote calls the controllers depend on.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn fetch_model_metrics(&self) -> ApiResult<ModelMetrics>;
    async fn submit_application(&self, input: &ApplicationInput) -> ApiResult<PredictionResult>;
    async fn submit_batch(&self, upload: &CsvUpload) -> ApiResult<BatchResult>;
}

/// HTTP client for the loan prediction service.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    base_url: String,
}

impl PredictionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        let url = self.endpoint(HEALTH_PATH);
        debug!(%url, "checking service health");
        decode_body(&url, self.http.get(&url).send().await).await
    }

    pub async fn feature_info(&self) -> ApiResult<FeatureInfo> {
        let url = self.endpoint(FEATURE_INFO_PATH);
        debug!(%url, "fetching feature info");
        let response: FeatureInfoResponse =
            decode_body(&url, self.http.get(&url).send().await).await?;
        log_outcome(&url, response.into_result())
    }
}

#[async_trait]
impl PredictionApi for PredictionClient {
    async fn fetch_model_metrics(&self) -> ApiResult<ModelMetrics> {
        let url = self.endpoint(MODEL_INFO_PATH);
        debug!(%url, "fetching model metrics");
        let response: ModelInfoResponse =
            decode_body(&url, self.http.get(&url).send().await).await?;
        log_outcome(&url, response.into_result())
    }

    async fn submit_application(&self, input: &ApplicationInput) -> ApiResult<PredictionResult> {
        let url = self.endpoint(PREDICT_PATH);
        debug!(%url, "submitting loan application");
        let response: PredictResponse =
            decode_body(&url, self.http.post(&url).json(input).send().await).await?;
        log_outcome(&url, response.into_result())
    }

    async fn submit_batch(&self, upload: &CsvUpload) -> ApiResult<BatchResult> {
        if !upload.is_csv() {
            warn!(
                file = %upload.file_name,
                mime_type = ?upload.mime_type,
                "refusing to upload non-csv file"
            );
            return Err(ClientError::invalid_csv());
        }

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(CSV_MIME_TYPE)
            .map_err(|_| ClientError::invalid_csv())?;
        let form = Form::new().part(BATCH_FILE_FIELD, part);

        let url = self.endpoint(PREDICT_BATCH_PATH);
        debug!(%url, file = %upload.file_name, bytes = upload.bytes.len(), "submitting batch");
        let response: BatchResponse =
            decode_body(&url, self.http.post(&url).multipart(form).send().await).await?;
        log_outcome(&url, response.into_result())
    }
}

/// Reads the JSON body whatever the status code; the service reports
/// failures as `{success: false, error}` on 4xx/5xx responses.
async fn decode_body<T: DeserializeOwned>(
    url: &str,
    sent: Result<Response, reqwest::Error>,
) -> ApiResult<T> {
    let response = sent.map_err(|err| {
        warn!(%url, "request failed: {err}");
        ClientError::connection()
    })?;
    let status = response.status();
    let body = response.bytes().await.map_err(|err| {
        warn!(%url, %status, "failed to read response body: {err}");
        ClientError::connection()
    })?;
    serde_json::from_slice(&body).map_err(|err| {
        warn!(%url, %status, "undecodable response body: {err}");
        ClientError::service(UNEXPECTED_RESPONSE_MESSAGE)
    })
}

fn log_outcome<T>(url: &str, outcome: ApiResult<T>) -> ApiResult<T> {
    match &outcome {
        Ok(_) => info!(%url, "request completed"),
        Err(err) => warn!(%url, "service reported failure: {err}"),
    }
    outcome
}

#[cfg(test)]
#[path = "tests/fake_api.rs"]
pub(crate) mod fake_api;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
