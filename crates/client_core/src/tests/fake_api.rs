use std::sync::Mutex;

use async_trait::async_trait;
use shared::{
    domain::ApplicationInput,
    error::{ApiResult, ClientError},
    protocol::{BatchRecord, BatchResult, Decision, ModelMetrics, PredictionResult},
};

use crate::{CsvUpload, PredictionApi};

/// Scripted stand-in for the prediction service that records what it was sent.
pub(crate) struct FakeApi {
    pub prediction: ApiResult<PredictionResult>,
    pub batch: ApiResult<BatchResult>,
    pub metrics: ApiResult<ModelMetrics>,
    pub submitted_inputs: Mutex<Vec<ApplicationInput>>,
    pub submitted_uploads: Mutex<Vec<CsvUpload>>,
    pub metric_fetches: Mutex<u32>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            prediction: Ok(PredictionResult {
                prediction: Decision::Approved,
                probability: 0.82,
                confidence: 0.91,
            }),
            batch: Ok(BatchResult::default()),
            metrics: Ok(ModelMetrics::default()),
            submitted_inputs: Mutex::new(Vec::new()),
            submitted_uploads: Mutex::new(Vec::new()),
            metric_fetches: Mutex::new(0),
        }
    }

    pub fn failing(err: ClientError) -> Self {
        Self {
            prediction: Err(err.clone()),
            batch: Err(err.clone()),
            metrics: Err(err),
            ..Self::new()
        }
    }

    pub fn with_batch(mut self, batch: BatchResult) -> Self {
        self.batch = Ok(batch);
        self
    }

    pub fn with_metrics(mut self, metrics: ModelMetrics) -> Self {
        self.metrics = Ok(metrics);
        self
    }

    pub fn input_count(&self) -> usize {
        self.submitted_inputs.lock().expect("lock").len()
    }

    pub fn upload_count(&self) -> usize {
        self.submitted_uploads.lock().expect("lock").len()
    }
}

#[async_trait]
impl PredictionApi for FakeApi {
    async fn fetch_model_metrics(&self) -> ApiResult<ModelMetrics> {
        *self.metric_fetches.lock().expect("lock") += 1;
        self.metrics.clone()
    }

    async fn submit_application(&self, input: &ApplicationInput) -> ApiResult<PredictionResult> {
        self.submitted_inputs
            .lock()
            .expect("lock")
            .push(input.clone());
        self.prediction.clone()
    }

    async fn submit_batch(&self, upload: &CsvUpload) -> ApiResult<BatchResult> {
        self.submitted_uploads
            .lock()
            .expect("lock")
            .push(upload.clone());
        self.batch.clone()
    }
}

pub(crate) fn batch_of(labels: &[&str]) -> BatchResult {
    BatchResult {
        total: labels.len() as u64,
        predictions: labels
            .iter()
            .enumerate()
            .map(|(idx, label)| BatchRecord {
                loan_id: format!("LP{:03}", idx + 1),
                prediction: Decision::from(label.to_string()),
                probability: (*label != "Error").then_some(0.7),
                confidence: (*label != "Error").then_some(0.6),
                error: (*label == "Error").then(|| "missing column".to_string()),
            })
            .collect(),
    }
}
